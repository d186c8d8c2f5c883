use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use log::debug;

use crate::errors::FatalError;

/// Context key carrying the proxy url. Consumed by execution only.
pub const PROXIES_KEY: &str = "proxies";
/// Context key carrying the cookie header value. Consumed by execution only.
pub const COOKIES_KEY: &str = "cookies";

const RESERVED_KEYS: [&str; 2] = [PROXIES_KEY, COOKIES_KEY];

/// Substitution values for the template plus the reserved execution keys.
/// Built once per invocation from the positional context sources; later
/// sources override earlier ones. Read-only once rendering begins.
#[derive(Debug, Default)]
pub struct Context {
    values: HashMap<String, String>,
}

impl Context {
    /// Assemble a context from positional sources. A source naming an
    /// existing file is parsed as a yaml mapping; a source containing `=`
    /// or `:` is a single key/value pair; anything else is fatal.
    pub fn from_sources(sources: &[String]) -> Result<Context, FatalError> {
        let mut context = Context::default();
        for source in sources {
            if Path::new(source).is_file() {
                context.merge_file(source)?;
            } else if source.contains('=') || source.contains(':') {
                context.merge_pair(source)?;
            } else {
                return Err(FatalError::InvalidContextSource(source.clone()));
            }
        }
        debug!(
            "context holds {} value(s) from {} source(s)",
            context.values.len(),
            sources.len()
        );
        return Ok(context);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        return self.values.get(key).map(String::as_str);
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// The mapping handed to the renderer. The reserved execution keys are
    /// withheld so transport configuration cannot leak into request text.
    pub fn template_vars(&self) -> HashMap<String, String> {
        return self
            .values
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
    }

    fn merge_file(&mut self, name: &str) -> Result<(), FatalError> {
        let file = File::open(name).map_err(|e| FatalError::InvalidContextFile {
            name: name.to_string(),
            detail: e.to_string(),
        })?;
        let doc: serde_yaml::Value =
            serde_yaml::from_reader(file).map_err(|e| FatalError::InvalidContextFile {
                name: name.to_string(),
                detail: e.to_string(),
            })?;
        let serde_yaml::Value::Mapping(mapping) = doc else {
            return Err(FatalError::InvalidContextFile {
                name: name.to_string(),
                detail: "document is not a key/value mapping".to_string(),
            });
        };
        for (key, value) in &mapping {
            let Some(key) = key.as_str() else {
                return Err(FatalError::InvalidContextFile {
                    name: name.to_string(),
                    detail: "mapping has a non-string key".to_string(),
                });
            };
            let value = scalar_to_string(value).ok_or_else(|| FatalError::InvalidContextFile {
                name: name.to_string(),
                detail: format!("value for key '{}' is not a scalar", key),
            })?;
            self.values.insert(key.to_string(), value);
        }
        return Ok(());
    }

    fn merge_pair(&mut self, source: &str) -> Result<(), FatalError> {
        // '=' wins over ':' so "a=b:c" keeps the colon inside the value
        let split = if source.contains('=') {
            source.split_once('=')
        } else {
            source.split_once(':')
        };
        let Some((key, value)) = split else {
            return Err(FatalError::InvalidContextString(source.to_string()));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(FatalError::InvalidContextString(source.to_string()));
        }
        self.values.insert(key.to_string(), value.trim().to_string());
        return Ok(());
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Null => Some(String::new()),
        serde_yaml::Value::Bool(flag) => Some(flag.to_string()),
        serde_yaml::Value::Number(number) => Some(number.to_string()),
        serde_yaml::Value::String(text) => Some(text.clone()),
        _ => None,
    }
}
