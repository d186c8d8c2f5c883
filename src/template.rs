use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use log::debug;
use minijinja::{path_loader, Environment, ErrorKind, UndefinedBehavior};

use crate::context::Context;
use crate::errors::FatalError;

pub const DEFAULT_NOW_FORMAT: &str = "%Y%m%d%H%M%S";

/// Values the template namespace pulls from the outside world, injected so
/// tests can render deterministically.
pub trait TemplateHelpers: Send + Sync {
    fn now(&self, format: &str) -> String;
    fn user(&self) -> String;
}

/// Production helpers: wall clock and login name.
pub struct SystemHelpers;

impl TemplateHelpers for SystemHelpers {
    fn now(&self, format: &str) -> String {
        let mut out = String::new();
        // an invalid strftime format falls back to the literal format string
        match write!(out, "{}", Local::now().format(format)) {
            Ok(()) => out,
            Err(_) => format.to_string(),
        }
    }

    fn user(&self) -> String {
        return whoami::username();
    }
}

/// Build the rendering environment: templates resolve relative to `root`,
/// undefined variables are hard errors, `now()` and `user()` are in scope.
pub fn environment(root: &Path, helpers: Arc<dyn TemplateHelpers>) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(path_loader(root));
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    let now_helpers = helpers.clone();
    env.add_function("now", move |format: Option<String>| {
        now_helpers.now(format.as_deref().unwrap_or(DEFAULT_NOW_FORMAT))
    });
    env.add_function("user", move || helpers.user());
    return env;
}

/// Render the named template against the context's template variables.
pub fn render(
    env: &Environment,
    name: &str,
    context: &Context,
) -> Result<String, FatalError> {
    let template = env.get_template(name).map_err(|e| match e.kind() {
        ErrorKind::TemplateNotFound => FatalError::TemplateNotFound(name.to_string()),
        ErrorKind::SyntaxError => FatalError::TemplateSyntax {
            name: name.to_string(),
            line: e.line().unwrap_or(0),
            detail: e.to_string(),
        },
        _ => FatalError::TemplateRender(e.to_string()),
    })?;
    let text = template
        .render(context.template_vars())
        .map_err(|e| match e.kind() {
            ErrorKind::UndefinedError => FatalError::UndefinedTemplateVariable(e.to_string()),
            _ => FatalError::TemplateRender(e.to_string()),
        })?;
    debug!("rendered template '{}' ({} bytes)", name, text.len());
    return Ok(text);
}
