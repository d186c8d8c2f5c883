use serde_json::Value;
use serde_json_path::JsonPath;

use crate::errors::FatalError;
use crate::response::Response;

/// Which response parts `-o` selects. The flags are independent; any
/// subset, including none at all, is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    pub status: bool,
    pub headers: bool,
    pub body: bool,
}

impl OutputMode {
    /// Characters outside `s`/`h`/`b` are ignored.
    pub fn parse(format: &str) -> OutputMode {
        return OutputMode {
            status: format.contains('s'),
            headers: format.contains('h'),
            body: format.contains('b'),
        };
    }
}

impl Default for OutputMode {
    fn default() -> OutputMode {
        OutputMode::parse("shb")
    }
}

/// Format the response per the output mode, or evaluate the extraction
/// query against it. With a query, the status and header flags are
/// suppressed entirely. Returns the text to print and the process exit
/// status.
pub fn present(
    response: &Response,
    mode: OutputMode,
    extract: Option<&str>,
) -> Result<(String, i32), FatalError> {
    let mut out = String::new();
    let mut divide = false;
    if extract.is_none() {
        if mode.status {
            divide = true;
            out.push_str(&format!("{} {}\n", response.status, response.reason));
        }
        if mode.headers {
            divide = true;
            for (name, value) in &response.headers {
                out.push_str(&format!("{}: {}\n", name, value));
            }
        }
    }
    if extract.is_some() || mode.body {
        // one blank line between the status/header block and the body,
        // only when that block printed anything
        if divide {
            out.push('\n');
        }
        match extract {
            Some(query) => out.push_str(&extract_matches(response, query)?),
            None if response.is_json() => out.push_str(&canonical_json(&response.body)?),
            None => {
                out.push_str(&response.body);
                out.push('\n');
            }
        }
    }
    return Ok((out, response.exit_status()));
}

/// Canonical form: indented, object keys sorted.
fn canonical_json(body: &str) -> Result<String, FatalError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FatalError::InvalidJsonBody(e.to_string()))?;
    let mut text = serde_json::to_string_pretty(&value)
        .map_err(|e| FatalError::InvalidJsonBody(e.to_string()))?;
    text.push('\n');
    return Ok(text);
}

/// One line per matched value, in encounter order; strings print raw,
/// everything else as compact json. No matches print nothing.
fn extract_matches(response: &Response, query: &str) -> Result<String, FatalError> {
    if !response.is_json() {
        return Err(FatalError::InvalidExtractionOnNonJson);
    }
    let value: Value = serde_json::from_str(&response.body)
        .map_err(|e| FatalError::InvalidJsonBody(e.to_string()))?;
    let path =
        JsonPath::parse(query).map_err(|e| FatalError::InvalidExtractionQuery(e.to_string()))?;
    let mut out = String::new();
    for matched in path.query(&value).all() {
        match matched {
            Value::String(text) => out.push_str(text),
            other => out.push_str(&other.to_string()),
        }
        out.push('\n');
    }
    return Ok(out);
}
