use crate::errors::FatalError;
use crate::request::Request;

// State as determined by the latest parsed line
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ParseState {
    Method,
    Header,
    Body,
}

/// Scan rendered template text into a [`Request`].
///
/// Three states: the first non-blank line is the method line, the following
/// lines up to a blank line are headers, everything after that blank line
/// is body text taken verbatim. There is no terminal state; the end of the
/// input ends the scan. Text that never produced a method line is rejected
/// rather than executed with an empty method.
pub fn parse_request(text: &str) -> Result<Request, FatalError> {
    let mut request = Request::default();
    let mut saw_method = false;

    let mut state = ParseState::Method;
    for line in text.lines() {
        match state {
            ParseState::Method => {
                if !line.trim().is_empty() {
                    parse_method_line(&mut request, line)?;
                    saw_method = true;
                }
                state = ParseState::Header;
            }
            ParseState::Header => {
                if line.trim().is_empty() {
                    state = ParseState::Body;
                } else {
                    parse_header_line(&mut request, line)?;
                }
            }
            ParseState::Body => parse_body_line(&mut request, line),
        }
    }

    if !saw_method {
        return Err(FatalError::InvalidMethodLine(
            "template produced no method line".to_string(),
        ));
    }
    return Ok(request);
}

fn parse_method_line(request: &mut Request, line: &str) -> Result<(), FatalError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Err(FatalError::InvalidMethodLine(
            "template contains empty method line".to_string(),
        ));
    }
    if parts.len() == 1 {
        return Err(FatalError::InvalidMethodLine(format!(
            "template method line '{}' missing address",
            line
        )));
    }
    request.method = parts[0].to_string();
    request.url = parts[1].to_string();
    if parts.len() > 2 {
        // tokens past the protocol are ignored
        request.protocol = Some(parts[2].to_string());
    }
    return Ok(());
}

fn parse_header_line(request: &mut Request, line: &str) -> Result<(), FatalError> {
    // only the first ':' separates; later colons belong to the value
    let Some((name, value)) = line.split_once(':') else {
        return Err(FatalError::InvalidHeaderLine(line.to_string()));
    };
    request
        .headers
        .push((name.to_string(), value.trim().to_string()));
    return Ok(());
}

fn parse_body_line(request: &mut Request, line: &str) {
    match &mut request.body {
        None => request.body = Some(line.to_string()),
        Some(body) => {
            body.push('\n');
            body.push_str(line);
        }
    }
}
