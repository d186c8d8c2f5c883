/// Content types treated as json. Parameters are never stripped, so
/// `application/json; charset=utf-8` does not match.
const JSON_CONTENT_TYPES: [&str; 2] = ["application/json", "text/json"];

/// Snapshot of the transport result. Built by the executor, read-only for
/// the presenter. Headers keep their wire order.
#[derive(Debug, Default)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    /// Case-insensitive header lookup; first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        return self
            .headers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str());
    }

    pub fn is_json(&self) -> bool {
        match self.header("Content-Type") {
            Some(content_type) => {
                let content_type = content_type.to_lowercase();
                JSON_CONTENT_TYPES.iter().any(|json| *json == content_type)
            }
            None => false,
        }
    }

    /// Anything below 300 exits clean; from 300 up the status code itself
    /// becomes the process exit code.
    pub fn exit_status(&self) -> i32 {
        if self.status < 300 {
            return 0;
        }
        return i32::from(self.status);
    }
}
