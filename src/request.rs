/// A request as recovered from rendered template text. Built once by the
/// parser, immutable afterward, consumed by the executor.
///
/// Header names are kept exactly as written (no case normalization, no
/// dedup); values are trimmed by the parser. `body` is `Some` as soon as
/// any body line was seen, so an empty rendered body stays distinguishable
/// from no body at all.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub protocol: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    /// Text form printed by `--test`: the method line, each header as
    /// `Name: Value`, a blank line, then the body.
    pub fn to_text(&self) -> String {
        let mut out = format!("{} {}\n", self.method, self.url);
        for (name, value) in &self.headers {
            out.push_str(&format!("{}: {}\n", name, value));
        }
        out.push('\n');
        out.push_str(self.body.as_deref().unwrap_or(""));
        out.push('\n');
        return out;
    }
}
