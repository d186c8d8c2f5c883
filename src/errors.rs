use thiserror::Error;

/// Every failure the pipeline can hit. All variants are fatal: the process
/// reports the message once and exits nonzero, nothing is retried.
#[derive(Error, Debug)]
pub enum FatalError {
    #[error("template file '{0}' not found")]
    TemplateNotFound(String),

    #[error("template syntax error on line {line} of '{name}': {detail}")]
    TemplateSyntax {
        name: String,
        line: usize,
        detail: String,
    },

    #[error("undefined template value: {0}")]
    UndefinedTemplateVariable(String),

    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    #[error("invalid context source '{0}'")]
    InvalidContextSource(String),

    #[error("invalid context string '{0}'")]
    InvalidContextString(String),

    #[error("invalid context file '{name}': {detail}")]
    InvalidContextFile { name: String, detail: String },

    #[error("{0}")]
    InvalidMethodLine(String),

    #[error("header line '{0}' has no ':' separator")]
    InvalidHeaderLine(String),

    #[error("template contains invalid method '{0}'")]
    InvalidMethod(String),

    #[error("connection failure occurred: {0}")]
    ConnectionFailure(String),

    #[error("communication failure occurred: {0}")]
    CommunicationFailure(String),

    #[error("response body is not valid json: {0}")]
    InvalidJsonBody(String),

    #[error("invalid extraction query: {0}")]
    InvalidExtractionQuery(String),

    #[error("extraction query given but the response is not json")]
    InvalidExtractionOnNonJson,
}
