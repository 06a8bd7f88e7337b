use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("message is empty")]
    EmptyMessage,

    #[error("no conversation yet; analyze a repository first")]
    NoConversation,

    #[error("a {0} request is already in flight")]
    Busy(&'static str),
}

impl ChatError {
    /// True for failures decided locally, before any request was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ChatError::EmptyMessage | ChatError::NoConversation | ChatError::Busy(_))
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("highlighting failed for '{lang}': {message}")]
    Highlight {
        lang: String,
        message: String,
    },

    #[error("markdown conversion failed: {0}")]
    Markdown(String),

    #[error("renderer panicked")]
    Panicked,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid endpoint path '{path}': {source}")]
    Endpoint {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unknown highlight theme '{0}'")]
    UnknownTheme(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
