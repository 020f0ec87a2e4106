use thiserror::Error;

/// Errors produced by an analysis call.
///
/// The workflow never shows these to the user directly; it logs them and
/// surfaces a fixed message instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The request never produced a response (connect failure, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status code
    #[error("Analysis service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into a report
    #[error("Malformed analysis response: {0}")]
    Malformed(String),
}

impl AnalysisError {
    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors raised by a diagram engine while turning a description into markup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The description does not follow the engine's grammar
    #[error("Parse error: {0}")]
    Parse(String),

    /// The description parsed but declares nothing to draw
    #[error("Diagram declares no nodes")]
    Empty,

    /// The engine itself failed (panicked task, unavailable backend, ...)
    #[error("Diagram engine failure: {0}")]
    Engine(String),
}

impl RenderError {
    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

/// Result type for analysis calls
pub type AnalysisResult<T> = Result<T, AnalysisError>;
