use thiserror::Error;

#[derive(Debug, Error)]
pub enum HtsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("query timed out after {attempts} poll attempts")]
    Timeout { attempts: u32 },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// An outgoing request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    #[error("http error: {0}")]
    Http(String),
}

impl HtsError {
    /// HTTP status of an API rejection, if this error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HtsError>;
