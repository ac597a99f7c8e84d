// Error taxonomy for the client and the uniform response shape every API call returns.
use thiserror::Error;

pub mod response;

pub use response::ApiResponse;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    // No response reached us: DNS, refused connection, timeout, aborted body
    #[error("Connection error")]
    Connection(#[source] reqwest::Error),

    // The backend answered with a non-2xx status; message is shown verbatim
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from server (HTTP {status})")]
    Decode { status: u16 },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// HTTP status associated with the failure; 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            ClientError::Api { status, .. } | ClientError::Decode { status } => *status,
            ClientError::Unauthenticated => 401,
            _ => 0,
        }
    }
}

// Custom result type
pub type ClientResult<T> = Result<T, ClientError>;
