use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Backend error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Unusable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
