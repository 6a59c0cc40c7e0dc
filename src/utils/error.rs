use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl Error {
    pub fn persistence<T: Into<String>>(message: T) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
