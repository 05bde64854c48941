use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("SDK error: {0}")]
    Sdk(#[from] rtctoken::SdkError),

    #[error("Token error: {0}")]
    Token(#[from] rtctoken::TokenError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rtctoken::ConfigError> for CliError {
    fn from(error: rtctoken::ConfigError) -> Self {
        CliError::Sdk(rtctoken::SdkError::Config(error))
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
