use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Features(#[from] features::Error),

    #[error(transparent)]
    Evaluation(#[from] evaluation::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
