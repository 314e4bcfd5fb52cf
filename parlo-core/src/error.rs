use thiserror::Error;

/// All errors produced by parlo-core.
#[derive(Debug, Error)]
pub enum ParloError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no audio data: the first read produced zero samples")]
    NoAudioData,

    #[error("decode cycle error: {0}")]
    DecodeCycle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ParloError>;
