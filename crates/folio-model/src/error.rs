use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("source path is empty")]
    EmptySource,
    #[error("preview is not valid base64: {0}")]
    InvalidPreview(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
