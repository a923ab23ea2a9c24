use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid project id: {0:?}")]
    InvalidProjectId(String),
    #[error("invalid model id: {0:?}")]
    InvalidModelId(String),
    #[error("invalid WBS code: {0:?}")]
    InvalidWbsCode(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
