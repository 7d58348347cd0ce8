use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("object store returned http status {0}")]
    Status(u16),
    #[error("object store request error: {0}")]
    Request(String),
    #[error("object store io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}
impl From<ureq::Error> for StoreError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(status) => StoreError::Status(status),
            other => StoreError::Request(other.to_string()),
        }
    }
}
impl From<glob::PatternError> for StoreError {
    fn from(e: glob::PatternError) -> Self {
        StoreError::Io(format!("glob pattern error: {}", e))
    }
}

impl crate::retry::Transient for StoreError {
    fn is_transient(&self) -> bool {
        match self {
            StoreError::Status(status) => *status >= 500 || *status == 429,
            StoreError::Request(_) => true,
            StoreError::NotFound { .. } | StoreError::InvalidKey(_) | StoreError::Io(_) => false,
        }
    }
}
