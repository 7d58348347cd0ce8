use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("inference endpoint returned http status {0}")]
    Status(u16),
    #[error("inference endpoint unreachable: {0}")]
    Endpoint(String),
    #[error("inference response is not valid json: {0}")]
    Decode(String),
}

impl From<ureq::Error> for InferenceError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(status) => InferenceError::Status(status),
            other => InferenceError::Endpoint(other.to_string()),
        }
    }
}
impl From<serde_json::Error> for InferenceError {
    fn from(e: serde_json::Error) -> Self {
        InferenceError::Decode(e.to_string())
    }
}

impl crate::retry::Transient for InferenceError {
    fn is_transient(&self) -> bool {
        match self {
            InferenceError::Status(status) => *status >= 500 || *status == 429,
            InferenceError::Endpoint(_) => true,
            InferenceError::Decode(_) => false,
        }
    }
}
