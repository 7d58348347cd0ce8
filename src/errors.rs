use thiserror::Error;
use crate::manager_inference::errors::InferenceError;
use crate::manager_storage::errors::StoreError;

/// Errors that abort a pipeline invocation.
///
/// Every variant is surfaced to the caller unmodified so that whoever triggered the
/// invocation can decide on redelivery.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("MalformedEventError: {0}")]
    MalformedEvent(String),
    #[error("NotFoundError: {bucket}/{key}")]
    NotFound { bucket: String, key: String },
    #[error("InferenceError: {0}")]
    Inference(String),
    #[error("DecodeError: {0}")]
    Decode(String),
    #[error("SchemaError: {0}")]
    Schema(String),
    #[error("StorageError: {0}")]
    Storage(String),
}

impl PipelineError {
    /// Process exit code for the error, distinct per kind so that a supervisor can tell
    /// failures apart without parsing messages
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::MalformedEvent(_) => 3,
            PipelineError::NotFound { .. } => 4,
            PipelineError::Inference(_) => 5,
            PipelineError::Decode(_) => 6,
            PipelineError::Schema(_) => 7,
            PipelineError::Storage(_) => 8,
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { bucket, key } => PipelineError::NotFound { bucket, key },
            other => PipelineError::Storage(other.to_string()),
        }
    }
}

impl From<InferenceError> for PipelineError {
    fn from(e: InferenceError) -> Self {
        match e {
            InferenceError::Decode(msg) => PipelineError::Decode(msg),
            other => PipelineError::Inference(other.to_string()),
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        PipelineError::Decode(format!("csv document error: {}", e))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Decode(format!("json document error: {}", e))
    }
}

/// Error depicting errors that occur while loading or validating the configuration
#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);

impl From<&str> for ConfigError {
    fn from(e: &str) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<String> for ConfigError {
    fn from(e: String) -> Self {
        ConfigError(e)
    }
}
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError(e.to_string())
    }
}
