use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Table in split orientation, i.e. separate arrays for column names, row labels and
/// row data. Row labels are left out unless explicitly asked for.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SplitTable {
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<usize>>,
    pub data: Vec<Vec<Value>>,
}

/// Request document for the inference endpoint, `{"instances": ...}`
#[derive(Serialize, Debug)]
pub struct InferenceRequest {
    pub instances: Value,
}

impl InferenceRequest {
    /// Wraps a split table as request instances. The table is sent as a string holding
    /// its JSON text unless as_object is set, in which case it is embedded as is.
    ///
    /// # Arguments
    ///
    /// * 'split' - the model input in split orientation
    /// * 'as_object' - embed the table as a JSON object instead of a string
    pub fn new(split: &SplitTable, as_object: bool) -> Result<Self, serde_json::Error> {
        let instances = if as_object {
            serde_json::to_value(split)?
        } else {
            Value::String(serde_json::to_string(split)?)
        };

        Ok(Self { instances })
    }
}
