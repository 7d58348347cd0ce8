use std::fmt;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use crate::errors::PipelineError;
use crate::models::s3_event::S3Event;

/// Location of an object in object storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Resolves the objects named in a new-object notification.
///
/// Object keys arrive form encoded in notifications (spaces as '+', other reserved
/// characters percent encoded) and are decoded before being returned.
///
/// # Arguments
///
/// * 'event' - the notification as received from the trigger
pub fn parse_event(event: &Value) -> Result<Vec<ObjectRef>, PipelineError> {
    let event: S3Event = serde_json::from_value(event.clone())
        .map_err(|e| PipelineError::MalformedEvent(e.to_string()))?;

    if event.records.is_empty() {
        return Err(PipelineError::MalformedEvent("event contains no records".to_string()));
    }

    event.records
        .into_iter()
        .map(|r| {
            if r.s3.bucket.name.is_empty() || r.s3.object.key.is_empty() {
                return Err(PipelineError::MalformedEvent("empty bucket name or object key".to_string()));
            }
            Ok(ObjectRef { bucket: r.s3.bucket.name, key: decode_key(&r.s3.object.key)? })
        })
        .collect()
}

fn decode_key(raw: &str) -> Result<String, PipelineError> {
    let plus_decoded = raw.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8()
        .map(|k| k.into_owned())
        .map_err(|e| PipelineError::MalformedEvent(format!("object key is not valid utf-8: {}", e)))
}
