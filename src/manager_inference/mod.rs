pub mod errors;

use std::time::Duration;
use log::debug;
use serde_json::Value;
use ureq::Agent;
use crate::manager_inference::errors::InferenceError;
use crate::models::split_table::{InferenceRequest, SplitTable};

/// A hosted model that turns a table of instances into predictions
pub trait Predictor {
    /// Sends the instances and returns the decoded prediction document
    ///
    /// # Arguments
    ///
    /// * 'instances' - the model input in split orientation
    fn predict(&self, instances: &SplitTable) -> Result<Value, InferenceError>;
}

/// Synchronous JSON inference endpoint
pub struct Endpoint {
    agent: Agent,
    url: String,
    token: Option<String>,
    instances_as_object: bool,
}

impl Endpoint {
    /// Returns a new instance of the Endpoint struct
    ///
    /// # Arguments
    ///
    /// * 'url' - the invocation url of the endpoint
    /// * 'token' - optional bearer token
    /// * 'timeout_secs' - global timeout for one invocation
    /// * 'instances_as_object' - send instances as a JSON object rather than JSON text
    pub fn new(url: &str, token: Option<String>, timeout_secs: u64, instances_as_object: bool) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .build();

        let agent = config.into();

        Self { agent, url: url.to_string(), token, instances_as_object }
    }
}

impl Predictor for Endpoint {
    fn predict(&self, instances: &SplitTable) -> Result<Value, InferenceError> {
        let req_json = serde_json::to_string(&InferenceRequest::new(instances, self.instances_as_object)?)?;
        debug!("invoking {} with {} instances", self.url, instances.data.len());

        let mut req = self.agent
            .post(self.url.as_str())
            .content_type("application/json");
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let body = req
            .send(req_json)?
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(serde_json::from_slice(&body)?)
    }
}
