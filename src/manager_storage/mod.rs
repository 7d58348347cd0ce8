pub mod errors;
pub mod file_store;

use std::time::Duration;
use log::debug;
use ureq::Agent;
use crate::manager_storage::errors::StoreError;

/// Object storage as seen by the pipelines: whole objects addressed by bucket and key
pub trait ObjectStore {
    /// Retrieves the full content of an object
    ///
    /// # Arguments
    ///
    /// * 'bucket' - the bucket holding the object
    /// * 'key' - the object key
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Stores an object, overwriting any prior object at the same key
    ///
    /// # Arguments
    ///
    /// * 'bucket' - the bucket to store the object in
    /// * 'key' - the object key
    /// * 'bytes' - the object content
    fn store(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Object store reached over an S3 compatible, path style HTTP gateway, i.e.
/// objects are addressed as {base_url}/{bucket}/{key}
pub struct HttpStore {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpStore {
    /// Returns a new instance of the HttpStore struct
    ///
    /// # Arguments
    ///
    /// * 'base_url' - url to the gateway, without trailing slash
    /// * 'token' - optional bearer token sent with every request
    /// * 'timeout_secs' - global timeout for each request
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .build();

        let agent = config.into();

        Self { agent, base_url: base_url.trim_end_matches('/').to_string(), token }
    }

    fn url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, bucket, key.trim_start_matches('/'))
    }

    fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

impl ObjectStore for HttpStore {
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.url(bucket, key);
        debug!("GET {}", url);

        let mut req = self.agent.get(url.as_str());
        if let Some(bearer) = self.bearer() {
            req = req.header("Authorization", bearer);
        }

        let mut res = match req.call() {
            Ok(res) => res,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(StoreError::NotFound { bucket: bucket.to_string(), key: key.to_string() });
            },
            Err(e) => return Err(e.into()),
        };

        let bytes = res.body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(bytes)
    }

    fn store(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let url = self.url(bucket, key);
        debug!("PUT {} ({} bytes)", url, bytes.len());

        let mut req = self.agent
            .put(url.as_str())
            .content_type("text/csv");
        if let Some(bearer) = self.bearer() {
            req = req.header("Authorization", bearer);
        }

        let _ = req.send(bytes)?;

        Ok(())
    }
}
