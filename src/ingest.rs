use log::{info, warn};
use serde_json::Value;
use crate::config::IngestParameters;
use crate::errors::PipelineError;
use crate::event::{parse_event, ObjectRef};
use crate::manager_inference::Predictor;
use crate::manager_storage::ObjectStore;
use crate::predictions::predictions_to_table;
use crate::retry;
use crate::table::Table;

/// Turns a newly created CSV object into a predictions object at a fixed destination
pub struct Ingest<'a> {
    store: &'a dyn ObjectStore,
    predictor: &'a dyn Predictor,
    params: &'a IngestParameters,
}

impl<'a> Ingest<'a> {
    /// Returns a new instance of the Ingest struct
    ///
    /// # Arguments
    ///
    /// * 'store' - object storage holding both source and destination objects
    /// * 'predictor' - the inference endpoint
    /// * 'params' - destination and retry parameters
    pub fn new(store: &'a dyn ObjectStore, predictor: &'a dyn Predictor, params: &'a IngestParameters) -> Self {
        Self { store, predictor, params }
    }

    /// Handles one new-object notification and returns where the predictions were stored.
    ///
    /// Steps are run in order and nothing is written unless all previous steps succeeded.
    /// Transient storage and endpoint failures are retried according to the configured
    /// retry policy, all other failures abort the invocation.
    ///
    /// # Arguments
    ///
    /// * 'event' - the notification naming the source object
    pub fn handle(&self, event: &Value) -> Result<ObjectRef, PipelineError> {
        let objects = parse_event(event)?;
        let source = &objects[0];
        if objects.len() > 1 {
            warn!("event holds {} records, only {} is processed", objects.len(), source);
        }
        info!("processing {}", source);

        let policy = self.params.retry_policy();

        let bytes = retry!(policy, "fetch source object", || self.store.fetch(&source.bucket, &source.key))?;
        let table = Table::from_csv(&bytes)?;
        info!("read {} rows with {} columns", table.len(), table.columns.len());

        let instances = table.to_split(self.params.include_index);
        let predictions = retry!(policy, "invoke inference endpoint", || self.predictor.predict(&instances))?;

        let output = predictions_to_table(&predictions, table.len())?;
        let csv = output.to_csv()?;

        let dest = ObjectRef { bucket: self.params.dest_bucket.clone(), key: self.params.dest_key.clone() };
        retry!(policy, "store predictions", || self.store.store(&dest.bucket, &dest.key, &csv))?;
        info!("stored {} predictions in {}", output.len(), dest);

        Ok(dest)
    }
}
