#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use pricecast::dashboard::sink::ChartSink;
use pricecast::dashboard::Selection;
use pricecast::errors::PipelineError;
use pricecast::manager_inference::errors::InferenceError;
use pricecast::manager_inference::Predictor;
use pricecast::manager_storage::errors::StoreError;
use pricecast::manager_storage::ObjectStore;
use pricecast::models::chart::Chart;
use pricecast::models::split_table::SplitTable;
use serde_json::Value;

/// Object store kept in memory, keyed by "bucket/key"
#[derive(Default)]
pub struct MemoryStore {
    pub objects: RefCell<HashMap<String, Vec<u8>>>,
    pub writes: Cell<usize>,
}

impl MemoryStore {
    pub fn with(bucket: &str, key: &str, bytes: &[u8]) -> Self {
        let store = MemoryStore::default();
        store.objects.borrow_mut().insert(format!("{}/{}", bucket, key), bytes.to_vec());
        store
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects.borrow().get(&format!("{}/{}", bucket, key)).cloned()
    }
}

impl ObjectStore for MemoryStore {
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.get(bucket, key)
            .ok_or(StoreError::NotFound { bucket: bucket.to_string(), key: key.to_string() })
    }

    fn store(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.writes.set(self.writes.get() + 1);
        self.objects.borrow_mut().insert(format!("{}/{}", bucket, key), bytes.to_vec());
        Ok(())
    }
}

/// Predictor answering from a closure and recording what it was sent
pub struct StubPredictor<F: Fn(&SplitTable) -> Result<Value, InferenceError>> {
    pub answer: F,
    pub calls: Cell<usize>,
    pub last_request: RefCell<Option<SplitTable>>,
}

impl<F: Fn(&SplitTable) -> Result<Value, InferenceError>> StubPredictor<F> {
    pub fn new(answer: F) -> Self {
        Self { answer, calls: Cell::new(0), last_request: RefCell::new(None) }
    }
}

impl<F: Fn(&SplitTable) -> Result<Value, InferenceError>> Predictor for StubPredictor<F> {
    fn predict(&self, instances: &SplitTable) -> Result<Value, InferenceError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_request.borrow_mut() = Some(instances.clone());
        (self.answer)(instances)
    }
}

/// Chart sink keeping rendered charts in memory
#[derive(Default)]
pub struct VecChartSink {
    pub charts: Vec<Chart>,
}

impl ChartSink for VecChartSink {
    fn begin(&mut self, _selection: &Selection) -> Result<(), PipelineError> {
        self.charts.clear();
        Ok(())
    }

    fn render(&mut self, chart: &Chart) -> Result<(), PipelineError> {
        self.charts.push(chart.clone());
        Ok(())
    }
}
