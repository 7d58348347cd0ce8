use std::fs;
use std::path::PathBuf;
use glob::glob;
use log::debug;
use crate::dashboard::Selection;
use crate::errors::PipelineError;
use crate::models::chart::Chart;

/// Receiver of rendered charts, i.e. the widget layer of the dashboard
pub trait ChartSink {
    /// Called once per selection before any chart is rendered
    fn begin(&mut self, selection: &Selection) -> Result<(), PipelineError>;

    /// Renders one chart
    fn render(&mut self, chart: &Chart) -> Result<(), PipelineError>;
}

/// Writes each chart as a json document named day_NN.json in an output directory.
/// Documents from any previous selection are removed when a new selection begins.
pub struct JsonChartSink {
    output_dir: PathBuf,
}

impl JsonChartSink {
    pub fn new(output_dir: &str) -> Self {
        Self { output_dir: PathBuf::from(output_dir) }
    }
}

impl ChartSink for JsonChartSink {
    fn begin(&mut self, selection: &Selection) -> Result<(), PipelineError> {
        fs::create_dir_all(&self.output_dir).map_err(storage_error)?;

        let pattern = format!("{}/day_*.json", glob::Pattern::escape(&self.output_dir.to_string_lossy()));
        let entries = glob(&pattern).map_err(|e| PipelineError::Storage(e.to_string()))?;
        for path in entries.flatten() {
            fs::remove_file(path).map_err(storage_error)?;
        }
        debug!("charts for {} month {} go to {}", selection.city, selection.month, self.output_dir.display());

        Ok(())
    }

    fn render(&mut self, chart: &Chart) -> Result<(), PipelineError> {
        let path = self.output_dir.join(format!("day_{:02}.json", chart.day));
        let json = serde_json::to_string_pretty(chart)?;

        fs::write(path, json).map_err(storage_error)
    }
}

fn storage_error(e: std::io::Error) -> PipelineError {
    PipelineError::Storage(e.to_string())
}
