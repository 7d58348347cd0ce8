pub mod sink;

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use chrono::{Month, NaiveDate};
use log::{info, warn};
use serde_json::Value;
use crate::category::derive_category;
use crate::config::{DashboardParameters, DayRange};
use crate::dashboard::sink::ChartSink;
use crate::errors::PipelineError;
use crate::manager_storage::ObjectStore;
use crate::models::chart::{Chart, ChartPoint};
use crate::table::Table;

/// One prediction with its category recovered from the indicator fields
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub city: String,
    pub day: u32,
    pub month: u32,
    pub hour: u32,
    pub predicted_value: f64,
}

/// A user selection of city and month (1-12)
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub city: String,
    pub month: u32,
}

impl Selection {
    pub fn new(city: &str, month: u32) -> Result<Self, PipelineError> {
        month_name(month)?;
        Ok(Self { city: city.to_string(), month })
    }
}

/// Values to offer in the city and month selectors
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorOptions {
    pub cities: Vec<String>,
    pub months: Vec<(u32, &'static str)>,
}

/// Loads historical predictions from object storage and renders per day charts for a selection
pub struct Dashboard<'a> {
    store: &'a dyn ObjectStore,
    params: &'a DashboardParameters,
}

impl<'a> Dashboard<'a> {
    pub fn new(store: &'a dyn ObjectStore, params: &'a DashboardParameters) -> Self {
        Self { store, params }
    }

    /// Fetches the predictions object and returns its rows with the city derived
    pub fn load(&self) -> Result<Vec<PredictionRow>, PipelineError> {
        info!("fetching predictions from {}/{}", self.params.bucket, self.params.key);
        let bytes = self.store.fetch(&self.params.bucket, &self.params.key)?;
        let table = Table::from_csv(&bytes).map_err(|e| match e {
            PipelineError::Decode(msg) => PipelineError::Schema(msg),
            other => other,
        })?;

        let rows = load_rows(&table, &self.params.indicator_fields, &self.params.category_prefix)?;
        info!("loaded {} prediction rows", rows.len());

        Ok(rows)
    }

    /// Returns the selector options given loaded rows
    ///
    /// # Arguments
    ///
    /// * 'rows' - rows as returned from load
    pub fn options(&self, rows: &[PredictionRow]) -> SelectorOptions {
        SelectorOptions {
            cities: cities(rows),
            months: (1..=12u32)
                .filter_map(|m| month_name(m).ok().map(|n| (m, n)))
                .collect(),
        }
    }

    /// Builds and renders one chart per day for the selection, returns the number of
    /// charts rendered
    ///
    /// # Arguments
    ///
    /// * 'rows' - rows as returned from load
    /// * 'selection' - selected city and month
    /// * 'sink' - where to render the charts
    pub fn render(&self, rows: &[PredictionRow], selection: &Selection, sink: &mut dyn ChartSink)
        -> Result<usize, PipelineError> {

        if !rows.iter().any(|r| r.city == selection.city) {
            warn!("no predictions for city '{}'", selection.city);
        }
        let charts = build_charts(rows, selection, self.params.day_range, &self.params.y_label)?;

        sink.begin(selection)?;
        for chart in &charts {
            sink.render(chart)?;
        }
        info!("rendered {} charts for {} in month {}", charts.len(), selection.city, selection.month);

        Ok(charts.len())
    }
}

/// Extracts prediction rows from a table, recovering the city from the indicator fields.
///
/// Ties between indicator fields resolve to the first field in declared order and are
/// logged. Null indicator cells are skipped, a row without any indicator value is a
/// schema error.
///
/// # Arguments
///
/// * 'table' - the predictions table
/// * 'indicator_fields' - one-hot city fields in declared order
/// * 'prefix' - prefix to strip from indicator field names
pub fn load_rows(table: &Table, indicator_fields: &[String], prefix: &str) -> Result<Vec<PredictionRow>, PipelineError> {
    let column = |name: &str| table.column_index(name)
        .ok_or(PipelineError::Schema(format!("missing column '{}'", name)));

    let indicators = indicator_fields.iter()
        .map(|f| column(f))
        .collect::<Result<Vec<usize>, PipelineError>>()?;
    let day = column("day")?;
    let month = column("month")?;
    let hour = column("hour")?;
    let value = column("predicted_value")?;

    let mut ties = 0;
    let mut rows: Vec<PredictionRow> = Vec::with_capacity(table.len());
    for (r, row) in table.rows.iter().enumerate() {
        let flags = indicators.iter()
            .map(|&c| match &row[c] {
                Value::Null => Ok(f64::NAN),
                cell => number(cell, r, &table.columns[c]),
            })
            .collect::<Result<Vec<f64>, PipelineError>>()?;

        let category = derive_category(&flags, indicator_fields, prefix)
            .ok_or(PipelineError::Schema(format!("row {}: no indicator value to derive the city from", r)))?;
        if category.is_tie() {
            ties += 1;
        }

        rows.push(PredictionRow {
            city: category.name().to_string(),
            day: whole_number(&row[day], r, "day")?,
            month: whole_number(&row[month], r, "month")?,
            hour: whole_number(&row[hour], r, "hour")?,
            predicted_value: number(&row[value], r, "predicted_value")?,
        });
    }

    if ties > 0 {
        warn!("{} rows had no unique indicator maximum, first declared field was used", ties);
    }

    Ok(rows)
}

/// Returns distinct cities in first seen order
pub fn cities(rows: &[PredictionRow]) -> Vec<String> {
    let mut cities: Vec<String> = Vec::new();
    for row in rows {
        if !cities.contains(&row.city) {
            cities.push(row.city.clone());
        }
    }

    cities
}

/// Returns the english name of a month given its number (1-12)
pub fn month_name(month: u32) -> Result<&'static str, PipelineError> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .ok_or(PipelineError::Schema(format!("month {} is not within 1-12", month)))
}

/// Returns the days to chart for a month
///
/// # Arguments
///
/// * 'range' - configured day range
/// * 'month' - the selected month (1-12)
pub fn days(range: DayRange, month: u32) -> Result<RangeInclusive<u32>, PipelineError> {
    match range {
        DayRange::Fixed { first, last } => Ok(first..=last),
        DayRange::Calendar { year } => {
            let first = NaiveDate::from_ymd_opt(year, month, 1);
            let next = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            };

            match (first, next) {
                (Some(first), Some(next)) => Ok(1..=(next - first).num_days() as u32),
                _ => Err(PipelineError::Schema(format!("no calendar for {}-{}", year, month))),
            }
        },
    }
}

/// Mean predicted value per hour for the given day, ordered by ascending hour
///
/// # Arguments
///
/// * 'rows' - rows already filtered to the selection
/// * 'day' - day of month to aggregate
pub fn hourly_means<'r, I>(rows: I, day: u32) -> Vec<ChartPoint>
where
    I: IntoIterator<Item = &'r PredictionRow>,
{
    let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for row in rows.into_iter().filter(|r| r.day == day) {
        let group = groups.entry(row.hour).or_insert((0.0, 0));
        group.0 += row.predicted_value;
        group.1 += 1;
    }

    groups.into_iter()
        .map(|(hour, (sum, count))| ChartPoint { hour, value: sum / count as f64 })
        .collect()
}

/// Builds one chart per day in range for the selection. Days without matching rows give
/// charts without points.
///
/// # Arguments
///
/// * 'rows' - all loaded rows
/// * 'selection' - selected city and month
/// * 'range' - configured day range
/// * 'y_label' - label for the value axis
pub fn build_charts(rows: &[PredictionRow], selection: &Selection, range: DayRange, y_label: &str)
    -> Result<Vec<Chart>, PipelineError> {

    let month = month_name(selection.month)?;
    let subset = rows.iter()
        .filter(|r| r.city == selection.city && r.month == selection.month)
        .collect::<Vec<&PredictionRow>>();

    let charts = days(range, selection.month)?
        .map(|day| Chart {
            day,
            title: format!("Energy Price Prediction by hour for day {} in {}, {}", day, selection.city, month),
            x_label: "Hour".to_string(),
            y_label: y_label.to_string(),
            points: hourly_means(subset.iter().copied(), day),
        })
        .collect();

    Ok(charts)
}

fn number(cell: &Value, row: usize, column: &str) -> Result<f64, PipelineError> {
    cell.as_f64()
        .ok_or(PipelineError::Schema(format!("row {}: '{}' is not numeric: {}", row, column, cell)))
}

fn whole_number(cell: &Value, row: usize, column: &str) -> Result<u32, PipelineError> {
    let v = number(cell, row, column)?;
    if v.fract() != 0.0 || v < 0.0 || v > u32::MAX as f64 {
        return Err(PipelineError::Schema(format!("row {}: '{}' is not a whole number: {}", row, column, v)));
    }

    Ok(v as u32)
}
