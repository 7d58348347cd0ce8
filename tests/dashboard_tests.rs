mod common;

use common::{MemoryStore, VecChartSink};
use pricecast::config::{DashboardParameters, DayRange};
use pricecast::dashboard::sink::JsonChartSink;
use pricecast::dashboard::{Dashboard, Selection};
use pricecast::errors::PipelineError;
use pricecast::manager_storage::file_store::FileStore;
use pricecast::manager_storage::ObjectStore;
use pricecast::models::chart::ChartPoint;

const PREDICTIONS_CSV: &str = "city_name_Madrid,city_name_Bilbao,day,month,hour,predicted_value\n\
                               1,0,5,3,14,42.7\n";

fn params(day_range: DayRange, output_dir: &str) -> DashboardParameters {
    DashboardParameters {
        bucket: "prediction-bucket".to_string(),
        key: "predictions_10000_price.csv".to_string(),
        category_prefix: "city_name_".to_string(),
        indicator_fields: vec!["city_name_Madrid".to_string(), "city_name_Bilbao".to_string()],
        day_range,
        output_dir: output_dir.to_string(),
        y_label: "Price/MWH".to_string(),
    }
}

#[test]
fn single_row_shows_up_on_its_day_only() {
    let store = MemoryStore::with("prediction-bucket", "predictions_10000_price.csv", PREDICTIONS_CSV.as_bytes());
    let params = params(DayRange::default(), "unused");
    let dashboard = Dashboard::new(&store, &params);
    let mut sink = VecChartSink::default();

    let rows = dashboard.load().unwrap();
    let count = dashboard.render(&rows, &Selection::new("Madrid", 3).unwrap(), &mut sink).unwrap();

    assert_eq!(count, 30);
    for chart in &sink.charts {
        if chart.day == 5 {
            assert_eq!(chart.points, vec![ChartPoint { hour: 14, value: 42.7 }]);
            assert_eq!(chart.title, "Energy Price Prediction by hour for day 5 in Madrid, March");
        } else {
            assert!(chart.points.is_empty(), "day {} should be empty", chart.day);
        }
    }
}

#[test]
fn selector_options_come_from_data() {
    let store = MemoryStore::with("prediction-bucket", "predictions_10000_price.csv", PREDICTIONS_CSV.as_bytes());
    let params = params(DayRange::default(), "unused");
    let dashboard = Dashboard::new(&store, &params);

    let options = dashboard.options(&dashboard.load().unwrap());

    assert_eq!(options.cities, vec!["Madrid"]);
    assert_eq!(options.months.len(), 12);
    assert_eq!(options.months[11], (12, "December"));
}

#[test]
fn unmatched_selection_renders_empty_charts() {
    let store = MemoryStore::with("prediction-bucket", "predictions_10000_price.csv", PREDICTIONS_CSV.as_bytes());
    let params = params(DayRange::default(), "unused");
    let dashboard = Dashboard::new(&store, &params);
    let mut sink = VecChartSink::default();

    let rows = dashboard.load().unwrap();
    dashboard.render(&rows, &Selection::new("Bilbao", 3).unwrap(), &mut sink).unwrap();

    assert_eq!(sink.charts.len(), 30);
    assert!(sink.charts.iter().all(|c| c.points.is_empty()));
}

#[test]
fn calendar_range_includes_day_31() {
    let csv = format!("{}1,0,31,3,23,50.0\n", PREDICTIONS_CSV);
    let store = MemoryStore::with("prediction-bucket", "predictions_10000_price.csv", csv.as_bytes());
    let params = params(DayRange::Calendar { year: 2023 }, "unused");
    let dashboard = Dashboard::new(&store, &params);
    let mut sink = VecChartSink::default();

    let rows = dashboard.load().unwrap();
    let count = dashboard.render(&rows, &Selection::new("Madrid", 3).unwrap(), &mut sink).unwrap();

    assert_eq!(count, 31);
    assert_eq!(sink.charts[30].points, vec![ChartPoint { hour: 23, value: 50.0 }]);
}

#[test]
fn missing_object_and_missing_columns_fail() {
    let empty = MemoryStore::default();
    let params = params(DayRange::default(), "unused");
    assert!(matches!(Dashboard::new(&empty, &params).load(), Err(PipelineError::NotFound { .. })));

    let no_value = MemoryStore::with("prediction-bucket", "predictions_10000_price.csv",
                                     b"city_name_Madrid,city_name_Bilbao,day,month,hour\n1,0,5,3,14\n");
    assert!(matches!(Dashboard::new(&no_value, &params).load(), Err(PipelineError::Schema(_))));
}

#[test]
fn malformed_csv_is_a_schema_error() {
    let csv = format!("{}1,0,5,3,14,42.7,99\n", PREDICTIONS_CSV);
    let store = MemoryStore::with("prediction-bucket", "predictions_10000_price.csv", csv.as_bytes());
    let params = params(DayRange::default(), "unused");

    let res = Dashboard::new(&store, &params).load();

    assert!(matches!(res, Err(PipelineError::Schema(_))));
}

#[test]
fn charts_are_written_as_documents() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("buckets"));
    store.store("prediction-bucket", "predictions_10000_price.csv", PREDICTIONS_CSV.as_bytes()).unwrap();
    let out = dir.path().join("charts");
    let params = params(DayRange::default(), &out.to_string_lossy());
    let dashboard = Dashboard::new(&store, &params);
    let mut sink = JsonChartSink::new(&params.output_dir);

    let rows = dashboard.load().unwrap();
    dashboard.render(&rows, &Selection::new("Madrid", 3).unwrap(), &mut sink).unwrap();

    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(out.join("day_05.json")).unwrap()).unwrap();
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 30);
    assert_eq!(doc["title"], "Energy Price Prediction by hour for day 5 in Madrid, March");
    assert_eq!(doc["points"][0]["value"], 42.7);
}
