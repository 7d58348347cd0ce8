use serde_json::{Map, Value};
use crate::errors::PipelineError;
use crate::models::split_table::SplitTable;
use crate::table::Table;

/// Builds the output table from a decoded prediction document.
///
/// Supported shapes:
/// * array of scalars - a single column named "0"
/// * array of arrays - columns named "0", "1", ...
/// * array of objects - one column per key, in first seen order
/// * object of arrays - one column per key, e.g. {"predictions": [...]}
/// * split table - {"columns", "index", "data"}, rows are put in input order by index
///
/// The number of rows must equal the number of rows sent, rows are otherwise matched to
/// the input by position only.
///
/// # Arguments
///
/// * 'predictions' - the decoded response from the inference endpoint
/// * 'expected_rows' - number of rows in the request
pub fn predictions_to_table(predictions: &Value, expected_rows: usize) -> Result<Table, PipelineError> {
    let table = match predictions {
        Value::Array(items) => from_array(items)?,
        Value::Object(map) if map.contains_key("columns") && map.contains_key("data") => {
            let split: SplitTable = serde_json::from_value(predictions.clone())?;
            from_split(split, expected_rows)?
        },
        Value::Object(map) => from_object_of_arrays(map)?,
        _ => return Err(PipelineError::Decode("prediction document is neither an array nor an object".to_string())),
    };

    if table.len() != expected_rows {
        return Err(PipelineError::Inference(format!(
            "endpoint returned {} predictions for {} rows", table.len(), expected_rows)));
    }

    Ok(table)
}

fn from_array(items: &[Value]) -> Result<Table, PipelineError> {
    match items.first() {
        None => Ok(Table { columns: vec!["0".to_string()], rows: Vec::new() }),
        Some(Value::Array(_)) => {
            let width = items.iter()
                .map(|i| i.as_array().map_or(0, |a| a.len()))
                .max()
                .unwrap_or(0);

            let mut rows: Vec<Vec<Value>> = Vec::with_capacity(items.len());
            for item in items {
                let mut row = item.as_array()
                    .ok_or(PipelineError::Decode("mixed arrays and scalars in predictions".to_string()))?
                    .clone();
                row.resize(width, Value::Null);
                rows.push(row);
            }

            Ok(Table { columns: (0..width).map(|c| c.to_string()).collect(), rows })
        },
        Some(Value::Object(_)) => {
            let mut columns: Vec<String> = Vec::new();
            for item in items {
                let obj = item.as_object()
                    .ok_or(PipelineError::Decode("mixed objects and non objects in predictions".to_string()))?;
                for key in obj.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }

            let rows = items.iter()
                .filter_map(|i| i.as_object())
                .map(|obj| columns.iter().map(|c| obj.get(c).cloned().unwrap_or(Value::Null)).collect())
                .collect();

            Ok(Table { columns, rows })
        },
        Some(_) => {
            if items.iter().any(|i| i.is_array() || i.is_object()) {
                return Err(PipelineError::Decode("mixed scalars and containers in predictions".to_string()));
            }
            Ok(Table {
                columns: vec!["0".to_string()],
                rows: items.iter().map(|i| vec![i.clone()]).collect(),
            })
        },
    }
}

fn from_object_of_arrays(map: &Map<String, Value>) -> Result<Table, PipelineError> {
    let mut columns: Vec<String> = Vec::with_capacity(map.len());
    let mut values: Vec<&Vec<Value>> = Vec::with_capacity(map.len());
    for (key, value) in map {
        let column = value.as_array()
            .ok_or(PipelineError::Decode(format!("prediction field '{}' is not an array", key)))?;
        columns.push(key.clone());
        values.push(column);
    }

    let len = values.first().map_or(0, |v| v.len());
    if values.iter().any(|v| v.len() != len) {
        return Err(PipelineError::Decode("prediction fields differ in length".to_string()));
    }

    let rows = (0..len)
        .map(|r| values.iter().map(|v| v[r].clone()).collect())
        .collect();

    Ok(Table { columns, rows })
}

fn from_split(split: SplitTable, expected_rows: usize) -> Result<Table, PipelineError> {
    let mut table = Table::from_split(&split)?;

    if let Some(index) = split.index {
        if index.len() != table.len() {
            return Err(PipelineError::Decode("split index and data differ in length".to_string()));
        }

        let mut slots: Vec<Option<Vec<Value>>> = vec![None; expected_rows.max(table.len())];
        for (row, pos) in table.rows.into_iter().zip(index) {
            let slot = slots.get_mut(pos)
                .ok_or(PipelineError::Inference(format!("prediction for unknown row {}", pos)))?;
            if slot.replace(row).is_some() {
                return Err(PipelineError::Inference(format!("duplicate prediction for row {}", pos)));
            }
        }
        table.rows = slots.into_iter().flatten().collect();
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_become_single_column() {
        let table = predictions_to_table(&json!([42.7, 38.1]), 2).unwrap();

        assert_eq!(table.columns, vec!["0"]);
        assert_eq!(table.rows, vec![vec![json!(42.7)], vec![json!(38.1)]]);
    }

    #[test]
    fn nested_arrays_become_columns() {
        let table = predictions_to_table(&json!([[1, 0.2], [0, 0.9]]), 2).unwrap();

        assert_eq!(table.columns, vec!["0", "1"]);
        assert_eq!(table.rows[1], vec![json!(0), json!(0.9)]);
    }

    #[test]
    fn records_and_columns_orientations() {
        let records = predictions_to_table(&json!([{"price": 1.5}, {"price": 2.5, "low": 1.0}]), 2).unwrap();
        assert_eq!(records.columns, vec!["price", "low"]);
        assert_eq!(records.rows[0], vec![json!(1.5), Value::Null]);

        let columns = predictions_to_table(&json!({"predictions": [3.0, 4.0]}), 2).unwrap();
        assert_eq!(columns.columns, vec!["predictions"]);
        assert_eq!(columns.rows[1], vec![json!(4.0)]);
    }

    #[test]
    fn split_rows_are_matched_by_index() {
        let doc = json!({"columns": ["price"], "index": [1, 0], "data": [[20.0], [10.0]]});

        let table = predictions_to_table(&doc, 2).unwrap();

        assert_eq!(table.rows, vec![vec![json!(10.0)], vec![json!(20.0)]]);
    }

    #[test]
    fn split_with_missing_row_is_rejected() {
        let doc = json!({"columns": ["price"], "index": [0, 0], "data": [[20.0], [10.0]]});

        assert!(matches!(predictions_to_table(&doc, 2), Err(PipelineError::Inference(_))));
    }

    #[test]
    fn row_count_must_match_request() {
        let res = predictions_to_table(&json!([1.0, 2.0]), 3);

        assert!(matches!(res, Err(PipelineError::Inference(_))));
    }

    #[test]
    fn scalar_document_is_a_decode_error() {
        assert!(matches!(predictions_to_table(&json!("oops"), 1), Err(PipelineError::Decode(_))));
    }
}
