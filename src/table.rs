use serde_json::{Number, Value};
use crate::errors::PipelineError;
use crate::models::split_table::SplitTable;

/// Cell values that are read as missing, i.e. null
const MISSING_VALUES: &[&str] = &[
    "", "null", "NULL", "n/a", "N/A", "NA", "nan", "-nan", "NaN", "-NaN",
];

/// A plain row oriented table with ordered column names.
///
/// Rows carry no identity besides their position.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Parses a comma-delimited, UTF-8 encoded CSV document with a header row.
    ///
    /// Cells are typed: missing values become null, integers and floats become numbers,
    /// true/false become booleans and anything else is kept as a string. Rows shorter
    /// than the header are padded with nulls, rows longer than the header are rejected.
    ///
    /// # Arguments
    ///
    /// * 'bytes' - the raw CSV document
    pub fn from_csv(bytes: &[u8]) -> Result<Table, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let columns = reader.headers()?
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>();

        if columns.is_empty() {
            return Err(PipelineError::Decode("csv document has no header row".to_string()));
        }

        let mut rows: Vec<Vec<Value>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > columns.len() {
                return Err(PipelineError::Decode(format!(
                    "row {} has {} fields but the header has {}", rows.len() + 1, record.len(), columns.len())));
            }

            let mut row = record.iter().map(parse_cell).collect::<Vec<Value>>();
            row.resize(columns.len(), Value::Null);
            rows.push(row);
        }

        Ok(Table { columns, rows })
    }

    /// Serializes the table to CSV with a header row and no index column
    pub fn to_csv(&self) -> Result<Vec<u8>, PipelineError> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(format_cell))?;
        }

        writer.into_inner().map_err(|e| PipelineError::Decode(e.to_string()))
    }

    /// Returns the table in split orientation
    ///
    /// # Arguments
    ///
    /// * 'include_index' - whether to include row positions as row labels
    pub fn to_split(&self, include_index: bool) -> SplitTable {
        SplitTable {
            columns: self.columns.clone(),
            index: include_index.then(|| (0..self.rows.len()).collect()),
            data: self.rows.clone(),
        }
    }

    /// Builds a table from its split orientation, row labels are ignored
    ///
    /// # Arguments
    ///
    /// * 'split' - the table in split orientation
    pub fn from_split(split: &SplitTable) -> Result<Table, PipelineError> {
        if let Some(row) = split.data.iter().find(|r| r.len() != split.columns.len()) {
            return Err(PipelineError::Decode(format!(
                "row length {} does not match {} columns", row.len(), split.columns.len())));
        }

        Ok(Table { columns: split.columns.clone(), rows: split.data.clone() })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of the named column, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

fn parse_cell(raw: &str) -> Value {
    if MISSING_VALUES.contains(&raw) {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(Number::from(i));
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
        return Value::Null;
    }
    match raw {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn format_cell(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "True".to_string() } else { "False".to_string() },
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CSV: &str = "city_name_Madrid,city_name_Bilbao,day,month,hour,predicted_value\n\
                       1,0,5,3,14,42.7\n\
                       0,1,6,3,15,38.25\n";

    #[test]
    fn parses_typed_cells() {
        let table = Table::from_csv(CSV.as_bytes()).unwrap();

        assert_eq!(table.columns.len(), 6);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec![json!(1), json!(0), json!(5), json!(3), json!(14), json!(42.7)]);
    }

    #[test]
    fn missing_and_text_cells() {
        let table = Table::from_csv("a,b,c\n,NaN,Madrid\n".as_bytes()).unwrap();

        assert_eq!(table.rows[0], vec![Value::Null, Value::Null, json!("Madrid")]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let res = Table::from_csv("a,b\n1,2,3\n".as_bytes());

        assert!(matches!(res, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn short_rows_are_padded_with_nulls() {
        let table = Table::from_csv("a,b,c\n1,2\n3,4,5\n".as_bytes()).unwrap();

        assert_eq!(table.rows[0], vec![json!(1), json!(2), Value::Null]);
        assert_eq!(table.rows[1], vec![json!(3), json!(4), json!(5)]);
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(matches!(Table::from_csv(b""), Err(PipelineError::Decode(_))));
    }

    #[test]
    fn split_has_one_data_row_per_input_row() {
        let table = Table::from_csv(CSV.as_bytes()).unwrap();
        let split = table.to_split(false);

        assert_eq!(split.data.len(), table.len());
        assert!(split.data.iter().all(|r| r.len() == split.columns.len()));
        assert!(split.index.is_none());

        let json = serde_json::to_value(&split).unwrap();
        assert!(json.get("index").is_none());
    }

    #[test]
    fn split_round_trip_keeps_order_and_cells() {
        let table = Table::from_csv(CSV.as_bytes()).unwrap();

        let json = serde_json::to_string(&table.to_split(true)).unwrap();
        let split: SplitTable = serde_json::from_str(&json).unwrap();

        assert_eq!(split.index, Some(vec![0, 1]));
        assert_eq!(Table::from_split(&split).unwrap(), table);
    }

    #[test]
    fn writes_csv_without_index_column() {
        let table = Table {
            columns: vec!["0".to_string(), "1".to_string()],
            rows: vec![vec![json!(42.7), Value::Null], vec![json!(3), json!(true)]],
        };

        let csv = String::from_utf8(table.to_csv().unwrap()).unwrap();

        assert_eq!(csv, "0,1\n42.7,\n3,True\n");
    }
}
