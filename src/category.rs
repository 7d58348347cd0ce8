/// Outcome of recovering a category from one-hot indicator fields
#[derive(Debug, Clone, PartialEq)]
pub enum Category {
    /// Exactly one indicator holds the maximum value
    Unique(String),
    /// Several indicators share the maximum value, the first one in declared order was chosen
    Tie { chosen: String, candidates: Vec<String> },
}

impl Category {
    /// Returns the category name, for ties the deterministically chosen one
    pub fn name(&self) -> &str {
        match self {
            Category::Unique(name) => name,
            Category::Tie { chosen, .. } => chosen,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, Category::Tie { .. })
    }
}

/// Recovers a category from one-hot encoded indicator values by arg-max.
///
/// Values and fields are matched by position, fields being the statically declared
/// ordered indicator field names. The category name is the field name with the prefix
/// removed and surrounding whitespace trimmed. NaN values count as missing and are
/// skipped. Returns None if no field has a value.
///
/// # Arguments
///
/// * 'values' - indicator values, one per field
/// * 'fields' - indicator field names in declared order
/// * 'prefix' - prefix to strip from the winning field name
pub fn derive_category(values: &[f64], fields: &[String], prefix: &str) -> Option<Category> {
    let max = values.iter()
        .take(fields.len())
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v))))?;

    let winners = fields.iter()
        .zip(values)
        .filter(|&(_, v)| *v == max)
        .map(|(f, _)| category_name(f, prefix))
        .collect::<Vec<String>>();

    match winners.len() {
        0 => None,
        1 => winners.into_iter().next().map(Category::Unique),
        _ => Some(Category::Tie { chosen: winners[0].clone(), candidates: winners }),
    }
}

fn category_name(field: &str, prefix: &str) -> String {
    field.strip_prefix(prefix).unwrap_or(field).trim().to_string()
}
