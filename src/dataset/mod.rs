//! Cocktail dataset tables.
//!
//! The raw dataset is a JSON array of cocktail objects, each carrying a
//! nested `ingredients` list. Preprocessing turns it into two flat tables:
//!
//! ```text
//! raw cocktails ─ unpack ─┬─ ingredient rows (one per occurrence)
//!                         └─ ingredientsID per cocktail
//!                 normalize ─> Vec<Cocktail>, Vec<Ingredient>
//!                 resolve   ─> "Gin, Tonic Water, Lime" per cocktail
//! ```
//!
//! Row order is never changed by any stage: the row index of a cocktail is
//! its key in the similarity matrix, the cluster labels, and the plot.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

mod normalize;
mod resolve;
mod unpack;

pub use normalize::{normalize, prepare};
pub use resolve::{ingredient_counts, name_lookup, profiles, resolve_names, NAME_SEPARATOR};
pub use unpack::{unpack, unpack_and_assign_id};

/// A loosely-typed table row: column name to JSON value.
pub type Record = serde_json::Map<String, Value>;

/// Identifier of an ingredient as it appears in the dataset.
pub type IngredientId = i64;

/// A raw cocktail dataset, as read from JSON.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    cocktails: Vec<Record>,
}

impl Dataset {
    /// Wrap already-parsed cocktail rows.
    pub fn new(cocktails: Vec<Record>) -> Self {
        Self { cocktails }
    }

    /// Parse a dataset from JSON text.
    ///
    /// Accepts either a bare array of cocktail objects or an object whose
    /// `data` field holds that array.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse a dataset from a JSON byte stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        let rows = match value {
            Value::Array(rows) => rows,
            Value::Object(mut obj) => match obj.remove("data") {
                Some(Value::Array(rows)) => rows,
                _ => {
                    return Err(Error::Other(
                        "expected a JSON array of cocktails or an object with a 'data' array"
                            .to_string(),
                    ))
                }
            },
            _ => {
                return Err(Error::Other(
                    "expected a JSON array of cocktails".to_string(),
                ))
            }
        };

        let cocktails = rows
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Value::Object(record) => Ok(record),
                other => Err(Error::InvalidRecord {
                    row,
                    message: format!("expected a cocktail object, found {}", kind(&other)),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(cocktails = cocktails.len(), "parsed dataset");
        Ok(Self { cocktails })
    }

    /// The raw cocktail rows.
    pub fn records(&self) -> &[Record] {
        &self.cocktails
    }

    /// Number of cocktails.
    pub fn len(&self) -> usize {
        self.cocktails.len()
    }

    /// Whether the dataset has no cocktails.
    pub fn is_empty(&self) -> bool {
        self.cocktails.is_empty()
    }

    /// The nested `ingredients` value of every cocktail, in row order.
    ///
    /// A missing or `null` list counts as empty.
    pub fn ingredient_column(&self) -> Result<Vec<Vec<Value>>> {
        ingredient_column(&self.cocktails)
    }
}

pub(crate) fn ingredient_column(cocktails: &[Record]) -> Result<Vec<Vec<Value>>> {
    cocktails
        .iter()
        .enumerate()
        .map(|(row, record)| match record.get("ingredients") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(other) => Err(Error::InvalidRecord {
                row,
                message: format!("'ingredients' must be a list, found {}", kind(other)),
            }),
        })
        .collect()
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// A normalised cocktail row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cocktail {
    /// Cocktail id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Ingredient ids in recipe order; duplicates allowed.
    #[serde(rename = "ingredientsID")]
    pub ingredients_id: Vec<IngredientId>,
    /// Creation time, present only when timestamps are kept.
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time, present only when timestamps are kept.
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Cluster label, once [`attach_clusters`](crate::cluster::attach_clusters) has run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
    /// Descriptive columns (instructions, category, glass, ...), passed through untouched.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// A normalised ingredient row; one per (cocktail, ingredient) occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    /// Ingredient id. Not unique across the table.
    pub id: IngredientId,
    /// Ingredient name.
    pub name: String,
    /// Alcohol percentage. Filled with 0 when timestamps are kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    /// Creation time, present only when timestamps are kept.
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time, present only when timestamps are kept.
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Remaining ingredient columns (description, type, ...).
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Cocktail {
    /// Back to a loosely-typed row, e.g. to re-normalise or export.
    pub fn to_record(&self) -> Result<Record> {
        to_record(self)
    }
}

impl Ingredient {
    /// Back to a loosely-typed row, e.g. to re-normalise or export.
    pub fn to_record(&self) -> Result<Record> {
        to_record(self)
    }
}

fn to_record<T: Serialize>(row: &T) -> Result<Record> {
    match serde_json::to_value(row)? {
        Value::Object(record) => Ok(record),
        other => Err(Error::Other(format!(
            "row serialised to {} instead of an object",
            kind(&other)
        ))),
    }
}

/// A cocktail's name paired with its resolved ingredient-name string.
///
/// This is the unit the recommender and the vectorizer work on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CocktailProfile {
    /// Display name.
    pub name: String,
    /// Ingredient names joined with `", "`, in recipe order.
    pub ingredients: String,
}

impl CocktailProfile {
    /// Build a profile.
    pub fn new(name: impl Into<String>, ingredients: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients: ingredients.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_array_and_data_envelope() {
        let bare = json!([{"id": 1, "name": "Mojito", "ingredients": []}]).to_string();
        let wrapped = json!({"data": [{"id": 1, "name": "Mojito"}]}).to_string();

        assert_eq!(Dataset::from_json_str(&bare).unwrap().len(), 1);
        assert_eq!(Dataset::from_json_str(&wrapped).unwrap().len(), 1);
    }

    #[test]
    fn rejects_non_object_rows() {
        let text = json!([{"id": 1}, 7]).to_string();
        let err = Dataset::from_json_str(&text).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { row: 1, .. }));
    }

    #[test]
    fn missing_ingredient_list_is_empty() {
        let text = json!([{"id": 1, "name": "Water"}, {"id": 2, "ingredients": null}]).to_string();
        let column = Dataset::from_json_str(&text)
            .unwrap()
            .ingredient_column()
            .unwrap();
        assert_eq!(column, vec![Vec::<Value>::new(), Vec::new()]);
    }
}
