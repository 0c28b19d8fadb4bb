//! Drop unused columns and fix column types.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::{
    ingredient_column, kind, unpack_and_assign_id, Cocktail, Ingredient, IngredientId, Record,
};
use crate::error::{Error, Result};

/// Cocktail columns with no downstream use.
const COCKTAIL_DROPPED: [&str; 4] = ["imageUrl", "ingredients", "tags", "alcoholic"];

/// Ingredient columns with no downstream use.
const INGREDIENT_DROPPED: [&str; 2] = ["imageUrl", "measure"];

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

/// Unpack the raw dataset and normalise both resulting tables.
///
/// Attaches each cocktail's `ingredientsID` list before normalising, so the
/// returned cocktails are ready for [`resolve_names`](super::resolve_names).
pub fn prepare(raw: &[Record], drop_times: bool) -> Result<(Vec<Cocktail>, Vec<Ingredient>)> {
    let column = ingredient_column(raw)?;
    let (ingredients, id_lists) = unpack_and_assign_id(&column)?;

    let cocktails: Vec<Record> = raw
        .iter()
        .zip(id_lists)
        .map(|(record, ids)| {
            let mut row = record.clone();
            row.insert(
                "ingredientsID".to_string(),
                Value::Array(ids.into_iter().map(Value::from).collect()),
            );
            row
        })
        .collect();

    normalize(&cocktails, &ingredients, drop_times)
}

/// Normalise the cocktail and ingredient tables.
///
/// Removes image URLs, nested ingredient blobs, tags and the alcoholic flag
/// from cocktails, and image URL and measure from ingredients. With
/// `drop_times` the `createdAt`/`updatedAt` columns are removed from both;
/// otherwise they are parsed into UTC date-times and missing ingredient
/// percentages become 0.
///
/// Dropping a column that is already absent is a no-op, so normalising the
/// [`to_record`](Cocktail::to_record) form of a normalised table gives it back.
pub fn normalize(
    cocktails: &[Record],
    ingredients: &[Record],
    drop_times: bool,
) -> Result<(Vec<Cocktail>, Vec<Ingredient>)> {
    let cocktails = cocktails
        .iter()
        .enumerate()
        .map(|(row, record)| cocktail_from_record(row, record, drop_times))
        .collect::<Result<Vec<_>>>()?;

    let ingredients = ingredients
        .iter()
        .enumerate()
        .map(|(row, record)| ingredient_from_record(row, record, drop_times))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        cocktails = cocktails.len(),
        ingredients = ingredients.len(),
        drop_times,
        "normalized tables"
    );
    Ok((cocktails, ingredients))
}

fn cocktail_from_record(row: usize, record: &Record, drop_times: bool) -> Result<Cocktail> {
    let mut rest = record.clone();
    for column in COCKTAIL_DROPPED {
        rest.remove(column);
    }
    let (created_at, updated_at) = take_times(&mut rest, drop_times)?;

    let id = take_i64(row, &mut rest, "id")?;
    let name = take_string(row, &mut rest, "name")?;
    let ingredients_id = take_id_list(row, &mut rest)?;
    let cluster = match rest.remove("cluster") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_u64().map(|c| c as usize).ok_or_else(|| Error::InvalidRecord {
            row,
            message: format!("'cluster' must be a non-negative integer, found {}", kind(&v)),
        })?),
    };

    Ok(Cocktail {
        id,
        name,
        ingredients_id,
        created_at,
        updated_at,
        cluster,
        fields: rest.into_iter().collect::<BTreeMap<_, _>>(),
    })
}

fn ingredient_from_record(row: usize, record: &Record, drop_times: bool) -> Result<Ingredient> {
    let mut rest = record.clone();
    for column in INGREDIENT_DROPPED {
        rest.remove(column);
    }
    let (created_at, updated_at) = take_times(&mut rest, drop_times)?;

    let id = take_i64(row, &mut rest, "id")?;
    let name = take_string(row, &mut rest, "name")?;
    let percentage = match rest.remove("percentage") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_f64().ok_or_else(|| Error::InvalidRecord {
            row,
            message: format!("'percentage' must be a number, found {}", kind(&v)),
        })?),
    };
    let percentage = if drop_times {
        percentage
    } else {
        Some(percentage.unwrap_or(0.0))
    };

    Ok(Ingredient {
        id,
        name,
        percentage,
        created_at,
        updated_at,
        fields: rest.into_iter().collect(),
    })
}

type Times = (Option<DateTime<Utc>>, Option<DateTime<Utc>>);

fn take_times(rest: &mut Record, drop_times: bool) -> Result<Times> {
    let created = rest.remove(CREATED_AT);
    let updated = rest.remove(UPDATED_AT);
    if drop_times {
        return Ok((None, None));
    }
    Ok((
        parse_timestamp(CREATED_AT, created)?,
        parse_timestamp(UPDATED_AT, updated)?,
    ))
}

/// Parse a timestamp column value. Missing and `null` become `None`.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, `+02:00` offsets), naive
/// date-times with `T` or space separators (read as UTC), and bare dates.
fn parse_timestamp(field: &'static str, value: Option<Value>) -> Result<Option<DateTime<Utc>>> {
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(Error::InvalidTimestamp {
                field,
                value: other.to_string(),
            })
        }
    };
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(midnight.and_utc()));
    }

    Err(Error::InvalidTimestamp { field, value: text })
}

fn take_i64(row: usize, rest: &mut Record, field: &str) -> Result<i64> {
    match rest.remove(field) {
        Some(v) => v.as_i64().ok_or_else(|| Error::InvalidRecord {
            row,
            message: format!("'{field}' must be an integer, found {}", kind(&v)),
        }),
        None => Err(Error::InvalidRecord {
            row,
            message: format!("missing '{field}'"),
        }),
    }
}

fn take_string(row: usize, rest: &mut Record, field: &str) -> Result<String> {
    match rest.remove(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::InvalidRecord {
            row,
            message: format!("'{field}' must be a string, found {}", kind(&other)),
        }),
        None => Err(Error::InvalidRecord {
            row,
            message: format!("missing '{field}'"),
        }),
    }
}

fn take_id_list(row: usize, rest: &mut Record) -> Result<Vec<IngredientId>> {
    let bad = |message: String| Error::InvalidRecord { row, message };
    match rest.remove("ingredientsID") {
        Some(Value::Array(ids)) => ids
            .iter()
            .map(|v| {
                v.as_i64().ok_or_else(|| {
                    bad(format!(
                        "'ingredientsID' entries must be integers, found {}",
                        kind(v)
                    ))
                })
            })
            .collect(),
        Some(other) => Err(bad(format!("'ingredientsID' must be a list, found {}", kind(&other)))),
        None => Err(bad("missing 'ingredientsID'".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(r) => r,
            _ => unreachable!(),
        }
    }

    fn raw() -> Vec<Record> {
        vec![
            record(json!({
                "id": 11,
                "name": "Gin Tonic",
                "category": "Highball",
                "instructions": "Pour over ice.",
                "imageUrl": "https://example.com/gt.png",
                "tags": ["classic"],
                "alcoholic": 1,
                "createdAt": "2024-08-18T19:03:21.000Z",
                "updatedAt": "2024-08-19 07:00:00",
                "ingredients": [
                    {"id": 1, "name": "Gin", "percentage": 40, "measure": "50 ml",
                     "imageUrl": "https://example.com/gin.png",
                     "createdAt": "2024-08-18", "updatedAt": "2024-08-18T00:00:00Z"},
                    {"id": 2, "name": "Tonic Water", "percentage": null, "measure": "100 ml",
                     "createdAt": "2024-08-18", "updatedAt": "2024-08-18"}
                ]
            })),
            record(json!({
                "id": 12,
                "name": "Virgin Nothing",
                "createdAt": "2024-08-18T19:03:21Z",
                "updatedAt": "2024-08-18T19:03:21Z",
                "ingredients": []
            })),
        ]
    }

    #[test]
    fn drop_times_removes_timestamps_everywhere() {
        let (cocktails, ingredients) = prepare(&raw(), true).unwrap();

        for c in &cocktails {
            assert!(c.created_at.is_none() && c.updated_at.is_none());
            let rec = c.to_record().unwrap();
            assert!(!rec.contains_key("createdAt") && !rec.contains_key("updatedAt"));
        }
        for i in &ingredients {
            assert!(i.created_at.is_none() && i.updated_at.is_none());
        }
        // Percentage is left as-is when times are dropped.
        assert_eq!(ingredients[1].percentage, None);
    }

    #[test]
    fn keeping_times_parses_them_and_fills_percentage() {
        let (cocktails, ingredients) = prepare(&raw(), false).unwrap();

        let created = cocktails[0].created_at.unwrap();
        assert_eq!((created.year(), created.month(), created.day()), (2024, 8, 18));
        assert_eq!(created.hour(), 19);
        assert_eq!(cocktails[0].updated_at.unwrap().hour(), 7);
        assert!(ingredients.iter().all(|i| i.created_at.is_some() && i.updated_at.is_some()));

        assert_eq!(ingredients[0].percentage, Some(40.0));
        assert_eq!(ingredients[1].percentage, Some(0.0));
    }

    #[test]
    fn drops_unused_columns_but_keeps_keys() {
        let (cocktails, ingredients) = prepare(&raw(), true).unwrap();

        let gt = &cocktails[0];
        assert_eq!(gt.id, 11);
        assert_eq!(gt.name, "Gin Tonic");
        assert_eq!(gt.ingredients_id, vec![1, 2]);
        for dropped in ["imageUrl", "ingredients", "tags", "alcoholic"] {
            assert!(!gt.fields.contains_key(dropped), "{dropped} kept");
        }
        assert_eq!(gt.fields["category"], json!("Highball"));

        assert_eq!(cocktails[1].ingredients_id, Vec::<i64>::new());

        assert_eq!(ingredients.len(), 2);
        assert!(!ingredients[0].fields.contains_key("measure"));
        assert!(!ingredients[0].fields.contains_key("imageUrl"));
    }

    #[test]
    fn renormalizing_is_a_no_op() {
        for drop_times in [true, false] {
            let (cocktails, ingredients) = prepare(&raw(), drop_times).unwrap();

            let c_rows: Vec<Record> = cocktails.iter().map(|c| c.to_record().unwrap()).collect();
            let i_rows: Vec<Record> = ingredients.iter().map(|i| i.to_record().unwrap()).collect();
            let (again_c, again_i) = normalize(&c_rows, &i_rows, drop_times).unwrap();

            assert_eq!(again_c, cocktails);
            assert_eq!(again_i, ingredients);
        }
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let mut rows = raw();
        rows[1].insert("createdAt".into(), json!("yesterday-ish"));

        let err = prepare(&rows, false).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTimestamp {
                field: "createdAt",
                ..
            }
        ));
        // Dropped columns are never parsed.
        assert!(prepare(&rows, true).is_ok());
    }

    #[test]
    fn missing_name_is_invalid_record() {
        let cocktails = vec![record(json!({"id": 3, "ingredientsID": []}))];
        let err = normalize(&cocktails, &[], true).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { row: 0, .. }));
    }
}
