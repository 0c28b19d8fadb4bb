//! Flatten nested per-cocktail ingredient lists into one table.

use serde_json::Value;

use super::{kind, IngredientId, Record};
use crate::error::{Error, Result};

/// Flatten every cocktail's ingredient list into one row per occurrence.
///
/// Nested objects inside a record are flattened into dotted column names
/// (`{"meta": {"abv": 40}}` becomes `meta.abv`). Records need not carry an
/// `id`; use [`unpack_and_assign_id`] when the id lists are wanted too.
pub fn unpack(column: &[Vec<Value>]) -> Result<Vec<Record>> {
    let total = column.iter().map(Vec::len).sum();
    let mut rows = Vec::with_capacity(total);

    for (cocktail, items) in column.iter().enumerate() {
        for item in items {
            match item {
                Value::Object(obj) => rows.push(flatten(obj)),
                other => {
                    return Err(Error::InvalidRecord {
                        row: cocktail,
                        message: format!(
                            "ingredient entry must be an object, found {}",
                            kind(other)
                        ),
                    })
                }
            }
        }
    }

    tracing::debug!(cocktails = column.len(), rows = rows.len(), "unpacked ingredients");
    Ok(rows)
}

/// Flatten ingredient lists and extract each cocktail's ordered id list.
///
/// Returns the flat table (one row per occurrence, all original fields kept)
/// and one id list per cocktail, in input order. A cocktail with no
/// ingredients contributes no rows and an empty id list at its position.
///
/// # Errors
///
/// [`Error::MalformedRecord`] if a record has no integer `id`.
pub fn unpack_and_assign_id(
    column: &[Vec<Value>],
) -> Result<(Vec<Record>, Vec<Vec<IngredientId>>)> {
    let total = column.iter().map(Vec::len).sum();
    let mut rows = Vec::with_capacity(total);
    let mut id_lists = Vec::with_capacity(column.len());

    for (cocktail, items) in column.iter().enumerate() {
        let mut ids = Vec::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            let malformed = Error::MalformedRecord {
                cocktail,
                position,
                field: "id",
            };
            let Value::Object(obj) = item else {
                return Err(malformed);
            };
            let id = obj.get("id").and_then(Value::as_i64).ok_or(malformed)?;

            ids.push(id);
            rows.push(flatten(obj));
        }

        id_lists.push(ids);
    }

    tracing::debug!(
        cocktails = column.len(),
        rows = rows.len(),
        "unpacked ingredients with ids"
    );
    Ok((rows, id_lists))
}

fn flatten(obj: &Record) -> Record {
    let mut out = Record::new();
    flatten_into(&mut out, None, obj);
    out
}

fn flatten_into(out: &mut Record, prefix: Option<&str>, obj: &Record) {
    for (key, value) in obj {
        let column = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(out, Some(&column), inner),
            other => {
                out.insert(column, other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn items(values: Value) -> Vec<Value> {
        match values {
            Value::Array(v) => v,
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_list_keeps_its_slot() {
        let column = vec![
            items(json!([{"id": 1, "name": "Gin"}, {"id": 2, "name": "Tonic"}])),
            Vec::new(),
            items(json!([{"id": 3, "name": "Rum"}])),
        ];

        let (rows, ids) = unpack_and_assign_id(&column).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(ids, vec![vec![1, 2], vec![], vec![3]]);
    }

    #[test]
    fn keeps_duplicates_and_order() {
        let column = vec![items(json!([
            {"id": 5, "name": "Lime"},
            {"id": 1, "name": "Gin"},
            {"id": 5, "name": "Lime"}
        ]))];

        let (rows, ids) = unpack_and_assign_id(&column).unwrap();
        assert_eq!(ids[0], vec![5, 1, 5]);
        assert_eq!(rows[0]["name"], json!("Lime"));
        assert_eq!(rows[1]["name"], json!("Gin"));
    }

    #[test]
    fn missing_id_is_malformed() {
        let column = vec![
            items(json!([{"id": 1, "name": "Gin"}])),
            items(json!([{"id": 2}, {"name": "Mystery"}])),
        ];

        let err = unpack_and_assign_id(&column).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedRecord {
                cocktail: 1,
                position: 1,
                field: "id"
            }
        ));
    }

    #[test]
    fn plain_unpack_does_not_need_ids() {
        let column = vec![items(json!([{"name": "Ice"}]))];
        let rows = unpack(&column).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn nested_objects_become_dotted_columns() {
        let column = vec![items(json!([
            {"id": 1, "name": "Gin", "meta": {"abv": 40, "origin": {"country": "UK"}}}
        ]))];

        let (rows, _) = unpack_and_assign_id(&column).unwrap();
        assert_eq!(rows[0]["meta.abv"], json!(40));
        assert_eq!(rows[0]["meta.origin.country"], json!("UK"));
        assert!(!rows[0].contains_key("meta"));
    }

    proptest! {
        #[test]
        fn row_count_is_sum_of_list_lengths(
            lengths in proptest::collection::vec(0usize..6, 0..30),
        ) {
            let column: Vec<Vec<Value>> = lengths
                .iter()
                .enumerate()
                .map(|(c, &n)| {
                    (0..n)
                        .map(|i| json!({"id": (c * 10 + i) as i64, "name": "x"}))
                        .collect()
                })
                .collect();

            let (rows, ids) = unpack_and_assign_id(&column).unwrap();

            prop_assert_eq!(rows.len(), lengths.iter().sum::<usize>());
            prop_assert_eq!(ids.len(), lengths.len());
            for (list, &n) in ids.iter().zip(&lengths) {
                prop_assert_eq!(list.len(), n);
            }
        }
    }
}
