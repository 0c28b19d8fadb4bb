use thiserror::Error;

/// Result alias for `muddle`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the preprocessing, recommendation, and clustering stages.
#[derive(Debug, Error)]
pub enum Error {
    /// An ingredient record lacks a field required to unpack it.
    #[error("cocktail {cocktail}: ingredient record {position} is missing field '{field}'")]
    MalformedRecord {
        /// Row of the cocktail owning the record.
        cocktail: usize,
        /// Position of the record inside the cocktail's ingredient list.
        position: usize,
        /// The missing (or mistyped) field.
        field: &'static str,
    },

    /// A table row could not be read into its typed form.
    #[error("row {row}: {message}")]
    InvalidRecord {
        /// Row index in the table.
        row: usize,
        /// What was wrong with it.
        message: String,
    },

    /// A timestamp column held a value that is not a date-time.
    #[error("cannot parse {field} value '{value}' as a date-time")]
    InvalidTimestamp {
        /// Column name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// An ingredient id referenced by a cocktail has no row in the ingredients table.
    #[error("cocktail {cocktail}: ingredient id {id} not found")]
    IngredientNotFound {
        /// Row of the cocktail referencing the id.
        cocktail: usize,
        /// The unresolved ingredient id.
        id: i64,
    },

    /// No cocktail carries the queried name.
    #[error("no cocktail named '{name}'")]
    NotFound {
        /// The queried name.
        name: String,
    },

    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// Invalid number of clusters requested.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Two inputs that must line up row for row do not.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// The dataset is not valid JSON of the expected shape.
    #[error("invalid dataset json: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = Error::IngredientNotFound { cocktail: 4, id: 17 };
        let msg = err.to_string();
        assert!(msg.contains("17"));
        assert!(msg.contains("cocktail 4"));

        let err = Error::NotFound {
            name: "Negroni".into(),
        };
        assert!(err.to_string().contains("Negroni"));

        let err = Error::MalformedRecord {
            cocktail: 0,
            position: 2,
            field: "id",
        };
        assert!(err.to_string().contains("'id'"));
    }
}
