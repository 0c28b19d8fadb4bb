//! Bag-of-words count vectors over ingredient names.
//!
//! Each cocktail's ingredient string (`"Gin, Tonic Water, Lime"`) becomes a
//! row of token counts. Tokens are maximal runs of word characters
//! (alphanumerics and `_`) at least two characters long, lower-cased:
//!
//! ```text
//! "Gin, Tonic Water, Lime"  →  gin tonic water lime
//! "7-Up, Lemon"             →  up lemon          ("7" is too short)
//! ```
//!
//! The vocabulary is sorted, so the column for a token depends only on the
//! set of tokens observed, never on hash order or insertion order.
//!
//! ```rust
//! use muddle::vectorize::vectorize;
//!
//! let (matrix, vocab) = vectorize(&["Gin, Tonic", "Gin, Gin"]);
//! assert_eq!(vocab.tokens(), &["gin", "tonic"]);
//! assert_eq!(matrix.row(1).to_vec(), vec![2.0, 0.0]);
//! ```

use std::collections::BTreeSet;
use std::collections::HashMap;

use ndarray::Array2;

use crate::error::{Error, Result};

/// Sorted token → column mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    fn from_sorted(tokens: Vec<String>) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { tokens, index }
    }

    /// Tokens in column order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Column of a token, if it is in the vocabulary.
    pub fn column(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token was observed.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Split text into lower-cased word tokens of two or more characters.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().nth(1).is_some())
        .map(str::to_lowercase)
}

/// Count vectorizer with a sorted vocabulary.
#[derive(Debug, Clone, Default)]
pub struct CountVectorizer {
    vocabulary: Option<Vocabulary>,
}

impl CountVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the vocabulary from documents.
    pub fn fit<S: AsRef<str>>(&mut self, docs: &[S]) -> &Vocabulary {
        let tokens: BTreeSet<String> = docs.iter().flat_map(|d| tokenize(d.as_ref())).collect();
        self.vocabulary.insert(Vocabulary::from_sorted(tokens.into_iter().collect()))
    }

    /// The learned vocabulary, once fitted.
    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    /// Count vocabulary tokens in each document.
    ///
    /// Tokens outside the fitted vocabulary are ignored.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if called before [`fit`](Self::fit).
    pub fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Result<Array2<f64>> {
        let vocab = self.vocabulary.as_ref().ok_or_else(|| Error::InvalidParameter {
            name: "vocabulary",
            message: "vectorizer is not fitted".to_string(),
        })?;

        Ok(count(vocab, docs))
    }

    /// Fit on `docs` and return their count matrix.
    pub fn fit_transform<S: AsRef<str>>(&mut self, docs: &[S]) -> Result<Array2<f64>> {
        self.fit(docs);
        self.transform(docs)
    }
}

fn count<S: AsRef<str>>(vocab: &Vocabulary, docs: &[S]) -> Array2<f64> {
    let mut counts = Array2::<f64>::zeros((docs.len(), vocab.len()));
    for (row, doc) in docs.iter().enumerate() {
        for token in tokenize(doc.as_ref()) {
            if let Some(col) = vocab.column(&token) {
                counts[[row, col]] += 1.0;
            }
        }
    }
    counts
}

/// Build the count matrix and vocabulary for a sequence of ingredient strings.
///
/// Row `i` is document `i`; column `t` is token `t` of the returned vocabulary.
pub fn vectorize<S: AsRef<str>>(docs: &[S]) -> (Array2<f64>, Vocabulary) {
    let tokens: BTreeSet<String> = docs.iter().flat_map(|d| tokenize(d.as_ref())).collect();
    let vocab = Vocabulary::from_sorted(tokens.into_iter().collect());

    let counts = count(&vocab, docs);

    tracing::debug!(rows = docs.len(), vocabulary = vocab.len(), "built count matrix");
    (counts, vocab)
}
