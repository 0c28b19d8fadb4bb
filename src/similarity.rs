//! Cosine similarity and content-based recommendation.
//!
//! ```text
//! cos(a, b) = a·b / (‖a‖ ‖b‖)
//! ```
//!
//! Count vectors are non-negative, so every similarity lies in [0, 1].
//! A cocktail with no ingredient tokens has a zero vector; its similarity to
//! every row, itself included, is defined as 0.
//!
//! Ranking sorts the other rows by descending similarity to the query with a
//! stable sort, so equal scores keep table order.
//!
//! ```rust
//! use muddle::dataset::CocktailProfile;
//! use muddle::similarity::recommend;
//!
//! let table = vec![
//!     CocktailProfile::new("A", "Gin, Tonic"),
//!     CocktailProfile::new("B", "Gin, Tonic, Lime"),
//!     CocktailProfile::new("C", "Rum, Cola"),
//! ];
//! assert_eq!(recommend("A", &table).unwrap(), vec!["B", "C"]);
//! ```

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView1, Axis};

use crate::config::DEFAULT_TOP_K;
use crate::dataset::CocktailProfile;
use crate::error::{Error, Result};
use crate::vectorize::{vectorize, Vocabulary};

/// Cosine similarity of two vectors; 0 if either is all zero.
pub fn cosine_similarity(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (a.dot(&b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Pairwise cosine similarity between the rows of `matrix`.
///
/// The result is square and symmetric. Its diagonal is exactly 1 for
/// non-zero rows and 0 for zero rows.
pub fn similarity_matrix(matrix: &Array2<f64>) -> Array2<f64> {
    let n = matrix.nrows();

    let mut unit = matrix.to_owned();
    let mut nonzero = vec![false; n];
    for (i, mut row) in unit.axis_iter_mut(Axis(0)).enumerate() {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|x| x / norm);
            nonzero[i] = true;
        }
    }

    let mut sim = unit.dot(&unit.t());
    for i in 0..n {
        sim[[i, i]] = if nonzero[i] { 1.0 } else { 0.0 };
        for j in (i + 1)..n {
            let s = sim[[i, j]].clamp(0.0, 1.0);
            sim[[i, j]] = s;
            sim[[j, i]] = s;
        }
    }
    sim
}

/// Rank every row except `query` by descending similarity, ties in row order.
fn rank(row: ArrayView1<'_, f64>, query: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row.len()).filter(|&i| i != query).collect();
    order.sort_by(|&a, &b| row[b].partial_cmp(&row[a]).unwrap_or(Ordering::Equal));
    order
}

/// Content-based recommender over a fixed cocktail table.
///
/// Builds the count matrix and the similarity matrix once; each query is then
/// a row lookup and a sort.
#[derive(Debug, Clone)]
pub struct Recommender {
    names: Vec<String>,
    vocabulary: Vocabulary,
    similarity: Array2<f64>,
    top_k: usize,
}

impl Recommender {
    /// Vectorize the profiles' ingredient strings and precompute similarities.
    pub fn fit(profiles: &[CocktailProfile]) -> Self {
        let docs: Vec<&str> = profiles.iter().map(|p| p.ingredients.as_str()).collect();
        let (counts, vocabulary) = vectorize(&docs);
        let similarity = similarity_matrix(&counts);

        tracing::debug!(
            cocktails = profiles.len(),
            vocabulary = vocabulary.len(),
            "fitted recommender"
        );
        Self {
            names: profiles.iter().map(|p| p.name.clone()).collect(),
            vocabulary,
            similarity,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set how many recommendations a query returns (default: 3).
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// The pairwise similarity matrix, rows in table order.
    pub fn similarity(&self) -> &Array2<f64> {
        &self.similarity
    }

    /// The vocabulary behind the count vectors.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Row of the first cocktail with exactly this name.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
            })
    }

    /// Rows of the `top_k` nearest cocktails with their scores, most similar first.
    ///
    /// The query row itself is never returned.
    pub fn neighbors(&self, name: &str) -> Result<Vec<(usize, f64)>> {
        let query = self.index_of(name)?;
        let row = self.similarity.row(query);

        Ok(rank(row, query)
            .into_iter()
            .take(self.top_k)
            .map(|i| (i, row[i]))
            .collect())
    }

    /// Up to `top_k` most similar cocktails with their scores, most similar first.
    pub fn recommend_with_scores(&self, name: &str) -> Result<Vec<(&str, f64)>> {
        Ok(self
            .neighbors(name)?
            .into_iter()
            .map(|(i, score)| (self.names[i].as_str(), score))
            .collect())
    }

    /// Up to `top_k` most similar cocktail names, most similar first.
    ///
    /// Only the query's own row is excluded: a later row sharing its name is a
    /// separate cocktail and can be returned.
    pub fn recommend(&self, name: &str) -> Result<Vec<&str>> {
        Ok(self
            .recommend_with_scores(name)?
            .into_iter()
            .map(|(n, _)| n)
            .collect())
    }
}

/// The three cocktails most similar to `query_name`, most similar first.
///
/// Duplicate names behave as in [`Recommender::recommend`].
///
/// Fewer are returned only when the table has fewer than four rows.
///
/// # Errors
///
/// [`Error::NotFound`] if no cocktail is named `query_name`.
pub fn recommend(query_name: &str, table: &[CocktailProfile]) -> Result<Vec<String>> {
    let recommender = Recommender::fit(table);
    Ok(recommender
        .recommend(query_name)?
        .into_iter()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    fn table(rows: &[(&str, &str)]) -> Vec<CocktailProfile> {
        rows.iter()
            .map(|(n, i)| CocktailProfile::new(*n, *i))
            .collect()
    }

    #[test]
    fn identical_and_orthogonal_vectors() {
        let a = array![1.0, 2.0, 0.0];
        let b = array![0.0, 0.0, 3.0];
        assert!((cosine_similarity(a.view(), a.view()) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(a.view(), b.view()).abs() < 1e-9);
    }

    #[test]
    fn zero_vector_is_similar_to_nothing() {
        let m = array![[0.0, 0.0], [1.0, 1.0]];
        let sim = similarity_matrix(&m);
        assert_eq!(sim[[0, 0]], 0.0);
        assert_eq!(sim[[0, 1]], 0.0);
        assert_eq!(sim[[1, 0]], 0.0);
        assert_eq!(sim[[1, 1]], 1.0);
        assert!(sim.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let m = array![[1.0, 0.0, 2.0], [1.0, 1.0, 0.0], [0.0, 3.0, 1.0], [2.0, 0.0, 4.0]];
        let sim = similarity_matrix(&m);
        for i in 0..4 {
            assert_eq!(sim[[i, i]], 1.0);
            for j in 0..4 {
                assert_eq!(sim[[i, j]], sim[[j, i]]);
                assert!((0.0..=1.0).contains(&sim[[i, j]]));
            }
        }
        // Rows 0 and 3 are parallel.
        assert!((sim[[0, 3]] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn shared_ingredients_rank_first() {
        let t = table(&[("A", "gin, tonic"), ("B", "gin, tonic, lime"), ("C", "rum, cola")]);
        assert_eq!(recommend("A", &t).unwrap(), vec!["B", "C"]);
    }

    #[test]
    fn ties_keep_table_order() {
        let t = table(&[
            ("Query", "Vodka"),
            ("First", "Gin"),
            ("Second", "Rum"),
            ("Match", "Vodka, Soda"),
            ("Third", "Tequila"),
        ]);
        assert_eq!(recommend("Query", &t).unwrap(), vec!["Match", "First", "Second"]);
    }

    #[test]
    fn duplicate_names_use_first_row() {
        let t = table(&[
            ("Sour", "Whiskey, Lemon Juice"),
            ("Highball", "Whiskey, Soda"),
            ("Sour", "Pisco, Lemon Juice"),
        ]);
        let r = Recommender::fit(&t);
        assert_eq!(r.index_of("Sour").unwrap(), 0);
        // The later row of the same name is a different cocktail and may be recommended.
        assert_eq!(r.recommend("Sour").unwrap(), vec!["Sour", "Highball"]);
        assert_eq!(recommend("Sour", &t).unwrap(), vec!["Sour", "Highball"]);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let t = table(&[("A", "Gin")]);
        let err = recommend("Zombie", &t).unwrap_err();
        assert!(matches!(err, Error::NotFound { name } if name == "Zombie"));
    }

    #[test]
    fn scores_are_descending() {
        let t = table(&[
            ("Negroni", "Gin, Campari, Sweet Vermouth"),
            ("Boulevardier", "Bourbon, Campari, Sweet Vermouth"),
            ("Americano", "Campari, Sweet Vermouth, Soda Water"),
            ("Martini", "Gin, Dry Vermouth"),
            ("Mojito", "Rum, Mint, Lime, Soda Water"),
        ]);
        let r = Recommender::fit(&t).with_top_k(4);
        let scored = r.recommend_with_scores("Negroni").unwrap();
        assert_eq!(scored.len(), 4);
        assert!(scored.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(scored[0].0, "Boulevardier");
    }

    proptest! {
        #[test]
        fn never_returns_query_and_at_most_three(
            docs in proptest::collection::vec("[a-e]{2}( [a-e]{2}){0,3}", 1..12),
            pick in 0usize..12,
        ) {
            let t: Vec<CocktailProfile> = docs
                .iter()
                .enumerate()
                .map(|(i, d)| CocktailProfile::new(format!("c{i}"), d.clone()))
                .collect();
            let query = format!("c{}", pick % t.len());

            let out = recommend(&query, &t).unwrap();

            prop_assert!(!out.contains(&query));
            prop_assert_eq!(out.len(), 3usize.min(t.len() - 1));
        }
    }
}
