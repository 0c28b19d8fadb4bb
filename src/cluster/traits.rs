//! Clustering traits.

use ndarray::ArrayView2;

use crate::error::Result;

/// Trait for hard clustering algorithms over row vectors.
pub trait Clustering {
    /// Fit the model to the rows of `data` and return cluster assignments.
    ///
    /// Returns a vector of cluster labels, one per row, in row order.
    fn fit_predict(&self, data: ArrayView2<'_, f64>) -> Result<Vec<usize>>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}
