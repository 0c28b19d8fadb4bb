//! Grouping cocktails by ingredient composition.
//!
//! Two independent consumers of the count matrix live here:
//!
//! - [`Kmeans`] assigns each cocktail (row) a cluster label in `[0, k)`,
//!   using Euclidean distance over the raw count vectors.
//! - [`Pca`] projects the same rows onto their two directions of greatest
//!   variance, purely so the clusters can be drawn.
//!
//! The projection never feeds back into the clustering.
//!
//! ## K-means
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**:
//! - Clusters are roughly spherical
//! - You know k in advance
//!
//! ## Usage
//!
//! ```rust
//! use muddle::cluster::{cluster, project_2d};
//! use muddle::vectorize::vectorize;
//!
//! let (matrix, _) = vectorize(&[
//!     "Gin, Tonic Water",
//!     "Gin, Tonic Water, Lime",
//!     "Rum, Cola",
//!     "Rum, Cola, Lime",
//! ]);
//! let labels = cluster(&matrix, 2).unwrap();
//! assert_eq!(labels.len(), 4);
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! let coords = project_2d(&matrix).unwrap();
//! assert_eq!(coords.len(), 4);
//! ```

mod kmeans;
mod pca;
mod traits;

pub use kmeans::{Kmeans, KmeansFit};
pub use pca::Pca;
pub use traits::Clustering;

use ndarray::Array2;

use crate::config::PipelineConfig;
use crate::dataset::Cocktail;
use crate::error::{Error, Result};

/// Cluster the rows of a count matrix into `k` groups.
///
/// Runs seeded k-means++ with the default restarts and iteration cap from
/// [`PipelineConfig`], so repeated calls give identical labels.
///
/// # Errors
///
/// [`Error::InvalidClusterCount`] if `k < 1` or `k` exceeds the number of rows.
pub fn cluster(matrix: &Array2<f64>, k: usize) -> Result<Vec<usize>> {
    let config = PipelineConfig::default().with_n_clusters(k);
    Kmeans::from_config(&config).fit_predict(matrix.view())
}

/// Project the rows of a count matrix to 2D for plotting.
///
/// An empty matrix gives no coordinates.
pub fn project_2d(matrix: &Array2<f64>) -> Result<Vec<(f64, f64)>> {
    if matrix.nrows() == 0 {
        return Ok(Vec::new());
    }
    let projected = Pca::new(2).fit_transform(matrix.view())?;
    Ok(projected
        .outer_iter()
        .map(|row| (row[0], row[1]))
        .collect())
}

/// Write cluster labels onto the cocktails table, row for row.
///
/// This is the one in-place mutation of a caller's table: it sets
/// [`Cocktail::cluster`] and touches nothing else.
pub fn attach_clusters(cocktails: &mut [Cocktail], labels: &[usize]) -> Result<()> {
    if cocktails.len() != labels.len() {
        return Err(Error::DimensionMismatch {
            expected: cocktails.len(),
            found: labels.len(),
        });
    }
    for (cocktail, &label) in cocktails.iter_mut().zip(labels) {
        cocktail.cluster = Some(label);
    }
    Ok(())
}
