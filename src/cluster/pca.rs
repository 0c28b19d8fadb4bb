//! Principal component projection for plotting.
//!
//! Centres the rows, eigen-decomposes the covariance matrix, and projects
//! onto the leading eigenvectors. Only used to lay clusters out in 2D; the
//! clustering itself always runs on the full count vectors.
//!
//! Eigenvector signs are arbitrary, so each component is flipped until its
//! largest-magnitude loading is positive. The same input always yields the
//! same picture.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Principal Component Analysis.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Number of components to keep.
    n_components: usize,
    /// Per-feature mean, set by `fit`.
    mean: Option<Array1<f64>>,
    /// `n_components × d`; rows are principal axes.
    components: Option<Array2<f64>>,
    /// Variance explained by each component.
    explained_variance: Option<Vec<f64>>,
    /// Fraction of total variance explained by each component.
    explained_variance_ratio: Option<Vec<f64>>,
}

impl Pca {
    /// Creates a new PCA transformer keeping `n_components` axes.
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            mean: None,
            components: None,
            explained_variance: None,
            explained_variance_ratio: None,
        }
    }

    /// Variance explained by each component, once fitted.
    pub fn explained_variance(&self) -> Option<&[f64]> {
        self.explained_variance.as_deref()
    }

    /// Ratio of variance explained by each component, once fitted.
    pub fn explained_variance_ratio(&self) -> Option<&[f64]> {
        self.explained_variance_ratio.as_deref()
    }

    /// Principal axes, one per row.
    pub fn components(&self) -> Option<&Array2<f64>> {
        self.components.as_ref()
    }

    /// Learn the principal axes of `data`.
    ///
    /// When `data` has fewer features than requested components, the missing
    /// components are zero vectors with zero variance.
    pub fn fit(&mut self, data: ArrayView2<'_, f64>) -> Result<()> {
        let (n_samples, n_features) = data.dim();
        if n_samples == 0 {
            return Err(Error::EmptyInput);
        }
        if self.n_components == 0 {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be at least 1".to_string(),
            });
        }

        let mean = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(n_features));
        let centered = &data - &mean;

        // Σ = (Xᵀ X) / (n - 1)
        let denom = n_samples.saturating_sub(1).max(1) as f64;
        let cov = centered.t().dot(&centered) / denom;

        let mut components = Array2::<f64>::zeros((self.n_components, n_features));
        let mut explained_variance = vec![0.0; self.n_components];
        let mut eigenvalues: Vec<f64> = Vec::new();

        if n_features > 0 {
            let sym = DMatrix::from_fn(n_features, n_features, |i, j| cov[[i, j]]);
            let eigen = SymmetricEigen::new(sym);
            eigenvalues = eigen.eigenvalues.iter().map(|&v| v.max(0.0)).collect();

            let mut order: Vec<usize> = (0..n_features).collect();
            order.sort_by(|&a, &b| {
                eigenvalues[b]
                    .partial_cmp(&eigenvalues[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            for (c, &idx) in order.iter().take(self.n_components).enumerate() {
                explained_variance[c] = eigenvalues[idx];
                for j in 0..n_features {
                    components[[c, j]] = eigen.eigenvectors[(j, idx)];
                }

                let pivot = components
                    .row(c)
                    .iter()
                    .copied()
                    .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
                if pivot < 0.0 {
                    components.row_mut(c).mapv_inplace(|x| -x);
                }
            }
        }

        let total: f64 = eigenvalues.iter().sum();
        let explained_variance_ratio = explained_variance
            .iter()
            .map(|&v| if total > 0.0 { v / total } else { 0.0 })
            .collect();

        tracing::debug!(
            rows = n_samples,
            features = n_features,
            components = self.n_components,
            "fitted pca"
        );

        self.mean = Some(mean);
        self.components = Some(components);
        self.explained_variance = Some(explained_variance);
        self.explained_variance_ratio = Some(explained_variance_ratio);
        Ok(())
    }

    /// Project rows onto the fitted axes.
    ///
    /// # Errors
    ///
    /// Returns an error if PCA is not fitted or the feature count differs.
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let (mean, components) = match (&self.mean, &self.components) {
            (Some(m), Some(c)) => (m, c),
            _ => return Err(Error::Other("PCA not fitted".to_string())),
        };
        if data.ncols() != mean.len() {
            return Err(Error::DimensionMismatch {
                expected: mean.len(),
                found: data.ncols(),
            });
        }

        let centered = &data - mean;
        Ok(centered.dot(&components.t()))
    }

    /// Fit on `data` and project it.
    pub fn fit_transform(&mut self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.fit(data)?;
        self.transform(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn projects_onto_direction_of_spread() {
        // Points on the line y = x, with a little noise off it.
        let data = array![[0.0, 0.0], [1.0, 1.1], [2.0, 1.9], [3.0, 3.0], [4.0, 4.1]];
        let mut pca = Pca::new(2);
        let out = pca.fit_transform(data.view()).unwrap();

        assert_eq!(out.dim(), (5, 2));
        let ratio = pca.explained_variance_ratio().unwrap();
        assert!(ratio[0] > 0.99);
        assert!(ratio[0] >= ratio[1]);
        // First coordinate increases along the line after the sign fix.
        assert!(out[[0, 0]] < out[[4, 0]]);
    }

    #[test]
    fn projection_is_centered() {
        let data = array![[1.0, 0.0, 2.0], [0.0, 1.0, 1.0], [3.0, 1.0, 0.0], [2.0, 2.0, 2.0]];
        let out = Pca::new(2).fit_transform(data.view()).unwrap();
        for col in out.axis_iter(Axis(1)) {
            assert!(col.sum().abs() < 1e-9);
        }
    }

    #[test]
    fn fewer_features_than_components_pads_with_zero() {
        let data = array![[1.0], [2.0], [4.0]];
        let out = Pca::new(2).fit_transform(data.view()).unwrap();
        assert_eq!(out.dim(), (3, 2));
        assert!(out.column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn single_row_projects_to_origin() {
        let data = array![[1.0, 2.0, 3.0]];
        let out = Pca::new(2).fit_transform(data.view()).unwrap();
        assert!(out.iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn transform_checks_width() {
        let mut pca = Pca::new(1);
        pca.fit(array![[1.0, 2.0], [2.0, 1.0]].view()).unwrap();
        let err = pca.transform(array![[1.0, 2.0, 3.0]].view()).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, found: 3 }));
    }

    #[test]
    fn empty_input_rejected() {
        let data = Array2::<f64>::zeros((0, 2));
        assert!(matches!(Pca::new(2).fit(data.view()), Err(Error::EmptyInput)));
    }
}
