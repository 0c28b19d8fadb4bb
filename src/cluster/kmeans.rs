//! K-means clustering.
//!
//! Partitions count vectors into k clusters by minimizing **within-cluster
//! sum of squares** (inertia):
//!
//! ```text
//! inertia = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids via k-means++
//! 2. **Assign**: Each point → nearest centroid (Euclidean)
//! 3. **Update**: Each centroid → mean of assigned points
//! 4. Repeat until the centroids stop moving or `max_iter` is reached
//!
//! Lloyd only finds a local minimum, so [`Kmeans`] runs `n_init`
//! initialisations from one seeded RNG and keeps the lowest inertia. With a
//! seed the whole fit is reproducible.
//!
//! ## K-means++ Initialization
//!
//! 1. Choose first centroid uniformly at random
//! 2. Choose next centroid with probability proportional to D(x)²
//!    (squared distance to nearest existing centroid)

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::traits::Clustering;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations per run.
    max_iter: usize,
    /// Convergence tolerance on total squared centroid shift.
    tol: f64,
    /// Number of independent initialisations.
    n_init: usize,
    /// Random seed.
    seed: Option<u64>,
}

/// Outcome of a k-means fit.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Cluster label per row, in `[0, k)`.
    pub labels: Vec<usize>,
    /// Final centroids, `k × d`.
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares.
    pub inertia: f64,
    /// Lloyd iterations of the winning run.
    pub iterations: usize,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            tol: 1e-4,
            n_init: 1,
            seed: None,
        }
    }

    /// K-means with the cluster count, seed, and iteration settings of a config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.n_clusters)
            .with_max_iter(config.max_iter)
            .with_tol(config.tol)
            .with_n_init(config.n_init)
            .with_seed(config.seed)
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the number of initialisations; the lowest-inertia run wins.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit and return labels, centroids, and inertia.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidClusterCount`] if `k` is 0 or exceeds the number of rows.
    pub fn fit(&self, data: ArrayView2<'_, f64>) -> Result<KmeansFit> {
        let n = data.nrows();
        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1".to_string(),
            });
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut best: Option<KmeansFit> = None;
        for run in 0..self.n_init {
            let fit = self.run_once(data, &mut rng);
            tracing::debug!(run, inertia = fit.inertia, iterations = fit.iterations, "k-means run");
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        best.ok_or(Error::Other("k-means produced no run".to_string()))
    }

    fn run_once(&self, data: ArrayView2<'_, f64>, rng: &mut impl Rng) -> KmeansFit {
        let n = data.nrows();
        let d = data.ncols();

        let mut centroids = self.init_centroids(data, rng);
        let mut labels = vec![0usize; n];
        let mut iterations = 0;
        let mut converged = false;

        for iter in 0..self.max_iter {
            iterations = iter + 1;
            assign(data, &centroids, &mut labels);

            // Update step
            let mut new_centroids = Array2::<f64>::zeros((self.k, d));
            let mut counts = vec![0usize; self.k];

            for (i, &k) in labels.iter().enumerate() {
                let mut row = new_centroids.row_mut(k);
                row += &data.row(i);
                counts[k] += 1;
            }

            for (k, &count) in counts.iter().enumerate() {
                if count > 0 {
                    new_centroids
                        .row_mut(k)
                        .mapv_inplace(|x| x / count as f64);
                } else {
                    // Empty cluster: reinitialize randomly
                    let idx = rng.random_range(0..n);
                    tracing::warn!(cluster = k, row = idx, "empty k-means cluster re-seeded");
                    new_centroids.row_mut(k).assign(&data.row(idx));
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();

            centroids = new_centroids;

            if shift <= self.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(max_iter = self.max_iter, "k-means hit the iteration cap");
        }

        // Labels must match the final centroids.
        let inertia = assign(data, &centroids, &mut labels);

        KmeansFit {
            labels,
            centroids,
            inertia,
            iterations,
        }
    }

    /// Initialize centroids using k-means++ algorithm.
    fn init_centroids(&self, data: ArrayView2<'_, f64>, rng: &mut impl Rng) -> Array2<f64> {
        let n = data.nrows();
        let d = data.ncols();
        let mut centroids = Array2::zeros((self.k, d));

        // First centroid: random point
        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        // Remaining centroids: k-means++ selection
        for i in 1..self.k {
            let distances: Vec<f64> = (0..n)
                .map(|j| {
                    (0..i)
                        .map(|c| squared_distance(data.row(j), centroids.row(c)))
                        .fold(f64::MAX, f64::min)
                })
                .collect();

            // Sample proportional to squared distance
            let total: f64 = distances.iter().sum();
            if total == 0.0 {
                let idx = rng.random_range(0..n);
                centroids.row_mut(i).assign(&data.row(idx));
                continue;
            }

            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = n - 1;

            for (j, &dist) in distances.iter().enumerate() {
                cumsum += dist;
                if cumsum >= threshold && dist > 0.0 {
                    selected = j;
                    break;
                }
            }

            centroids.row_mut(i).assign(&data.row(selected));
        }

        centroids
    }
}

/// Compute squared Euclidean distance.
fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: ArrayView1<'_, f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut best_cluster = 0;
    let mut best_dist = f64::MAX;
    for (k, centroid) in centroids.outer_iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best_cluster = k;
        }
    }
    (best_cluster, best_dist)
}

/// Assign each row to its nearest centroid; returns the inertia.
#[cfg(feature = "parallel")]
fn assign(data: ArrayView2<'_, f64>, centroids: &Array2<f64>, labels: &mut [usize]) -> f64 {
    labels
        .par_iter_mut()
        .enumerate()
        .map(|(i, label)| {
            let (cluster, dist) = nearest(data.row(i), centroids);
            *label = cluster;
            dist
        })
        .sum()
}

/// Assign each row to its nearest centroid; returns the inertia.
#[cfg(not(feature = "parallel"))]
fn assign(data: ArrayView2<'_, f64>, centroids: &Array2<f64>, labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (i, label) in labels.iter_mut().enumerate() {
        let (cluster, dist) = nearest(data.row(i), centroids);
        *label = cluster;
        inertia += dist;
    }
    inertia
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: ArrayView2<'_, f64>) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}
