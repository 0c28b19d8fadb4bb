//! Pipeline configuration.
//!
//! Defaults mirror the behaviour of the analysis scripts this crate grew out
//! of (three recommendations, three clusters, ten k-means restarts). Any field
//! can be overridden through a `MUDDLE_*` environment variable or a builder
//! method.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of recommendations returned per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Default number of k-means clusters.
pub const DEFAULT_N_CLUSTERS: usize = 3;

/// Default random seed for k-means initialisation.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration shared by the preprocessing, recommendation, and clustering stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Drop `createdAt`/`updatedAt` during normalisation (default: true).
    pub drop_times: bool,
    /// Recommendations per query (default: 3).
    pub top_k: usize,
    /// Number of k-means clusters (default: 3).
    pub n_clusters: usize,
    /// Seed for k-means initialisation (default: 42).
    pub seed: u64,
    /// Lloyd iteration cap per k-means run (default: 300).
    pub max_iter: usize,
    /// Centroid-shift convergence tolerance (default: 1e-4).
    pub tol: f64,
    /// Independent k-means initialisations; the lowest inertia wins (default: 10).
    pub n_init: usize,
    /// Annotate plot points with cocktail names (default: true).
    pub annotate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            drop_times: true,
            top_k: DEFAULT_TOP_K,
            n_clusters: DEFAULT_N_CLUSTERS,
            seed: DEFAULT_SEED,
            max_iter: 300,
            tol: 1e-4,
            n_init: 10,
            annotate: true,
        }
    }
}

impl PipelineConfig {
    /// Load the defaults, overlaid with any `MUDDLE_*` environment variables.
    ///
    /// Recognised:
    /// - `MUDDLE_DROP_TIMES`: `true`/`false`/`1`/`0`
    /// - `MUDDLE_TOP_K`
    /// - `MUDDLE_CLUSTERS`
    /// - `MUDDLE_SEED`
    /// - `MUDDLE_MAX_ITER`
    /// - `MUDDLE_N_INIT`
    /// - `MUDDLE_ANNOTATE`: `true`/`false`/`1`/`0`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_flag("MUDDLE_DROP_TIMES")? {
            config.drop_times = v;
        }
        if let Some(v) = env_parse("MUDDLE_TOP_K")? {
            config.top_k = v;
        }
        if let Some(v) = env_parse("MUDDLE_CLUSTERS")? {
            config.n_clusters = v;
        }
        if let Some(v) = env_parse("MUDDLE_SEED")? {
            config.seed = v;
        }
        if let Some(v) = env_parse("MUDDLE_MAX_ITER")? {
            config.max_iter = v;
        }
        if let Some(v) = env_parse("MUDDLE_N_INIT")? {
            config.n_init = v;
        }
        if let Some(v) = env_flag("MUDDLE_ANNOTATE")? {
            config.annotate = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set whether timestamps are dropped.
    pub fn with_drop_times(mut self, drop_times: bool) -> Self {
        self.drop_times = drop_times;
        self
    }

    /// Set the number of recommendations.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the number of clusters.
    pub fn with_n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    /// Set the k-means seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the k-means iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of k-means restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set whether plot points carry name labels.
    pub fn with_annotate(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Check parameter ranges. The cluster count is checked against the data
    /// at clustering time, not here.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(invalid("top_k", "must be at least 1"));
        }
        if self.max_iter == 0 {
            return Err(invalid("max_iter", "must be at least 1"));
        }
        if self.n_init == 0 {
            return Err(invalid("n_init", "must be at least 1"));
        }
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(invalid("tol", "must be a finite, non-negative number"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, message: &str) -> Error {
    Error::InvalidParameter {
        name,
        message: message.to_string(),
    }
}

fn env_parse<T: FromStr>(key: &'static str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| Error::InvalidParameter {
            name: key,
            message: format!("cannot parse '{raw}'"),
        }),
        Err(_) => Ok(None),
    }
}

fn env_flag(key: &'static str) -> Result<Option<bool>> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(Some(true)),
            "0" | "false" | "no" => Ok(Some(false)),
            _ => Err(Error::InvalidParameter {
                name: key,
                message: format!("expected a boolean, got '{raw}'"),
            }),
        },
        Err(_) => Ok(None),
    }
}
