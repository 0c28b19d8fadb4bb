//! # muddle
//!
//! Cocktail recipe analytics: flatten a nested recipe dataset into relational
//! tables, recommend similar cocktails by ingredient overlap, and cluster
//! cocktails by composition.
//!
//! ```text
//! raw JSON ─ dataset::prepare ─> cocktails + ingredients
//!          ─ dataset::profiles ─> "Gin, Tonic Water, Lime" per cocktail
//!          ─ vectorize ─────────> count matrix (rows = cocktails)
//!                 ├─ similarity::Recommender ─> top-k similar names
//!                 └─ cluster::Kmeans / Pca ───> labels + 2D plot
//! ```
//!
//! Every stage is an in-memory batch transform that preserves row order.
//! File and terminal I/O live in the `muddle` binary.

pub mod cluster;
pub mod config;
pub mod dataset;
/// Error types used across `muddle`.
pub mod error;
pub mod plot;
pub mod similarity;
pub mod vectorize;


pub use cluster::{attach_clusters, cluster, project_2d, Clustering, Kmeans, KmeansFit, Pca};
pub use config::PipelineConfig;
pub use dataset::{
    ingredient_counts, normalize, prepare, profiles, resolve_names, unpack, unpack_and_assign_id,
    Cocktail, CocktailProfile, Dataset, Ingredient, IngredientId, Record,
};
pub use error::{Error, Result};
pub use plot::{PlotPoint, ScatterPlot};
pub use similarity::{cosine_similarity, recommend, similarity_matrix, Recommender};
pub use vectorize::{vectorize, CountVectorizer, Vocabulary};
