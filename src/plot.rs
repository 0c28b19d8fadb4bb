//! Scatter-plot data for cluster visualisation.
//!
//! Rendering happens outside this crate. [`ScatterPlot`] carries everything
//! a renderer needs per cocktail: 2D position, cluster label, name, and the
//! palette style for its cluster. It serialises to JSON.

use serde::Serialize;

use crate::error::{Error, Result};

/// Colours assigned to clusters, cycled by `cluster % PALETTE_SIZE`.
pub const COLORS: [&str; 5] = ["blue", "green", "red", "purple", "pink"];

/// Marker shapes assigned to clusters, cycled like [`COLORS`].
pub const MARKERS: [&str; 5] = ["o", "s", "D", "^", "s"];

/// Number of distinct cluster styles.
pub const PALETTE_SIZE: usize = COLORS.len();

/// Visual style of one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Style {
    /// Fill colour name.
    pub color: &'static str,
    /// Marker shape code.
    pub marker: &'static str,
}

/// Style for a cluster label. Labels past the palette wrap around.
pub fn style_for(cluster: usize) -> Style {
    let slot = cluster % PALETTE_SIZE;
    Style {
        color: COLORS[slot],
        marker: MARKERS[slot],
    }
}

/// One cocktail on the plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    /// First principal component.
    pub x: f64,
    /// Second principal component.
    pub y: f64,
    /// Cluster label.
    pub cluster: usize,
    /// Cocktail name.
    pub name: String,
    /// Palette style for `cluster`.
    pub style: Style,
}

/// A cluster scatter plot, ready for an external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPlot {
    /// Plot title.
    pub title: String,
    /// Horizontal axis label.
    pub x_label: String,
    /// Vertical axis label.
    pub y_label: String,
    /// Draw each point's name next to it.
    pub annotate: bool,
    /// Points in table row order.
    pub points: Vec<PlotPoint>,
}

impl ScatterPlot {
    /// Zip coordinates, labels, and names into plot points.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] unless all three inputs have one entry per row.
    pub fn build<S: AsRef<str>>(
        coords: &[(f64, f64)],
        labels: &[usize],
        names: &[S],
        annotate: bool,
    ) -> Result<Self> {
        for found in [labels.len(), names.len()] {
            if found != coords.len() {
                return Err(Error::DimensionMismatch {
                    expected: coords.len(),
                    found,
                });
            }
        }

        let points = coords
            .iter()
            .zip(labels)
            .zip(names)
            .map(|((&(x, y), &cluster), name)| PlotPoint {
                x,
                y,
                cluster,
                name: name.as_ref().to_string(),
                style: style_for(cluster),
            })
            .collect();

        Ok(Self {
            title: "Cocktail Clusters".to_string(),
            x_label: "Principal Component 1".to_string(),
            y_label: "Principal Component 2".to_string(),
            annotate,
            points,
        })
    }

    /// Legend entries: each distinct cluster once, in order of first appearance.
    pub fn legend(&self) -> Vec<(String, Style)> {
        let mut seen = Vec::new();
        for p in &self.points {
            if !seen.contains(&p.cluster) {
                seen.push(p.cluster);
            }
        }
        seen.into_iter()
            .map(|c| (format!("Cluster {}", c % PALETTE_SIZE), style_for(c)))
            .collect()
    }

    /// Pretty-printed JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
