//! Chart description builders.
//!
//! Every builder returns a `{data: [...], layout: {...}}` JSON value in the
//! conventional Plotly schema; rendering is someone else's job. Builders are
//! pure and synchronous: aggregate rows in, figure object out.

use thiserror::Error;

use crate::frame::FrameError;

pub mod choropleth;
pub mod heatmap;
pub mod hourly;
pub mod pareto;
pub mod points;
pub mod sankey;
pub mod targeting;
pub mod violin;

/// Sequential colorscale used across the dashboard (Plasma).
pub const PLASMA: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];

#[derive(Debug, Error)]
pub enum FigureError {
    #[error("flow diagram needs at least 2 stage columns, got {0}")]
    NotEnoughStages(usize),
    #[error("palette has {palette} colors but {stages} stage columns were given")]
    PaletteExhausted { stages: usize, palette: usize },
    #[error("label '{0}' missing from the unified label list")]
    UnknownLabel(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Colorscale entries in Plotly's `[fraction, color]` form.
pub fn plasma_scale() -> serde_json::Value {
    let last = (PLASMA.len() - 1) as f64;
    serde_json::Value::Array(
        PLASMA
            .iter()
            .enumerate()
            .map(|(i, color)| serde_json::json!([i as f64 / last, color]))
            .collect(),
    )
}
