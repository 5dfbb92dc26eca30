//! Card transaction analytics: loads a fixed transaction dataset, joins it
//! against country lookup tables, and turns aggregation queries into
//! Plotly-style chart description objects served as JSON.

pub mod config;
pub mod data;
pub mod dataset;
pub mod figures;
pub mod frame;
pub mod logging;
pub mod metric;
pub mod query;
pub mod server;
