//! Choropleth map of a per-region, per-year indicator with a linked trend
//! chart. Views render into in-memory SVG surfaces that are written to disk
//! or served over HTTP.

pub mod axis;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod legend;
pub mod line_view;
pub mod map_view;
pub mod projection;
pub mod scale;
pub mod scene;
pub mod server;
pub mod tooltip;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::AtlasConfig;
pub use dashboard::{Dashboard, PointerEvent};
pub use error::AtlasError;
pub use types::{Dataset, Selection};
