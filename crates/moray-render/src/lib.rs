#![forbid(unsafe_code)]

//! Headless network-topology graph view engine.
//!
//! The engine assigns node positions from tier membership, fans parallel
//! links apart with per-edge Bézier curvature, keeps floating interface
//! labels glued to their edge at a constant arc-length distance across
//! pan/zoom, tracks selection/highlight state, and re-renders the same
//! geometry into a static SVG with labels baked in.
//!
//! The rendering primitive and the floating-label host are collaborator
//! traits ([`canvas::Canvas`], [`canvas::OverlayHost`]); the built-in
//! [`canvas::HeadlessCanvas`] implements both in memory.

pub mod anchor;
pub mod canvas;
pub mod curvature;
pub mod export;
pub mod geometry;
pub mod overlay;
pub mod selection;
pub mod text;
pub mod tier;
pub mod view;

pub use canvas::{Canvas, HeadlessCanvas, OverlayHost};
pub use geometry::Point;
pub use view::TopologyView;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("svg serialization failed: {0}")]
    Canvas(#[from] canvas::CanvasError),
}

pub type Result<T> = std::result::Result<T, Error>;
