#![forbid(unsafe_code)]

//! Snapshot model for network topology views.
//!
//! `moray-core` holds the wire-level node/link shapes delivered by the data
//! feed, the identity scheme used to tell parallel links apart, and the
//! command/request unions exchanged with the hosting panel. Rendering lives
//! in `moray-render`.

pub mod command;
pub mod iface;
pub mod model;
pub mod theme;

pub use command::{Command, ExportOptions, LabelMode, Request};
pub use model::{EdgeKey, GraphEdge, GraphNode, ResolvedEdge, TopologySnapshot};
pub use theme::Theme;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parses a `{nodes, edges}` snapshot document.
pub fn parse_snapshot(text: &str) -> Result<TopologySnapshot> {
    Ok(serde_json::from_str(text)?)
}
