use crate::model::TopologySnapshot;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Floating-label visibility policy, applied uniformly to every edge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// Never shown.
    Hide,
    /// Always shown.
    Show,
    /// Shown only while the owning edge (or an edge touching the selected
    /// node) is the current selection.
    #[default]
    Select,
}

impl std::str::FromStr for LabelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hide" => Ok(Self::Hide),
            "show" => Ok(Self::Show),
            "select" => Ok(Self::Select),
            other => Err(format!("unknown label mode: {other}")),
        }
    }
}

/// Per-export style overrides requested from the toolbar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(rename = "backgroundColor", default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub transparent: bool,
    #[serde(rename = "fontColor", default)]
    pub font_color: Option<String>,
    #[serde(rename = "linkThickness", default = "default_link_thickness")]
    pub link_thickness: f64,
    #[serde(rename = "includeLabels", default = "default_true")]
    pub include_labels: bool,
    /// Output pixel ratio applied to injected label coordinates. The
    /// headless serializer emits at ratio 1.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_link_thickness() -> f64 {
    1.5
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f64 {
    1.0
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            background_color: None,
            transparent: false,
            font_color: None,
            link_thickness: default_link_thickness(),
            include_labels: true,
            scale: 1.0,
        }
    }
}

/// Inbound command from the hosting panel.
///
/// A tagged union matched exhaustively by the view, replacing string-keyed
/// handler lookup.
#[derive(Debug, Clone)]
pub enum Command {
    Render {
        namespace: String,
        snapshot: TopologySnapshot,
    },
    SetLabelMode(LabelMode),
    SetTheme(Theme),
    ExportSvg(ExportOptions),
}

/// Outbound request emitted toward the hosting panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Show detail content for the selected node or edge.
    OpenResource(Value),
    /// Open a remote shell to the double-clicked node.
    SshTopoNode(Value),
    /// A finished export, ready to be offered as a download.
    SvgExported(String),
    /// Export failed; the live view was left untouched.
    ExportFailed(String),
}
