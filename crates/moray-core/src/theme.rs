use serde::{Deserialize, Serialize};

/// Explicit theme value passed into render and recolor calls.
///
/// The view never queries global document state for colors; the host
/// refreshes this object from its theme observer and hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Link stroke for state `up`/`active`.
    pub link_up_color: String,
    /// Link stroke for any other non-empty state.
    pub link_down_color: String,
    /// Link stroke when no state is reported.
    pub link_neutral_color: String,
    pub node_background_color: String,
    pub node_border_color: String,
    pub font_color: String,
    pub label_background_color: String,
    pub label_border_color: String,
    pub background_color: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            link_up_color: "#52c41a".to_string(),
            link_down_color: "#ff4d4f".to_string(),
            link_neutral_color: "#999999".to_string(),
            node_background_color: "#ffffff".to_string(),
            node_border_color: "#666666".to_string(),
            font_color: "#333333".to_string(),
            label_background_color: "#f0f0f0".to_string(),
            label_border_color: "#d9d9d9".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            link_up_color: "#49aa19".to_string(),
            link_down_color: "#d32029".to_string(),
            link_neutral_color: "#7d7d7d".to_string(),
            node_background_color: "#1f1f1f".to_string(),
            node_border_color: "#434343".to_string(),
            font_color: "#dbdbdb".to_string(),
            label_background_color: "#262626".to_string(),
            label_border_color: "#434343".to_string(),
            background_color: "#141414".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
