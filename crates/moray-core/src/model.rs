use crate::iface::shorten_interface;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_tier() -> i64 {
    1
}

/// One device in the topology, as delivered by the snapshot feed.
///
/// Snapshots replace the node set wholesale; nodes are never patched
/// field-by-field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Layer used for initial vertical placement. Absent means tier 1.
    #[serde(default = "default_tier")]
    pub tier: i64,
    /// Opaque payload forwarded to selection consumers.
    #[serde(default)]
    pub raw: Value,
}

/// One link in the topology as delivered by the snapshot feed.
///
/// `source`/`target` are optional because snapshots are produced externally
/// and may be transiently inconsistent; edges missing an endpoint are
/// dropped during resolution rather than treated as fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(rename = "sourceInterface", default)]
    pub source_interface: Option<String>,
    #[serde(rename = "targetInterface", default)]
    pub target_interface: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "sourceState", default)]
    pub source_state: Option<String>,
    #[serde(rename = "targetState", default)]
    pub target_state: Option<String>,
    #[serde(default)]
    pub raw: Value,
    #[serde(rename = "rawResource", default)]
    pub raw_resource: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

/// Rendering identity of an edge within one snapshot.
///
/// The ordinal disambiguates otherwise-identical parallel edges, assigned in
/// encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub source: String,
    pub target: String,
    pub source_interface: Option<String>,
    pub target_interface: Option<String>,
    pub ordinal: usize,
}

impl EdgeKey {
    /// Direction-sensitive grouping key for parallel edges. Not normalized:
    /// `a|b` and `b|a` are distinct groups.
    pub fn pair_key(&self) -> String {
        format!("{}|{}", self.source, self.target)
    }

    /// Stable canvas element id for this edge.
    pub fn element_id(&self) -> String {
        format!(
            "edge:{}|{}|{}|{}#{}",
            self.source,
            self.target,
            self.source_interface.as_deref().unwrap_or(""),
            self.target_interface.as_deref().unwrap_or(""),
            self.ordinal
        )
    }
}

/// An edge whose endpoints resolved against the snapshot's node set, with
/// interface names shortened for display.
#[derive(Debug, Clone)]
pub struct ResolvedEdge {
    pub key: EdgeKey,
    /// Shortened `sourceInterface`, if one was named.
    pub source_label: Option<String>,
    /// Shortened `targetInterface`, if one was named.
    pub target_label: Option<String>,
    pub state: Option<String>,
    pub source_state: Option<String>,
    pub target_state: Option<String>,
    pub raw: Value,
    pub raw_resource: Value,
}

impl ResolvedEdge {
    /// Effective link state used for coloring: the edge-level state wins,
    /// then either endpoint state.
    pub fn effective_state(&self) -> Option<&str> {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|s| !s.is_empty())
        }
        non_empty(&self.state)
            .or(non_empty(&self.source_state))
            .or(non_empty(&self.target_state))
    }

    /// Detail payload shown when the edge is selected: `raw` merged with
    /// `rawResource` and the state fields.
    pub fn detail_payload(&self) -> Value {
        let mut out = serde_json::Map::new();
        if let Value::Object(map) = &self.raw {
            for (k, v) in map {
                out.insert(k.clone(), v.clone());
            }
        }
        if !self.raw_resource.is_null() {
            out.insert("resource".to_string(), self.raw_resource.clone());
        }
        for (name, value) in [
            ("state", &self.state),
            ("sourceState", &self.source_state),
            ("targetState", &self.target_state),
        ] {
            if let Some(v) = value {
                out.insert(name.to_string(), Value::String(v.clone()));
            }
        }
        Value::Object(out)
    }
}

impl TopologySnapshot {
    /// Resolves edges against the node set.
    ///
    /// Edges without a recognizable source or target node are skipped; the
    /// count of skipped edges is returned alongside the survivors. Ordinals
    /// are assigned in encounter order among edges sharing the full
    /// `(source, target, sourceInterface, targetInterface)` identity.
    pub fn resolve_edges(&self) -> (Vec<ResolvedEdge>, usize) {
        let node_ids: std::collections::BTreeSet<&str> =
            self.nodes.iter().map(|n| n.id.as_str()).collect();

        let mut seen: IndexMap<(String, String, Option<String>, Option<String>), usize> =
            IndexMap::new();
        let mut resolved = Vec::with_capacity(self.edges.len());
        let mut skipped = 0usize;

        for edge in &self.edges {
            let (Some(source), Some(target)) = (edge.source.as_deref(), edge.target.as_deref())
            else {
                skipped += 1;
                continue;
            };
            if !node_ids.contains(source) || !node_ids.contains(target) {
                skipped += 1;
                continue;
            }

            let identity = (
                source.to_string(),
                target.to_string(),
                edge.source_interface.clone(),
                edge.target_interface.clone(),
            );
            let ordinal = {
                let counter = seen.entry(identity.clone()).or_insert(0);
                let current = *counter;
                *counter += 1;
                current
            };

            resolved.push(ResolvedEdge {
                key: EdgeKey {
                    source: identity.0,
                    target: identity.1,
                    source_interface: identity.2,
                    target_interface: identity.3,
                    ordinal,
                },
                source_label: edge.source_interface.as_deref().map(shorten_interface),
                target_label: edge.target_interface.as_deref().map(shorten_interface),
                state: edge.state.clone(),
                source_state: edge.source_state.clone(),
                target_state: edge.target_state.clone(),
                raw: edge.raw.clone(),
                raw_resource: edge.raw_resource.clone(),
            });
        }

        (resolved, skipped)
    }
}
