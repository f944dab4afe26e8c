use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Kinds of nodes held by the theory graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    Scale,
    Chord,
    Genre,
    Motif,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 4] = [
        NodeLabel::Scale,
        NodeLabel::Chord,
        NodeLabel::Genre,
        NodeLabel::Motif,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeLabel::Scale => "Scale",
            NodeLabel::Chord => "Chord",
            NodeLabel::Genre => "Genre",
            NodeLabel::Motif => "Motif",
        }
    }

    /// Property that uniquely identifies a node of this label.
    pub fn key_property(self) -> &'static str {
        match self {
            NodeLabel::Motif => "pattern",
            _ => "name",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown node label: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeLabel {
    /// Genre -> Motif
    #[serde(rename = "EMBRACES")]
    Embraces,
}

impl EdgeLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeLabel::Embraces => "EMBRACES",
        }
    }
}

/// Reference to a node by label and key value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef<'a> {
    pub label: NodeLabel,
    pub key: &'a str,
}

impl<'a> NodeRef<'a> {
    pub fn new(label: NodeLabel, key: &'a str) -> Self {
        Self { label, key }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub label: NodeLabel,
    pub properties: Properties,
}

impl GraphNode {
    pub fn key(&self) -> Option<&str> {
        self.properties
            .get(self.label.key_property())
            .and_then(|v| v.as_str())
    }
}
