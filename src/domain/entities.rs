//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::domain::error::{DomainResult, ValidationError};

/// Edge color used for AND-linked children.
pub const AND_EDGE_COLOR: &str = "black";
/// Edge color used for OR-linked children.
pub const OR_EDGE_COLOR: &str = "black";
/// Name of the single node in a fresh document.
pub const DEFAULT_ROOT_NAME: &str = "Node";

/// Stable, opaque node identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Fresh random identifier; never collides with an existing one in practice.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A named value attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub value: String,
    /// Whether the attribute is printed inside the node box of the tree
    #[serde(with = "flag_string", default)]
    pub display_in_tree: bool,
}

impl Attribute {
    pub fn new(value: impl Into<String>, display_in_tree: bool) -> Self {
        Self {
            value: value.into(),
            display_in_tree,
        }
    }
}

/// Attribute map of a node, keyed by attribute name.
pub type Attributes = BTreeMap<String, Attribute>;

/// Build an attribute map from `(name, value, display_in_tree)` entries.
///
/// Names and values are trimmed; entries with an empty name or value are
/// skipped. A name given twice is rejected.
pub fn attributes_from_entries<I, N, V>(entries: I) -> DomainResult<Attributes>
where
    I: IntoIterator<Item = (N, V, bool)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut attributes = Attributes::new();
    let mut seen = std::collections::HashSet::new();
    for (name, value, display_in_tree) in entries {
        let name = name.as_ref().trim();
        if !name.is_empty() && !seen.insert(name.to_string()) {
            return Err(ValidationError::DuplicateAttribute(name.to_string()).into());
        }
        let value = value.as_ref().trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        attributes.insert(name.to_string(), Attribute::new(value, display_in_tree));
    }
    Ok(attributes)
}

/// A vertex of the attack tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// AND-group label; nodes sharing a label are jointly required
    #[serde(default, deserialize_with = "blank_as_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(),
            name: name.into(),
            color: None,
            group: None,
            attributes: Attributes::new(),
        }
    }

    /// Attributes flagged for display in the tree, in name order.
    pub fn visible_attributes(&self) -> impl Iterator<Item = (&String, &Attribute)> {
        self.attributes.iter().filter(|(_, a)| a.display_in_tree)
    }
}

/// A probability-weighted parent -> child link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
    /// Decimal string as entered, `.` or `,` separator
    pub probability: String,
    #[serde(default = "default_edge_color")]
    pub color: String,
}

impl Edge {
    pub fn new(
        parent: NodeId,
        child: NodeId,
        probability: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            parent,
            child,
            probability: probability.into(),
            color: color.into(),
        }
    }

    pub fn connects(&self, parent: &NodeId, child: &NodeId) -> bool {
        &self.parent == parent && &self.child == child
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        &self.parent == id || &self.child == id
    }
}

fn default_edge_color() -> String {
    AND_EDGE_COLOR.to_string()
}

/// How a child contributes to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeMode {
    And,
    Or,
}

impl EdgeMode {
    pub fn color(self) -> &'static str {
        match self {
            EdgeMode::And => AND_EDGE_COLOR,
            EdgeMode::Or => OR_EDGE_COLOR,
        }
    }
}

impl FromStr for EdgeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(EdgeMode::And),
            "or" => Ok(EdgeMode::Or),
            other => Err(format!("unknown edge mode '{other}', expected 'and' or 'or'")),
        }
    }
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeMode::And => f.write_str("and"),
            EdgeMode::Or => f.write_str("or"),
        }
    }
}

/// The persisted attack tree: flat node and edge lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Document {
    /// A fresh document: one root node, no edges.
    pub fn bootstrap(root_name: &str) -> Self {
        Self {
            nodes: vec![Node::new(root_name)],
            edges: Vec::new(),
        }
    }
}

/// Older documents store `""` for nodes outside any group.
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let group = Option::<String>::deserialize(deserializer)?;
    Ok(group.filter(|g| !g.trim().is_empty()))
}

/// `display_in_tree` is stored as the strings "true"/"false".
mod flag_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(b) => b,
            Flag::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_string_flags_when_deserializing_attribute_then_parses_bool() {
        let attr: Attribute =
            serde_json::from_value(json!({"value": "low", "display_in_tree": "True"})).unwrap();
        assert!(attr.display_in_tree);

        let attr: Attribute =
            serde_json::from_value(json!({"value": "low", "display_in_tree": false})).unwrap();
        assert!(!attr.display_in_tree);
    }

    #[test]
    fn given_attribute_when_serializing_then_flag_is_string() {
        let value = serde_json::to_value(Attribute::new("high", true)).unwrap();
        assert_eq!(value, json!({"value": "high", "display_in_tree": "true"}));
    }

    #[test]
    fn given_node_without_optional_fields_when_deserializing_then_defaults_apply() {
        let node: Node = serde_json::from_value(json!({"id": "n1", "name": "Node"})).unwrap();
        assert_eq!(node.id, NodeId::from("n1"));
        assert!(node.group.is_none());
        assert!(node.color.is_none());
        assert!(node.attributes.is_empty());
    }

    #[test]
    fn given_blank_group_when_deserializing_node_then_no_group() {
        let node: Node =
            serde_json::from_value(json!({"id": "n1", "name": "A", "group": "  "})).unwrap();
        assert!(node.group.is_none());

        let node: Node =
            serde_json::from_value(json!({"id": "n1", "name": "A", "group": "g1"})).unwrap();
        assert_eq!(node.group.as_deref(), Some("g1"));
    }

    #[test]
    fn given_entries_with_blanks_when_building_attributes_then_blanks_skipped() {
        let attrs = attributes_from_entries(vec![
            (" cost ", " 100 ", true),
            ("", "orphan", false),
            ("skill", "  ", false),
        ])
        .unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["cost"], Attribute::new("100", true));
    }

    #[test]
    fn given_repeated_name_when_building_attributes_then_duplicate_attribute() {
        let err = attributes_from_entries(vec![("cost", "1", false), ("cost", "2", false)])
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateAttribute("cost".to_string()).into()
        );
    }

    #[test]
    fn test_edge_mode_from_str() {
        assert_eq!("AND".parse::<EdgeMode>(), Ok(EdgeMode::And));
        assert_eq!("or".parse::<EdgeMode>(), Ok(EdgeMode::Or));
        assert!("xor".parse::<EdgeMode>().is_err());
    }
}
