//! Tests for graph queries and the document JSON format

use serde_json::json;

use atree::domain::{groups_of, Document, DomainError, Edge, NewNode, Node, NodeId};

fn node(id: &str, name: &str) -> Node {
    serde_json::from_value(json!({"id": id, "name": name})).unwrap()
}

// ============================================================
// Levels and ancestry
// ============================================================

#[test]
fn given_chain_when_node_level_then_counts_edges_to_root() {
    // Arrange
    let mut doc = Document::bootstrap("Root");
    let root = doc.nodes[0].id.clone();
    let a = doc.add_node(NewNode::new("A", root.clone(), "1")).unwrap();
    let b = doc.add_node(NewNode::new("B", a.clone(), "1")).unwrap();

    // Act & Assert
    assert_eq!(doc.node_level(&root).unwrap(), 0);
    assert_eq!(doc.node_level(&a).unwrap(), 1);
    assert_eq!(doc.node_level(&b).unwrap(), 2);
    assert!(doc.is_ancestor(&root, &b));
    assert!(!doc.is_ancestor(&b, &root));
}

#[test]
fn given_parent_cycle_when_node_level_then_cycle_detected() {
    let doc = Document {
        nodes: vec![node("a", "A"), node("b", "B")],
        edges: vec![
            Edge::new("a".into(), "b".into(), "1", "black"),
            Edge::new("b".into(), "a".into(), "1", "black"),
        ],
    };

    let err = doc.node_level(&NodeId::from("a")).unwrap_err();

    assert_eq!(err, DomainError::CycleDetected(NodeId::from("a")));
}

#[test]
fn given_name_or_id_when_resolve_id_then_finds_node() {
    let mut doc = Document::bootstrap("Root");
    let root = doc.nodes[0].id.clone();
    let a = doc.add_node(NewNode::new("Phish", root, "1")).unwrap();

    assert_eq!(doc.resolve_id("Phish").unwrap(), a);
    assert_eq!(doc.resolve_id(a.as_str()).unwrap(), a);
    assert_eq!(
        doc.resolve_id("nobody").unwrap_err(),
        DomainError::NodeNotFound(NodeId::from("nobody"))
    );
}

#[test]
fn given_grouped_nodes_when_groups_of_then_first_appearance_order() {
    let mut nodes = vec![node("1", "A"), node("2", "B"), node("3", "C"), node("4", "D")];
    nodes[0].group = Some("g2".into());
    nodes[1].group = Some("g1".into());
    nodes[2].group = Some("g2".into());

    let groups = groups_of(&nodes);

    assert_eq!(
        groups,
        vec![
            ("g2".to_string(), vec![NodeId::from("1"), NodeId::from("3")]),
            ("g1".to_string(), vec![NodeId::from("2")]),
        ]
    );
}

#[test]
fn given_blank_group_labels_when_groups_of_then_not_a_group() {
    let mut nodes = vec![node("1", "A"), node("2", "B"), node("3", "C")];
    nodes[0].group = Some(String::new());
    nodes[1].group = Some("  ".into());
    nodes[2].group = Some("g1".into());

    let groups = groups_of(&nodes);

    assert_eq!(groups, vec![("g1".to_string(), vec![NodeId::from("3")])]);
}

// ============================================================
// JSON format
// ============================================================

#[test]
fn given_stored_json_when_deserializing_then_reads_all_fields() {
    // Arrange
    let raw = json!({
        "nodes": [
            {"id": "r", "name": "Root", "group": null, "attributes": {}},
            {"id": "a", "name": "A", "color": "black", "group": "g1",
             "attributes": {"cost": {"value": "high", "display_in_tree": "true"}}}
        ],
        "edges": [
            {"parent": "r", "child": "a", "probability": "0,5", "color": "black"}
        ]
    });

    // Act
    let doc: Document = serde_json::from_value(raw).unwrap();

    // Assert
    let a = doc.node(&NodeId::from("a")).unwrap();
    assert_eq!(a.group.as_deref(), Some("g1"));
    assert!(a.attributes["cost"].display_in_tree);
    assert_eq!(doc.edges[0].probability, "0,5");
    assert_eq!(doc.root().unwrap().name, "Root");
}

#[test]
fn given_document_when_serializing_then_group_null_and_flags_strings() {
    let mut doc = Document::bootstrap("Root");
    let root = doc.nodes[0].id.clone();
    doc.nodes[0].attributes.insert(
        "cost".into(),
        atree::domain::Attribute::new("1", false),
    );

    let value = serde_json::to_value(&doc).unwrap();

    let stored = &value["nodes"][0];
    assert_eq!(stored["id"], json!(root.as_str()));
    assert_eq!(stored["group"], json!(null));
    assert!(stored.get("color").is_none());
    assert_eq!(stored["attributes"]["cost"]["display_in_tree"], json!("false"));
    assert_eq!(value["edges"], json!([]));
}

#[test]
fn given_well_formed_document_when_round_tripped_then_equal() {
    let mut doc = Document::bootstrap("Root");
    let root = doc.nodes[0].id.clone();
    doc.add_node(NewNode::new("A", root, "0.25").with_group("g"))
        .unwrap();

    let text = serde_json::to_string(&doc).unwrap();
    let back: Document = serde_json::from_str(&text).unwrap();

    assert_eq!(back, doc);
}
