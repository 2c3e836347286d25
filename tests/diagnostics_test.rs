//! Tests for advisory document checks

use serde_json::json;

use atree::domain::diagnostics::{
    structural_violations, warn_singleton_and_groups, warn_unbalanced_probabilities,
};
use atree::domain::{check_document, Diagnostic, Document, Edge, NewNode, Node, NodeId};
use atree::util::testing;

fn node(id: &str, name: &str) -> Node {
    serde_json::from_value(json!({"id": id, "name": name})).unwrap()
}

fn edge(parent: &str, child: &str, probability: &str) -> Edge {
    Edge::new(parent.into(), child.into(), probability, "black")
}

#[test]
fn given_fresh_document_when_check_document_then_no_findings() {
    testing::init_test_setup();
    assert!(check_document(&Document::bootstrap("Root")).is_empty());
}

#[test]
fn given_one_member_group_when_warn_singleton_and_groups_then_reported() {
    let mut nodes = vec![node("a", "A"), node("b", "B"), node("c", "C")];
    nodes[0].group = Some("solo".into());
    nodes[1].group = Some("pair".into());
    nodes[2].group = Some("pair".into());

    let found = warn_singleton_and_groups(&nodes);

    assert_eq!(
        found,
        vec![Diagnostic::SingletonAndGroup {
            group: "solo".into(),
            node: NodeId::from("a")
        }]
    );
}

#[test]
fn given_children_below_one_when_warn_unbalanced_probabilities_then_reports_rounded_total() {
    let nodes = vec![node("r", "Root"), node("a", "A"), node("b", "B")];
    let edges = vec![edge("r", "a", "0.333"), edge("r", "b", "0.333")];

    let found = warn_unbalanced_probabilities(&nodes, &edges);

    assert_eq!(
        found,
        vec![Diagnostic::UnbalancedProbability {
            parent: NodeId::from("r"),
            parent_name: "Root".into(),
            total: 0.67
        }]
    );
    assert!(found[0].to_string().contains("'Root'"));
}

#[test]
fn given_children_rounding_to_one_when_warn_unbalanced_probabilities_then_quiet() {
    let nodes = vec![node("r", "Root")];
    let edges = vec![
        edge("r", "a", "0.333"),
        edge("r", "b", "0.333"),
        edge("r", "c", "0,334"),
    ];
    assert!(warn_unbalanced_probabilities(&nodes, &edges).is_empty());
}

#[test]
fn given_unknown_parent_when_warn_unbalanced_probabilities_then_named_unknown() {
    let found = warn_unbalanced_probabilities(&[], &[edge("x", "a", "0.5")]);
    assert!(matches!(
        &found[0],
        Diagnostic::UnbalancedProbability { parent_name, .. } if parent_name == "unknown"
    ));
}

#[test]
fn given_unparsable_probability_when_warn_unbalanced_probabilities_then_reported_as_zero() {
    let nodes = vec![node("r", "Root")];
    let found = warn_unbalanced_probabilities(&nodes, &[edge("r", "a", "likely")]);

    assert!(found.contains(&Diagnostic::UnparsableProbability {
        parent: NodeId::from("r"),
        child: NodeId::from("a"),
        raw: "likely".into()
    }));
    assert!(found.iter().any(|d| matches!(
        d,
        Diagnostic::UnbalancedProbability { total, .. } if *total == 0.0
    )));
}

#[test]
fn given_hand_edited_document_when_structural_violations_then_reports_each_problem() {
    // Arrange
    let doc = Document {
        nodes: vec![node("r", "Root"), node("a", "A"), node("b", "A")],
        edges: vec![
            edge("r", "a", "0.5"),
            edge("r", "a", "0.5"),
            edge("a", "a", "0.1"),
            edge("r", "ghost", "0.1"),
            edge("a", "b", "1"),
        ],
    };

    // Act
    let found = structural_violations(&doc);

    // Assert
    assert!(found.contains(&Diagnostic::DuplicateName { name: "A".into() }));
    assert!(found.contains(&Diagnostic::DuplicateEdge {
        parent: "r".into(),
        child: "a".into()
    }));
    assert!(found.contains(&Diagnostic::SelfLoop { node: "a".into() }));
    assert!(found.contains(&Diagnostic::UnknownNodeReference {
        parent: "r".into(),
        child: "ghost".into(),
        missing: "ghost".into()
    }));
    assert!(!found
        .iter()
        .any(|d| matches!(d, Diagnostic::InvalidRootCount { .. })));
}

#[test]
fn given_detached_cycle_when_structural_violations_then_unreachable() {
    let doc = Document {
        nodes: vec![node("r", "Root"), node("a", "A"), node("b", "B")],
        edges: vec![edge("a", "b", "1"), edge("b", "a", "1")],
    };

    let found = structural_violations(&doc);

    assert!(found.contains(&Diagnostic::Unreachable {
        nodes: vec!["a".into(), "b".into()]
    }));
}

#[test]
fn given_two_roots_when_structural_violations_then_invalid_root_count() {
    let doc = Document {
        nodes: vec![node("r", "Root"), node("s", "Second")],
        edges: vec![],
    };
    assert_eq!(
        structural_violations(&doc),
        vec![Diagnostic::InvalidRootCount { roots: 2 }]
    );
}

#[test]
fn given_edited_tree_when_check_document_then_combines_all_checks() {
    testing::init_test_setup();
    let mut doc = Document::bootstrap("Root");
    let root = doc.nodes[0].id.clone();
    doc.add_node(NewNode::new("A", root, "0.5").with_group("g1"))
        .unwrap();

    let found = check_document(&doc);

    assert_eq!(found.len(), 2, "{found:?}");
    assert!(found
        .iter()
        .any(|d| matches!(d, Diagnostic::SingletonAndGroup { .. })));
    assert!(found
        .iter()
        .any(|d| matches!(d, Diagnostic::UnbalancedProbability { .. })));
}
