//! Tests for JsonFileStore
//!
//! The document on disk is pretty-printed JSON with 4-space indentation and is
//! replaced through a temporary sibling file.

use std::sync::Arc;

use tempfile::TempDir;

use atree::application::services::{DocumentStore, JsonFileStore};
use atree::application::ApplicationError;
use atree::domain::{Document, NewNode};
use atree::infrastructure::traits::RealFileSystem;

fn store_in(temp: &TempDir) -> JsonFileStore {
    JsonFileStore::new(
        Arc::new(RealFileSystem),
        temp.path().join("config").join("attack_tree_data.json"),
    )
}

fn sample() -> Document {
    let mut doc = Document::bootstrap("Root");
    let root = doc.nodes[0].id.clone();
    doc.add_node(NewNode::new("A", root, "0,5").with_group("g1"))
        .unwrap();
    doc
}

#[test]
fn given_no_file_when_load_then_none() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    assert!(store.load().unwrap().is_none());
}

#[test]
fn given_saved_document_when_load_then_equal() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    let doc = sample();

    // Act
    store.save(&doc).unwrap();
    let loaded = store.load().unwrap().unwrap();

    // Assert
    assert_eq!(loaded, doc);
}

#[test]
fn given_saved_document_when_reading_file_then_four_space_indent_and_no_temp_left() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);

    store.save(&sample()).unwrap();

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.starts_with("{\n    \"nodes\": ["), "{text}");
    assert!(text.ends_with("}\n"));
    let leftovers: Vec<_> = std::fs::read_dir(store.path().parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("attack_tree_data.json")]);
}

#[test]
fn given_corrupt_file_when_load_then_corrupt_document_and_file_untouched() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "{ not json").unwrap();

    // Act
    let err = store.load().unwrap_err();

    // Assert
    assert!(matches!(err, ApplicationError::CorruptDocument { .. }));
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{ not json");
}

#[test]
fn given_existing_file_when_save_then_replaced() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);
    store.save(&sample()).unwrap();

    let fresh = Document::bootstrap("Other");
    store.save(&fresh).unwrap();

    assert_eq!(store.load().unwrap().unwrap(), fresh);
}
