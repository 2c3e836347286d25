//! Tests for layered Settings loading

use std::path::PathBuf;

use tempfile::TempDir;

use atree::application::ApplicationError;
use atree::config::{local_config_path, Settings};

#[test]
fn given_global_and_local_config_when_loading_then_local_wins() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let global = temp.path().join("atree.toml");
    std::fs::write(
        &global,
        "root_name = \"Global root\"\nedge_color = \"red\"\n",
    )
    .unwrap();
    let project = temp.path().join("project");
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(
        local_config_path(&project),
        "root_name = \"Local root\"\ndocument_path = \"trees/web.json\"\n",
    )
    .unwrap();

    // Act
    let settings = Settings::load_from(Some(&global), Some(&project)).unwrap();

    // Assert
    assert_eq!(settings.root_name, "Local root");
    assert_eq!(settings.edge_color, "red");
    assert_eq!(settings.document_path, PathBuf::from("trees/web.json"));
    assert_eq!(settings.export_dir, PathBuf::from("export"));
}

#[test]
fn given_missing_files_when_loading_then_defaults() {
    let temp = TempDir::new().unwrap();

    let settings =
        Settings::load_from(Some(&temp.path().join("absent.toml")), Some(temp.path())).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_invalid_toml_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    std::fs::write(local_config_path(temp.path()), "root_name = [unclosed").unwrap();

    let err = Settings::load_from(None, Some(temp.path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_settings_when_to_toml_then_parses_back() {
    let settings = Settings {
        root_name: "Compromise server".into(),
        ..Settings::default()
    };

    let text = settings.to_toml().unwrap();
    let back: Settings = toml::from_str(&text).unwrap();

    assert_eq!(back, settings);
}
