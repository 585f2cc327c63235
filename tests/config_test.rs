//! Integration tests for layered Settings loading.
//!
//! Precedence: defaults < global file < local `.webgl-export.toml` < env vars.
//! These tests pass an explicit global file (or none) so the developer's own
//! config never leaks in. Env var overrides live in `config_env_test.rs`.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use webgl_export::application::ApplicationError;
use webgl_export::config::{local_config_path, Settings};
use webgl_export::domain::SelfParentPolicy;

#[test]
fn given_no_config_files_when_load_then_defaults() {
    // Arrange
    let project = TempDir::new().unwrap();

    // Act
    let settings = Settings::load_from(None, Some(project.path())).expect("load settings");

    // Assert
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.output, PathBuf::from("scene.html"));
    assert_eq!(settings.viewport, 0);
    assert_eq!(settings.self_parent, SelfParentPolicy::Skip);
}

#[test]
fn given_local_config_when_load_then_overrides_only_given_keys() {
    // Arrange
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        r#"
output = "web/brain.html"
viewport = 1
self_parent = "reject"

[render]
title = "Brain atlas"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_from(None, Some(project.path())).expect("load settings");

    // Assert
    assert_eq!(settings.output, PathBuf::from("web/brain.html"));
    assert_eq!(settings.viewport, 1);
    assert_eq!(settings.self_parent, SelfParentPolicy::Reject);
    assert_eq!(settings.render.title, "Brain atlas");
    assert_eq!(
        settings.render.script_url,
        Settings::default().render.script_url,
        "unset keys keep their default"
    );
}

#[test]
fn given_global_and_local_config_when_load_then_local_wins() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global = global_dir.path().join("webgl-export.toml");
    fs::write(
        &global,
        r#"
viewport = 2

[render]
title = "Global title"
script_url = "https://cdn.example.org/xtk.js"
"#,
    )
    .unwrap();
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "viewport = 1\n").unwrap();

    // Act
    let settings = Settings::load_from(Some(&global), Some(project.path())).unwrap();

    // Assert
    assert_eq!(settings.viewport, 1);
    assert_eq!(settings.render.title, "Global title");
    assert_eq!(settings.render.script_url, "https://cdn.example.org/xtk.js");
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    // Arrange
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "viewport = \"first\"\n").unwrap();

    // Act
    let result = Settings::load_from(None, Some(project.path()));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_settings_when_rendered_then_toml_reloads_equal() {
    // Arrange
    let mut settings = Settings::default();
    settings.self_parent = SelfParentPolicy::Reject;
    settings.render.title = "It's a brain".into();

    // Act
    let rendered = settings.to_toml().unwrap();
    let reloaded: Settings = toml::from_str(&rendered).unwrap();

    // Assert
    assert!(rendered.contains("self_parent = \"reject\""));
    assert_eq!(reloaded, settings);
}
