//! Tests for TOML scene documents

use std::fs;
use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use webgl_export::domain::NodeKind;
use webgl_export::infrastructure::traits::{RealFileSystem, SceneSource};
use webgl_export::infrastructure::{InfraError, SceneDocument};

const BRAIN: &str = r##"
[[nodes]]
id = "vtkMRMLModelHierarchyNode1"
name = "Brain"
kind = "model_hierarchy"

[[nodes]]
id = "vtkMRMLModelNode4"
name = "Cortex"
kind = "model"
storage = "cortex.vtk"
display = { color = [1.0, 0.8, 0.7], opacity = 0.5, visible = true }

[[nodes]]
id = "vtkMRMLModelHierarchyNode2"
kind = "model_hierarchy"
parent = "vtkMRMLModelHierarchyNode1"
model = "vtkMRMLModelNode4"

[[nodes]]
id = "vtkMRMLModelNode1"
name = "Red Volume Slice"
kind = "model"
hidden = true

[[viewports]]
background = "#000000"
camera = [0.0, 0.0, 500.0]

[[viewports]]
background = "#ffffff"
"##;

#[test]
fn given_scene_file_when_loaded_then_nodes_in_file_order() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("brain.toml");
    fs::write(&path, BRAIN).unwrap();

    // Act
    let doc = SceneDocument::load(&RealFileSystem, &path).unwrap();

    // Assert
    assert_eq!(doc.node_count(), 4);
    let ids: Vec<&str> = (0..doc.node_count())
        .filter_map(|n| doc.nth_node(n))
        .map(|node| node.id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "vtkMRMLModelHierarchyNode1",
            "vtkMRMLModelNode4",
            "vtkMRMLModelHierarchyNode2",
            "vtkMRMLModelNode1",
        ]
    );
    assert!(doc.nth_node(4).is_none());
}

#[test]
fn given_scene_file_when_queried_then_host_attributes_available() {
    // Arrange
    let doc = SceneDocument::from_toml_str(BRAIN, Path::new("brain.toml")).unwrap();

    // Act
    let cortex = doc.node_by_id("vtkMRMLModelNode4").unwrap();
    let wrapper = doc.hierarchy_node_for_model("vtkMRMLModelNode4").unwrap();
    let display = doc.display_properties("vtkMRMLModelNode4").unwrap();

    // Assert
    assert_eq!(cortex.kind, NodeKind::Model);
    assert_eq!(cortex.name, "Cortex");
    assert_eq!(wrapper.parent.as_deref(), Some("vtkMRMLModelHierarchyNode1"));
    assert_eq!(doc.storage_file("vtkMRMLModelNode4").as_deref(), Some("cortex.vtk"));
    assert_eq!(display.color, [1.0, 0.8, 0.7]);
    assert_eq!(display.opacity, 0.5);
    assert!(doc.node_by_id("vtkMRMLModelNode1").unwrap().hide_from_editors);
    assert!(doc.storage_file("vtkMRMLModelNode1").is_none());
}

#[test]
fn given_viewports_when_queried_then_missing_values_are_none() {
    let doc = SceneDocument::from_toml_str(BRAIN, Path::new("brain.toml")).unwrap();

    assert_eq!(doc.background_color(0).as_deref(), Some("#000000"));
    assert_eq!(doc.camera_position(0), Some([0.0, 0.0, 500.0]));
    assert_eq!(doc.background_color(1).as_deref(), Some("#ffffff"));
    assert!(doc.camera_position(1).is_none());
    assert!(doc.background_color(2).is_none());
}

#[rstest]
#[case::duplicate_id("[[nodes]]\nid = \"a\"\nkind = \"model\"\n[[nodes]]\nid = \"a\"\nkind = \"model\"\n")]
#[case::empty_id("[[nodes]]\nid = \" \"\nkind = \"model\"\n")]
#[case::opacity_out_of_range("[[nodes]]\nid = \"a\"\nkind = \"model\"\ndisplay = { opacity = 1.5 }\n")]
#[case::color_out_of_range("[[nodes]]\nid = \"a\"\nkind = \"model\"\ndisplay = { color = [0.0, 2.0, 0.0] }\n")]
#[case::missing_kind("[[nodes]]\nid = \"a\"\n")]
#[case::not_toml("nodes = [")]
#[case::infinite_camera("[[viewports]]\nbackground = \"#000000\"\ncamera = [inf, 0.0, 1.0]\n")]
#[case::nan_camera("[[viewports]]\nbackground = \"#000000\"\ncamera = [0.0, nan, 1.0]\n")]
fn given_invalid_document_when_parsed_then_scene_format_error(#[case] content: &str) {
    // Act
    let result = SceneDocument::from_toml_str(content, Path::new("bad.toml"));

    // Assert
    match result {
        Err(InfraError::SceneFormat { path, .. }) => assert_eq!(path, Path::new("bad.toml")),
        other => panic!("expected SceneFormat, got {:?}", other.map(|d| d.node_count())),
    }
}

#[test]
fn given_missing_file_when_loaded_then_io_error() {
    let temp = TempDir::new().unwrap();

    let result = SceneDocument::load(&RealFileSystem, &temp.path().join("absent.toml"));

    assert!(matches!(result, Err(InfraError::Io { .. })));
}

#[test]
fn given_identifiers_with_whitespace_when_queried_then_matched_sanitized() {
    // Arrange
    let content = r#"
[[nodes]]
id = "Model Node 4"
kind = "model"
storage = "cortex.vtk"
display = { opacity = 0.25 }

[[nodes]]
id = "Hierarchy Node 2"
kind = "model_hierarchy"
model = "Model Node 4"
"#;

    // Act
    let doc = SceneDocument::from_toml_str(content, Path::new("spaces.toml")).unwrap();

    // Assert
    assert_eq!(doc.node_by_id("ModelNode4").unwrap().id, "Model Node 4");
    assert_eq!(doc.storage_file("ModelNode4").as_deref(), Some("cortex.vtk"));
    assert_eq!(doc.display_properties(" Model Node4").unwrap().opacity, 0.25);
    assert_eq!(
        doc.hierarchy_node_for_model("ModelNode4").unwrap().id,
        "Hierarchy Node 2"
    );
}

#[test]
fn given_ids_equal_after_sanitizing_when_parsed_then_duplicate_rejected() {
    let content = "[[nodes]]\nid = \"a b\"\nkind = \"model\"\n[[nodes]]\nid = \"ab\"\nkind = \"model\"\n";

    let result = SceneDocument::from_toml_str(content, Path::new("dup.toml"));

    assert!(matches!(result, Err(InfraError::SceneFormat { .. })));
}
