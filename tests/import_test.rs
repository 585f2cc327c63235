//! Tests for SceneImporter
//!
//! The importer mirrors the host hierarchy into a SceneTree:
//! - ancestors are inserted before descendants regardless of host order
//! - hierarchy nodes wrapping a model are represented by the model
//! - self parents, parent loops and unresolved parents are reported, not fatal

use webgl_export::application::services::{ImportWarning, SceneImporter};
use webgl_export::application::ApplicationError;
use webgl_export::domain::{
    DomainError, NodeKind, SceneTree, SelfParentPolicy, TraversalMode, SCENE_ROOT_ID,
};
use webgl_export::infrastructure::{NodeRecord, SceneDocument};
use webgl_export::util::testing;

fn scene(records: Vec<NodeRecord>) -> SceneDocument {
    let mut doc = SceneDocument::new();
    for record in records {
        doc.push_node(record).unwrap();
    }
    doc
}

/// Model listed before its wrapper and before the group that holds it.
fn brain_scene() -> SceneDocument {
    scene(vec![
        NodeRecord::model("vtkMRMLModelNode4", "Cortex").with_storage("cortex.vtk"),
        NodeRecord::hierarchy("vtkMRMLModelHierarchyNode2", "Cortex")
            .with_parent("vtkMRMLModelHierarchyNode1")
            .wrapping("vtkMRMLModelNode4"),
        NodeRecord::hierarchy("vtkMRMLModelHierarchyNode1", "Brain"),
        NodeRecord::model("vtkMRMLModelNode5", "Skull"),
    ])
}

/// Depth-first identifiers from the synthetic root.
fn ids(tree: &SceneTree) -> Vec<String> {
    tree
        .traverse(SCENE_ROOT_ID, TraversalMode::DepthFirst)
        .unwrap()
        .map(str::to_string)
        .collect()
}

// ============================================================
// Structure
// ============================================================

#[test]
fn given_model_before_its_ancestors_when_imported_then_parents_inserted_first() {
    // Arrange
    testing::init_test_setup();
    let doc = brain_scene();

    // Act
    let report = SceneImporter::default().import(&doc).unwrap();

    // Assert
    let tree = &report.tree;
    assert!(report.warnings.is_empty());
    assert_eq!(
        ids(tree),
        vec![
            "scene",
            "vtkMRMLModelHierarchyNode1",
            "vtkMRMLModelNode4",
            "vtkMRMLModelNode5",
        ]
    );
    assert_eq!(
        tree.get("vtkMRMLModelNode4").unwrap().parent(),
        Some("vtkMRMLModelHierarchyNode1")
    );
    assert_eq!(tree.get("vtkMRMLModelNode5").unwrap().parent(), Some("scene"));
    assert_eq!(tree.get("vtkMRMLModelHierarchyNode1").unwrap().name, "Brain");
}

#[test]
fn given_wrapping_hierarchy_node_when_imported_then_not_added_to_tree() {
    let doc = brain_scene();

    let report = SceneImporter::default().import(&doc).unwrap();

    assert!(!report.tree.contains("vtkMRMLModelHierarchyNode2"));
    assert_eq!(report.tree.len(), 4);
}

#[test]
fn given_hierarchy_node_with_unknown_model_when_imported_then_kept_as_group() {
    // Arrange
    let doc = scene(vec![
        NodeRecord::hierarchy("G", "Brain").wrapping("missingModel"),
        NodeRecord::model("L", "Left hemisphere").with_storage("lh.vtk"),
        NodeRecord::hierarchy("HL", "Left hemisphere")
            .with_parent("G")
            .wrapping("L"),
    ]);

    // Act
    let report = SceneImporter::default().import(&doc).unwrap();

    // Assert
    assert!(report.warnings.is_empty());
    assert_eq!(ids(&report.tree), vec!["scene", "G", "L"]);
    assert_eq!(report.tree.get("L").unwrap().parent(), Some("G"));
}

#[test]
fn given_hierarchy_node_wrapping_non_model_when_imported_then_kept_as_group() {
    // Arrange
    let doc = scene(vec![
        NodeRecord::new("vol", "Volume", NodeKind::Other),
        NodeRecord::hierarchy("G", "Brain").wrapping("vol"),
    ]);

    // Act
    let report = SceneImporter::default().import(&doc).unwrap();

    // Assert
    assert_eq!(ids(&report.tree), vec!["scene", "G"]);
}

#[test]
fn given_hidden_models_and_other_kinds_when_imported_then_silently_ignored() {
    // Arrange
    let doc = scene(vec![
        NodeRecord::model("vtkMRMLModelNode1", "Red Volume Slice").hidden(),
        NodeRecord::new("vtkMRMLScalarVolumeNode1", "MRHead", NodeKind::Other),
        NodeRecord::model("vtkMRMLModelNode4", "Cortex"),
    ]);

    // Act
    let report = SceneImporter::default().import(&doc).unwrap();

    // Assert
    assert!(report.warnings.is_empty());
    assert_eq!(ids(&report.tree), vec!["scene", "vtkMRMLModelNode4"]);
}

#[test]
fn given_same_importer_when_imported_twice_then_results_identical() {
    // Arrange
    let doc = brain_scene();
    let mut importer = SceneImporter::default();

    // Act
    let first = importer.import(&doc).unwrap();
    let second = importer.import(&doc).unwrap();

    // Assert
    assert_eq!(ids(&first.tree), ids(&second.tree));
    assert_eq!(first.warnings, second.warnings);
    assert_eq!(first.tree.len(), second.tree.len());
}

#[test]
fn given_empty_scene_when_imported_then_only_root() {
    let report = SceneImporter::default().import(&SceneDocument::new()).unwrap();

    assert_eq!(report.tree.len(), 1);
    assert_eq!(report.tree.root().unwrap().identifier(), SCENE_ROOT_ID);
    assert_eq!(report.tree.root().unwrap().name, "Scene");
}

// ============================================================
// Cycle guard
// ============================================================

#[test]
fn given_self_parent_when_imported_with_skip_then_warned_and_children_orphaned() {
    // Arrange
    let doc = scene(vec![
        NodeRecord::hierarchy("x", "Loop").with_parent("x"),
        NodeRecord::hierarchy("y", "Below loop").with_parent("x"),
        NodeRecord::hierarchy("z", "Fine"),
    ]);

    // Act
    let report = SceneImporter::new(SelfParentPolicy::Skip).import(&doc).unwrap();

    // Assert
    assert_eq!(
        report.warnings,
        vec![
            ImportWarning::CycleGuard { id: "x".into() },
            ImportWarning::Orphan {
                id: "y".into(),
                parent: "x".into()
            },
        ]
    );
    assert_eq!(ids(&report.tree), vec!["scene", "z"]);
}

#[test]
fn given_self_parent_when_imported_with_reject_then_fails() {
    // Arrange
    let doc = scene(vec![
        NodeRecord::hierarchy("z", "Fine"),
        NodeRecord::hierarchy("x", "Loop").with_parent("x"),
    ]);

    // Act
    let result = SceneImporter::new(SelfParentPolicy::Reject).import(&doc);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::SelfParent(id))) if id == "x"
    ));
}

#[test]
fn given_parent_loop_when_imported_then_loop_members_guarded_and_dependents_orphaned() {
    // Arrange
    let doc = scene(vec![
        NodeRecord::hierarchy("a", "A").with_parent("b"),
        NodeRecord::hierarchy("b", "B").with_parent("a"),
        NodeRecord::hierarchy("c", "C").with_parent("a"),
    ]);

    // Act
    let report = SceneImporter::default().import(&doc).unwrap();

    // Assert
    assert_eq!(report.tree.len(), 1);
    assert_eq!(report.warnings.len(), 3);
    assert!(report
        .warnings
        .contains(&ImportWarning::CycleGuard { id: "a".into() }));
    assert!(report
        .warnings
        .contains(&ImportWarning::CycleGuard { id: "b".into() }));
    assert!(report.warnings.contains(&ImportWarning::Orphan {
        id: "c".into(),
        parent: "a".into()
    }));
}

// ============================================================
// Unresolved parents
// ============================================================

#[test]
fn given_dangling_parent_when_imported_then_orphan_reported() {
    // Arrange
    let doc = scene(vec![
        NodeRecord::hierarchy("h", "Lost").with_parent("vtkMRMLModelHierarchyNode99"),
        NodeRecord::model("m", "Inside lost").with_storage("m.vtk"),
        NodeRecord::hierarchy("hm", "Inside lost").with_parent("h").wrapping("m"),
    ]);

    // Act
    let report = SceneImporter::default().import(&doc).unwrap();

    // Assert
    assert_eq!(
        report.warnings[0],
        ImportWarning::Orphan {
            id: "h".into(),
            parent: "vtkMRMLModelHierarchyNode99".into()
        }
    );
    assert!(report.warnings.iter().any(|w| w.id() == "m"));
    assert_eq!(report.tree.len(), 1);
}

#[test]
fn given_parent_of_unexported_kind_when_imported_then_orphan_reported() {
    // Arrange
    let doc = scene(vec![
        NodeRecord::new("vol", "Volume", NodeKind::Other),
        NodeRecord::hierarchy("h", "Under volume").with_parent("vol"),
    ]);

    // Act
    let report = SceneImporter::default().import(&doc).unwrap();

    // Assert
    assert_eq!(
        report.warnings,
        vec![ImportWarning::Orphan {
            id: "h".into(),
            parent: "vol".into()
        }]
    );
    assert!(!report.tree.contains("h"));
}
