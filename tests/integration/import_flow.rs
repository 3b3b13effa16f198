use super::memory_document;
use outliner::import::{JsonRecordDecoder, YamlRecordDecoder};
use outliner::{ApiError, ImportError, IndexPath, NodeType};
use std::fs;
use tempfile::TempDir;

const PLACES: &str = r#"{
  "children": [
    {"type": "container", "title": "Places", "identifier": "100", "children": [
      {"type": "document", "title": "Home", "url": "file:///Users/me"},
      {"type": "separator", "title": "", "children": [
        {"type": "document", "title": "Hidden"}
      ]},
      {"type": "container", "title": "Work", "children": [
        {"type": "separator"},
        {"type": "document", "title": "Desk", "url": "/srv/desk"}
      ]}
    ]},
    {"type": "separator"},
    {"type": "document", "title": "Loose"}
  ]
}"#;

fn write(temp: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn separators_drop_with_their_subtree() {
    let temp = TempDir::new().unwrap();
    let doc = memory_document();
    let source = write(&temp, "places.json", PLACES);
    let root = doc.import_file(&source, &JsonRecordDecoder, None).unwrap();

    let outline: Vec<(String, String)> = doc
        .outline()
        .into_iter()
        .map(|(p, n)| (p.to_string(), n.title))
        .collect();
    let expected = [
        ("0", "places.json"),
        ("0.0", "Places"),
        ("0.0.0", "me"),
        ("0.0.1", "Work"),
        ("0.0.1.0", "desk"),
        ("0.1", "Loose"),
    ];
    assert_eq!(
        outline,
        expected
            .iter()
            .map(|(p, t)| (p.to_string(), t.to_string()))
            .collect::<Vec<_>>()
    );
    assert!(doc
        .outline()
        .iter()
        .all(|(_, n)| n.node_type != NodeType::Separator));
    assert_eq!(doc.node(&root).unwrap().node_type, NodeType::Root);
    assert_eq!(doc.node(&"100".into()).unwrap().title, "Places");
    assert!(doc.selection().is_empty());
}

#[test]
fn malformed_source_leaves_tree_untouched() {
    let temp = TempDir::new().unwrap();
    let doc = memory_document();
    doc.add_folder(Some("existing")).unwrap();
    doc.import_file(&write(&temp, "ok.json", PLACES), &JsonRecordDecoder, None)
        .unwrap();

    let before = serde_json::to_vec(&doc.snapshot()).unwrap();
    let selection = doc.selection();
    let broken = write(&temp, "broken.json", r#"{"children": [{"type": "container", "#);
    let err = doc
        .import_file(&broken, &JsonRecordDecoder, None)
        .unwrap_err();

    assert!(matches!(err, ApiError::Import(ImportError::Decode(_))));
    assert_eq!(serde_json::to_vec(&doc.snapshot()).unwrap(), before);
    assert_eq!(doc.selection(), selection);
}

#[test]
fn missing_source_is_a_read_error() {
    let temp = TempDir::new().unwrap();
    let doc = memory_document();
    let err = doc
        .import_file(&temp.path().join("absent.json"), &JsonRecordDecoder, None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Import(ImportError::Read { .. })));
    assert!(doc.is_empty());
}

#[test]
fn yaml_import_and_group_counter() {
    let temp = TempDir::new().unwrap();
    let doc = memory_document();
    let yaml = "children:\n  - type: container\n    title: Music\n    children:\n      - type: document\n        title: song\n";
    let source = write(&temp, "music.yaml", yaml);
    let first = doc
        .import_file(&source, &YamlRecordDecoder, Some("Library"))
        .unwrap();
    let second = doc.import_file(&source, &YamlRecordDecoder, None).unwrap();

    assert_eq!(first.as_str(), "root.0");
    assert_eq!(second.as_str(), "root.1");
    assert_eq!(doc.node_at(&IndexPath::root(0)).unwrap().title, "Library");
    assert_eq!(doc.node_at(&IndexPath::new(vec![1, 0, 0])).unwrap().title, "song");
}

#[test]
fn import_is_one_undo_step() {
    let temp = TempDir::new().unwrap();
    let doc = memory_document();
    doc.import_file(&write(&temp, "p.json", PLACES), &JsonRecordDecoder, None)
        .unwrap();
    assert_eq!(doc.len(), 6);
    assert!(doc.undo().unwrap());
    assert!(doc.is_empty());
    assert!(!doc.can_undo());
}
