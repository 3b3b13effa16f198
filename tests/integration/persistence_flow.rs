use outliner::persistence::{MemoryGateway, PersistenceGateway, SledGateway};
use outliner::undo::UndoConfig;
use outliner::{ApiError, Document, IndexPath, Node, NodeTree, StorageError};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn sled_document_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store");
    let folder;
    {
        let gateway = Arc::new(SledGateway::open(&path, UndoConfig::default()).unwrap());
        let doc = Document::open(gateway).unwrap();
        folder = doc.add_folder(Some("Projects")).unwrap();
        doc.add_node(NodeTree::leaf(Node::document("plan"))).unwrap();
        doc.import_records(&[], "group").unwrap();
        assert!(doc.save().unwrap());
        assert!(!doc.has_pending_changes());
    }
    let gateway = Arc::new(SledGateway::open(&path, UndoConfig::default()).unwrap());
    let doc = Document::open(gateway).unwrap();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.path_of(&folder), Some(IndexPath::root(0)));
    assert_eq!(doc.node_at(&IndexPath::new(vec![0, 0])).unwrap().title, "plan");
    // the group counter resumes past the saved group
    assert_eq!(doc.import_records(&[], "next").unwrap().as_str(), "root.1");
}

#[test]
fn commit_failure_is_surfaced_without_retry() {
    let gateway = Arc::new(MemoryGateway::new());
    let doc = Document::new(gateway.clone());
    doc.add_folder(None).unwrap();
    gateway.set_fail_saves(true);
    let err = doc.save().unwrap_err();
    assert!(matches!(err, ApiError::StorageError(StorageError::CommitFailure(_))));
    assert_eq!(gateway.save_count(), 0);
    assert!(doc.has_pending_changes());
}

#[test]
fn undo_depth_is_bounded() {
    let gateway = Arc::new(MemoryGateway::with_undo_config(UndoConfig { max_depth: 2 }));
    let doc = Document::new(gateway.clone());
    for _ in 0..4 {
        doc.add_folder(None).unwrap();
    }
    assert_eq!(gateway.undo_manager().lock().undo_depth(), 2);
    assert!(doc.undo().unwrap());
    assert!(doc.undo().unwrap());
    assert!(!doc.undo().unwrap());
    assert_eq!(doc.len(), 2);
}

#[test]
fn undo_stages_restored_forest() {
    let gateway = Arc::new(MemoryGateway::new());
    let doc = Document::new(gateway.clone());
    doc.add_folder(None).unwrap();
    doc.save().unwrap();
    doc.add_folder(None).unwrap();
    doc.undo().unwrap();
    assert!(doc.save().unwrap());
    assert_eq!(gateway.saved().unwrap().len(), 1);
}
