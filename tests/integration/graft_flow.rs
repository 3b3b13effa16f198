use super::memory_document;
use outliner::{IndexPath, Node, NodeTree, NodeType};
use std::fs;
use tempfile::TempDir;

fn child_titles(doc: &outliner::Document, parent: &IndexPath) -> Vec<String> {
    let count = doc.read(|s| s.store.child_count(Some(parent)).unwrap_or(0));
    (0..count)
        .map(|i| doc.node_at(&parent.appending(i)).unwrap().title)
        .collect()
}

#[test]
fn grafted_children_are_reverse_lexicographic() {
    let temp = TempDir::new().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(temp.path().join(name), "x").unwrap();
    }
    let doc = memory_document();
    let id = doc
        .add_filesystem_object(temp.path(), &IndexPath::root(0))
        .unwrap();
    assert_eq!(doc.path_of(&id), Some(IndexPath::root(0)));
    assert_eq!(
        child_titles(&doc, &IndexPath::root(0)),
        vec!["c.txt", "b.txt", "a.txt"]
    );
}

#[test]
fn graft_into_folder_at_index() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("note.md");
    fs::write(&file, "x").unwrap();

    let doc = memory_document();
    let folder = doc.add_folder(Some("Notes")).unwrap();
    doc.add_node(NodeTree::leaf(Node::document("existing"))).unwrap();
    let id = doc
        .add_filesystem_object(&file, &IndexPath::new(vec![0, 0]))
        .unwrap();
    assert_eq!(doc.path_of(&id), Some(IndexPath::new(vec![0, 0])));
    assert_eq!(doc.node(&id).unwrap().node_type, NodeType::Document);
    assert_eq!(doc.selection(), vec![id]);
    assert_eq!(child_titles(&doc, &doc.path_of(&folder).unwrap()), vec!["note.md", "existing"]);
}

#[test]
fn graft_rejects_unresolvable_destination() {
    let temp = TempDir::new().unwrap();
    let doc = memory_document();
    assert!(doc
        .add_filesystem_object(temp.path(), &IndexPath::new(vec![4, 0]))
        .is_err());
    assert!(doc.is_empty());
}

#[test]
fn unreadable_directory_grafts_empty() {
    let temp = TempDir::new().unwrap();
    let doc = memory_document();
    let gone = temp.path().join("gone");
    let folder = doc.add_folder(None).unwrap();
    let id = doc
        .insert(
            NodeTree::leaf(Node::container("gone").with_resource(gone)),
            &IndexPath::new(vec![0, 0]),
        )
        .unwrap();
    assert_eq!(doc.expand(&id).unwrap(), 0);
    assert!(doc.node(&id).unwrap().mirrored);
    assert!(doc.path_of(&folder).is_some());
}

#[test]
fn expansion_is_idempotent() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("inner")).unwrap();
    fs::write(temp.path().join("inner/x.txt"), "x").unwrap();
    fs::write(temp.path().join("y.txt"), "y").unwrap();

    let doc = memory_document();
    let id = doc
        .insert(
            NodeTree::leaf(Node::container("").with_resource(temp.path().to_path_buf())),
            &IndexPath::root(0),
        )
        .unwrap();
    assert_eq!(doc.expand(&id).unwrap(), 2);
    assert_eq!(doc.expand(&id).unwrap(), 0);
    assert_eq!(doc.len(), 4);
    assert_eq!(child_titles(&doc, &IndexPath::root(0)), vec!["y.txt", "inner"]);
}

#[tokio::test]
async fn async_graft_runs_off_the_lock() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("only.txt"), "x").unwrap();
    let doc = memory_document();
    let id = doc
        .clone()
        .add_filesystem_object_async(temp.path().to_path_buf(), IndexPath::root(0))
        .await
        .unwrap();
    assert_eq!(doc.node(&id).unwrap().node_type, NodeType::Container);
    assert_eq!(child_titles(&doc, &IndexPath::root(0)), vec!["only.txt"]);
}
