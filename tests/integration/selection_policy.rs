use super::memory_document;
use outliner::{IndexPath, Node, NodeTree};

#[test]
fn consecutive_leaves_become_siblings() {
    let doc = memory_document();
    let folder = doc.add_folder(Some("Downloads")).unwrap();
    let first = doc.add_node(NodeTree::leaf(Node::document("one"))).unwrap();
    let second = doc.add_node(NodeTree::leaf(Node::document("two"))).unwrap();

    let p1 = doc.path_of(&first).unwrap();
    let p2 = doc.path_of(&second).unwrap();
    assert_eq!(p1.parent(), p2.parent());
    assert_eq!(p1.parent(), doc.path_of(&folder));
    assert_eq!(p2.last(), Some(p1.last().unwrap() + 1));
}

#[test]
fn empty_selection_appends_at_root() {
    let doc = memory_document();
    doc.add_folder(None).unwrap();
    doc.clear_selection();
    let second = doc.add_folder(None).unwrap();
    assert_eq!(doc.path_of(&second), Some(IndexPath::root(1)));
}

#[test]
fn selected_leaf_inserts_next_sibling() {
    let doc = memory_document();
    let folder = doc.add_folder(None).unwrap();
    let leaf = doc.add_node(NodeTree::leaf(Node::document("a"))).unwrap();
    doc.add_node(NodeTree::leaf(Node::document("b"))).unwrap();
    doc.select(vec![leaf.clone()]);
    let inserted = doc.add_node(NodeTree::leaf(Node::document("between"))).unwrap();
    assert_eq!(doc.path_of(&inserted), Some(IndexPath::new(vec![0, 1])));
    assert_eq!(doc.selection(), vec![folder]);
}

#[test]
fn stale_selection_falls_back_to_root_append() {
    let doc = memory_document();
    let folder = doc.add_folder(None).unwrap();
    doc.select(vec!["gone".into()]);
    let added = doc.add_folder(None).unwrap();
    assert_eq!(doc.path_of(&added), Some(IndexPath::root(1)));
    assert_eq!(doc.path_of(&folder), Some(IndexPath::root(0)));
}
