use outliner::{IndexPath, Node, NodeTree, TreeStore};
use proptest::prelude::*;

/// Build a store from (parent pick, is_container) steps; each step appends
/// under the picked directory, or at the root level when none exist yet
fn build(steps: &[(usize, bool)]) -> TreeStore {
    let mut store = TreeStore::new();
    for (i, &(pick, container)) in steps.iter().enumerate() {
        let node = if container {
            Node::container(format!("folder {}", i))
        } else {
            Node::document(format!("item {}", i))
        };
        let directories: Vec<IndexPath> = store
            .outline()
            .into_iter()
            .filter(|(_, n)| n.is_directory())
            .map(|(p, _)| p)
            .collect();
        // pick == directories.len() means "root level"
        let at = match directories.get(pick % (directories.len() + 1)) {
            Some(parent) => parent.appending(store.child_count(Some(parent)).unwrap()),
            None => IndexPath::root(store.root_count()),
        };
        store.insert(NodeTree::leaf(node), &at).unwrap();
    }
    store
}

fn steps() -> impl Strategy<Value = Vec<(usize, bool)>> {
    prop::collection::vec((0usize..16, any::<bool>()), 1..40)
}

proptest! {
    #[test]
    fn path_round_trip(steps in steps()) {
        let store = build(&steps);
        prop_assert_eq!(store.len(), steps.len());
        for (path, node) in store.outline() {
            let resolved = store.path_of(&node.id).unwrap();
            prop_assert_eq!(&resolved, &path);
            prop_assert_eq!(store.node_at(&resolved), Some(node));
        }
    }

    #[test]
    fn append_lands_last(steps in steps(), pick in 0usize..16) {
        let mut store = build(&steps);
        let directories: Vec<IndexPath> = store
            .outline()
            .into_iter()
            .filter(|(_, n)| n.is_directory())
            .map(|(p, _)| p)
            .collect();
        let parent = directories.get(pick % (directories.len() + 1)).cloned();
        let count = store.child_count(parent.as_ref()).unwrap();
        let at = match &parent {
            Some(p) => p.appending(count),
            None => IndexPath::root(count),
        };
        let node = Node::document("appended");
        let id = node.id.clone();
        store.insert(NodeTree::leaf(node), &at).unwrap();

        prop_assert_eq!(store.path_of(&id), Some(at));
        prop_assert_eq!(store.child_count(parent.as_ref()), Some(count + 1));
    }

    #[test]
    fn snapshot_rebuild_preserves_outline(steps in steps()) {
        let store = build(&steps);
        let rebuilt = TreeStore::from_forest(store.to_forest()).unwrap();
        prop_assert_eq!(rebuilt.to_forest(), store.to_forest());
    }
}

#[test]
fn insert_past_end_is_rejected() {
    let mut store = build(&[(0, true)]);
    let before = store.to_forest();
    let err = store
        .insert(NodeTree::leaf(Node::document("x")), &IndexPath::new(vec![0, 5]))
        .unwrap_err();
    assert!(matches!(err, outliner::TreeError::InvalidPath(_)));
    assert_eq!(store.to_forest(), before);
}
