use super::memory_document;
use futures::FutureExt;
use outliner::removal::{AlwaysConfirm, FnConfirm, NeverConfirm};
use outliner::{IndexPath, Node, NodeTree, RemovalCoordinator, RemovalOutcome, RemovalState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn nested() -> NodeTree {
    NodeTree::with_children(
        Node::container("dir"),
        vec![
            NodeTree::leaf(Node::document("child")),
            NodeTree::with_children(
                Node::container("sub"),
                vec![NodeTree::leaf(Node::document("deep"))],
            ),
        ],
    )
}

#[tokio::test]
async fn directory_and_descendant_in_one_batch() {
    let doc = memory_document();
    let dir = doc.insert(nested(), &IndexPath::root(0)).unwrap();
    let keep = doc
        .insert(NodeTree::leaf(Node::document("keep")), &IndexPath::root(1))
        .unwrap();
    let deep = doc.node_at(&IndexPath::new(vec![0, 1, 0])).unwrap().id;

    let outcome = RemovalCoordinator::new(doc.clone())
        .remove(Some(vec![deep, dir.clone()]), &AlwaysConfirm)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RemovalOutcome::Removed {
            removed: vec![dir],
            skipped: 0
        }
    );
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.path_of(&keep), Some(IndexPath::root(0)));
}

#[tokio::test]
async fn target_deleted_during_confirmation_is_skipped() {
    let doc = memory_document();
    let a = doc
        .insert(NodeTree::leaf(Node::document("a")), &IndexPath::root(0))
        .unwrap();
    let b = doc
        .insert(NodeTree::leaf(Node::document("b")), &IndexPath::root(1))
        .unwrap();

    // a second coordinator deletes `a` while the first is awaiting confirmation
    let racing = doc.clone();
    let victim = a.clone();
    let confirm = FnConfirm::new(move |_| {
        let racing = racing.clone();
        let victim = victim.clone();
        async move {
            let inner = RemovalCoordinator::new(racing);
            inner
                .remove(Some(vec![victim]), &AlwaysConfirm)
                .await
                .is_ok()
        }
        .boxed()
    });

    let outcome = RemovalCoordinator::new(doc.clone())
        .remove(Some(vec![a, b.clone()]), &confirm)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        RemovalOutcome::Removed {
            removed: vec![b],
            skipped: 1
        }
    );
    assert!(doc.is_empty());
}

#[tokio::test]
async fn confirmation_runs_once_and_state_returns_idle() {
    let doc = memory_document();
    let id = doc.insert(nested(), &IndexPath::root(0)).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let coordinator = Arc::new(RemovalCoordinator::new(doc.clone()));
    let observer = coordinator.clone();
    let confirm = FnConfirm::new(move |targets| {
        seen.fetch_add(1, Ordering::SeqCst);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].descendants, 3);
        assert_eq!(observer.state(), RemovalState::AwaitingConfirmation);
        async { true }.boxed()
    });
    coordinator.remove(Some(vec![id]), &confirm).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.state(), RemovalState::Idle);
    assert!(doc.is_empty());
}

#[tokio::test]
async fn declined_removal_changes_nothing() {
    let doc = memory_document();
    let id = doc.insert(nested(), &IndexPath::root(0)).unwrap();
    doc.select(vec![id]);
    let before = doc.snapshot();
    let outcome = RemovalCoordinator::new(doc.clone())
        .remove(None, &NeverConfirm)
        .await
        .unwrap();
    assert_eq!(outcome, RemovalOutcome::Declined);
    assert_eq!(doc.snapshot(), before);
    assert!(!doc.selection().is_empty());
}

#[tokio::test]
async fn removal_is_undoable() {
    let doc = memory_document();
    let id = doc.insert(nested(), &IndexPath::root(0)).unwrap();
    let before = doc.snapshot();
    RemovalCoordinator::new(doc.clone())
        .remove(Some(vec![id]), &AlwaysConfirm)
        .await
        .unwrap();
    assert!(doc.undo().unwrap());
    assert_eq!(doc.snapshot(), before);
}
