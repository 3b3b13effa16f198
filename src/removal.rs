//! Removal Coordinator
//!
//! Confirm-then-mutate removal. Targets are snapshotted under the read lock,
//! confirmation runs with no lock held, and the targets are re-resolved by id
//! under the write lock. Anything another edit removed while confirmation was
//! pending is skipped and counted rather than failing the batch.

use crate::document::Document;
use crate::error::ApiError;
use crate::tree::{Node, TreeStore};
use crate::types::{IndexPath, NodeId};
use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalState {
    Idle,
    CollectingTargets,
    AwaitingConfirmation,
    Applying,
}

/// What the confirmation predicate sees of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub node: Node,
    pub path: IndexPath,
    /// Nodes removed along with this one
    pub descendants: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    NoTargets,
    Declined,
    Removed { removed: Vec<NodeId>, skipped: usize },
}

/// External asynchronous confirmation
///
/// Invoked once per removal request, with the targets as they were when the
/// request started. A call that never resolves leaves the coordinator waiting.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, targets: &[NodeSummary]) -> bool;
}

pub struct AlwaysConfirm;

#[async_trait]
impl Confirm for AlwaysConfirm {
    async fn confirm(&self, _targets: &[NodeSummary]) -> bool {
        true
    }
}

pub struct NeverConfirm;

#[async_trait]
impl Confirm for NeverConfirm {
    async fn confirm(&self, _targets: &[NodeSummary]) -> bool {
        false
    }
}

type ConfirmFn = dyn Fn(Vec<NodeSummary>) -> BoxFuture<'static, bool> + Send + Sync;

/// Closure-backed confirmation
pub struct FnConfirm(Box<ConfirmFn>);

impl FnConfirm {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<NodeSummary>) -> BoxFuture<'static, bool> + Send + Sync + 'static,
    {
        Self(Box::new(f))
    }
}

#[async_trait]
impl Confirm for FnConfirm {
    async fn confirm(&self, targets: &[NodeSummary]) -> bool {
        (self.0)(targets.to_vec()).await
    }
}

pub struct RemovalCoordinator {
    document: Arc<Document>,
    state: Mutex<RemovalState>,
}

impl RemovalCoordinator {
    pub fn new(document: Arc<Document>) -> Self {
        Self {
            document,
            state: Mutex::new(RemovalState::Idle),
        }
    }

    pub fn state(&self) -> RemovalState {
        *self.state.lock()
    }

    fn enter(&self, state: RemovalState) {
        *self.state.lock() = state;
        debug!(?state, "Removal state");
    }

    /// Remove `targets`, or the current selection when `None`, after `confirm` agrees
    pub async fn remove(
        &self,
        targets: Option<Vec<NodeId>>,
        confirm: &dyn Confirm,
    ) -> Result<RemovalOutcome, ApiError> {
        self.enter(RemovalState::CollectingTargets);
        let summaries = self.document.read(|state| {
            let ids = targets.unwrap_or_else(|| state.selection.selected().to_vec());
            summarize(&state.store, &ids)
        });
        if summaries.is_empty() {
            self.enter(RemovalState::Idle);
            return Ok(RemovalOutcome::NoTargets);
        }

        self.enter(RemovalState::AwaitingConfirmation);
        if !confirm.confirm(&summaries).await {
            self.enter(RemovalState::Idle);
            info!(targets = summaries.len(), "Removal declined");
            return Ok(RemovalOutcome::Declined);
        }

        self.enter(RemovalState::Applying);
        let ids: Vec<NodeId> = summaries.into_iter().map(|s| s.node.id).collect();
        let applied = self.document.apply_removal(&ids);
        self.enter(RemovalState::Idle);
        let applied = applied?;
        info!(
            removed = applied.removed.len(),
            skipped = applied.skipped,
            "Removal applied"
        );
        Ok(RemovalOutcome::Removed {
            removed: applied.removed,
            skipped: applied.skipped,
        })
    }
}

/// Resolvable targets in request order, duplicates dropped
fn summarize(store: &TreeStore, ids: &[NodeId]) -> Vec<NodeSummary> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert((*id).clone()))
        .filter_map(|id| {
            let handle = store.handle_of(id)?;
            let path = store.path_of_handle(handle)?;
            let node = store.get(handle)?.clone();
            let descendants = store.subtree(handle).map(|t| t.count() - 1).unwrap_or(0);
            Some(NodeSummary {
                node,
                path,
                descendants,
            })
        })
        .collect()
}
