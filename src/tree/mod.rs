//! Outline tree: node payloads, detached subtrees, and the arena store.

pub mod node;
pub mod store;

pub use node::{display_name, Forest, Node, NodeTree, NodeType, UNTITLED};
pub use store::TreeStore;
