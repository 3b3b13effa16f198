mod cli_parse;
mod concurrent_writers;
mod graft_flow;
mod import_flow;
mod persistence_flow;
mod removal_flow;
mod selection_policy;
mod tree_properties;

use outliner::persistence::MemoryGateway;
use outliner::Document;
use std::sync::Arc;

pub(crate) fn memory_document() -> Arc<Document> {
    Arc::new(Document::new(Arc::new(MemoryGateway::new())))
}
