//! CLI Tooling
//!
//! Command-line host for an outline document stored in a workspace. Every
//! mutating command saves the document before returning.

use crate::config::{ConfigLoader, OutlinerConfig};
use crate::document::Document;
use crate::error::{ApiError, TreeError};
use crate::graft::FsGrafter;
use crate::import::{decoder_for, decoder_for_path};
use crate::persistence::SledGateway;
use crate::removal::{AlwaysConfirm, Confirm, NodeSummary, RemovalCoordinator};
use crate::tooling::format::{
    format_outline_json, format_outline_table, format_outline_text, format_removal_outcome,
    format_removal_prompt,
};
use crate::tree::{Node, NodeTree, UNTITLED};
use crate::types::{IndexPath, NodeId};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Outliner CLI - folders and items in an ordered outline
#[derive(Parser)]
#[command(name = "outliner")]
#[command(about = "Edit an outline document of folders and items")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the outline
    Show {
        /// Output format (text, table or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Import a record file as a new top-level group
    Import {
        file: PathBuf,
        /// Decoder (json, yaml); defaults to the file extension
        #[arg(long)]
        format: Option<String>,
        /// Group title; defaults to the file name
        #[arg(long)]
        label: Option<String>,
    },
    /// Add an empty folder
    AddFolder {
        #[arg(long)]
        title: Option<String>,
        /// Parent folder id; the root level when omitted
        #[arg(long)]
        parent: Option<String>,
    },
    /// Add an item as the first child of a folder
    AddDocument {
        #[arg(long)]
        parent: String,
        #[arg(long, default_value = "")]
        title: String,
        /// Resource path; its file name becomes the title
        #[arg(long)]
        resource: Option<PathBuf>,
    },
    /// Mirror a file or directory into the outline
    Graft {
        path: PathBuf,
        /// Destination index path (e.g. 0.2); appended at the root level when omitted
        #[arg(long)]
        at: Option<IndexPath>,
    },
    /// Mirror the entries of a resource-backed folder
    Expand { id: String },
    /// Move a node
    Move {
        id: String,
        /// Destination index path, interpreted before the move
        #[arg(long, conflicts_with = "into")]
        to: Option<IndexPath>,
        /// Destination folder id
        #[arg(long)]
        into: Option<String>,
        /// Child index within the destination; appended when omitted
        #[arg(long)]
        index: Option<usize>,
    },
    /// Rename a node
    Rename { id: String, title: String },
    /// Remove nodes and everything below them
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Print the effective configuration
    Config,
}

/// Interactive terminal confirmation
pub struct TerminalConfirm;

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, targets: &[NodeSummary]) -> bool {
        let prompt = format_removal_prompt(targets);
        tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false)
        })
        .await
        .unwrap_or(false)
    }
}

/// CLI context for one workspace document
pub struct CliContext {
    document: Arc<Document>,
    config: OutlinerConfig,
    store_path: PathBuf,
}

impl CliContext {
    pub fn load_config(
        workspace_root: &Path,
        config_path: Option<&Path>,
    ) -> Result<OutlinerConfig, ApiError> {
        Ok(match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace_root)?,
        })
    }

    pub fn new(workspace_root: PathBuf, config: OutlinerConfig) -> Result<Self, ApiError> {
        let store_path = config.document.resolve_store_path(&workspace_root)?;
        let gateway = Arc::new(SledGateway::open(&store_path, config.document.undo_config())?);
        let document = Document::open(gateway)?
            .with_grafter(FsGrafter::new().with_hidden(config.graft.include_hidden));
        Ok(Self {
            document: Arc::new(document),
            config,
            store_path,
        })
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Show { format } => self.handle_show(format),
            Commands::Import {
                file,
                format,
                label,
            } => {
                let decoder = match format {
                    Some(f) => decoder_for(f)?,
                    None => decoder_for_path(file, &self.config.import.default_format)?,
                };
                let label = label.as_deref().or(self.config.import.root_label.as_deref());
                let root = self.document.import_file(file, decoder.as_ref(), label)?;
                self.save()?;
                let count = self
                    .document
                    .read(|s| s.store.handle_of(&root).and_then(|h| s.store.subtree(h)))
                    .map(|t| t.count())
                    .unwrap_or(0);
                Ok(format!("Imported {} node(s) as {}", count, root))
            }
            Commands::AddFolder { title, parent } => {
                let id = match parent {
                    Some(parent) => self
                        .document
                        .add_folder_at(&NodeId::from(parent.as_str()), title.as_deref())?,
                    None => {
                        let at = IndexPath::root(self.document.read(|s| s.store.root_count()));
                        let node = Node::container(title.as_deref().unwrap_or(UNTITLED));
                        self.document.insert(NodeTree::leaf(node), &at)?
                    }
                };
                self.save()?;
                Ok(self.describe("Added folder", &id))
            }
            Commands::AddDocument {
                parent,
                title,
                resource,
            } => {
                let resource = resource
                    .as_ref()
                    .map(|p| dunce::canonicalize(p).unwrap_or_else(|_| p.clone()));
                let id = self.document.add_document_at(
                    &NodeId::from(parent.as_str()),
                    title,
                    resource,
                )?;
                self.save()?;
                Ok(self.describe("Added item", &id))
            }
            Commands::Graft { path, at } => {
                let at = match at {
                    Some(at) => at.clone(),
                    None => IndexPath::root(self.document.read(|s| s.store.root_count())),
                };
                let id = Arc::clone(&self.document)
                    .add_filesystem_object_async(path.clone(), at)
                    .await?;
                self.save()?;
                Ok(self.describe("Grafted", &id))
            }
            Commands::Expand { id } => {
                let added = self.document.expand(&NodeId::from(id.as_str()))?;
                self.save()?;
                Ok(format!("Added {} entr{}", added, if added == 1 { "y" } else { "ies" }))
            }
            Commands::Move {
                id,
                to,
                into,
                index,
            } => {
                let id = NodeId::from(id.as_str());
                let path = match to {
                    Some(to) => self.document.move_node(&id, to)?,
                    None => {
                        let target = into.as_deref().map(NodeId::from);
                        self.document.move_by_drop(&id, target.as_ref(), *index)?
                    }
                };
                self.save()?;
                Ok(format!("Moved {} to {}", id, path))
            }
            Commands::Rename { id, title } => {
                let id = NodeId::from(id.as_str());
                self.document.rename(&id, title)?;
                self.save()?;
                Ok(self.describe("Renamed", &id))
            }
            Commands::Remove { ids, yes } => {
                let targets: Vec<NodeId> = ids.iter().map(|i| NodeId::from(i.as_str())).collect();
                let unknown: Vec<&NodeId> = targets
                    .iter()
                    .filter(|id| self.document.path_of(id).is_none())
                    .collect();
                if let Some(first) = unknown.first() {
                    return Err(TreeError::NodeNotFound((*first).clone()).into());
                }
                let coordinator = RemovalCoordinator::new(Arc::clone(&self.document));
                let outcome = if *yes {
                    coordinator.remove(Some(targets), &AlwaysConfirm).await?
                } else {
                    coordinator.remove(Some(targets), &TerminalConfirm).await?
                };
                self.save()?;
                Ok(format_removal_outcome(&outcome))
            }
            Commands::Config => self.config.to_toml(),
        }
    }

    fn handle_show(&self, format: &str) -> Result<String, ApiError> {
        let outline = self.document.outline();
        match format {
            "text" => Ok(format_outline_text(&outline)),
            "table" => Ok(format_outline_table(&outline)),
            "json" => format_outline_json(&outline)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render outline: {}", e))),
            other => Err(ApiError::ConfigError(format!(
                "Invalid format: {} (must be 'text', 'table' or 'json')",
                other
            ))),
        }
    }

    fn describe(&self, verb: &str, id: &NodeId) -> String {
        match (self.document.node(id), self.document.path_of(id)) {
            (Some(node), Some(path)) => format!("{} '{}' at {} ({})", verb, node.title, path, id),
            _ => format!("{} {}", verb, id),
        }
    }

    fn save(&self) -> Result<(), ApiError> {
        if self.document.save()? {
            info!(store = %self.store_path.display(), "Document saved");
        }
        Ok(())
    }
}
