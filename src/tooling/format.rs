//! Format outlines, removal results and summaries as text.

use crate::removal::{NodeSummary, RemovalOutcome};
use crate::tree::{Node, NodeType};
use crate::types::IndexPath;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn type_label(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Container => "folder",
        NodeType::Document => "item",
        NodeType::Separator => "separator",
        NodeType::Root => "group",
        NodeType::Unknown => "unknown",
    }
}

/// Indented outline, directories emphasized
pub fn format_outline_text(outline: &[(IndexPath, Node)]) -> String {
    if outline.is_empty() {
        return "Document is empty".to_string();
    }
    let mut out = String::new();
    for (path, node) in outline {
        let indent = "  ".repeat(path.len().saturating_sub(1));
        let title = if node.title.is_empty() {
            crate::tree::UNTITLED
        } else {
            node.title.as_str()
        };
        let title = if node.is_directory() {
            format!("{}", title.bold())
        } else {
            title.to_string()
        };
        out.push_str(&format!("{}{} {}  {}\n", indent, path.dimmed(), title, node.id.dimmed()));
    }
    out
}

pub fn format_outline_table(outline: &[(IndexPath, Node)]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Type", "Title", "Resource", "Id"]);
    for (path, node) in outline {
        let resource = node
            .resource_ref
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            path.to_string(),
            type_label(node.node_type).to_string(),
            node.title.clone(),
            resource,
            node.id.to_string(),
        ]);
    }
    table.to_string()
}

#[derive(Serialize)]
struct OutlineRow<'a> {
    path: &'a IndexPath,
    #[serde(flatten)]
    node: &'a Node,
}

pub fn format_outline_json(outline: &[(IndexPath, Node)]) -> Result<String, serde_json::Error> {
    let rows: Vec<OutlineRow<'_>> = outline
        .iter()
        .map(|(path, node)| OutlineRow { path, node })
        .collect();
    serde_json::to_string_pretty(&rows)
}

/// Confirmation prompt text for a removal
pub fn format_removal_prompt(targets: &[NodeSummary]) -> String {
    let nodes: usize = targets.iter().map(|t| t.descendants + 1).sum();
    match targets {
        [only] if only.node.is_resource_backed() => format!(
            "Remove the link to '{}'? The file itself is left in place.",
            only.node.title
        ),
        [only] => format!("Remove '{}' ({} node(s))?", only.node.title, nodes),
        _ => format!("Remove {} items ({} node(s))?", targets.len(), nodes),
    }
}

pub fn format_removal_outcome(outcome: &RemovalOutcome) -> String {
    match outcome {
        RemovalOutcome::NoTargets => "Nothing to remove".to_string(),
        RemovalOutcome::Declined => "Removal cancelled".to_string(),
        RemovalOutcome::Removed { removed, skipped } => {
            let mut out = format!("Removed {} item(s)", removed.len());
            if *skipped > 0 {
                out.push_str(&format!(", {} already gone", skipped));
            }
            out
        }
    }
}
