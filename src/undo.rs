//! Snapshot undo/redo
//!
//! Every document mutation records the forest as it was before the change. Undo
//! swaps the current forest for the most recent recorded one and keeps the
//! current one for redo. Recording a new edit starts a new branch and drops the
//! redo history.

use crate::tree::Forest;
use std::collections::VecDeque;

/// Undo configuration
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of retained undo steps; oldest are evicted first
    pub max_depth: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

#[derive(Debug, Clone)]
struct Step {
    label: String,
    forest: Forest,
}

#[derive(Debug, Default)]
pub struct UndoManager {
    undo_stack: VecDeque<Step>,
    redo_stack: Vec<Step>,
    config: UndoConfig,
}

impl UndoManager {
    pub fn new(config: UndoConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            config,
        }
    }

    /// Record the state preceding an edit named `label`
    pub fn record(&mut self, label: impl Into<String>, before: Forest) {
        if self.config.max_depth == 0 {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push_back(Step {
            label: label.into(),
            forest: before,
        });
        while self.undo_stack.len() > self.config.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Step back: returns the label and the forest to restore
    pub fn undo(&mut self, current: Forest) -> Option<(String, Forest)> {
        let step = self.undo_stack.pop_back()?;
        self.redo_stack.push(Step {
            label: step.label.clone(),
            forest: current,
        });
        Some((step.label, step.forest))
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: Forest) -> Option<(String, Forest)> {
        let step = self.redo_stack.pop()?;
        self.undo_stack.push_back(Step {
            label: step.label.clone(),
            forest: current,
        });
        Some((step.label, step.forest))
    }

    /// Forest the next undo would restore, without taking it
    pub fn peek_undo(&self) -> Option<&Forest> {
        self.undo_stack.back().map(|s| &s.forest)
    }

    /// Forest the next redo would restore, without taking it
    pub fn peek_redo(&self) -> Option<&Forest> {
        self.redo_stack.last().map(|s| &s.forest)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|s| s.label.as_str())
    }

    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|s| s.label.as_str())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
