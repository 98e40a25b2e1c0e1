use tracing::debug;

use super::transaction::Transaction;
use crate::graph::{Graph, GraphError};

/// Bounded undo/redo stacks of recorded transactions
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    /// Maximum number of undo steps, 0 disables recording
    max_size: usize,
}

impl CommandHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.evict();
    }

    /// Record a transaction that was just performed (clears redo stack)
    pub fn record(&mut self, txn: Transaction) {
        if self.max_size == 0 {
            return;
        }
        debug!(label = %txn.label(), "recording transaction");
        self.undo_stack.push(txn);
        self.redo_stack.clear();
        self.evict();
    }

    /// Drop the oldest entries beyond the configured bound
    fn evict(&mut self) {
        if self.undo_stack.len() > self.max_size {
            let excess = self.undo_stack.len() - self.max_size;
            self.undo_stack.drain(..excess);
        }
    }

    /// Undo the last transaction. Returns `Ok(false)` if there is nothing to undo.
    ///
    /// A transaction that fails to undo stays on the undo stack.
    pub fn undo(&mut self, graph: &mut Graph) -> Result<bool, GraphError> {
        let Some(mut txn) = self.undo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = txn.undo(graph) {
            self.undo_stack.push(txn);
            return Err(err);
        }
        self.redo_stack.push(txn);
        Ok(true)
    }

    /// Redo the last undone transaction. Returns `Ok(false)` if there is nothing to redo.
    pub fn redo(&mut self, graph: &mut Graph) -> Result<bool, GraphError> {
        let Some(mut txn) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = txn.redo(graph) {
            self.redo_stack.push(txn);
            return Err(err);
        }
        self.undo_stack.push(txn);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Peek at the next undo transaction without removing it
    pub fn peek_undo(&self) -> Option<&Transaction> {
        self.undo_stack.last()
    }

    /// Peek at the next redo transaction without removing it
    pub fn peek_redo(&self) -> Option<&Transaction> {
        self.redo_stack.last()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
