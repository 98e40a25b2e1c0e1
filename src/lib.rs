//! Undo/redo for node-graph pipeline editors
//!
//! Two complementary mechanisms operate on a [`graph::Graph`]:
//!
//! - [`journal`]: a bounded timeline of whole-graph snapshots with random-access navigation
//! - [`transaction`]: fine-grained reversible edits recorded in a [`transaction::CommandHistory`]

pub mod config;
pub mod graph;
pub mod journal;
pub mod transaction;
