//! Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Invoice mutations. Used by the action handlers for their user-facing
/// messages and by the in-memory store to record issued statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        }
    }
}
