//! The result envelope threaded through every workflow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The stage at which a workflow failed.
///
/// Rendered verbatim (`"Persistance"` keeps its historical spelling) so the
/// tag stays stable in logs and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Batch or aggregate-level failure.
    Many,
    /// Fetch, save or snapshot collaborator failure.
    Persistance,
    /// Business-rule rejection from a command handler.
    Command,
    /// Projection read failure.
    Projection,
    /// Publishing collaborator failure.
    Publishing,
}

impl Stage {
    /// Returns the stage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Many => "Many",
            Stage::Persistance => "Persistance",
            Stage::Command => "Command",
            Stage::Projection => "Projection",
            Stage::Publishing => "Publishing",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workflow failure: the stage it happened at plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Many: {0}")]
    Many(String),

    #[error("Persistance: {0}")]
    Persistance(String),

    #[error("Command: {0}")]
    Command(String),

    #[error("Projection: {0}")]
    Projection(String),

    #[error("Publishing: {0}")]
    Publishing(String),
}

impl WorkflowError {
    /// Builds a failure for the given stage.
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        let message = message.into();
        match stage {
            Stage::Many => WorkflowError::Many(message),
            Stage::Persistance => WorkflowError::Persistance(message),
            Stage::Command => WorkflowError::Command(message),
            Stage::Projection => WorkflowError::Projection(message),
            Stage::Publishing => WorkflowError::Publishing(message),
        }
    }

    /// The stage this failure is tagged with.
    pub fn stage(&self) -> Stage {
        match self {
            WorkflowError::Many(_) => Stage::Many,
            WorkflowError::Persistance(_) => Stage::Persistance,
            WorkflowError::Command(_) => Stage::Command,
            WorkflowError::Projection(_) => Stage::Projection,
            WorkflowError::Publishing(_) => Stage::Publishing,
        }
    }

    /// The human-readable message, without the stage prefix.
    pub fn message(&self) -> &str {
        match self {
            WorkflowError::Many(m)
            | WorkflowError::Persistance(m)
            | WorkflowError::Command(m)
            | WorkflowError::Projection(m)
            | WorkflowError::Publishing(m) => m,
        }
    }
}

/// Result type returned by every public workflow operation.
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;
