//! Error types for plumline operations.
//!
//! This module provides the main error type [`PlumlineError`]. Layout itself
//! follows a soft-failure policy: missing view-states, kinds, or target
//! participants are logged and skipped, never raised. The only fatal layout
//! condition is a cyclic call graph, which would otherwise recurse without
//! bound.

use thiserror::Error;

/// The main error type for plumline operations.
#[derive(Debug, Error)]
pub enum PlumlineError {
    /// A call chain re-entered a participant already on the current traversal
    /// path. `path` renders the offending chain, e.g. `fn1 -> fn2 -> fn1`.
    #[error("cyclic call graph: {path}")]
    CyclicCallGraph { path: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
