//! Error types for graph building, substitution and frame parsing

use thiserror::Error;

/// Errors raised while building or querying a task graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("plug not found: {0}")]
    PlugNotFound(String),

    #[error("duplicate {kind} name '{name}' under '{parent}'")]
    DuplicateName {
        kind: &'static str,
        name: String,
        parent: String,
    },

    /// Connecting `source` into `destination` would make the input chain loop
    #[error("connecting {source_path} -> {destination} would create an input cycle")]
    CyclicConnection {
        source_path: String,
        destination: String,
    },
}

/// Errors raised by the built-in substitution context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionError {
    #[error("undefined variable '{variable}' in '{text}'")]
    UndefinedVariable { variable: String, text: String },
}

/// Errors raised while parsing a frame list such as `1-10x2`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameListError {
    #[error("invalid frame list '{0}'")]
    Invalid(String),

    #[error("frame range '{0}' has a zero step")]
    ZeroStep(String),

    #[error("frame range '{clause}' expands to more than {limit} frames")]
    TooLarge { clause: String, limit: u64 },
}
