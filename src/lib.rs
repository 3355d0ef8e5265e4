//! taskdeps - upstream dependency resolver for task graphs
//!
//! Walks a task graph upstream from a task plug and lists the source files
//! declared by everything the task depends on, optionally resolving `${var}`
//! and `####` tokens per frame or per variable binding.

pub mod app;
pub mod config;
pub mod core;
pub mod report;

// Re-exports
pub use crate::app::{App, Query};
pub use crate::config::{Settings, SettingsLayer};
pub use crate::core::{
    upstream_nodes, Context, FrameList, Graph, GraphDocument, PlugGraph, SubstitutionContext,
    TaskAlgo,
};
pub use crate::report::{OutputFormat, Report};

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
