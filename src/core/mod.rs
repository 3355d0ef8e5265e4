//! Core engine - graph model, document loading, substitution and dependency resolution

mod context;
mod document;
mod error;
mod frames;
mod graph;
mod resolver;

pub use context::{Context, SubstitutionContext};
pub use document::{GraphDocument, NodeSpec, PlugEntry, PlugSpec};
pub use error::{FrameListError, GraphError, SubstitutionError};
pub use frames::{FrameList, MAX_RANGE_FRAMES};
pub use graph::{Direction, Graph, Metadata, NodeId, PlugId, PlugOwner, PlugValue};
pub use resolver::{upstream_nodes, PlugGraph, TaskAlgo, DEFAULT_FILE_PLUG_NAMES};
