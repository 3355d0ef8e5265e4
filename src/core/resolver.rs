//! Upstream dependency resolution - which source files does a task depend on

use super::context::SubstitutionContext;
use super::graph::{Direction, NodeId, PlugId, PlugValue};
use std::collections::{BTreeSet, HashSet};

/// Plug names that hold a declared output file path by default
pub const DEFAULT_FILE_PLUG_NAMES: &[&str] = &["fileName"];

/// Read-only view of a host graph, as needed by the resolver
///
/// Implemented by [`Graph`](super::Graph); a host application can implement
/// it over its own node representation.
pub trait PlugGraph {
    /// Top-level plugs of a node
    fn node_plugs(&self, node: NodeId) -> &[PlugId];

    /// Child plugs of a compound plug
    fn plug_children(&self, plug: PlugId) -> &[PlugId];

    fn direction(&self, plug: PlugId) -> Direction;

    /// Plug at the far end of the input chain, `None` if unconnected
    fn source(&self, plug: PlugId) -> Option<PlugId>;

    /// Node the plug belongs to
    fn plug_node(&self, plug: PlugId) -> NodeId;

    fn plug_name(&self, plug: PlugId) -> &str;

    fn plug_value(&self, plug: PlugId) -> Option<&PlugValue>;
}

#[derive(Debug, Clone, Copy)]
enum Parent {
    Node(NodeId),
    Plug(PlugId),
}

/// All nodes `entry` transitively depends on, excluding `entry` itself
///
/// Every plug of every visited node is walked, child plugs included. An input
/// plug with a source pulls in the source's node; each node is recorded and
/// walked at most once, which also stops the walk on cyclic task graphs.
pub fn upstream_nodes<G: PlugGraph + ?Sized>(graph: &G, entry: NodeId) -> HashSet<NodeId> {
    let mut upstream = HashSet::new();
    let mut stack = vec![Parent::Node(entry)];

    while let Some(parent) = stack.pop() {
        let plugs = match parent {
            Parent::Node(node) => graph.node_plugs(node),
            Parent::Plug(plug) => graph.plug_children(plug),
        };

        for &plug in plugs {
            if graph.direction(plug) == Direction::In {
                if let Some(source) = graph.source(plug) {
                    let node = graph.plug_node(source);
                    if node != entry && upstream.insert(node) {
                        log::debug!("Upstream node {:?} via plug {:?}", node, plug);
                        stack.push(Parent::Node(node));
                    }
                }
            }
            stack.push(Parent::Plug(plug));
        }
    }

    upstream
}

/// Collects source files declared upstream of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAlgo {
    file_plug_names: BTreeSet<String>,
}

impl Default for TaskAlgo {
    fn default() -> Self {
        Self::with_file_plug_names(DEFAULT_FILE_PLUG_NAMES.iter().copied())
    }
}

impl TaskAlgo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom set of file-bearing plug names
    pub fn with_file_plug_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file_plug_names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn file_plug_names(&self) -> &BTreeSet<String> {
        &self.file_plug_names
    }

    /// Raw file names declared by every node upstream of `task_plug`'s node
    ///
    /// The queried node's own file names are not dependencies and are never
    /// included. Unset and empty values are skipped.
    pub fn source_filenames<G: PlugGraph + ?Sized>(
        &self,
        graph: &G,
        task_plug: PlugId,
    ) -> BTreeSet<String> {
        let mut filenames = BTreeSet::new();

        for node in upstream_nodes(graph, graph.plug_node(task_plug)) {
            for &plug in graph.node_plugs(node) {
                if !self.file_plug_names.contains(graph.plug_name(plug)) {
                    continue;
                }
                if let Some(name) = graph.plug_value(plug).and_then(PlugValue::as_text) {
                    log::trace!("Source file {:?} from plug {:?}", name, plug);
                    filenames.insert(name);
                }
            }
        }

        filenames
    }

    /// Like [`source_filenames`](Self::source_filenames), with each name run
    /// through `context`
    ///
    /// Names that substitute to the same string collapse into one entry.
    /// Substitution errors are returned unchanged.
    pub fn substituted_source_filenames<G, C>(
        &self,
        graph: &G,
        task_plug: PlugId,
        context: &C,
    ) -> Result<BTreeSet<String>, C::Error>
    where
        G: PlugGraph + ?Sized,
        C: SubstitutionContext + ?Sized,
    {
        self.source_filenames(graph, task_plug)
            .iter()
            .map(|name| context.substitute(name))
            .collect()
    }

    /// Union of [`substituted_source_filenames`](Self::substituted_source_filenames)
    /// over several contexts, e.g. one per frame or per wedge value
    pub fn substituted_source_filenames_over<G, C, I>(
        &self,
        graph: &G,
        task_plug: PlugId,
        contexts: I,
    ) -> Result<BTreeSet<String>, C::Error>
    where
        G: PlugGraph + ?Sized,
        C: SubstitutionContext,
        I: IntoIterator<Item = C>,
    {
        let raw = self.source_filenames(graph, task_plug);
        let mut filenames = BTreeSet::new();
        for context in contexts {
            for name in &raw {
                filenames.insert(context.substitute(name)?);
            }
        }
        Ok(filenames)
    }
}
