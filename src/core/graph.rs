//! Task graph - arena of nested nodes and plugs wired by input connections

use super::error::GraphError;
use super::resolver::PlugGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Stable handle to a node in a [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Stable handle to a plug in a [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlugId(usize);

/// Data flow direction of a plug
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

/// Value held by a plug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlugValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PlugValue {
    /// Textual form of the value, `None` for an empty string
    pub fn as_text(&self) -> Option<String> {
        match self {
            PlugValue::String(s) if s.is_empty() => None,
            other => Some(other.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlugValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PlugValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlugValue::Bool(v) => write!(f, "{}", v),
            PlugValue::Int(v) => write!(f, "{}", v),
            PlugValue::Float(v) => write!(f, "{}", v),
            PlugValue::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for PlugValue {
    fn from(value: &str) -> Self {
        PlugValue::String(value.to_string())
    }
}

impl From<String> for PlugValue {
    fn from(value: String) -> Self {
        PlugValue::String(value)
    }
}

/// What a plug hangs off: a node, or a compound parent plug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlugOwner {
    Node(NodeId),
    Plug(PlugId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub project: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    node_type: String,
    parent: Option<NodeId>,
    plugs: Vec<PlugId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct PlugData {
    name: String,
    direction: Direction,
    owner: PlugOwner,
    node: NodeId,
    input: Option<PlugId>,
    value: Option<PlugValue>,
    children: Vec<PlugId>,
}

/// Task graph representation
///
/// Nodes and plugs live in flat arenas and refer to each other by index, so
/// handles stay valid for the lifetime of the graph. Nodes may contain child
/// nodes (subgraphs) and plugs may contain child plugs (compound plugs such as
/// `preTasks`).
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub metadata: Option<Metadata>,
    nodes: Vec<NodeData>,
    plugs: Vec<PlugData>,
    roots: Vec<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load graph from a YAML document
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        Ok(super::document::GraphDocument::from_file(path)?.build()?)
    }

    /// Add a node, either at the top level or inside `parent`
    pub fn add_node(&mut self, name: &str, parent: Option<NodeId>) -> Result<NodeId, GraphError> {
        let siblings = match parent {
            Some(p) => &self.nodes[p.0].children,
            None => &self.roots,
        };
        if siblings.iter().any(|&n| self.nodes[n.0].name == name) {
            return Err(GraphError::DuplicateName {
                kind: "node",
                name: name.to_string(),
                parent: parent.map(|p| self.node_path(p)).unwrap_or_default(),
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.to_string(),
            node_type: String::new(),
            parent,
            plugs: Vec::new(),
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    pub fn set_node_type(&mut self, node: NodeId, node_type: &str) {
        self.nodes[node.0].node_type = node_type.to_string();
    }

    /// Add a plug to a node or to a compound plug
    pub fn add_plug(
        &mut self,
        owner: PlugOwner,
        name: &str,
        direction: Direction,
    ) -> Result<PlugId, GraphError> {
        let (siblings, node) = match owner {
            PlugOwner::Node(n) => (&self.nodes[n.0].plugs, n),
            PlugOwner::Plug(p) => (&self.plugs[p.0].children, self.plugs[p.0].node),
        };
        if siblings.iter().any(|&p| self.plugs[p.0].name == name) {
            let parent = match owner {
                PlugOwner::Node(n) => self.node_path(n),
                PlugOwner::Plug(p) => self.plug_path(p),
            };
            return Err(GraphError::DuplicateName {
                kind: "plug",
                name: name.to_string(),
                parent,
            });
        }

        let id = PlugId(self.plugs.len());
        self.plugs.push(PlugData {
            name: name.to_string(),
            direction,
            owner,
            node,
            input: None,
            value: None,
            children: Vec::new(),
        });
        match owner {
            PlugOwner::Node(n) => self.nodes[n.0].plugs.push(id),
            PlugOwner::Plug(p) => self.plugs[p.0].children.push(id),
        }
        Ok(id)
    }

    pub fn set_value(&mut self, plug: PlugId, value: impl Into<PlugValue>) {
        self.plugs[plug.0].value = Some(value.into());
    }

    /// Feed `destination` from `source`
    ///
    /// Fails if the new input would make the input chain of `source` loop
    /// back to `destination`.
    pub fn connect(&mut self, source: PlugId, destination: PlugId) -> Result<(), GraphError> {
        let mut cursor = Some(source);
        while let Some(plug) = cursor {
            if plug == destination {
                return Err(GraphError::CyclicConnection {
                    source_path: self.plug_path(source),
                    destination: self.plug_path(destination),
                });
            }
            cursor = self.plugs[plug.0].input;
        }

        log::debug!(
            "Connecting {} -> {}",
            self.plug_path(source),
            self.plug_path(destination)
        );
        self.plugs[destination.0].input = Some(source);
        Ok(())
    }

    pub fn disconnect(&mut self, destination: PlugId) {
        self.plugs[destination.0].input = None;
    }

    /// Direct upstream plug, without following the chain
    pub fn input(&self, plug: PlugId) -> Option<PlugId> {
        self.plugs[plug.0].input
    }

    pub fn value(&self, plug: PlugId) -> Option<&PlugValue> {
        self.plugs[plug.0].value.as_ref()
    }

    pub fn node_name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    pub fn node_type(&self, node: NodeId) -> &str {
        &self.nodes[node.0].node_type
    }

    pub fn node_parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn node_children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Top-level nodes, in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn plug_owner(&self, plug: PlugId) -> PlugOwner {
        self.plugs[plug.0].owner
    }

    /// Dotted path from the top level, e.g. `box.boxWriter`
    pub fn node_path(&self, node: NodeId) -> String {
        let mut segments = vec![self.nodes[node.0].name.as_str()];
        let mut cursor = self.nodes[node.0].parent;
        while let Some(parent) = cursor {
            segments.push(&self.nodes[parent.0].name);
            cursor = self.nodes[parent.0].parent;
        }
        segments.reverse();
        segments.join(".")
    }

    /// Dotted path including the owning node, e.g. `n1.preTasks.preTask0`
    pub fn plug_path(&self, plug: PlugId) -> String {
        let mut segments = vec![self.plugs[plug.0].name.clone()];
        let mut owner = self.plugs[plug.0].owner;
        loop {
            match owner {
                PlugOwner::Plug(p) => {
                    segments.push(self.plugs[p.0].name.clone());
                    owner = self.plugs[p.0].owner;
                }
                PlugOwner::Node(n) => {
                    segments.push(self.node_path(n));
                    break;
                }
            }
        }
        segments.reverse();
        segments.join(".")
    }

    /// Find a node by dotted path
    pub fn find_node(&self, path: &str) -> Result<NodeId, GraphError> {
        let mut candidates = &self.roots;
        let mut found = None;
        for segment in path.split('.') {
            let node = candidates
                .iter()
                .copied()
                .find(|&n| self.nodes[n.0].name == segment)
                .ok_or_else(|| GraphError::NodeNotFound(path.to_string()))?;
            candidates = &self.nodes[node.0].children;
            found = Some(node);
        }
        found.ok_or_else(|| GraphError::NodeNotFound(path.to_string()))
    }

    /// Find a plug by dotted path such as `box.boxWriter.task`
    ///
    /// Leading segments name nodes, the rest name plugs. Node names are tried
    /// first; if the remainder does not resolve, the segment is retried as a
    /// plug name.
    pub fn find_plug(&self, path: &str) -> Result<PlugId, GraphError> {
        let segments: Vec<&str> = path.split('.').collect();
        self.roots
            .iter()
            .filter(|&&n| self.nodes[n.0].name == segments[0])
            .find_map(|&n| self.resolve_from_node(n, &segments[1..]))
            .ok_or_else(|| GraphError::PlugNotFound(path.to_string()))
    }

    fn resolve_from_node(&self, node: NodeId, rest: &[&str]) -> Option<PlugId> {
        let (head, tail) = rest.split_first()?;
        let via_child = self.nodes[node.0]
            .children
            .iter()
            .find(|&&c| self.nodes[c.0].name == *head)
            .and_then(|&c| self.resolve_from_node(c, tail));
        if via_child.is_some() {
            return via_child;
        }

        let mut plug = self.nodes[node.0]
            .plugs
            .iter()
            .copied()
            .find(|&p| self.plugs[p.0].name == *head)?;
        for segment in tail {
            plug = self.plugs[plug.0]
                .children
                .iter()
                .copied()
                .find(|&p| self.plugs[p.0].name == *segment)?;
        }
        Some(plug)
    }

    /// Direct plug of `node` named `name`
    pub fn node_plug(&self, node: NodeId, name: &str) -> Option<PlugId> {
        self.nodes[node.0]
            .plugs
            .iter()
            .copied()
            .find(|&p| self.plugs[p.0].name == name)
    }
}

impl PlugGraph for Graph {
    fn node_plugs(&self, node: NodeId) -> &[PlugId] {
        &self.nodes[node.0].plugs
    }

    fn plug_children(&self, plug: PlugId) -> &[PlugId] {
        &self.plugs[plug.0].children
    }

    fn direction(&self, plug: PlugId) -> Direction {
        self.plugs[plug.0].direction
    }

    /// Follow inputs to the start of the chain
    fn source(&self, plug: PlugId) -> Option<PlugId> {
        let mut current = self.plugs[plug.0].input?;
        // connect() keeps chains acyclic, so this terminates
        while let Some(upstream) = self.plugs[current.0].input {
            current = upstream;
        }
        Some(current)
    }

    fn plug_node(&self, plug: PlugId) -> NodeId {
        self.plugs[plug.0].node
    }

    fn plug_name(&self, plug: PlugId) -> &str {
        &self.plugs[plug.0].name
    }

    fn plug_value(&self, plug: PlugId) -> Option<&PlugValue> {
        self.plugs[plug.0].value.as_ref()
    }
}
