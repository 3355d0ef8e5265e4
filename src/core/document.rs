//! Graph documents - the YAML form of a task graph
//!
//! ```yaml
//! metadata: { project: demo }
//! settings: { file_plug_names: [fileName] }
//! variables: { shot: sh010 }
//! nodes:
//!   n1:
//!     type: TextWriter
//!     plugs:
//!       fileName: output.txt
//!       task: { direction: out }
//!       preTasks:
//!         children:
//!           preTask0: { input: n2.task }
//! ```
//!
//! A scalar plug entry is shorthand for an input plug holding that value.

use super::error::GraphError;
use super::graph::{Direction, Graph, Metadata, NodeId, PlugId, PlugOwner, PlugValue};
use crate::config::SettingsLayer;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub settings: SettingsLayer,
    /// Default substitution variables
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub plugs: BTreeMap<String, PlugEntry>,
    /// Nested nodes, for boxes and other subgraphs
    #[serde(default)]
    pub children: BTreeMap<String, NodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlugEntry {
    Value(PlugValue),
    Spec(PlugSpec),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlugSpec {
    #[serde(default)]
    pub direction: Direction,
    pub value: Option<PlugValue>,
    /// Dotted path of the plug feeding this one
    pub input: Option<String>,
    #[serde(default)]
    pub children: BTreeMap<String, PlugEntry>,
}

impl GraphDocument {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid graph {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let document: GraphDocument = serde_yaml::from_str(content)?;
        Ok(document)
    }

    /// Create every node and plug, then wire inputs
    pub fn build(&self) -> Result<Graph, GraphError> {
        let mut graph = Graph::new();
        graph.metadata = self.metadata.clone();

        let mut pending = Vec::new();
        for (name, spec) in &self.nodes {
            add_node(&mut graph, name, spec, None, &mut pending)?;
        }

        for (input, destination) in pending {
            let source = graph.find_plug(&input)?;
            graph.connect(source, destination)?;
        }

        log::info!("Built graph with {} nodes", graph.node_count());
        Ok(graph)
    }
}

fn add_node(
    graph: &mut Graph,
    name: &str,
    spec: &NodeSpec,
    parent: Option<NodeId>,
    pending: &mut Vec<(String, PlugId)>,
) -> Result<(), GraphError> {
    let node = graph.add_node(name, parent)?;
    graph.set_node_type(node, &spec.node_type);

    for (plug_name, entry) in &spec.plugs {
        add_plug(graph, PlugOwner::Node(node), plug_name, entry, pending)?;
    }
    for (child_name, child) in &spec.children {
        add_node(graph, child_name, child, Some(node), pending)?;
    }
    Ok(())
}

fn add_plug(
    graph: &mut Graph,
    owner: PlugOwner,
    name: &str,
    entry: &PlugEntry,
    pending: &mut Vec<(String, PlugId)>,
) -> Result<(), GraphError> {
    match entry {
        PlugEntry::Value(value) => {
            let plug = graph.add_plug(owner, name, Direction::In)?;
            graph.set_value(plug, value.clone());
        }
        PlugEntry::Spec(spec) => {
            let plug = graph.add_plug(owner, name, spec.direction)?;
            if let Some(value) = &spec.value {
                graph.set_value(plug, value.clone());
            }
            if let Some(input) = &spec.input {
                pending.push((input.clone(), plug));
            }
            for (child_name, child) in &spec.children {
                add_plug(graph, PlugOwner::Plug(plug), child_name, child, pending)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlugGraph;

    const CHAIN: &str = r#"
metadata:
  project: chain
settings:
  strict_substitution: true
variables:
  shot: sh010
nodes:
  n1:
    type: TextWriter
    plugs:
      fileName: output.txt
      task: { direction: out }
      preTasks:
        children:
          preTask0: { input: n2.task }
  n2:
    type: TextWriter
    plugs:
      fileName: { value: "${shot}_source.txt" }
      task: { direction: out }
      mode: 3
"#;

    #[test]
    fn test_parse_and_build() {
        let doc = GraphDocument::parse(CHAIN).unwrap();
        assert_eq!(doc.metadata.as_ref().unwrap().project, "chain");
        assert_eq!(doc.settings.strict_substitution, Some(true));
        assert_eq!(doc.variables["shot"], "sh010");

        let graph = doc.build().unwrap();
        let pre = graph.find_plug("n1.preTasks.preTask0").unwrap();
        let n2_task = graph.find_plug("n2.task").unwrap();
        assert_eq!(graph.source(pre), Some(n2_task));
        assert_eq!(graph.direction(n2_task), Direction::Out);

        let n2 = graph.find_node("n2").unwrap();
        assert_eq!(graph.node_type(n2), "TextWriter");
        let mode = graph.node_plug(n2, "mode").unwrap();
        assert_eq!(graph.value(mode), Some(&PlugValue::Int(3)));
        let file = graph.node_plug(n2, "fileName").unwrap();
        assert_eq!(
            graph.value(file).and_then(PlugValue::as_str),
            Some("${shot}_source.txt")
        );
    }

    #[test]
    fn test_unknown_input_is_reported() {
        let doc = GraphDocument::parse(
            r#"
nodes:
  n1:
    plugs:
      in: { input: ghost.task }
"#,
        )
        .unwrap();
        assert_eq!(
            doc.build().unwrap_err(),
            GraphError::PlugNotFound("ghost.task".to_string())
        );
    }

    #[test]
    fn test_nested_nodes() {
        let doc = GraphDocument::parse(
            r#"
nodes:
  box:
    plugs:
      task: { direction: out, input: box.inner.task }
    children:
      inner:
        plugs:
          task: { direction: out }
"#,
        )
        .unwrap();
        let graph = doc.build().unwrap();
        let inner = graph.find_node("box.inner").unwrap();
        let box_node = graph.find_node("box").unwrap();
        assert_eq!(graph.node_parent(inner), Some(box_node));
        assert_eq!(graph.node_children(box_node), &[inner]);
    }
}
