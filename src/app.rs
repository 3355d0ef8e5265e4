//! Application - runs dependency queries against a loaded graph

use crate::config::{Settings, SettingsLayer};
use crate::core::{upstream_nodes, Context, FrameList, Graph, GraphDocument, PlugGraph, TaskAlgo};
use crate::report::Report;
use anyhow::{Context as _, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::Path;

/// One dependency query
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Dotted path of the task plug, e.g. `n1.task`
    pub task: String,
    /// Frame list; falls back to the `frames` setting
    pub frames: Option<String>,
    /// Variable bindings layered over the document's `variables:`
    pub variables: Vec<(String, String)>,
    /// Skip substitution and report declared names as-is
    pub raw: bool,
    pub list_nodes: bool,
    /// Report source files that do not exist on disk
    pub check: bool,
}

/// Application state
pub struct App {
    pub graph: Graph,
    pub settings: Settings,
    pub variables: BTreeMap<String, String>,
}

impl App {
    /// Load a graph document and resolve settings
    ///
    /// Layers apply in order: the `global` config file, the document's
    /// `settings:` block, then `overrides`.
    pub fn load(path: &Path, overrides: &SettingsLayer, global: Option<&Path>) -> Result<Self> {
        log::info!("Loading graph from: {}", path.display());
        let document = GraphDocument::from_file(path)?;
        Self::from_document(&document, overrides, global)
    }

    pub fn from_document(
        document: &GraphDocument,
        overrides: &SettingsLayer,
        global: Option<&Path>,
    ) -> Result<Self> {
        let settings = Settings::resolve(global, &[&document.settings, overrides])?;
        let graph = document.build()?;
        Ok(Self::new(graph, settings, document.variables.clone()))
    }

    pub fn new(graph: Graph, settings: Settings, variables: BTreeMap<String, String>) -> Self {
        Self {
            graph,
            settings,
            variables,
        }
    }

    fn base_context(&self, query: &Query) -> Context {
        let mut context = Context::new().strict(self.settings.strict_substitution);
        for (name, value) in &self.variables {
            context.set(name, value);
        }
        for (name, value) in &query.variables {
            context.set(name, value);
        }
        context
    }

    /// Resolve the source files for `query`
    pub fn run(&self, query: &Query) -> Result<Report> {
        let task = self
            .graph
            .find_plug(&query.task)
            .with_context(|| format!("Unknown task plug '{}'", query.task))?;
        if query.raw && query.check {
            anyhow::bail!("Raw file names cannot be checked on disk; drop --raw to check");
        }
        let algo = TaskAlgo::with_file_plug_names(self.settings.file_plug_names.iter().cloned());

        // Raw names are frame independent
        let frames = match query.frames.as_ref().or(self.settings.frames.as_ref()) {
            Some(text) if !query.raw => Some(FrameList::parse(text)?.as_list()),
            _ => None,
        };

        let source_files = if query.raw {
            algo.source_filenames(&self.graph, task)
        } else {
            let base = self.base_context(query);
            match &frames {
                Some(frames) => {
                    let contexts = frames
                        .iter()
                        .map(|&frame| base.clone().with_frame(frame as f64));
                    algo.substituted_source_filenames_over(&self.graph, task, contexts)?
                }
                None => algo.substituted_source_filenames(&self.graph, task, &base)?,
            }
        };
        log::info!(
            "Resolved {} source files upstream of {}",
            source_files.len(),
            query.task
        );

        let upstream = query.list_nodes.then(|| {
            let entry = self.graph.plug_node(task);
            let mut paths: Vec<String> = upstream_nodes(&self.graph, entry)
                .into_iter()
                .map(|node| self.graph.node_path(node))
                .collect();
            paths.sort();
            paths
        });

        let missing = query.check.then(|| {
            source_files
                .iter()
                .filter(|file| !Path::new(file.as_str()).exists())
                .cloned()
                .collect::<Vec<_>>()
        });
        if let Some(missing) = missing.as_ref().filter(|m| !m.is_empty()) {
            log::warn!("{} source files are missing on disk", missing.len());
        }

        Ok(Report {
            task: query.task.clone(),
            generated_at: Utc::now(),
            substituted: !query.raw,
            frames,
            upstream_nodes: upstream,
            source_files: source_files.into_iter().collect(),
            missing_files: missing,
        })
    }
}
