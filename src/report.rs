//! Query reports - text and JSON rendering

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Result of one dependency query
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Queried task plug path
    pub task: String,
    pub generated_at: DateTime<Utc>,
    /// `false` when raw, unsubstituted names were requested
    pub substituted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<i64>>,
    /// Upstream node paths, sorted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_nodes: Option<Vec<String>>,
    /// Sorted source files
    pub source_files: Vec<String>,
    /// Source files not found on disk, when checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_files: Option<Vec<String>>,
}

impl Report {
    pub fn has_missing(&self) -> bool {
        self.missing_files.as_ref().is_some_and(|m| !m.is_empty())
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => self.to_json(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

/// One file per line, with optional node and missing-file sections
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(nodes) = &self.upstream_nodes {
            writeln!(f, "# upstream nodes of {}", self.task)?;
            for node in nodes {
                writeln!(f, "{}", node)?;
            }
            writeln!(f, "# source files")?;
        }

        for file in &self.source_files {
            writeln!(f, "{}", file)?;
        }

        if let Some(missing) = self.missing_files.as_ref().filter(|m| !m.is_empty()) {
            writeln!(f, "# missing ({})", missing.len())?;
            for file in missing {
                writeln!(f, "{}", file)?;
            }
        }
        Ok(())
    }
}
