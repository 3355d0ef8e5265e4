//! Settings - defaults, global config file, graph document, then CLI flags

use crate::core::DEFAULT_FILE_PLUG_NAMES;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "taskdeps";
const CONFIG_FILE: &str = "config.yml";

/// Overrides the global config location; an empty value disables it
pub const CONFIG_ENV: &str = "TASKDEPS_CONFIG";

/// One layer of optional overrides, as found in a config file, a graph
/// document's `settings:` block, or on the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsLayer {
    pub file_plug_names: Option<Vec<String>>,
    pub strict_substitution: Option<bool>,
    /// Frame list evaluated when no frames are given explicitly
    pub frames: Option<String>,
}

impl SettingsLayer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let layer: SettingsLayer = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(layer)
    }
}

/// Effective settings after all layers are applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub file_plug_names: Vec<String>,
    pub strict_substitution: bool,
    pub frames: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file_plug_names: DEFAULT_FILE_PLUG_NAMES.iter().map(|s| s.to_string()).collect(),
            strict_substitution: false,
            frames: None,
        }
    }
}

impl Settings {
    /// Location of the global config file
    ///
    /// `$TASKDEPS_CONFIG` wins over the per-user config directory.
    pub fn global_path() -> Option<PathBuf> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if path.is_empty() => None,
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    log::warn!("{} points at missing file {}", CONFIG_ENV, path.display());
                }
                Some(path)
            }
            None => dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE)),
        }
    }

    /// Later layers win over earlier ones
    pub fn apply(&mut self, layer: &SettingsLayer) {
        if let Some(names) = &layer.file_plug_names {
            self.file_plug_names = names.clone();
        }
        if let Some(strict) = layer.strict_substitution {
            self.strict_substitution = strict;
        }
        if let Some(frames) = &layer.frames {
            self.frames = Some(frames.clone());
        }
    }

    /// Defaults, then the `global` config file if present, then `layers`
    pub fn resolve(global: Option<&Path>, layers: &[&SettingsLayer]) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(path) = global.filter(|p| p.exists()) {
            log::debug!("Loading global config from {}", path.display());
            settings.apply(&SettingsLayer::from_file(path)?);
        }

        for layer in layers {
            settings.apply(layer);
        }
        Ok(settings)
    }
}
