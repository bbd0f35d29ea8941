use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

fn default_memory_budget_bytes() -> usize {
    512 * 1024 * 1024
}

fn default_max_write_buffers() -> usize {
    10
}

fn default_path_template() -> String {
    "/var/lib/granary/partition-%partition%".to_string()
}

/// Store configuration, loadable from a TOML file.
///
/// The memory budget covers the block cache and the write buffers together;
/// how it is split is the store's concern, not the operator's.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    /// Total engine memory budget in bytes (default 512 MiB).
    #[serde(default = "default_memory_budget_bytes")]
    pub memory_budget_bytes: usize,
    /// Maximum number of concurrent write buffers (default 10). Only one is
    /// writable at a time; the rest are waiting to be flushed.
    #[serde(default = "default_max_write_buffers")]
    pub max_write_buffers: usize,
    /// Database directory per partition; `%partition%` is replaced with the
    /// partition id.
    #[serde(default = "default_path_template")]
    pub path_template: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            memory_budget_bytes: default_memory_budget_bytes(),
            max_write_buffers: default_max_write_buffers(),
            path_template: default_path_template(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl StoreSettings {
    /// Load settings from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(p) => {
                let data = fs::read_to_string(p)?;
                Ok(toml::from_str(&data)?)
            }
            None => Ok(Self::default()),
        }
    }
}
