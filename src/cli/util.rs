//! CLI Common Utilities
//!
//! Shared configuration loading for CLI commands.

use std::path::Path;

use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Load configuration, using `project_path` in place of `./clubguide.toml` when given
pub fn load_config(project_path: Option<&Path>) -> Result<Config> {
    match project_path {
        Some(path) => ConfigLoader::load_with_project(path),
        None => ConfigLoader::load(),
    }
}

/// Apply `serve` overrides on top of the loaded configuration
pub fn apply_server_overrides(config: &mut Config, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}
