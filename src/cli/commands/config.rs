//! Config Command
//!
//! Manage clubguide configuration.
//!
//! Usage:
//!   clubguide config show [-f json|toml]
//!   clubguide config path
//!   clubguide config init [--force]

use std::path::Path;

use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Print the merged effective configuration
pub fn show(config: &Config, format: &str) -> Result<()> {
    let rendered = ConfigLoader::render(config, format == "json")?;
    println!("{}", rendered);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a starter project configuration
pub fn init(path: &Path, force: bool) -> Result<()> {
    let output = Output::new();
    if ConfigLoader::init_project(path, force)? {
        output.success("Initialized project configuration");
        output.field("Config", &path.display().to_string());
    } else {
        output.warning(&format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    Ok(())
}
