//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/clubguide/config.toml)
//! 3. Project config (./clubguide.toml)
//! 4. Environment variables (CLUBGUIDE_* prefix, `__` between nested keys)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{GuideError, Result};

const ENV_PREFIX: &str = "CLUBGUIDE_";
const PROJECT_CONFIG_FILE: &str = "clubguide.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layers(Self::global_config_path(), &Self::project_config_path())
    }

    /// Load with an explicit project config file in place of `./clubguide.toml`
    pub fn load_with_project(project_path: &Path) -> Result<Config> {
        Self::load_layers(Self::global_config_path(), project_path)
    }

    fn load_layers(global_path: Option<PathBuf>, project_path: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Merge global config
        if let Some(global_path) = global_path
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        // Merge project config
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(project_path));
        }

        // Merge environment variables (e.g., CLUBGUIDE_SERVER__PORT -> server.port)
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| GuideError::Config(format!("Configuration error: {}", e)))?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/clubguide/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("clubguide"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_CONFIG_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration (API keys are never included)
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| GuideError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a starter project config. Existing files are kept unless `force`.
    pub fn init_project(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Project config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, Self::default_project_config())?;
        info!("Created project config: {}", path.display());
        Ok(true)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default project config content (TOML)
    fn default_project_config() -> String {
        r#"# clubguide configuration
# Environment variables override these (CLUBGUIDE_SERVER__PORT=8080, ...).
# API keys are read from OPENAI_API_KEY / OPENROUTER_API_KEY unless set here.

[server]
host = "127.0.0.1"
port = 5000

[providers.primary]
name = "openai"
api_base = "https://api.openai.com/v1"
model = "gpt-4o-mini-2024-07-18"
api_key_env = "OPENAI_API_KEY"
timeout_secs = 30

[providers.secondary]
name = "openrouter"
api_base = "https://openrouter.ai/api/v1"
model = "meta-llama/llama-4-maverick:free"
api_key_env = "OPENROUTER_API_KEY"
timeout_secs = 20

[telemetry]
enabled = true
timeout_secs = 5

[throttle]
window_secs = 5.0
"#
        .to_string()
    }
}
