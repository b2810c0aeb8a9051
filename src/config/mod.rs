pub mod schema;

pub use schema::{CatalogScope, TesterConfig};

use anyhow::{bail, Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default home directory (~/.tool-tester).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".tool-tester"))
        .unwrap_or_else(|| PathBuf::from(".tool-tester"))
}

/// Default config path (~/.tool-tester/config.toml).
pub fn default_config_path() -> PathBuf {
    default_home_dir().join("config.toml")
}

/// Environment variables that take precedence over the config file.
pub const ENV_OVERRIDES: [&str; 4] = [
    "OPENAI_API_KEY",
    "OPENAI_API_BASE",
    "OPENAI_MODEL",
    "PUBLIC_BASE_URL",
];

/// Load config from the given path, or return defaults if it does not exist.
pub fn load_config(path: &Path) -> Result<TesterConfig> {
    let config: TesterConfig = match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {} (TOML)", path.display()))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No config at {}, using defaults", path.display());
            TesterConfig::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    validate(&config)?;
    Ok(config)
}

/// Load the config file, then apply [`ENV_OVERRIDES`] read through `lookup`.
pub fn load_with_env<F>(path: &Path, lookup: F) -> Result<TesterConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config, lookup);
    Ok(config)
}

/// Overwrite fields from the environment. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut TesterConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for key in ENV_OVERRIDES {
        let Some(value) = lookup(key).filter(|v| !v.is_empty()) else {
            continue;
        };
        let field = match key {
            "OPENAI_API_KEY" => &mut config.api_key,
            "OPENAI_API_BASE" => &mut config.api_base_url,
            "OPENAI_MODEL" => &mut config.model,
            "PUBLIC_BASE_URL" => &mut config.public_base_url,
            _ => continue,
        };
        debug!("{} overrides the config file", key);
        *field = value;
    }
}

fn validate(config: &TesterConfig) -> Result<()> {
    if config.model.trim().is_empty() {
        bail!("'model' must not be empty");
    }
    if config.catalog_scope == CatalogScope::Session && config.session_ttl_secs == 0 {
        bail!("'session_ttl_secs' must be positive when catalog_scope is \"session\"");
    }
    Ok(())
}

/// Save config to the given path (TOML format), creating parent directories.
pub fn save_config(config: &TesterConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
