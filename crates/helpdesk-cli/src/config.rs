//! CLI configuration paths

use anyhow::Context;
use helpdesk_core::HelpdeskConfig;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".helpdesk";

/// Load engine settings from `explicit`, else `~/.helpdesk/config.toml`
/// when present, else defaults.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<HelpdeskConfig> {
    if let Some(path) = explicit {
        return HelpdeskConfig::load(path).with_context(|| format!("loading config {}", path.display()));
    }

    match dirs::home_dir().map(|home| home.join(APP_DIR).join("config.toml")) {
        Some(path) if path.exists() => {
            HelpdeskConfig::load(&path).with_context(|| format!("loading config {}", path.display()))
        }
        _ => {
            tracing::debug!("No config file, using defaults");
            Ok(HelpdeskConfig::default())
        }
    }
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("Cannot find home directory; pass --store")?;
    Ok(home.join(APP_DIR).join("store.json"))
}
