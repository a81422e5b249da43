use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::ChatlogConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "chatlog.toml",
    "chatlog.yaml",
    "chatlog.yml",
    "chatlog.json",
];

/// Override for the config directory, set via `set_config_dir()`.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Restrict config discovery to `path`. Each call replaces the previous override.
pub fn set_config_dir(path: PathBuf) {
    *CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner()) = Some(path);
}

/// Clear the config directory override, restoring default discovery.
pub fn clear_config_dir() {
    *CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner()) = None;
}

fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<ChatlogConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./chatlog.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/chatlog/chatlog.{toml,yaml,yml,json}` (user-global)
///
/// Returns `ChatlogConfig::default()` if nothing is found or the file is invalid.
pub fn discover_and_load() -> ChatlogConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return ChatlogConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            ChatlogConfig::default()
        },
    }
}

/// Find the first config file in standard locations.
///
/// When a config dir override is set, only that directory is searched.
fn find_config_file() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return first_existing(&dir);
    }
    first_existing(Path::new(".")).or_else(|| config_dir().and_then(|dir| first_existing(&dir)))
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the config directory: override, or `~/.config/chatlog/`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return Some(dir);
    }
    home_dir().map(|h| h.join(".config").join("chatlog"))
}

/// Returns the data directory: `~/.chatlog/`.
pub fn data_dir() -> PathBuf {
    home_dir()
        .map(|h| h.join(".chatlog"))
        .unwrap_or_else(|| PathBuf::from(".chatlog"))
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatlog.toml")
}

/// Serialize `config` to `path` in the format its extension names.
///
/// Creates parent directories if needed.
pub fn save_config(config: &ChatlogConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    let text = match ext {
        "toml" => toml::to_string_pretty(config)
            .map_err(|e| anyhow::anyhow!("serialize config: {e}"))?,
        "yaml" | "yml" => serde_yaml::to_string(config)?,
        "json" => serde_json::to_string_pretty(config)?,
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    };
    std::fs::write(path, text)?;
    debug!(path = %path.display(), "saved config");
    Ok(())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<ChatlogConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
