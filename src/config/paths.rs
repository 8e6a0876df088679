use std::env;
use std::path::{Path, PathBuf};

/// Environment override for the durable cache directory.
const CACHE_DIR_ENV: &str = "WAYPOINT_CACHE_DIR";

/// Determine the settings file path, searching `$HOME/.config` then `$XDG_CONFIG_HOME`.
pub fn resolve_settings_config_path() -> Option<PathBuf> {
    let home = env::var("HOME").ok();
    let xdg_config = env::var("XDG_CONFIG_HOME").ok();
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(h) = home.as_deref() {
        candidates.push(Path::new(h).join(".config").join("waypoint").join("settings.conf"));
    }
    if let Some(xdg) = xdg_config.as_deref() {
        candidates.push(Path::new(xdg).join("waypoint").join("settings.conf"));
    }
    candidates.into_iter().find(|p| p.is_file())
}

/// Resolve an XDG base directory from environment or default to `$HOME` + segments.
///
/// Inputs:
/// - `var`: Environment variable to check (e.g., `XDG_CONFIG_HOME`).
/// - `home_default`: Fallback path segments relative to `$HOME` if `var` is unset/empty.
///
/// Output: Resolved base directory path.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// Configuration directory: `$XDG_CONFIG_HOME/waypoint` (or `~/.config/waypoint`).
#[must_use]
pub fn config_dir() -> PathBuf {
    xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join("waypoint")
}

/// Logs directory under config: `<config>/logs` (ensured to exist).
#[must_use]
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// What: Directory for durable cache records.
///
/// Details:
/// - `WAYPOINT_CACHE_DIR` wins; otherwise `$XDG_CACHE_HOME/waypoint` (or `~/.cache/waypoint`).
/// - Not created here; the store creates it on first write.
#[must_use]
pub fn cache_dir() -> PathBuf {
    if let Ok(p) = env::var(CACHE_DIR_ENV)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    xdg_base_dir("XDG_CACHE_HOME", &[".cache"]).join("waypoint")
}
