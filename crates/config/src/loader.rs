use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::PassgateConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "passgate.toml",
    "passgate.yaml",
    "passgate.yml",
    "passgate.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<PassgateConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let expanded = substitute_env(&raw);
    if !expanded.unresolved.is_empty() {
        debug!(
            path = %path.display(),
            vars = ?expanded.unresolved,
            "config references unset environment variables"
        );
    }
    parse_config(&expanded.text, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./passgate.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/passgate/passgate.{toml,yaml,yml,json}` (user-global)
///
/// Returns `PassgateConfig::default()` if no config file is found or the file
/// found cannot be parsed.
pub fn discover_and_load() -> PassgateConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return PassgateConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            PassgateConfig::default()
        },
    }
}

fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory, `~/.config/passgate/`.
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("passgate"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<PassgateConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
