//! Multi-source configuration loading.
//!
//! Priority, lowest to highest: built-in defaults, the first YAML file found
//! (explicit path, `<project>/cpgview.yaml`, `<user config dir>/cpgview/config.yaml`),
//! then environment variables. CLI flags are applied by the caller on top.

use std::path::{Path, PathBuf};

use crate::config::schema::CpgViewConfig;
use crate::error::{CpgError, Result};

/// File name looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "cpgview.yaml";

/// Environment variable overriding the store path.
pub const ENV_DB_PATH: &str = "CPGVIEW_DB_PATH";
/// Environment variable overriding the bind address.
pub const ENV_BIND: &str = "CPGVIEW_BIND";

/// Load the effective configuration.
///
/// An `explicit` path that does not exist is an error; the implicit
/// locations are optional.
pub fn load_config(explicit: Option<&Path>, project_root: Option<&Path>) -> Result<CpgViewConfig> {
    let config = match find_config_file(explicit, project_root)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config file");
            let text = std::fs::read_to_string(&path)?;
            parse_config(&text)?
        }
        None => CpgViewConfig::default(),
    };
    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

/// Parse YAML text; an empty document yields the defaults.
pub fn parse_config(text: &str) -> Result<CpgViewConfig> {
    if text.trim().is_empty() {
        return Ok(CpgViewConfig::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

fn find_config_file(explicit: Option<&Path>, project_root: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(CpgError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Some(root) = project_root {
        let candidate = root.join(PROJECT_CONFIG_FILE);
        if candidate.is_file() {
            return Ok(Some(candidate));
        }
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "cpgview") {
        let candidate = dirs.config_dir().join("config.yaml");
        if candidate.is_file() {
            return Ok(Some(candidate));
        }
    }

    Ok(None)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Honors `CPGVIEW_DB_PATH` (falling back to `DB_PATH`) and `CPGVIEW_BIND`
/// (falling back to `PORT`, which binds all interfaces).
pub fn apply_env_overrides<F>(mut config: CpgViewConfig, lookup: F) -> CpgViewConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(path) = non_empty(ENV_DB_PATH).or_else(|| non_empty("DB_PATH")) {
        config.store.path = PathBuf::from(path);
    }

    if let Some(bind) = non_empty(ENV_BIND) {
        config.server.bind = bind;
    } else if let Some(port) = non_empty("PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.server.bind = format!("0.0.0.0:{port}"),
            Err(_) => tracing::warn!(%port, "ignoring PORT: not a valid port number"),
        }
    }

    config
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.yaml");
        let err = load_config(Some(&missing), None).unwrap_err();
        assert!(matches!(err, CpgError::Config(_)));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.yaml");
        std::fs::write(&path, "store:\n  min_ready_bytes: 0\n").unwrap();
        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.store.min_ready_bytes, 0);
    }

    #[test]
    fn project_file_is_found() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(PROJECT_CONFIG_FILE),
            "server:\n  bind: 127.0.0.1:9999\n",
        )
        .unwrap();
        let config = load_config(None, Some(tmp.path())).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9999");
    }

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse_config("   \n").unwrap(), CpgViewConfig::default());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = parse_config("store: [").unwrap_err();
        assert!(matches!(err, CpgError::Config(_)));
    }

    #[test]
    fn env_db_path_overrides_file() {
        let config = apply_env_overrides(
            CpgViewConfig::default(),
            env(&[(ENV_DB_PATH, "/data/graph.db")]),
        );
        assert_eq!(config.store.path, PathBuf::from("/data/graph.db"));
    }

    #[test]
    fn legacy_db_path_is_used_when_primary_missing() {
        let config =
            apply_env_overrides(CpgViewConfig::default(), env(&[("DB_PATH", "legacy.db")]));
        assert_eq!(config.store.path, PathBuf::from("legacy.db"));
    }

    #[test]
    fn primary_db_path_wins_over_legacy() {
        let config = apply_env_overrides(
            CpgViewConfig::default(),
            env(&[(ENV_DB_PATH, "new.db"), ("DB_PATH", "old.db")]),
        );
        assert_eq!(config.store.path, PathBuf::from("new.db"));
    }

    #[test]
    fn port_binds_all_interfaces() {
        let config = apply_env_overrides(CpgViewConfig::default(), env(&[("PORT", "4000")]));
        assert_eq!(config.server.bind, "0.0.0.0:4000");
    }

    #[test]
    fn invalid_port_is_ignored() {
        let config = apply_env_overrides(CpgViewConfig::default(), env(&[("PORT", "http")]));
        assert_eq!(config.server.bind, "127.0.0.1:3001");
    }

    #[test]
    fn bind_wins_over_port() {
        let config = apply_env_overrides(
            CpgViewConfig::default(),
            env(&[(ENV_BIND, "10.0.0.1:80"), ("PORT", "4000")]),
        );
        assert_eq!(config.server.bind, "10.0.0.1:80");
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = apply_env_overrides(CpgViewConfig::default(), env(&[(ENV_DB_PATH, "  ")]));
        assert_eq!(config.store.path, PathBuf::from("cpg.db"));
    }
}
