//! Configuration loader and validator.
//!
//! Responsibilities:
//! - Read a config file (`DOCSCRIBE_CONFIG` or `<root>/docscribe.{yml,yaml,json}`) into [`PipelineConfig`]
//! - Apply defaults for every missing value
//! - Apply environment overrides for the knobs most often changed per run
//! - Validate constraints (e.g., concurrency must be > 0)

pub mod model;

use crate::config::model::{InvalidConfig, PipelineConfig};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

/// Config file names probed in the repository root, in order.
const CONFIG_FILE_NAMES: [&str; 3] = ["docscribe.yml", "docscribe.yaml", "docscribe.json"];

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("invalid value for env var {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error(transparent)]
    Invalid(#[from] InvalidConfig),
}

/// Load [`PipelineConfig`] for the repository at `root`.
///
/// File (if any) → defaults for the rest → env overrides → validation.
pub fn load(root: &Path) -> Result<PipelineConfig, ConfigLoadError> {
    let explicit = env::var("DOCSCRIBE_CONFIG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    load_with(root, explicit.as_deref(), &|k| env::var(k).ok())
}

/// Same as [`load`] with the config path and the env lookup injected.
pub fn load_with(
    root: &Path,
    explicit: Option<&Path>,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<PipelineConfig, ConfigLoadError> {
    let file = match explicit {
        Some(p) if p.is_relative() => Some(root.join(p)),
        Some(p) => Some(p.to_path_buf()),
        None => CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|p| p.is_file()),
    };

    let mut cfg = match file {
        Some(path) => {
            let cfg = from_file(&path)?;
            info!("config: loaded {}", path.display());
            cfg
        }
        None => {
            debug!("config: no config file in {}, using defaults", root.display());
            PipelineConfig::default()
        }
    };

    apply_env_overrides(&mut cfg, lookup)?;
    cfg.validate()?;
    Ok(cfg)
}

fn from_file(path: &Path) -> Result<PipelineConfig, ConfigLoadError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(PipelineConfig::default());
    }
    // YAML is a superset of JSON, so one parser covers both file kinds.
    serde_yml::from_str(&text).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(
    cfg: &mut PipelineConfig,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<(), ConfigLoadError> {
    if let Some(v) = parse_env(lookup, "DOCSCRIBE_CONCURRENCY")? {
        cfg.limits.concurrency = v;
    }
    if let Some(v) = parse_env(lookup, "DOCSCRIBE_MAX_ATTEMPTS")? {
        cfg.generation.max_attempts = v;
    }
    if let Some(v) = parse_env(lookup, "DOCSCRIBE_CHUNK_MAX_LENGTH")? {
        cfg.limits.chunk_max_length = v;
    }
    if let Some(raw) = non_empty(lookup, "DOCSCRIBE_DRY_RUN") {
        cfg.mutation.dry_run = match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(ConfigLoadError::InvalidEnv {
                    var: "DOCSCRIBE_DRY_RUN",
                    value: raw,
                });
            }
        };
    }
    Ok(())
}

fn non_empty(lookup: &dyn Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(
    lookup: &dyn Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigLoadError> {
    match non_empty(lookup, var) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigLoadError::InvalidEnv { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_with(dir.path(), None, &no_env).unwrap();
        assert_eq!(cfg.limits.concurrency, 5);
        assert!(!cfg.mutation.dry_run);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("docscribe.yml"),
            "limits:\n  concurrency: 2\nprompt:\n  project_info: Billing service\n",
        )
        .unwrap();

        let cfg = load_with(dir.path(), None, &no_env).unwrap();
        assert_eq!(cfg.limits.concurrency, 2);
        assert_eq!(cfg.limits.chunk_max_length, 500);
        assert_eq!(cfg.prompt.project_info, "Billing service");
    }

    #[test]
    fn json_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("docscribe.json"),
            r#"{"generation": {"max_attempts": 5}}"#,
        )
        .unwrap();
        let cfg = load_with(dir.path(), None, &no_env).unwrap();
        assert_eq!(cfg.generation.max_attempts, 5);
    }

    #[test]
    fn env_overrides_and_validation() {
        let dir = tempfile::tempdir().unwrap();
        let env: HashMap<&str, &str> = [
            ("DOCSCRIBE_CONCURRENCY", "8"),
            ("DOCSCRIBE_DRY_RUN", "true"),
        ]
        .into_iter()
        .collect();
        let lookup = move |k: &str| env.get(k).map(|v| v.to_string());
        let cfg = load_with(dir.path(), None, &lookup).unwrap();
        assert_eq!(cfg.limits.concurrency, 8);
        assert!(cfg.mutation.dry_run);

        let zero = |k: &str| (k == "DOCSCRIBE_CONCURRENCY").then(|| "0".to_string());
        assert!(matches!(
            load_with(dir.path(), None, &zero),
            Err(ConfigLoadError::Invalid(_))
        ));

        let junk = |k: &str| (k == "DOCSCRIBE_MAX_ATTEMPTS").then(|| "many".to_string());
        assert!(matches!(
            load_with(dir.path(), None, &junk),
            Err(ConfigLoadError::InvalidEnv { var: "DOCSCRIBE_MAX_ATTEMPTS", .. })
        ));
    }

    #[test]
    fn broken_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yml");
        fs::write(&path, "limits: [unclosed").unwrap();
        assert!(matches!(
            load_with(dir.path(), Some(&path), &no_env),
            Err(ConfigLoadError::Parse { .. })
        ));
    }
}
