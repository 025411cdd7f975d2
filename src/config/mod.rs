//! Configuration management for `recon`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`RECON_*`)
//! 3. Project config (.recon/config.yaml)
//! 4. User config (~/.config/recon/config.yaml)
//! 5. Defaults

use crate::error::{ReconError, Result};
use crate::model::{Priority, Severity};
use crate::storage::SqliteStorage;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the workspace directory.
pub const WORKSPACE_DIR_NAME: &str = ".recon";
/// Database filename inside the workspace.
pub const DEFAULT_DB_FILENAME: &str = "recon.db";
/// Busy timeout applied when nothing else is configured.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;
/// Look-ahead window for the "due soon" counter.
pub const DEFAULT_DUE_SOON_DAYS: i64 = 3;

const ENV_PREFIX: &str = "RECON_";

/// Resolved paths for this workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub recon_dir: PathBuf,
    pub db_path: PathBuf,
}

impl ConfigPaths {
    /// Resolve the database path. An explicit override is used as given;
    /// a configured `db` value is relative to the workspace directory.
    #[must_use]
    pub fn resolve(recon_dir: &Path, layer: &ConfigLayer, db_override: Option<&PathBuf>) -> Self {
        let db_path = db_override.cloned().unwrap_or_else(|| {
            db_from_layer(layer).map_or_else(
                || recon_dir.join(DEFAULT_DB_FILENAME),
                |candidate| {
                    if candidate.is_absolute() {
                        candidate
                    } else {
                        recon_dir.join(candidate)
                    }
                },
            )
        });

        Self {
            recon_dir: recon_dir.to_path_buf(),
            db_path,
        }
    }
}

/// Discover the active `.recon` directory.
///
/// Honors `RECON_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns `NotInitialized` if no workspace is found, or an I/O error if the
/// CWD cannot be read.
pub fn discover_recon_dir(start: Option<&Path>) -> Result<PathBuf> {
    let env_dir = env::var("RECON_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from);
    discover_recon_dir_with_env(start, env_dir.as_deref())
}

fn discover_recon_dir_with_env(start: Option<&Path>, env_override: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(WORKSPACE_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    Err(ReconError::NotInitialized)
}

/// An open database together with the configuration it was opened with.
#[derive(Debug)]
pub struct StorageContext {
    pub storage: SqliteStorage,
    pub paths: ConfigPaths,
    pub config: ConfigLayer,
}

/// Discover the workspace for a CLI invocation.
///
/// With an explicit `--db` and no workspace on disk, the database's parent
/// directory stands in for the workspace.
///
/// # Errors
///
/// Returns `NotInitialized` if there is no workspace and no `--db`.
pub fn discover_recon_dir_with_cli(cli: &CliOverrides) -> Result<PathBuf> {
    match discover_recon_dir(None) {
        Ok(dir) => Ok(dir),
        Err(ReconError::NotInitialized) => cli
            .db
            .as_ref()
            .map(|db| {
                db.parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
            })
            .ok_or(ReconError::NotInitialized),
        Err(other) => Err(other),
    }
}

/// Open storage using the merged configuration.
///
/// # Errors
///
/// Returns an error if config cannot be read or the database cannot be opened.
pub fn open_storage_with_cli(recon_dir: &Path, cli: &CliOverrides) -> Result<StorageContext> {
    let config = load_config(recon_dir, cli)?;
    let paths = ConfigPaths::resolve(recon_dir, &config, cli.db.as_ref());
    let lock_timeout = lock_timeout_from_layer(&config).unwrap_or(DEFAULT_LOCK_TIMEOUT_MS);

    tracing::debug!(db = %paths.db_path.display(), lock_timeout, "Opening storage");
    let storage = SqliteStorage::open_with_timeout(&paths.db_path, Some(lock_timeout))?;
    Ok(StorageContext {
        storage,
        paths,
        config,
    })
}

/// A flat key/value configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Build a layer from YAML text. Nested maps flatten to dotted keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let only_comments = contents.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if only_comments {
            return Ok(Self::default());
        }

        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let mut flat = HashMap::new();
        flatten_yaml(&value, "", &mut flat);

        let mut layer = Self::default();
        for (key, value) in flat {
            layer.insert(&key, value);
        }
        Ok(layer)
    }

    /// Build a layer from `RECON_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from `(name, value)` pairs, keeping only `RECON_*` names.
    ///
    /// `RECON_LOCK_TIMEOUT` becomes `lock-timeout`.
    #[must_use]
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.insert(stripped, value);
            }
        }
        layer
    }

    /// Look up a key, ignoring case and `_`/`-` differences.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(String::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn insert(&mut self, key: &str, value: String) {
        self.values.insert(normalize_key(key), value);
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub actor: Option<String>,
    pub lock_timeout: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer.insert("db", path.to_string_lossy().to_string());
        }
        if let Some(actor) = &self.actor {
            layer.insert("actor", actor.clone());
        }
        if let Some(lock_timeout) = self.lock_timeout {
            layer.insert("lock-timeout", lock_timeout.to_string());
        }

        layer
    }
}

/// Load project config (.recon/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(recon_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&recon_dir.join("config.yaml"))
}

/// Load user config (~/.config/recon/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("recon")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("lock-timeout", DEFAULT_LOCK_TIMEOUT_MS.to_string());
    layer.insert("due-soon-days", DEFAULT_DUE_SOON_DAYS.to_string());
    layer
}

/// Load configuration in precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(recon_dir: &Path, cli: &CliOverrides) -> Result<ConfigLayer> {
    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        load_user_config()?,
        load_project_config(recon_dir)?,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]))
}

/// Resolve actor with fallback to USER and a safe default.
#[must_use]
pub fn resolve_actor(layer: &ConfigLayer) -> String {
    layer
        .get("actor")
        .map(str::to_string)
        .or_else(|| {
            env::var("USER")
                .ok()
                .map(|value| value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Severity preselected for new bugs.
///
/// # Errors
///
/// Returns `InvalidSeverity` if the configured value is not a severity.
pub fn default_severity_from_layer(layer: &ConfigLayer) -> Result<Severity> {
    layer
        .get("default-severity")
        .map_or_else(|| Ok(Severity::default()), Severity::from_str)
}

/// Priority preselected for new bugs.
///
/// # Errors
///
/// Returns `InvalidPriority` if the configured value is not a priority.
pub fn default_priority_from_layer(layer: &ConfigLayer) -> Result<Priority> {
    layer
        .get("default-priority")
        .map_or_else(|| Ok(Priority::default()), Priority::from_str)
}

/// Look-ahead window for the "due soon" counter, in days.
///
/// # Errors
///
/// Returns a config error for a non-numeric or negative value.
pub fn due_soon_days_from_layer(layer: &ConfigLayer) -> Result<i64> {
    let Some(raw) = layer.get("due-soon-days") else {
        return Ok(DEFAULT_DUE_SOON_DAYS);
    };
    match raw.parse::<i64>() {
        Ok(days) if days >= 0 => Ok(days),
        _ => Err(ReconError::Config(format!(
            "due-soon-days must be a non-negative integer, got '{raw}'"
        ))),
    }
}

#[must_use]
pub fn lock_timeout_from_layer(layer: &ConfigLayer) -> Option<u64> {
    layer
        .get("lock-timeout")
        .and_then(|value| value.parse::<u64>().ok())
}

fn db_from_layer(layer: &ConfigLayer) -> Option<PathBuf> {
    layer.get("db").map(PathBuf::from)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layer(pairs: &[(&str, &str)]) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        for (key, value) in pairs {
            layer.insert(key, (*value).to_string());
        }
        layer
    }

    #[test]
    fn discover_walks_up_to_workspace() {
        let temp = TempDir::new().expect("tempdir");
        let recon_dir = temp.path().join(WORKSPACE_DIR_NAME);
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&recon_dir).unwrap();
        fs::create_dir_all(&nested).unwrap();

        let found = discover_recon_dir_with_env(Some(&nested), None).unwrap();
        assert_eq!(found, recon_dir);
    }

    #[test]
    fn discover_prefers_env_override() {
        let temp = TempDir::new().expect("tempdir");
        let elsewhere = temp.path().join("custom");
        fs::create_dir_all(&elsewhere).unwrap();

        let found = discover_recon_dir_with_env(Some(temp.path()), Some(&elsewhere)).unwrap();
        assert_eq!(found, elsewhere);
    }

    #[test]
    fn discover_without_workspace_is_not_initialized() {
        let temp = TempDir::new().expect("tempdir");
        let err = discover_recon_dir_with_env(Some(temp.path()), None).unwrap_err();
        assert!(matches!(err, ReconError::NotInitialized));
    }

    #[test]
    fn yaml_layer_flattens_and_normalizes() {
        let layer = ConfigLayer::from_yaml_str(
            "actor: sam\nlock_timeout: 500\ndisplay:\n  color: false\n",
        )
        .unwrap();
        assert_eq!(layer.get("actor"), Some("sam"));
        assert_eq!(layer.get("lock-timeout"), Some("500"));
        assert_eq!(layer.get("display.color"), Some("false"));
    }

    #[test]
    fn missing_yaml_is_empty() {
        let temp = TempDir::new().expect("tempdir");
        let layer = ConfigLayer::from_yaml(&temp.path().join("config.yaml")).unwrap();
        assert!(layer.values.is_empty());
    }

    #[test]
    fn env_vars_are_prefixed() {
        let layer = ConfigLayer::from_vars(vec![
            ("RECON_ACTOR".to_string(), "ci-bot".to_string()),
            ("RECON_DUE_SOON_DAYS".to_string(), "7".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ]);
        assert_eq!(layer.get("actor"), Some("ci-bot"));
        assert_eq!(due_soon_days_from_layer(&layer).unwrap(), 7);
        assert!(layer.get("home").is_none());
    }

    #[test]
    fn later_layers_win() {
        let merged = ConfigLayer::merge_layers(&[
            layer(&[("actor", "a"), ("lock-timeout", "10")]),
            layer(&[("actor", "b")]),
        ]);
        assert_eq!(merged.get("actor"), Some("b"));
        assert_eq!(lock_timeout_from_layer(&merged), Some(10));
    }

    #[test]
    fn cli_overrides_become_layer() {
        let cli = CliOverrides {
            db: Some(PathBuf::from("/tmp/x.db")),
            actor: Some("dev".to_string()),
            lock_timeout: Some(250),
        };
        let layer = cli.as_layer();
        assert_eq!(layer.get("db"), Some("/tmp/x.db"));
        assert_eq!(resolve_actor(&layer), "dev");
        assert_eq!(lock_timeout_from_layer(&layer), Some(250));
    }

    #[test]
    fn blank_actor_falls_through() {
        let layer = layer(&[("actor", "  ")]);
        assert!(!resolve_actor(&layer).trim().is_empty());
    }

    #[test]
    fn paths_resolve_relative_db_against_workspace() {
        let recon_dir = Path::new("/work/.recon");
        let default = ConfigPaths::resolve(recon_dir, &ConfigLayer::default(), None);
        assert_eq!(default.db_path, recon_dir.join(DEFAULT_DB_FILENAME));

        let relative = ConfigPaths::resolve(recon_dir, &layer(&[("db", "alt.db")]), None);
        assert_eq!(relative.db_path, recon_dir.join("alt.db"));

        let explicit = PathBuf::from("other.db");
        let overridden =
            ConfigPaths::resolve(recon_dir, &layer(&[("db", "alt.db")]), Some(&explicit));
        assert_eq!(overridden.db_path, explicit);
    }

    #[test]
    fn defaults_from_layer() {
        let defaults = default_config_layer();
        assert_eq!(
            due_soon_days_from_layer(&defaults).unwrap(),
            DEFAULT_DUE_SOON_DAYS
        );
        assert_eq!(default_severity_from_layer(&defaults).unwrap(), Severity::Major);
        assert_eq!(default_priority_from_layer(&defaults).unwrap(), Priority::Medium);

        let custom = layer(&[("default-severity", "minor"), ("default_priority", "HIGH")]);
        assert_eq!(default_severity_from_layer(&custom).unwrap(), Severity::Minor);
        assert_eq!(default_priority_from_layer(&custom).unwrap(), Priority::High);
    }

    #[test]
    fn bad_due_soon_days_is_config_error() {
        let err = due_soon_days_from_layer(&layer(&[("due-soon-days", "-2")])).unwrap_err();
        assert!(matches!(err, ReconError::Config(_)));
    }

    #[test]
    fn open_storage_creates_database() {
        let temp = TempDir::new().expect("tempdir");
        let recon_dir = temp.path().join(WORKSPACE_DIR_NAME);
        fs::create_dir_all(&recon_dir).unwrap();

        let ctx = open_storage_with_cli(&recon_dir, &CliOverrides::default()).unwrap();
        assert!(ctx.paths.db_path.exists());
        assert_eq!(ctx.paths.db_path, recon_dir.join(DEFAULT_DB_FILENAME));
        assert_eq!(ctx.storage.count_active_bugs().unwrap(), 0);
    }
}
