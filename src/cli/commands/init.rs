//! Init command implementation.

use crate::config::{DEFAULT_DB_FILENAME, WORKSPACE_DIR_NAME};
use crate::error::{ReconError, Result};
use crate::output::OutputContext;
use crate::storage::SqliteStorage;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::info;

const CONFIG_TEMPLATE: &str = r"# Recon Project Configuration
# actor: your-name
# default-severity: Major
# default-priority: Medium
# due-soon-days: 3
# lock-timeout: 30000
";

const GITIGNORE_TEMPLATE: &str = r"# Database
*.db
*.db-shm
*.db-wal

# Exports
*.csv
";

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the directory or database cannot be created, or if a
/// database already exists and `force` is not set.
pub fn execute(force: bool, root_dir: Option<&Path>, ctx: &OutputContext) -> Result<()> {
    let base_dir = root_dir.unwrap_or_else(|| Path::new("."));
    let recon_dir = base_dir.join(WORKSPACE_DIR_NAME);
    let db_path = recon_dir.join(DEFAULT_DB_FILENAME);

    if recon_dir.exists() {
        if db_path.exists() && !force {
            return Err(ReconError::AlreadyInitialized { path: db_path });
        }
    } else {
        fs::create_dir(&recon_dir)?;
    }

    // Opening applies the schema; existing rows survive a forced re-init.
    let storage = SqliteStorage::open(&db_path)?;
    let existing = storage.count_active_bugs()?;

    let config_path = recon_dir.join("config.yaml");
    if !config_path.exists() {
        fs::write(config_path, CONFIG_TEMPLATE)?;
    }

    let gitignore_path = recon_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(gitignore_path, GITIGNORE_TEMPLATE)?;
    }

    info!(path = %recon_dir.display(), existing, "Workspace initialized");

    if ctx.is_json() {
        ctx.print_json(&json!({
            "path": recon_dir.display().to_string(),
            "database": db_path.display().to_string(),
            "active_bugs": existing,
        }))?;
    } else {
        ctx.println(&format!("Initialized recon workspace in {WORKSPACE_DIR_NAME}/"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewBug;
    use tempfile::TempDir;

    fn quiet() -> OutputContext {
        OutputContext::from_flags(false, true, true)
    }

    #[test]
    fn test_init_creates_recon_directory() {
        let temp_dir = TempDir::new().unwrap();
        execute(false, Some(temp_dir.path()), &quiet()).unwrap();

        assert!(temp_dir.path().join(".recon").is_dir());
        assert!(temp_dir.path().join(".recon/recon.db").exists());
        assert!(temp_dir.path().join(".recon/config.yaml").exists());
        assert!(temp_dir.path().join(".recon/.gitignore").exists());
    }

    #[test]
    fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();
        execute(false, Some(temp_dir.path()), &quiet()).unwrap();

        let err = execute(false, Some(temp_dir.path()), &quiet()).unwrap_err();
        assert!(matches!(err, ReconError::AlreadyInitialized { .. }));
    }

    #[test]
    fn test_init_force_keeps_existing_bugs() {
        let temp_dir = TempDir::new().unwrap();
        execute(false, Some(temp_dir.path()), &quiet()).unwrap();

        let db_path = temp_dir.path().join(".recon/recon.db");
        {
            let mut storage = SqliteStorage::open(&db_path).unwrap();
            storage.create_bug(&NewBug::new("survivor")).unwrap();
        }

        execute(true, Some(temp_dir.path()), &quiet()).unwrap();
        let storage = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(storage.count_active_bugs().unwrap(), 1);
    }

    #[test]
    fn test_config_template_is_valid_yaml() {
        let layer = crate::config::ConfigLayer::from_yaml_str(CONFIG_TEMPLATE).unwrap();
        assert!(layer.values.is_empty());
    }

    #[test]
    fn test_existing_config_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let recon_dir = temp_dir.path().join(".recon");
        fs::create_dir(&recon_dir).unwrap();
        fs::write(recon_dir.join("config.yaml"), "actor: kept\n").unwrap();

        execute(false, Some(temp_dir.path()), &quiet()).unwrap();
        let contents = fs::read_to_string(recon_dir.join("config.yaml")).unwrap();
        assert_eq!(contents, "actor: kept\n");
    }
}
