//! Create command implementation.

use crate::cli::CreateArgs;
use crate::cli::commands::open_workspace;
use crate::config::{self, ConfigLayer};
use crate::error::{ReconError, Result};
use crate::model::{Bug, NewBug, Resolution, Severity, Status};
use crate::output::OutputContext;
use crate::storage::SqliteStorage;
use std::str::FromStr;

/// Execute the create command.
///
/// # Errors
///
/// Returns an error if a field value is invalid, the database cannot be
/// opened, or the bug cannot be stored.
pub fn execute(args: &CreateArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let mut storage_ctx = open_workspace(cli)?;
    let bug = create_from_args(&mut storage_ctx.storage, args, &storage_ctx.config)?;

    if ctx.is_json() {
        ctx.print_json(&bug)?;
    } else if ctx.is_quiet() {
        println!("{}", bug.display_id());
    } else {
        println!("Created {}: {}", bug.display_id(), bug.summary);
    }
    Ok(())
}

/// Build the new bug from CLI args and config defaults, store it, and read
/// it back.
///
/// # Errors
///
/// Returns an error for invalid enum values or storage failures.
pub fn create_from_args(
    storage: &mut SqliteStorage,
    args: &CreateArgs,
    layer: &ConfigLayer,
) -> Result<Bug> {
    let new_bug = build_new_bug(args, layer)?;
    let id = storage.create_bug(&new_bug)?;
    storage.get_bug(id)?.ok_or(ReconError::BugNotFound { id })
}

fn build_new_bug(args: &CreateArgs, layer: &ConfigLayer) -> Result<NewBug> {
    let severity = match &args.severity {
        Some(value) => Severity::from_str(value)?,
        None => config::default_severity_from_layer(layer)?,
    };
    let priority = match &args.priority {
        Some(value) => value.parse()?,
        None => config::default_priority_from_layer(layer)?,
    };
    let status = args
        .status
        .as_deref()
        .map(Status::from_str)
        .transpose()?
        .unwrap_or_default();
    let resolution = match &args.resolution {
        Some(value) => Resolution::parse_optional(value)?,
        None => None,
    };
    let reporter = args
        .reporter
        .clone()
        .or_else(|| Some(config::resolve_actor(layer)));

    Ok(NewBug {
        summary: args.summary.clone(),
        description: args.description.clone(),
        steps_to_reproduce: args.steps.clone(),
        expected_result: args.expected.clone(),
        actual_result: args.actual.clone(),
        severity,
        priority,
        status,
        assignee_name: args.assignee.clone(),
        reporter_name: reporter,
        environment: args.environment.clone(),
        resolution,
        requirement_number: args.requirement.clone(),
        test_case_name: args.test_case.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use crate::model::Priority;

    fn args(summary: &str) -> CreateArgs {
        CreateArgs {
            summary: summary.to_string(),
            ..CreateArgs::default()
        }
    }

    fn actor_layer(actor: &str) -> ConfigLayer {
        config::CliOverrides {
            actor: Some(actor.to_string()),
            ..config::CliOverrides::default()
        }
        .as_layer()
    }

    #[test]
    fn test_defaults_and_reporter_from_actor() {
        init_test_logging();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let bug = create_from_args(&mut storage, &args("Crash"), &actor_layer("sam")).unwrap();

        assert_eq!(bug.severity, Severity::Major);
        assert_eq!(bug.priority, Priority::Medium);
        assert_eq!(bug.status, Status::Reported);
        assert_eq!(bug.reporter_name.as_deref(), Some("sam"));
        assert_eq!(bug.resolution, None);
    }

    #[test]
    fn test_explicit_fields() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let create = CreateArgs {
            severity: Some("blocker".to_string()),
            priority: Some("Critical".to_string()),
            status: Some("in_progress".to_string()),
            resolution: Some("wont-fix".to_string()),
            reporter: Some("ana".to_string()),
            environment: Some("iOS 17".to_string()),
            ..args("Login loop")
        };
        let bug = create_from_args(&mut storage, &create, &ConfigLayer::default()).unwrap();

        assert_eq!(bug.severity, Severity::Blocker);
        assert_eq!(bug.priority, Priority::Critical);
        assert_eq!(bug.status, Status::InProgress);
        assert_eq!(bug.resolution, Some(Resolution::WontFix));
        assert_eq!(bug.reporter_name.as_deref(), Some("ana"));
        assert_eq!(bug.environment.as_deref(), Some("iOS 17"));
    }

    #[test]
    fn test_config_defaults_apply() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let layer = ConfigLayer::from_yaml_str("default-severity: Minor\ndefault-priority: Low\n")
            .unwrap();
        let bug = create_from_args(&mut storage, &args("Typo"), &layer).unwrap();
        assert_eq!(bug.severity, Severity::Minor);
        assert_eq!(bug.priority, Priority::Low);
    }

    #[test]
    fn test_invalid_severity_stores_nothing() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let create = CreateArgs {
            severity: Some("trivial".to_string()),
            ..args("x")
        };
        let err = create_from_args(&mut storage, &create, &ConfigLayer::default()).unwrap_err();
        assert!(matches!(err, ReconError::InvalidSeverity { .. }));
        assert_eq!(storage.count_active_bugs().unwrap(), 0);
    }
}
