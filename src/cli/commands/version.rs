//! Version command implementation.

use crate::error::Result;
use crate::output::OutputContext;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    schema_version: i32,
}

fn version_output() -> VersionOutput<'static> {
    VersionOutput {
        version: env!("CARGO_PKG_VERSION"),
        build: if cfg!(debug_assertions) {
            "dev"
        } else {
            "release"
        },
        schema_version: CURRENT_SCHEMA_VERSION,
    }
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(ctx: &OutputContext) -> Result<()> {
    let output = version_output();
    if ctx.is_json() {
        return ctx.print_json(&output);
    }
    println!(
        "recon version {} ({}, schema v{})",
        output.version, output.build, output.schema_version
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_json_fields() {
        let value = serde_json::to_value(version_output()).unwrap();
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["schema_version"], CURRENT_SCHEMA_VERSION);
    }
}
