//! `fields` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::FieldsArgs;
use contracts::FIELDS;

#[derive(Serialize)]
struct FieldInfo {
    name: &'static str,
    metric_type: &'static str,
    kind: &'static str,
}

/// Execute the `fields` command
pub fn run_fields(args: &FieldsArgs) -> Result<()> {
    let fields: Vec<FieldInfo> = FIELDS
        .iter()
        .map(|f| FieldInfo {
            name: f.name,
            metric_type: f.metric_type.as_str(),
            kind: f.kind.as_str(),
        })
        .collect();

    if args.json {
        let json =
            serde_json::to_string_pretty(&fields).context("Failed to serialize field list")?;
        println!("{}", json);
    } else {
        println!("{:<26} {:<10} {}", "FIELD", "TYPE", "KIND");
        for field in &fields {
            println!("{:<26} {:<10} {}", field.name, field.metric_type, field.kind);
        }
    }

    Ok(())
}
