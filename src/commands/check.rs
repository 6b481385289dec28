//! Validate a collection without serving it

use anyhow::Result;

use crate::{Opened, Postdex};

/// Load and validate every record, printing the ingest report.
/// Fails if any file or record was rejected.
pub fn run(app: &Postdex, json: bool) -> Result<()> {
    let Opened {
        store,
        report,
        load_errors,
    } = app.open()?;

    if json {
        let out = serde_json::json!({
            "inserted_ids": &report.inserted_ids,
            "failures": &report.failures,
            "load_errors": &load_errors,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Loaded {} post(s) from {:?}", store.len(), app.source_dir);
        for error in &load_errors {
            println!("  ! {}: {}", error.source, error.message);
        }
        for failure in &report.failures {
            println!(
                "  ✗ record #{} ({}): {}",
                failure.index,
                failure.id.as_deref().unwrap_or("no id"),
                failure.reasons.join("; ")
            );
        }
    }

    let problems = report.failures.len() + load_errors.len();
    if problems > 0 {
        anyhow::bail!("{} problem(s) found", problems);
    }
    Ok(())
}
