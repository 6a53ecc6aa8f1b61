//! CLI command implementations

pub mod generate;
pub mod kinds;
pub mod scaffold;

pub use generate::GenerateCommand;
pub use kinds::KindsCommand;
pub use scaffold::ScaffoldCommand;

use anyhow::{bail, Context, Result};
use console::style;
use genpro::prelude::*;
use genpro::scaffold::SqlxTableReader;

/// Run the default registry for `config` and print what happened
///
/// Fails when any (kind, model) pair failed, so the process exits non-zero.
pub fn run_and_report(config: &Configuration) -> Result<()> {
    let registry = RendererRegistry::with_defaults();
    let engine = BundleTemplates::from_config(config, &registry)
        .context("Template bundle is not available")?;

    let reader = if config.uses_database() {
        let connection = config
            .connection
            .as_ref()
            .context("A database-sourced model needs `driver` and `dsn`")?;
        let reader = SqlxTableReader::connect(connection)
            .with_context(|| format!("Failed to connect to {} database", connection.driver))?;
        Some(Box::new(reader) as Box<dyn genpro::scaffold::TableReader>)
    } else {
        None
    };

    let report = registry
        .run(config, &engine, reader)
        .context("Generation aborted")?;

    print_report(&report);

    if !report.is_success() {
        bail!("{} artifact(s) failed to generate", report.failures.len());
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for path in &report.written {
        println!("  {} {}", style("✓").green(), style(path.display()).dim());
    }
    for backup in &report.backups {
        println!("  {} backed up to {}", style("↺").yellow(), style(backup.display()).dim());
    }
    for skip in &report.skipped {
        println!(
            "  {} {} for {} ({})",
            style("-").dim(),
            skip.kind,
            style(&skip.model).bold(),
            style(&skip.reason).dim()
        );
    }
    for failure in &report.failures {
        println!(
            "  {} {} for {}: {}",
            style("✗").red(),
            failure.kind,
            style(&failure.model).bold(),
            style(&failure.error).red()
        );
    }

    println!(
        "\n{} {} file(s), {} skipped, {} failed",
        style("Generated").green().bold(),
        report.written.len(),
        report.skipped.len(),
        report.failures.len()
    );
}
