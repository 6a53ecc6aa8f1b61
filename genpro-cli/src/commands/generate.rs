//! `genpro generate`: run a configuration file

use anyhow::{Context, Result};
use console::style;
use genpro::prelude::*;
use std::path::PathBuf;

pub struct GenerateCommand {
    config: Option<PathBuf>,
    overwrite: bool,
    templates: Option<PathBuf>,
}

impl GenerateCommand {
    pub const fn new(config: Option<PathBuf>, overwrite: bool, templates: Option<PathBuf>) -> Self {
        Self {
            config,
            overwrite,
            templates,
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config {
            return Ok(path.clone());
        }
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Configuration::discover(&cwd).with_context(|| {
            format!(
                "No genpro.json or genpro.toml found in {}; pass --config",
                cwd.display()
            )
        })
    }

    pub fn execute(&self) -> Result<()> {
        let path = self.config_path()?;
        let mut config = Configuration::load(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        if self.overwrite {
            config.overwrite_existing = true;
        }
        if let Some(templates) = &self.templates {
            config.bundle.local_path.clone_from(templates);
        }

        println!(
            "\n{} {} model(s) with style {}",
            style("Generating").cyan().bold(),
            config.models.len(),
            style(&config.output_style).green().bold()
        );
        tracing::debug!(config = %path.display(), "loaded configuration");

        super::run_and_report(&config)
    }
}
