//! `genpro scaffold`: generate one model from a field list
//!
//! ```bash
//! genpro scaffold post "title:string:64,body:text,publishedAt:datetime" \
//!   --style richUI --kinds model,controller,router,migration
//! ```

use anyhow::{Context, Result};
use console::style;
use genpro::config::{GenproSettings, ModelSettings, SchemaSettings};
use genpro::prelude::*;
use genpro::scaffold::helpers::TemplateHelpers;
use std::path::PathBuf;

pub struct ScaffoldCommand {
    pub name: String,
    pub fields: String,
    pub output: PathBuf,
    pub style: String,
    pub kinds: String,
    pub templates: Option<PathBuf>,
    pub overwrite: bool,
}

impl ScaffoldCommand {
    fn settings(&self) -> GenproSettings {
        let mut settings = GenproSettings {
            output_style: self.style.clone(),
            enabled_kinds: self.kinds.clone(),
            output_root: self.output.clone(),
            frontend_root: self.output.join("web/src/pages"),
            template_bundle_local_path: self.templates.clone(),
            overwrite_existing: self.overwrite,
            ..GenproSettings::default()
        };
        settings.models.insert(
            self.name.clone(),
            ModelSettings {
                schema: Some(SchemaSettings::Inline(self.fields.clone())),
                ..ModelSettings::default()
            },
        );
        settings
    }

    pub fn execute(&self) -> Result<()> {
        println!(
            "\n{} {} {}",
            style("Scaffolding").cyan().bold(),
            style(&self.name).green().bold(),
            style("...").cyan().bold()
        );

        let config = Configuration::from_settings(self.settings())
            .with_context(|| format!("Invalid scaffold for '{}'", self.name))?;

        super::run_and_report(&config)?;

        println!("\n{}", style("Next steps:").cyan().bold());
        println!(
            "  Add the module to src/models/mod.rs: {}",
            style(format!("pub mod {};", TemplateHelpers::to_file_stem(&self.name))).yellow()
        );
        Ok(())
    }
}
