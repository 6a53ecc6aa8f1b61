//! genpro: schema-driven multi-target code generator
//!
//! Given a data model, described either as a textual field list or discovered
//! by introspecting a live relational database, genpro renders a consistent
//! set of artifacts through a template bundle:
//! - **model**: SeaORM-style entity struct
//! - **controller** and **router**: Axum-style handlers and route tables
//! - **migration**: forward/backward SQL
//! - **list-view** and **form-view**: TSX components for admin UIs
//!
//! # Pipeline
//!
//! 1. [`config::Configuration`] is loaded once per invocation
//! 2. [`scaffold::RendererRegistry`] selects the bindings for the output style
//! 3. For each enabled kind and each declared model, the
//!    [`scaffold::SchemaResolver`] produces a canonical [`scaffold::ModelSchema`]
//! 4. The bound [`scaffold::Renderer`] builds a template context and renders it
//! 5. [`scaffold::FileWriter`] applies the overwrite/backup policy and writes
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use genpro::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Configuration::load("genpro.json")?;
//!     let registry = RendererRegistry::with_defaults();
//!     let engine = BundleTemplates::from_config(&config, &registry)?;
//!
//!     let report = registry.run(&config, &engine, None)?;
//!     for file in &report.written {
//!         println!("created {}", file.display());
//!     }
//!     Ok(())
//! }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod observability;
pub mod scaffold;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Configuration, FieldSpec, ModelDeclaration, SchemaSource};
    pub use crate::error::{ConfigError, FsError, GenproError, SchemaError, TemplateError};
    pub use crate::scaffold::{
        ArtifactKind, BundleTemplates, FileWriter, ModelSchema, RendererRegistry, RunReport,
        SchemaResolver, TemplateEngine,
    };
}
