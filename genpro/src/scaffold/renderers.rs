//! Renderer implementations, one per artifact kind
//!
//! A renderer turns a resolved schema into one file: build the context,
//! pick the template, render it, hand the text to the [`FileWriter`].

use super::context;
use super::kind::ArtifactKind;
use super::materialize::{FileWriter, WriteOutcome};
use super::schema::ModelSchema;
use super::templates::{TemplateEngine, TemplateId};
use crate::config::{Configuration, ModelDeclaration};
use crate::error::GenproError;
use serde_json::Value;
use std::path::PathBuf;

/// Everything a renderer needs for one (kind, model) pair
pub struct RenderInput<'a> {
    /// Run configuration
    pub config: &'a Configuration,
    /// Template engine
    pub engine: &'a dyn TemplateEngine,
    /// File writer carrying the overwrite policy
    pub writer: FileWriter,
    /// Declared model name
    pub model_name: &'a str,
    /// Model declaration
    pub declaration: &'a ModelDeclaration,
    /// Resolved schema
    pub schema: &'a ModelSchema,
}

impl RenderInput<'_> {
    fn api_prefix(&self) -> &str {
        self.config.api_prefix_for(self.declaration)
    }

    fn destination(&self, kind: ArtifactKind) -> PathBuf {
        kind.destination(self.config, self.model_name)
    }
}

/// Result of a renderer that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A file was written
    Written {
        /// Destination path
        path: PathBuf,
        /// Backup of the previous version, if one was replaced
        backup: Option<PathBuf>,
    },
    /// Nothing was generated, by policy
    Skipped {
        /// Why
        reason: String,
    },
}

/// Renders one artifact kind
pub trait Renderer {
    /// Kind this renderer produces
    fn kind(&self) -> ArtifactKind;

    /// Render and write the artifact for one model
    ///
    /// # Errors
    ///
    /// Returns the template or filesystem error for this pair only.
    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutcome, GenproError>;
}

fn emit(
    input: &RenderInput<'_>,
    kind: ArtifactKind,
    template: &str,
    context: &Value,
) -> Result<RenderOutcome, GenproError> {
    let id = TemplateId::new(kind.package(), template);
    let text = input.engine.render(&id, context)?;
    let path = input.destination(kind);
    let backup = match input.writer.write(&path, &text)? {
        WriteOutcome::Created => None,
        WriteOutcome::Replaced { backup } => Some(backup),
    };
    tracing::info!(kind = %kind, model = input.model_name, path = %path.display(), "generated file");
    Ok(RenderOutcome::Written { path, backup })
}

/// Entity struct renderer
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelRenderer;

impl Renderer for ModelRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Model
    }

    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutcome, GenproError> {
        let ctx = context::model_context(input.schema);
        emit(input, self.kind(), "model.rs.tmpl", &ctx)
    }
}

/// Request handler renderer
///
/// Uses `controller_model.rs.tmpl` when the model file is already on disk,
/// `controller.rs.tmpl` otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct ControllerRenderer;

impl Renderer for ControllerRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Controller
    }

    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutcome, GenproError> {
        let has_model = input.destination(ArtifactKind::Model).is_file();
        let template = if has_model {
            tracing::info!(model = input.model_name, "using matching model");
            "controller_model.rs.tmpl"
        } else {
            "controller.rs.tmpl"
        };
        let ctx = context::controller_context(input.schema, input.api_prefix(), has_model);
        emit(input, self.kind(), template, &ctx)
    }
}

/// Route table renderer
#[derive(Debug, Default, Clone, Copy)]
pub struct RouterRenderer;

impl Renderer for RouterRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Router
    }

    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutcome, GenproError> {
        let pkg_path = context::crate_name(&input.config.output_root);
        let ctx = context::router_context(input.schema, input.api_prefix(), &pkg_path);
        emit(input, self.kind(), "router.rs.tmpl", &ctx)
    }
}

/// SQL migration renderer
#[derive(Debug, Default, Clone, Copy)]
pub struct MigrationRenderer;

impl Renderer for MigrationRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Migration
    }

    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutcome, GenproError> {
        let ctx = context::migration_context(input.schema);
        emit(input, self.kind(), "migration.sql.tmpl", &ctx)
    }
}

/// List and form component renderer
#[derive(Debug, Clone, Copy)]
pub struct ViewRenderer {
    kind: ArtifactKind,
}

impl ViewRenderer {
    /// Table view
    #[must_use]
    pub const fn list() -> Self {
        Self {
            kind: ArtifactKind::ListView,
        }
    }

    /// Create/update form
    #[must_use]
    pub const fn form() -> Self {
        Self {
            kind: ArtifactKind::FormView,
        }
    }
}

impl Renderer for ViewRenderer {
    fn kind(&self) -> ArtifactKind {
        self.kind
    }

    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutcome, GenproError> {
        let ctx = context::view_context(input.schema, self.kind, input.api_prefix());
        let template = format!("{}.tsx.tmpl", self.kind.package());
        emit(input, self.kind, &template, &ctx)
    }
}
