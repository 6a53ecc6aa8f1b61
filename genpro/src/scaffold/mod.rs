//! Code generation pipeline
//!
//! Schema resolution, template rendering and file materialization for every
//! artifact kind. [`RendererRegistry::run`] is the entry point; the other
//! types are exposed for custom renderers and template engines.

pub mod context;
pub mod field_type;
pub mod format;
pub mod helpers;
pub mod introspect;
pub mod kind;
pub mod materialize;
pub mod registry;
pub mod renderers;
pub mod schema;
pub mod templates;

pub use field_type::{map_type, parse_field_list, Annotation, MappedType};
pub use introspect::{CatalogColumn, Dialect, SqlxTableReader, TableReader};
pub use kind::ArtifactKind;
pub use materialize::{FileWriter, WriteOutcome};
pub use registry::{Failure, RegistryBuilder, RendererRegistry, RunReport, Skip};
pub use renderers::{
    ControllerRenderer, MigrationRenderer, ModelRenderer, RenderInput, RenderOutcome, Renderer,
    RouterRenderer, ViewRenderer,
};
pub use schema::{ModelSchema, ResolvedColumn, SchemaResolver};
pub use templates::{BundleTemplates, TemplateEngine, TemplateId};
