//! Render dispatch registry
//!
//! Maps an output style to its artifact kind → [`Renderer`] bindings and
//! drives a run: every enabled kind, in configured order, for every declared
//! model, in name order.
//!
//! # Example
//!
//! ```rust,no_run
//! use genpro::prelude::*;
//! use genpro::scaffold::{ModelRenderer, MigrationRenderer};
//!
//! # fn example(config: &Configuration, engine: &BundleTemplates) -> Result<(), GenproError> {
//! let registry = RendererRegistry::builder()
//!     .register("minimal", Box::new(ModelRenderer))
//!     .register("minimal", Box::new(MigrationRenderer))
//!     .build();
//!
//! let report = registry.run(config, engine, None)?;
//! println!("{} files written", report.written.len());
//! # Ok(())
//! # }
//! ```

use super::introspect::{Dialect, TableReader};
use super::kind::ArtifactKind;
use super::materialize::FileWriter;
use super::renderers::{
    ControllerRenderer, MigrationRenderer, ModelRenderer, RenderInput, RenderOutcome, Renderer,
    RouterRenderer, ViewRenderer,
};
use super::schema::{ModelSchema, SchemaResolver};
use super::templates::TemplateEngine;
use crate::config::{Configuration, SchemaSource};
use crate::error::{ConfigError, GenproError, SchemaError};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Style with backend artifacts only
pub const DEFAULT_STYLE: &str = "default";

/// Style with backend artifacts plus UI views
pub const RICH_UI_STYLE: &str = "richUI";

type Bindings = BTreeMap<ArtifactKind, Box<dyn Renderer>>;

/// A (kind, model) pair skipped by policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Model name
    pub model: String,
    /// Why it was skipped
    pub reason: String,
}

/// A (kind, model) pair that failed
#[derive(Debug)]
pub struct Failure {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Model name
    pub model: String,
    /// Destination that was not written
    pub path: PathBuf,
    /// What went wrong
    pub error: GenproError,
}

/// Outcome of a run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files written, in generation order
    pub written: Vec<PathBuf>,
    /// Backups taken of replaced files
    pub backups: Vec<PathBuf>,
    /// Policy skips
    pub skipped: Vec<Skip>,
    /// Per-pair failures
    pub failures: Vec<Failure>,
}

impl RunReport {
    /// Whether every pair either succeeded or was skipped by policy
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builder for [`RendererRegistry`]
#[derive(Default)]
pub struct RegistryBuilder {
    styles: BTreeMap<String, Bindings>,
    aliases: BTreeMap<String, String>,
}

impl RegistryBuilder {
    /// Bind `renderer` to `style` under the renderer's own kind
    ///
    /// A later registration for the same (style, kind) replaces the earlier one.
    #[must_use]
    pub fn register(mut self, style: &str, renderer: Box<dyn Renderer>) -> Self {
        self.styles
            .entry(style.to_string())
            .or_default()
            .insert(renderer.kind(), renderer);
        self
    }

    /// Make `alias` select the same bindings as `style`
    #[must_use]
    pub fn alias(mut self, alias: &str, style: &str) -> Self {
        self.aliases.insert(alias.to_string(), style.to_string());
        self
    }

    /// Freeze the bindings
    #[must_use]
    pub fn build(self) -> RendererRegistry {
        RendererRegistry {
            styles: self.styles,
            aliases: self.aliases,
        }
    }
}

/// Immutable table of renderer bindings
pub struct RendererRegistry {
    styles: BTreeMap<String, Bindings>,
    aliases: BTreeMap<String, String>,
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let styles: BTreeMap<_, Vec<_>> = self
            .styles
            .iter()
            .map(|(style, bindings)| (style, bindings.keys().collect()))
            .collect();
        f.debug_struct("RendererRegistry")
            .field("styles", &styles)
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl RendererRegistry {
    /// Start an empty registry
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry with the stock styles
    ///
    /// - `default`: model, controller, router
    /// - `richUI` (alias `antDesign`): all six kinds
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut builder = Self::builder();
        for style in [DEFAULT_STYLE, RICH_UI_STYLE] {
            builder = builder
                .register(style, Box::new(ModelRenderer))
                .register(style, Box::new(ControllerRenderer))
                .register(style, Box::new(RouterRenderer));
        }
        builder
            .register(RICH_UI_STYLE, Box::new(MigrationRenderer))
            .register(RICH_UI_STYLE, Box::new(ViewRenderer::list()))
            .register(RICH_UI_STYLE, Box::new(ViewRenderer::form()))
            .alias("antDesign", RICH_UI_STYLE)
            .build()
    }

    /// Registered style names, aliases excluded
    pub fn styles(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    /// Aliases and the style each one selects
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, s)| (a.as_str(), s.as_str()))
    }

    /// Kinds bound for `style` (or an alias of it), in catalogue order
    #[must_use]
    pub fn bound_kinds(&self, style: &str) -> Option<Vec<ArtifactKind>> {
        self.bindings(style).map(|b| b.keys().copied().collect())
    }

    /// Style an alias selects; any other name is returned unchanged
    ///
    /// Template bundles are laid out under canonical style names only.
    #[must_use]
    pub fn canonical_style<'a>(&'a self, style: &'a str) -> &'a str {
        self.aliases.get(style).map_or(style, String::as_str)
    }

    fn bindings(&self, style: &str) -> Option<&Bindings> {
        self.styles.get(self.canonical_style(style))
    }

    /// Kinds to run: configured names that parse and are bound, deduplicated
    fn planned_kinds(config: &Configuration, bindings: &Bindings) -> Vec<ArtifactKind> {
        if config.enabled_kinds.is_empty() {
            return bindings.keys().copied().collect();
        }
        let mut planned = Vec::new();
        for name in &config.enabled_kinds {
            match ArtifactKind::parse(name) {
                Some(kind) if bindings.contains_key(&kind) => {
                    if !planned.contains(&kind) {
                        planned.push(kind);
                    }
                }
                _ => tracing::debug!(kind = %name, style = %config.output_style, "kind not bound, skipping"),
            }
        }
        planned
    }

    /// Generate every enabled kind for every declared model
    ///
    /// Per-pair failures are collected in the report and do not stop the run.
    ///
    /// # Errors
    ///
    /// Fails before touching any model with [`ConfigError::UnknownOutputStyle`]
    /// when the style has no bindings, or [`SchemaError::UnsupportedDriver`]
    /// when a database-sourced model uses a driver without a translation table.
    pub fn run(
        &self,
        config: &Configuration,
        engine: &dyn TemplateEngine,
        reader: Option<Box<dyn TableReader>>,
    ) -> Result<RunReport, GenproError> {
        let bindings = self
            .bindings(&config.output_style)
            .ok_or_else(|| ConfigError::UnknownOutputStyle(config.output_style.clone()))?;

        for declaration in config.models.values() {
            if let SchemaSource::Database(connection) = &declaration.source {
                Dialect::require(&connection.driver)?;
            }
        }

        let kinds = Self::planned_kinds(config, bindings);
        tracing::info!(
            style = %config.output_style,
            kinds = ?kinds.iter().map(|k| k.name()).collect::<Vec<_>>(),
            models = config.models.len(),
            "starting generation"
        );

        let writer = FileWriter::new(config.overwrite_existing);
        let mut resolver = SchemaResolver::new(reader);
        let mut schemas: BTreeMap<&str, Result<ModelSchema, SchemaError>> = BTreeMap::new();
        let mut report = RunReport::default();

        for kind in kinds {
            let Some(renderer) = bindings.get(&kind) else {
                continue;
            };
            for (model_name, declaration) in &config.models {
                let path = kind.destination(config, model_name);
                let schema = schemas
                    .entry(model_name.as_str())
                    .or_insert_with(|| resolver.resolve(model_name, declaration));

                let result = match schema {
                    Ok(schema) if kind.needs_primary_key() && schema.primary_key.is_none() => {
                        tracing::info!(kind = %kind, model = %model_name, "model has no primary key, skipping");
                        Ok(RenderOutcome::Skipped {
                            reason: "model has no primary key".to_string(),
                        })
                    }
                    Ok(schema) => renderer.render(&RenderInput {
                        config,
                        engine,
                        writer,
                        model_name,
                        declaration,
                        schema,
                    }),
                    Err(err) if err.is_fatal() => return Err(err.clone().into()),
                    Err(err) => Err(err.clone().into()),
                };

                match result {
                    Ok(RenderOutcome::Written { path, backup }) => {
                        report.written.push(path);
                        report.backups.extend(backup);
                    }
                    Ok(RenderOutcome::Skipped { reason }) => report.skipped.push(Skip {
                        kind,
                        model: model_name.clone(),
                        reason,
                    }),
                    Err(error) if error.is_fatal() => return Err(error),
                    Err(error) => {
                        tracing::error!(
                            kind = %kind,
                            model = %model_name,
                            path = %path.display(),
                            error = %error,
                            "generation failed"
                        );
                        report.failures.push(Failure {
                            kind,
                            model: model_name.clone(),
                            path,
                            error,
                        });
                    }
                }
            }
        }

        tracing::info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "generation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionDescriptor, FieldSpec, GenproSettings, ModelSettings, SchemaSettings};
    use crate::error::TemplateError;
    use crate::scaffold::introspect::CatalogColumn;
    use crate::scaffold::templates::TemplateId;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Renders every template as a comment naming it
    #[derive(Default)]
    struct EchoEngine {
        rendered: RefCell<Vec<String>>,
    }

    impl TemplateEngine for EchoEngine {
        fn render(&self, id: &TemplateId, context: &serde_json::Value) -> Result<String, TemplateError> {
            self.rendered.borrow_mut().push(id.to_string());
            let name = context["name"].as_str().unwrap_or_default();
            Ok(format!("// {id} for {name}\n"))
        }
    }

    struct FakeCatalog(HashMap<String, Vec<CatalogColumn>>);

    impl TableReader for FakeCatalog {
        fn read_table(&mut self, table: &str) -> Result<Option<Vec<CatalogColumn>>, SchemaError> {
            Ok(self.0.get(table).cloned())
        }
    }

    fn settings(dir: &TempDir, style: &str, kinds: &str) -> GenproSettings {
        let mut settings = GenproSettings {
            output_style: style.to_string(),
            enabled_kinds: kinds.to_string(),
            output_root: dir.path().join("app"),
            frontend_root: dir.path().join("web"),
            ..GenproSettings::default()
        };
        settings.models.insert(
            "post".into(),
            ModelSettings {
                schema: Some(SchemaSettings::Fields(vec![
                    FieldSpec::new("title", "string:64"),
                    FieldSpec::new("body", "text"),
                ])),
                ..ModelSettings::default()
            },
        );
        settings
    }

    #[test]
    fn test_default_bindings() {
        let registry = RendererRegistry::with_defaults();
        assert_eq!(
            registry.bound_kinds("default").unwrap(),
            vec![ArtifactKind::Model, ArtifactKind::Controller, ArtifactKind::Router]
        );
        assert_eq!(registry.bound_kinds("richUI").unwrap(), ArtifactKind::ALL.to_vec());
        assert_eq!(registry.bound_kinds("antDesign"), registry.bound_kinds("richUI"));
        assert_eq!(registry.canonical_style("antDesign"), "richUI");
        assert_eq!(registry.canonical_style("default"), "default");
        assert_eq!(registry.canonical_style("fancy"), "fancy");
        assert!(registry.bound_kinds("fancy").is_none());
    }

    #[test]
    fn test_unknown_style_fails_before_any_model() {
        let dir = TempDir::new().unwrap();
        let config = Configuration::from_settings(settings(&dir, "fancy", "model")).unwrap();
        let engine = EchoEngine::default();

        let err = RendererRegistry::with_defaults()
            .run(&config, &engine, None)
            .unwrap_err();

        assert!(matches!(err, GenproError::Config(ConfigError::UnknownOutputStyle(s)) if s == "fancy"));
        assert!(engine.rendered.borrow().is_empty());
        assert!(!dir.path().join("app").exists());
    }

    #[test]
    fn test_runs_enabled_kinds_in_order_and_skips_unbound() {
        let dir = TempDir::new().unwrap();
        let config =
            Configuration::from_settings(settings(&dir, "default", "controller,docs,model,migration,model"))
                .unwrap();
        let engine = EchoEngine::default();

        let report = RendererRegistry::with_defaults()
            .run(&config, &engine, None)
            .unwrap();

        assert!(report.is_success());
        assert_eq!(
            *engine.rendered.borrow(),
            vec!["controllers/controller.rs.tmpl", "models/model.rs.tmpl"]
        );
        assert_eq!(report.written.len(), 2);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_empty_kind_list_runs_all_bound_kinds() {
        let dir = TempDir::new().unwrap();
        let config = Configuration::from_settings(settings(&dir, "antDesign", "")).unwrap();
        let engine = EchoEngine::default();

        let report = RendererRegistry::with_defaults()
            .run(&config, &engine, None)
            .unwrap();

        assert_eq!(report.written.len(), 6);
        // The model was written first, so the controller picks the model-aware template
        assert!(engine
            .rendered
            .borrow()
            .contains(&"controllers/controller_model.rs.tmpl".to_string()));
    }

    #[test]
    fn test_bad_model_does_not_block_others() {
        let dir = TempDir::new().unwrap();
        let mut raw = settings(&dir, "default", "model");
        raw.models.insert(
            "broken".into(),
            ModelSettings {
                schema: Some(SchemaSettings::Fields(vec![FieldSpec::new("x", "varchar")])),
                ..ModelSettings::default()
            },
        );
        let config = Configuration::from_settings(raw).unwrap();

        let report = RendererRegistry::with_defaults()
            .run(&config, &EchoEngine::default(), None)
            .unwrap();

        assert_eq!(report.written.len(), 1);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.model, "broken");
        assert_eq!(failure.kind, ArtifactKind::Model);
        assert!(failure.path.ends_with("src/models/broken.rs"));
        assert!(matches!(failure.error, GenproError::Schema(SchemaError::MalformedFieldSpec { .. })));
    }

    #[test]
    fn test_unparsable_inline_schema_fails_only_its_model() {
        let dir = TempDir::new().unwrap();
        let mut raw = settings(&dir, "default", "model");
        raw.models.insert(
            "comment".into(),
            ModelSettings {
                schema: Some(SchemaSettings::Inline("author:string,body".into())),
                ..ModelSettings::default()
            },
        );
        let config = Configuration::from_settings(raw).unwrap();

        let report = RendererRegistry::with_defaults()
            .run(&config, &EchoEngine::default(), None)
            .unwrap();

        assert_eq!(report.written, vec![dir.path().join("app/src/models/post.rs")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].model, "comment");
        assert!(matches!(
            &report.failures[0].error,
            GenproError::Schema(SchemaError::MalformedFieldSpec { spec, .. }) if spec == "body"
        ));
    }

    fn database_settings(dir: &TempDir, driver: &str) -> GenproSettings {
        let mut raw = settings(dir, "default", "model,controller,router");
        raw.models.clear();
        raw.driver = driver.to_string();
        raw.dsn = "ignored".to_string();
        raw.models.insert(
            "audit".into(),
            ModelSettings {
                schema_source: Some("database".into()),
                ..ModelSettings::default()
            },
        );
        raw
    }

    #[test]
    fn test_missing_primary_key_skips_controller_and_router() {
        let dir = TempDir::new().unwrap();
        let config = Configuration::from_settings(database_settings(&dir, "mysql")).unwrap();
        let mut tables = HashMap::new();
        tables.insert(
            "audit".to_string(),
            vec![CatalogColumn::new("message", "text")],
        );

        let engine = EchoEngine::default();
        let report = RendererRegistry::with_defaults()
            .run(&config, &engine, Some(Box::new(FakeCatalog(tables))))
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.written.len(), 1);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.kind).collect();
        assert_eq!(skipped, vec![ArtifactKind::Controller, ArtifactKind::Router]);
        assert!(report.skipped.iter().all(|s| s.reason == "model has no primary key"));
        assert_eq!(*engine.rendered.borrow(), vec!["models/model.rs.tmpl".to_string()]);
    }

    #[test]
    fn test_unsupported_driver_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = Configuration::from_settings(database_settings(&dir, "oracle")).unwrap();
        assert_eq!(
            config.connection,
            Some(ConnectionDescriptor {
                driver: "oracle".into(),
                dsn: "ignored".into()
            })
        );

        let engine = EchoEngine::default();
        let err = RendererRegistry::with_defaults()
            .run(&config, &engine, None)
            .unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(err, GenproError::Schema(SchemaError::UnsupportedDriver(_))));
        assert!(engine.rendered.borrow().is_empty());
    }

    #[test]
    fn test_custom_registry() {
        let dir = TempDir::new().unwrap();
        let config = Configuration::from_settings(settings(&dir, "minimal", "")).unwrap();
        let registry = RendererRegistry::builder()
            .register("minimal", Box::new(MigrationRenderer))
            .build();

        let report = registry.run(&config, &EchoEngine::default(), None).unwrap();
        assert_eq!(report.written, vec![dir.path().join("app/migrations/post.sql")]);
    }
}
