//! Template engine adapter
//!
//! The pipeline only depends on [`TemplateEngine`]: render a template id with
//! a JSON context, get text back. [`BundleTemplates`] implements it on top of
//! minijinja, loading files from a template bundle laid out as
//! `<bundle>/<style>/<version>/<package>/<template>`.

use super::helpers::TemplateHelpers;
use super::registry::RendererRegistry;
use crate::config::Configuration;
use crate::error::{ConfigError, TemplateError};
use minijinja::{AutoEscape, Environment, ErrorKind};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifies one template inside a style/version directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateId {
    /// Artifact kind package directory (`models`, `controllers`, ...)
    pub package: String,
    /// Template file name (`model.rs.tmpl`, ...)
    pub name: String,
}

impl TemplateId {
    /// Create a template id
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.name)
    }
}

/// Renders a template with a context
pub trait TemplateEngine {
    /// Render `id` with `context`
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::NotFound`] for a missing template and
    /// [`TemplateError::Render`] for any engine failure.
    fn render(&self, id: &TemplateId, context: &serde_json::Value) -> Result<String, TemplateError>;
}

/// minijinja environment over an on-disk template bundle
pub struct BundleTemplates {
    env: Environment<'static>,
    root: PathBuf,
}

impl fmt::Debug for BundleTemplates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleTemplates")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl BundleTemplates {
    /// Create an engine rooted at a style/version directory
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut env = Environment::new();

        // Generated sources are not HTML
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_loader(minijinja::path_loader(&root));

        env.add_filter("lowerfirst", |value: String| TemplateHelpers::lower_first(&value));
        env.add_filter("upperfirst", |value: String| TemplateHelpers::upper_first(&value));
        env.add_filter("snake", |value: String| TemplateHelpers::to_snake_case(&value));
        env.add_filter("pascal", |value: String| TemplateHelpers::to_pascal_case(&value));
        env.add_filter("title", |value: String| TemplateHelpers::title_case(&value));

        Self { env, root }
    }

    /// Create an engine for the configured bundle, style and version
    ///
    /// A style alias is looked up under the style it selects in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BundleMissing`] when the style/version directory
    /// does not exist. Fetching the bundle is left to the user.
    pub fn from_config(
        config: &Configuration,
        registry: &RendererRegistry,
    ) -> Result<Self, ConfigError> {
        let root = Self::style_root(
            &config.bundle.local_path,
            registry.canonical_style(&config.output_style),
            &config.format_version,
        );
        if !root.is_dir() {
            return Err(ConfigError::BundleMissing {
                path: root,
                url: config.bundle.url.clone(),
                reference: config.bundle.reference.clone(),
            });
        }
        tracing::debug!(root = %root.display(), "using template bundle");
        Ok(Self::new(root))
    }

    /// `<bundle>/<style>/<version>`
    #[must_use]
    pub fn style_root(bundle: &Path, style: &str, version: &str) -> PathBuf {
        bundle.join(style).join(version)
    }
}

impl TemplateEngine for BundleTemplates {
    fn render(&self, id: &TemplateId, context: &serde_json::Value) -> Result<String, TemplateError> {
        let name = id.to_string();
        tracing::debug!(template = %name, root = %self.root.display(), "rendering template");

        let template = self.env.get_template(&name).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                TemplateError::NotFound(name.clone())
            } else {
                TemplateError::Render {
                    template: name.clone(),
                    source: e,
                }
            }
        })?;

        template.render(context).map_err(|source| TemplateError::Render {
            template: name,
            source,
        })
    }
}
