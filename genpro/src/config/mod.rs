//! Configuration loading for generation runs
//!
//! Configuration is read once per invocation and is immutable afterwards.
//! Sources are merged with this precedence:
//!
//! 1. Environment variables (highest priority, `GENPRO_` prefix, `__` for nesting)
//! 2. `genpro.json` or `genpro.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! Keys are accepted in snake case, camel case, or under the legacy names used
//! by older generator configs (`proType`, `enableModule`, `sourceGen`, ...).
//! Unknown keys are ignored.
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "outputStyle": "default",
//!   "enabledKinds": "model,controller,router",
//!   "apiPathPrefix": "/api",
//!   "outputRoot": ".",
//!   "models": {
//!     "post": {
//!       "schemaSource": "text",
//!       "schema": [
//!         { "name": "title", "type": "string:64", "comment": "Title" },
//!         { "name": "body", "type": "text" }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use genpro::config::Configuration;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Configuration::load("genpro.json")?;
//! for (name, model) in &config.models {
//!     println!("{name}: {:?}", model.source);
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File names probed by [`Configuration::discover`], in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["genpro.json", "genpro.toml"];

/// One declared field of a text-sourced model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as written by the user
    pub name: String,
    /// Raw type token such as `string:64`, `datetime`, `pk`
    #[serde(rename = "type")]
    pub declared_type: String,
    /// Optional human label
    #[serde(default)]
    pub comment: String,
}

impl FieldSpec {
    /// Create a field spec without a comment
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            comment: String::new(),
        }
    }

    /// Attach a display comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Schema as written in a config file: a field list or a `name:type,...` string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaSettings {
    /// Structured field list
    Fields(Vec<FieldSpec>),
    /// Single-string form parsed by [`crate::scaffold::parse_field_list`]
    Inline(String),
}

/// Per-model settings as written in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Field list, required for text-sourced models
    pub schema: Option<SchemaSettings>,

    /// `text` or `database`
    #[serde(alias = "schemaSource", alias = "sourceGen")]
    pub schema_source: Option<String>,

    /// Overrides the global API prefix for this model
    #[serde(alias = "apiPathPrefix", alias = "apiPrefix")]
    pub api_path_prefix: Option<String>,

    /// Catalog table to introspect when it differs from the model name
    pub table: Option<String>,
}

/// Raw settings merged from every configuration source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenproSettings {
    /// Renderer binding set to use
    #[serde(alias = "outputStyle", alias = "proType")]
    pub output_style: String,

    /// Template bundle layout version
    #[serde(alias = "formatVersion", alias = "proVersion")]
    pub format_version: String,

    /// Comma-joined artifact kinds; empty means every kind the style binds
    ///
    /// A JSON/TOML array is accepted and joined.
    #[serde(
        alias = "enabledKinds",
        alias = "enableModule",
        deserialize_with = "joined_kinds"
    )]
    pub enabled_kinds: String,

    /// Database driver for database-sourced models
    pub driver: String,

    /// Database connection string
    pub dsn: String,

    /// Default API prefix for generated routes
    #[serde(alias = "apiPathPrefix", alias = "apiPrefix")]
    pub api_path_prefix: String,

    /// Root of the backend project receiving generated files
    #[serde(alias = "outputRoot", alias = "beegoPath")]
    pub output_root: PathBuf,

    /// Root of the frontend project receiving UI views
    #[serde(alias = "frontendRoot", alias = "antDesignPath")]
    pub frontend_root: PathBuf,

    /// Remote location of the template bundle
    #[serde(alias = "templateBundleURL", alias = "templateBundleUrl", alias = "url")]
    pub template_bundle_url: String,

    /// Branch or tag of the template bundle
    #[serde(alias = "templateBundleRef", alias = "branch")]
    pub template_bundle_ref: String,

    /// Local checkout of the template bundle
    #[serde(alias = "templateBundleLocalPath", alias = "gitPath")]
    pub template_bundle_local_path: Option<PathBuf>,

    /// Back up and replace files that already exist
    #[serde(alias = "overwriteExisting", alias = "overwrite")]
    pub overwrite_existing: bool,

    /// Declared models keyed by name
    pub models: BTreeMap<String, ModelSettings>,
}

impl Default for GenproSettings {
    fn default() -> Self {
        Self {
            output_style: "default".to_string(),
            format_version: "v1".to_string(),
            enabled_kinds: String::new(),
            driver: String::new(),
            dsn: String::new(),
            api_path_prefix: "/".to_string(),
            output_root: PathBuf::from("."),
            frontend_root: PathBuf::from("./web/src/pages"),
            template_bundle_url: String::new(),
            template_bundle_ref: "main".to_string(),
            template_bundle_local_path: None,
            overwrite_existing: false,
            models: BTreeMap::new(),
        }
    }
}

/// Database connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    /// Driver name (`mysql`, `postgres`, `sqlite`, ...)
    pub driver: String,
    /// Connection string
    pub dsn: String,
}

/// Where a model's fields come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Literal field list from the configuration
    Text(Vec<FieldSpec>),
    /// Unparsed `name:type,...` field list, parsed when the model is resolved
    Inline(String),
    /// Introspected from a live catalog
    Database(ConnectionDescriptor),
}

/// Validated declaration of one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDeclaration {
    /// Schema source and the data it needs
    pub source: SchemaSource,
    /// Per-model API prefix override
    pub api_path_prefix: Option<String>,
    /// Catalog table name override
    pub table: Option<String>,
}

impl ModelDeclaration {
    /// Text-sourced declaration without overrides
    #[must_use]
    pub const fn text(fields: Vec<FieldSpec>) -> Self {
        Self {
            source: SchemaSource::Text(fields),
            api_path_prefix: None,
            table: None,
        }
    }
}

/// Where the template bundle lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBundle {
    /// Remote location, informational only
    pub url: String,
    /// Remote branch or tag, informational only
    pub reference: String,
    /// Local directory holding `<style>/<version>/...`
    pub local_path: PathBuf,
}

impl TemplateBundle {
    /// Default local bundle directory under the user cache
    #[must_use]
    pub fn default_local_path() -> PathBuf {
        dirs::cache_dir().map_or_else(
            || PathBuf::from("./.genpro/bundle"),
            |cache| cache.join("genpro").join("bundle"),
        )
    }
}

/// Validated, immutable configuration for one run
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Renderer binding set to use
    pub output_style: String,
    /// Template bundle layout version
    pub format_version: String,
    /// Artifact kinds to generate, in configured order; empty means all bound kinds
    pub enabled_kinds: Vec<String>,
    /// Connection shared by all database-sourced models
    pub connection: Option<ConnectionDescriptor>,
    /// Backend project root
    pub output_root: PathBuf,
    /// Frontend project root
    pub frontend_root: PathBuf,
    /// Default API prefix
    pub api_path_prefix: String,
    /// Back up and replace existing files
    pub overwrite_existing: bool,
    /// Template bundle location
    pub bundle: TemplateBundle,
    /// Models keyed by name, iterated in name order
    pub models: BTreeMap<String, ModelDeclaration>,
}

impl Configuration {
    /// Load configuration from a JSON or TOML file, then environment overrides
    ///
    /// Files ending in `.toml` are read as TOML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed, or if the merged
    /// settings fail validation (see [`Configuration::from_settings`]).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let figment = if path.extension().is_some_and(|ext| ext == "toml") {
            Figment::new().merge(Toml::file(path))
        } else {
            Figment::new().merge(Json::file(path))
        };
        let settings: GenproSettings = figment
            .merge(Env::prefixed("GENPRO_").split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_settings(settings)
    }

    /// Find the first existing config file name in `dir`
    #[must_use]
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Validate raw settings into a run configuration
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingOutputStyle`] if the style is blank
    /// - [`ConfigError::NoModels`] if no model is declared
    /// - [`ConfigError::MissingSchema`] if a text model has no `schema`
    /// - [`ConfigError::MissingConnection`] if a database model lacks `driver`/`dsn`
    /// - [`ConfigError::UnknownSchemaSource`] for any other source tag
    pub fn from_settings(settings: GenproSettings) -> Result<Self, ConfigError> {
        let output_style = settings.output_style.trim().to_string();
        if output_style.is_empty() {
            return Err(ConfigError::MissingOutputStyle);
        }
        if settings.models.is_empty() {
            return Err(ConfigError::NoModels);
        }

        let connection = (!settings.driver.trim().is_empty() && !settings.dsn.trim().is_empty())
            .then(|| ConnectionDescriptor {
                driver: settings.driver.trim().to_lowercase(),
                dsn: settings.dsn.clone(),
            });

        let models = settings
            .models
            .into_iter()
            .map(|(name, model)| {
                let declaration = Self::declaration(&name, model, connection.as_ref())?;
                Ok((name, declaration))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let format_version = if settings.format_version.trim().is_empty() {
            "v1".to_string()
        } else {
            settings.format_version.trim().to_string()
        };

        Ok(Self {
            output_style,
            format_version,
            enabled_kinds: split_kinds(&settings.enabled_kinds),
            connection,
            output_root: settings.output_root,
            frontend_root: settings.frontend_root,
            api_path_prefix: settings.api_path_prefix,
            overwrite_existing: settings.overwrite_existing,
            bundle: TemplateBundle {
                url: settings.template_bundle_url,
                reference: settings.template_bundle_ref,
                local_path: settings
                    .template_bundle_local_path
                    .unwrap_or_else(TemplateBundle::default_local_path),
            },
            models,
        })
    }

    fn declaration(
        name: &str,
        model: ModelSettings,
        connection: Option<&ConnectionDescriptor>,
    ) -> Result<ModelDeclaration, ConfigError> {
        let tag = model
            .schema_source
            .as_deref()
            .map_or_else(|| "text".to_string(), |tag| tag.trim().to_lowercase());

        let source = match tag.as_str() {
            "text" => match model.schema {
                None => return Err(ConfigError::MissingSchema(name.to_string())),
                Some(SchemaSettings::Fields(fields)) => SchemaSource::Text(fields),
                Some(SchemaSettings::Inline(raw)) => SchemaSource::Inline(raw),
            },
            "database" => SchemaSource::Database(
                connection
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingConnection(name.to_string()))?,
            ),
            _ => {
                return Err(ConfigError::UnknownSchemaSource {
                    model: name.to_string(),
                    source_tag: tag,
                })
            }
        };

        Ok(ModelDeclaration {
            source,
            api_path_prefix: model.api_path_prefix,
            table: model.table,
        })
    }

    /// Effective API prefix for a model
    #[must_use]
    pub fn api_prefix_for<'a>(&'a self, declaration: &'a ModelDeclaration) -> &'a str {
        declaration
            .api_path_prefix
            .as_deref()
            .unwrap_or(&self.api_path_prefix)
    }

    /// Whether any declared model needs a database connection
    #[must_use]
    pub fn uses_database(&self) -> bool {
        self.models
            .values()
            .any(|model| matches!(model.source, SchemaSource::Database(_)))
    }
}

fn joined_kinds<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Kinds {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match Kinds::deserialize(deserializer)? {
        Kinds::Joined(joined) => joined,
        Kinds::List(list) => list.join(","),
    })
}

fn split_kinds(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|kind| !kind.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let settings = GenproSettings::default();
        assert_eq!(settings.output_style, "default");
        assert_eq!(settings.format_version, "v1");
        assert_eq!(settings.api_path_prefix, "/");
        assert!(!settings.overwrite_existing);
        assert!(settings.models.is_empty());
    }

    #[test]
    fn test_load_json_with_camel_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "genpro.json",
            r#"{
                "outputStyle": "richUI",
                "enabledKinds": "model, controller ,list-view",
                "apiPathPrefix": "/api",
                "overwriteExisting": true,
                "someFutureKey": 42,
                "models": {
                    "post": {
                        "schemaSource": "text",
                        "schema": [
                            {"name": "title", "type": "string:64", "comment": "Title"},
                            {"name": "body", "type": "text"}
                        ]
                    }
                }
            }"#,
        );

        let config = Configuration::load(&path).unwrap();
        assert_eq!(config.output_style, "richUI");
        assert_eq!(config.enabled_kinds, vec!["model", "controller", "list-view"]);
        assert_eq!(config.api_path_prefix, "/api");
        assert!(config.overwrite_existing);

        let post = &config.models["post"];
        let SchemaSource::Text(fields) = &post.source else {
            panic!("expected text source");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].comment, "Title");
        assert!(fields[1].comment.is_empty());
    }

    #[test]
    fn test_load_legacy_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "genpro.json",
            r#"{
                "proType": "antDesign",
                "proVersion": "v1",
                "enableModule": "models,antList",
                "apiPrefix": "/v1",
                "beegoPath": "./backend",
                "antDesignPath": "./frontend/pages",
                "gitPath": "/tmp/bundle",
                "overwrite": true,
                "models": {
                    "user": {"sourceGen": "text", "schema": "name:string,age:int", "apiPrefix": "/admin"}
                }
            }"#,
        );

        let config = Configuration::load(&path).unwrap();
        assert_eq!(config.output_style, "antDesign");
        assert_eq!(config.enabled_kinds, vec!["models", "antList"]);
        assert_eq!(config.output_root, PathBuf::from("./backend"));
        assert_eq!(config.frontend_root, PathBuf::from("./frontend/pages"));
        assert_eq!(config.bundle.local_path, PathBuf::from("/tmp/bundle"));

        let user = &config.models["user"];
        assert_eq!(config.api_prefix_for(user), "/admin");
        assert_eq!(
            user.source,
            SchemaSource::Inline("name:string,age:int".to_string())
        );
    }

    #[test]
    fn test_enabled_kinds_as_array() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "genpro.json",
            r#"{
                "enabledKinds": ["model", "controller"],
                "models": {"post": {"schema": "title:string"}}
            }"#,
        );

        let config = Configuration::load(&path).unwrap();
        assert_eq!(config.enabled_kinds, vec!["model", "controller"]);
    }

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "genpro.toml",
            r#"
            output_style = "default"
            driver = "MySQL"
            dsn = "mysql://root@localhost/blog"

            [models.post]
            schema_source = "database"
            table = "posts"
            "#,
        );

        let config = Configuration::load(&path).unwrap();
        let post = &config.models["post"];
        assert_eq!(post.table.as_deref(), Some("posts"));
        assert_eq!(
            post.source,
            SchemaSource::Database(ConnectionDescriptor {
                driver: "mysql".to_string(),
                dsn: "mysql://root@localhost/blog".to_string(),
            })
        );
        assert!(config.uses_database());
    }

    #[test]
    fn test_validation_errors() {
        let settings = GenproSettings::default();
        assert!(matches!(
            Configuration::from_settings(settings),
            Err(ConfigError::NoModels)
        ));

        let mut settings = GenproSettings {
            output_style: "  ".to_string(),
            ..GenproSettings::default()
        };
        settings.models.insert("post".into(), ModelSettings::default());
        assert!(matches!(
            Configuration::from_settings(settings.clone()),
            Err(ConfigError::MissingOutputStyle)
        ));

        settings.output_style = "default".to_string();
        assert!(matches!(
            Configuration::from_settings(settings.clone()),
            Err(ConfigError::MissingSchema(name)) if name == "post"
        ));

        settings.models.get_mut("post").unwrap().schema_source = Some("database".into());
        assert!(matches!(
            Configuration::from_settings(settings.clone()),
            Err(ConfigError::MissingConnection(_))
        ));

        settings.models.get_mut("post").unwrap().schema_source = Some("yaml".into());
        assert!(matches!(
            Configuration::from_settings(settings),
            Err(ConfigError::UnknownSchemaSource { source_tag, .. }) if source_tag == "yaml"
        ));
    }

    #[test]
    fn test_empty_schema_list_is_left_to_the_resolver() {
        let mut settings = GenproSettings::default();
        settings.models.insert(
            "empty".into(),
            ModelSettings {
                schema: Some(SchemaSettings::Fields(Vec::new())),
                ..ModelSettings::default()
            },
        );
        let config = Configuration::from_settings(settings).unwrap();
        assert_eq!(config.models["empty"].source, SchemaSource::Text(Vec::new()));
    }

    #[test]
    fn test_malformed_inline_schema_is_left_to_the_resolver() {
        let mut settings = GenproSettings::default();
        for (name, raw) in [("good", "title:string"), ("bad", "title:string,body")] {
            settings.models.insert(
                name.into(),
                ModelSettings {
                    schema: Some(SchemaSettings::Inline(raw.into())),
                    ..ModelSettings::default()
                },
            );
        }

        let config = Configuration::from_settings(settings).unwrap();
        assert_eq!(
            config.models["bad"].source,
            SchemaSource::Inline("title:string,body".to_string())
        );
    }

    #[test]
    fn test_discover() {
        let dir = TempDir::new().unwrap();
        assert!(Configuration::discover(dir.path()).is_none());
        write(&dir, "genpro.toml", "");
        assert_eq!(
            Configuration::discover(dir.path()),
            Some(dir.path().join("genpro.toml"))
        );
    }
}
