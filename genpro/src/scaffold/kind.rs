//! Artifact kinds and where their output lands

use super::helpers::TemplateHelpers;
use crate::config::Configuration;
use std::fmt;
use std::path::PathBuf;

/// One category of generated output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    /// Entity struct
    Model,
    /// Request handlers
    Controller,
    /// Route table
    Router,
    /// SQL migration
    Migration,
    /// Table view component
    ListView,
    /// Create/update form component
    FormView,
}

impl ArtifactKind {
    /// Every kind, in catalogue order
    pub const ALL: [Self; 6] = [
        Self::Model,
        Self::Controller,
        Self::Router,
        Self::Migration,
        Self::ListView,
        Self::FormView,
    ];

    /// Parse a kind name, accepting the legacy plural and `ant*` spellings
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::ArtifactKind;
    /// assert_eq!(ArtifactKind::parse("model"), Some(ArtifactKind::Model));
    /// assert_eq!(ArtifactKind::parse("controllers"), Some(ArtifactKind::Controller));
    /// assert_eq!(ArtifactKind::parse("antList"), Some(ArtifactKind::ListView));
    /// assert_eq!(ArtifactKind::parse("docs"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "model" | "models" => Some(Self::Model),
            "controller" | "controllers" => Some(Self::Controller),
            "router" | "routers" => Some(Self::Router),
            "migration" | "migrations" => Some(Self::Migration),
            "list-view" | "list_view" | "list" | "antlist" => Some(Self::ListView),
            "form-view" | "form_view" | "form" | "antform" => Some(Self::FormView),
            _ => None,
        }
    }

    /// Canonical kind name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Controller => "controller",
            Self::Router => "router",
            Self::Migration => "migration",
            Self::ListView => "list-view",
            Self::FormView => "form-view",
        }
    }

    /// Package directory, used both in the template bundle and in the output tree
    #[must_use]
    pub const fn package(self) -> &'static str {
        match self {
            Self::Model => "models",
            Self::Controller => "controllers",
            Self::Router => "routers",
            Self::Migration => "migrations",
            Self::ListView => "list",
            Self::FormView => "form",
        }
    }

    /// Whether the output goes to the frontend root
    #[must_use]
    pub const fn is_view(self) -> bool {
        matches!(self, Self::ListView | Self::FormView)
    }

    /// Whether the kind needs a primary key to be meaningful
    ///
    /// The registry skips these kinds for models without one.
    #[must_use]
    pub const fn needs_primary_key(self) -> bool {
        matches!(self, Self::Controller | Self::Router)
    }

    /// Destination of the artifact for `model_name`
    ///
    /// ```text
    /// model       <outputRoot>/src/models/<lower>.rs
    /// controller  <outputRoot>/src/controllers/<lower>.rs
    /// router      <outputRoot>/src/routers/<lower>.rs
    /// migration   <outputRoot>/migrations/<lower>.sql
    /// list-view   <frontendRoot>/<model>/list.tsx
    /// form-view   <frontendRoot>/<model>/form.tsx
    /// ```
    #[must_use]
    pub fn destination(self, config: &Configuration, model_name: &str) -> PathBuf {
        let stem = TemplateHelpers::to_file_stem(model_name);
        match self {
            Self::Model | Self::Controller | Self::Router => config
                .output_root
                .join("src")
                .join(self.package())
                .join(format!("{stem}.rs")),
            Self::Migration => config
                .output_root
                .join("migrations")
                .join(format!("{stem}.sql")),
            Self::ListView | Self::FormView => config
                .frontend_root
                .join(model_name)
                .join(format!("{}.tsx", self.package())),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldSpec, GenproSettings, ModelSettings, SchemaSettings};

    fn config() -> Configuration {
        let mut settings = GenproSettings {
            output_root: PathBuf::from("/srv/app"),
            frontend_root: PathBuf::from("/srv/web/pages"),
            ..GenproSettings::default()
        };
        settings.models.insert(
            "BlogPost".into(),
            ModelSettings {
                schema: Some(SchemaSettings::Fields(vec![FieldSpec::new("title", "string")])),
                ..ModelSettings::default()
            },
        );
        Configuration::from_settings(settings).unwrap()
    }

    #[test]
    fn test_names_round_trip() {
        for kind in ArtifactKind::ALL {
            assert_eq!(ArtifactKind::parse(kind.name()), Some(kind));
            assert_eq!(ArtifactKind::parse(kind.package()), Some(kind));
        }
        assert_eq!(ArtifactKind::parse("antForm"), Some(ArtifactKind::FormView));
    }

    #[test]
    fn test_primary_key_kinds() {
        let kinds: Vec<_> = ArtifactKind::ALL
            .into_iter()
            .filter(|k| k.needs_primary_key())
            .collect();
        assert_eq!(kinds, vec![ArtifactKind::Controller, ArtifactKind::Router]);
    }

    #[test]
    fn test_destinations() {
        let config = config();
        assert_eq!(
            ArtifactKind::Model.destination(&config, "BlogPost"),
            PathBuf::from("/srv/app/src/models/blogpost.rs")
        );
        assert_eq!(
            ArtifactKind::Router.destination(&config, "BlogPost"),
            PathBuf::from("/srv/app/src/routers/blogpost.rs")
        );
        assert_eq!(
            ArtifactKind::Migration.destination(&config, "BlogPost"),
            PathBuf::from("/srv/app/migrations/blogpost.sql")
        );
        assert_eq!(
            ArtifactKind::ListView.destination(&config, "BlogPost"),
            PathBuf::from("/srv/web/pages/BlogPost/list.tsx")
        );
        assert_eq!(
            ArtifactKind::FormView.destination(&config, "BlogPost"),
            PathBuf::from("/srv/web/pages/BlogPost/form.tsx")
        );
    }
}
