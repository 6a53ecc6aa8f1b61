//! Canonical model schema and its two resolvers
//!
//! Whatever the source, a model resolves to a [`ModelSchema`]: an ordered
//! list of [`ResolvedColumn`]s plus the primary key and the chrono import
//! flag. Renderers only ever see this shape.

use super::field_type::{map_type, parse_field_list, Annotation, MappedType};
use super::helpers::TemplateHelpers;
use super::introspect::{CatalogColumn, Dialect, TableReader};
use crate::config::{FieldSpec, ModelDeclaration, SchemaSource};
use crate::error::SchemaError;
use serde::Serialize;
use std::collections::BTreeSet;

/// Name of the synthesized primary key column
pub const IMPLICIT_ID: &str = "Id";

/// One column of a resolved model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    /// Upper camel case field name (`title` → `Title`)
    pub name: String,
    /// Storage column name
    pub column: String,
    /// Rust type of the generated field, without `Option`
    pub target_type: String,
    /// Persistence annotation
    #[serde(serialize_with = "serialize_display")]
    pub annotation: Annotation,
    /// SQL column type for migrations
    pub sql_type: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// UI label: the comment, or the name when there is none
    pub display_label: String,
}

fn serialize_display<S: serde::Serializer>(
    annotation: &Annotation,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(annotation)
}

impl ResolvedColumn {
    fn from_mapped(name: &str, mapped: &MappedType, nullable: bool, comment: &str) -> Self {
        let pascal = TemplateHelpers::to_pascal_case(name);
        let display_label = if comment.trim().is_empty() {
            pascal.clone()
        } else {
            comment.trim().to_string()
        };
        Self {
            name: pascal,
            column: name.to_string(),
            target_type: mapped.target_type.to_string(),
            annotation: mapped.annotation,
            sql_type: mapped.sql_type(),
            nullable,
            display_label,
        }
    }

    /// Field identifier in the generated struct
    #[must_use]
    pub fn field_name(&self) -> String {
        TemplateHelpers::to_snake_case(&self.name)
    }

    /// Full Rust type including `Option` for nullable columns
    #[must_use]
    pub fn rust_type(&self) -> String {
        if self.nullable {
            format!("Option<{}>", self.target_type)
        } else {
            self.target_type.clone()
        }
    }
}

/// Canonical schema of one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSchema {
    /// Model name as declared
    pub model_name: String,
    /// Storage table name
    pub table_name: String,
    /// Name of the primary key column, if the source supplied one
    pub primary_key: Option<String>,
    /// Columns in generation order
    pub columns: Vec<ResolvedColumn>,
    /// Whether any column is a chrono type
    pub needs_time_import: bool,
}

impl ModelSchema {
    fn new(
        model_name: &str,
        table_name: String,
        columns: Vec<ResolvedColumn>,
        id_by_name: bool,
    ) -> Self {
        // Text sources follow the ORM convention that a field named `id` is the key
        let primary_key = columns
            .iter()
            .find(|c| c.annotation.is_primary_key())
            .or_else(|| {
                columns
                    .iter()
                    .find(|c| id_by_name && c.name.eq_ignore_ascii_case("id"))
            })
            .map(|c| c.name.clone());
        let needs_time_import = columns
            .iter()
            .any(|c| matches!(c.target_type.as_str(), "NaiveDateTime" | "NaiveDate"));
        Self {
            model_name: model_name.to_string(),
            table_name,
            primary_key,
            columns,
            needs_time_import,
        }
    }

    /// Primary key column, if any
    #[must_use]
    pub fn primary_key_column(&self) -> Option<&ResolvedColumn> {
        let key = self.primary_key.as_deref()?;
        self.columns.iter().find(|c| c.name == key)
    }

    /// Columns other than the primary key
    pub fn value_columns(&self) -> impl Iterator<Item = &ResolvedColumn> {
        self.columns
            .iter()
            .filter(move |c| Some(c.name.as_str()) != self.primary_key.as_deref())
    }

    /// Same column names with the same mapped types, ignoring order
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        let shape = |schema: &Self| -> BTreeSet<(String, String)> {
            schema
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.target_type.clone()))
                .collect()
        };
        self.columns.len() == other.columns.len() && shape(self) == shape(other)
    }
}

/// Resolve a text field list
///
/// When the first field is not named `id` (case-insensitively), an
/// auto-increment `Id` column is placed ahead of it.
///
/// # Examples
///
/// ```
/// # use genpro::config::FieldSpec;
/// # use genpro::scaffold::schema::resolve_fields;
/// let schema = resolve_fields("post", &[FieldSpec::new("title", "string:64")]).unwrap();
/// let names: Vec<_> = schema.columns.iter().map(|c| c.name.as_str()).collect();
/// assert_eq!(names, ["Id", "Title"]);
/// assert_eq!(schema.primary_key.as_deref(), Some("Id"));
/// ```
///
/// # Errors
///
/// - [`SchemaError::EmptySchema`] when `fields` is empty
/// - [`SchemaError::MalformedFieldSpec`] when a type token does not map
pub fn resolve_fields(model_name: &str, fields: &[FieldSpec]) -> Result<ModelSchema, SchemaError> {
    let Some(first) = fields.first() else {
        return Err(SchemaError::EmptySchema(model_name.to_string()));
    };

    let mut columns = Vec::with_capacity(fields.len() + 1);
    if !first.name.trim().eq_ignore_ascii_case("id") {
        let id = map_type("auto").ok_or_else(|| SchemaError::MalformedFieldSpec {
            spec: "id:auto".to_string(),
            reason: "implicit id type did not map".to_string(),
        })?;
        columns.push(ResolvedColumn::from_mapped("id", &id, false, ""));
    }

    for field in fields {
        let name = field.name.trim();
        if name.is_empty() {
            return Err(SchemaError::MalformedFieldSpec {
                spec: format!(":{}", field.declared_type),
                reason: "field name cannot be empty".to_string(),
            });
        }
        let mapped = map_type(&field.declared_type).ok_or_else(|| SchemaError::MalformedFieldSpec {
            spec: format!("{name}:{}", field.declared_type),
            reason: format!("unknown field type '{}'", field.declared_type),
        })?;
        columns.push(ResolvedColumn::from_mapped(name, &mapped, false, &field.comment));
    }

    Ok(ModelSchema::new(
        model_name,
        TemplateHelpers::to_table_name(model_name),
        columns,
        true,
    ))
}

/// Resolve catalog columns through a driver's translation table
///
/// Columns keep catalog order; no implicit id is added, so a table without
/// a primary key yields `primary_key == None`.
#[must_use]
pub fn resolve_catalog(
    model_name: &str,
    table: &str,
    dialect: Dialect,
    catalog: &[CatalogColumn],
) -> ModelSchema {
    let columns = catalog
        .iter()
        .map(|column| {
            let mut mapped = dialect.translate(&column.native_type);
            if column.primary_key {
                mapped.annotation = if column.auto_increment {
                    Annotation::AutoIncrement
                } else {
                    Annotation::PrimaryKey
                };
            }
            ResolvedColumn::from_mapped(&column.name, &mapped, column.nullable, &column.comment)
        })
        .collect();
    ModelSchema::new(model_name, table.to_string(), columns, false)
}

/// Resolves model declarations into [`ModelSchema`]s
///
/// Owns the optional catalog reader so one connection serves the whole run.
#[derive(Default)]
pub struct SchemaResolver {
    reader: Option<Box<dyn TableReader>>,
}

impl std::fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("has_reader", &self.reader.is_some())
            .finish()
    }
}

impl SchemaResolver {
    /// Create a resolver, optionally backed by a catalog reader
    #[must_use]
    pub fn new(reader: Option<Box<dyn TableReader>>) -> Self {
        Self { reader }
    }

    /// Resolve one declaration
    ///
    /// # Errors
    ///
    /// Text sources fail as described on [`resolve_fields`]; inline lists also
    /// fail with [`SchemaError::MalformedFieldSpec`] when they do not parse. Database sources
    /// fail with [`SchemaError::UnsupportedDriver`],
    /// [`SchemaError::CatalogUnavailable`], [`SchemaError::TableNotFound`] or
    /// [`SchemaError::Catalog`].
    pub fn resolve(
        &mut self,
        model_name: &str,
        declaration: &ModelDeclaration,
    ) -> Result<ModelSchema, SchemaError> {
        match &declaration.source {
            SchemaSource::Text(fields) => resolve_fields(model_name, fields),
            SchemaSource::Inline(raw) => resolve_fields(model_name, &parse_field_list(raw)?),
            SchemaSource::Database(connection) => {
                let dialect = Dialect::require(&connection.driver)?;
                let table = declaration.table.as_deref().unwrap_or(model_name);
                let reader = self
                    .reader
                    .as_deref_mut()
                    .ok_or_else(|| SchemaError::CatalogUnavailable(model_name.to_string()))?;
                let catalog = reader
                    .read_table(table)?
                    .ok_or_else(|| SchemaError::TableNotFound(table.to_string()))?;
                Ok(resolve_catalog(model_name, table, dialect, &catalog))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionDescriptor;
    use proptest::prelude::*;
    use std::collections::HashMap;

    struct FakeCatalog(HashMap<String, Vec<CatalogColumn>>);

    impl TableReader for FakeCatalog {
        fn read_table(&mut self, table: &str) -> Result<Option<Vec<CatalogColumn>>, SchemaError> {
            Ok(self.0.get(table).cloned())
        }
    }

    fn post_fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("title", "string:64"), FieldSpec::new("body", "text")]
    }

    fn database(driver: &str, table: Option<&str>) -> ModelDeclaration {
        ModelDeclaration {
            source: SchemaSource::Database(ConnectionDescriptor {
                driver: driver.to_string(),
                dsn: "unused".to_string(),
            }),
            api_path_prefix: None,
            table: table.map(ToString::to_string),
        }
    }

    fn mysql_post() -> FakeCatalog {
        let mut tables = HashMap::new();
        tables.insert(
            "post".to_string(),
            vec![
                CatalogColumn::new("id", "bigint(20)").auto_primary_key(),
                CatalogColumn::new("title", "varchar(64)").with_comment("Post title"),
                CatalogColumn::new("body", "text"),
            ],
        );
        FakeCatalog(tables)
    }

    #[test]
    fn test_post_scenario() {
        let schema = resolve_fields("post", &post_fields()).unwrap();
        let shape: Vec<_> = schema
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.target_type.as_str(), c.annotation))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("Id", "i64", Annotation::AutoIncrement),
                ("Title", "String", Annotation::Size(64)),
                ("Body", "String", Annotation::LongText),
            ]
        );
        assert!(!schema.needs_time_import);
        assert_eq!(schema.primary_key.as_deref(), Some("Id"));
        assert_eq!(schema.table_name, "post");
    }

    #[test]
    fn test_sole_datetime_field() {
        let schema = resolve_fields("task", &[FieldSpec::new("due", "datetime")]).unwrap();
        assert!(schema.needs_time_import);
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[0].name, IMPLICIT_ID);
        assert_eq!(schema.columns[1].target_type, "NaiveDateTime");
    }

    #[test]
    fn test_explicit_id_is_kept() {
        let fields = vec![FieldSpec::new("id", "pk"), FieldSpec::new("name", "string")];
        let schema = resolve_fields("user", &fields).unwrap();
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[0].annotation, Annotation::PrimaryKey);
        assert_eq!(schema.primary_key.as_deref(), Some("Id"));
    }

    #[test]
    fn test_display_label_fallback() {
        let fields = vec![
            FieldSpec::new("title", "string").with_comment("Headline"),
            FieldSpec::new("body", "text"),
        ];
        let schema = resolve_fields("post", &fields).unwrap();
        assert_eq!(schema.columns[1].display_label, "Headline");
        assert_eq!(schema.columns[2].display_label, "Body");
    }

    #[test]
    fn test_text_errors() {
        assert_eq!(
            resolve_fields("post", &[]),
            Err(SchemaError::EmptySchema("post".to_string()))
        );
        let err = resolve_fields("post", &[FieldSpec::new("title", "varchar")]).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedFieldSpec { spec, .. } if spec == "title:varchar"));
    }

    #[test]
    fn test_inline_source() {
        let mut resolver = SchemaResolver::default();
        let declaration = ModelDeclaration {
            source: SchemaSource::Inline("title:string:64, body:text".to_string()),
            api_path_prefix: None,
            table: None,
        };
        let schema = resolver.resolve("post", &declaration).unwrap();
        assert!(schema.is_equivalent(&resolve_fields("post", &post_fields()).unwrap()));

        let declaration = ModelDeclaration {
            source: SchemaSource::Inline("title:string,body".to_string()),
            ..declaration
        };
        let err = resolver.resolve("post", &declaration).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedFieldSpec { ref spec, .. } if spec == "body"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_text_and_database_sources_are_equivalent() {
        let text = resolve_fields("post", &post_fields()).unwrap();

        let mut resolver = SchemaResolver::new(Some(Box::new(mysql_post())));
        let db = resolver.resolve("post", &database("mysql", None)).unwrap();

        assert!(text.is_equivalent(&db));
        assert_eq!(db.primary_key.as_deref(), Some("Id"));
        assert_eq!(db.columns[1].display_label, "Post title");
    }

    #[test]
    fn test_database_errors() {
        let mut resolver = SchemaResolver::new(Some(Box::new(mysql_post())));
        assert_eq!(
            resolver.resolve("post", &database("oracle", None)),
            Err(SchemaError::UnsupportedDriver("oracle".to_string()))
        );
        assert_eq!(
            resolver.resolve("comment", &database("mysql", None)),
            Err(SchemaError::TableNotFound("comment".to_string()))
        );

        let mut detached = SchemaResolver::default();
        assert_eq!(
            detached.resolve("post", &database("mysql", None)),
            Err(SchemaError::CatalogUnavailable("post".to_string()))
        );
    }

    #[test]
    fn test_table_override_and_missing_primary_key() {
        let mut tables = HashMap::new();
        tables.insert(
            "audit_log".to_string(),
            vec![
                CatalogColumn::new("message", "text"),
                CatalogColumn::new("logged_at", "timestamp").nullable(),
            ],
        );
        let mut resolver = SchemaResolver::new(Some(Box::new(FakeCatalog(tables))));
        let schema = resolver
            .resolve("audit", &database("postgres", Some("audit_log")))
            .unwrap();

        assert_eq!(schema.table_name, "audit_log");
        assert_eq!(schema.primary_key, None);
        assert!(schema.needs_time_import);
        assert_eq!(schema.columns[1].rust_type(), "Option<NaiveDateTime>");
    }

    proptest! {
        #[test]
        fn implicit_id_precedes_non_id_fields(
            names in prop::collection::vec("[a-hj-z][a-z]{0,8}", 1..8)
        ) {
            let fields: Vec<_> = names.iter().map(|n| FieldSpec::new(n.clone(), "int")).collect();
            let schema = resolve_fields("thing", &fields).unwrap();
            prop_assert_eq!(schema.columns.len(), fields.len() + 1);
            prop_assert_eq!(&schema.columns[0].name, IMPLICIT_ID);
            prop_assert_eq!(schema.columns[0].annotation, Annotation::AutoIncrement);
        }
    }
}
