//! Template contexts, one builder per artifact kind
//!
//! Every builder is a pure function of the resolved schema and a few
//! configuration values. Keys are camel case so bundle templates read the
//! same whichever kind they render.

use super::field_type::Annotation;
use super::helpers::TemplateHelpers;
use super::kind::ArtifactKind;
use super::schema::{ModelSchema, ResolvedColumn};
use serde_json::{json, Value};
use std::path::Path;

/// Join an API prefix and a resource name with exactly one `/`
///
/// # Examples
///
/// ```
/// # use genpro::scaffold::context::api_url;
/// assert_eq!(api_url("/", "post"), "/post");
/// assert_eq!(api_url("/api/", "post"), "/api/post");
/// assert_eq!(api_url("", "post"), "/post");
/// ```
#[must_use]
pub fn api_url(prefix: &str, resource: &str) -> String {
    let prefix = prefix.trim().trim_end_matches('/');
    if prefix.is_empty() || prefix.starts_with('/') {
        format!("{prefix}/{resource}")
    } else {
        format!("/{prefix}/{resource}")
    }
}

/// Crate name of the project at `output_root`, as a Rust path segment
///
/// Read from `Cargo.toml` when possible, otherwise derived from the
/// directory name.
#[must_use]
pub fn crate_name(output_root: &Path) -> String {
    let from_manifest = std::fs::read_to_string(output_root.join("Cargo.toml"))
        .ok()
        .and_then(|raw| raw.parse::<toml::Table>().ok())
        .and_then(|manifest| {
            manifest
                .get("package")?
                .get("name")?
                .as_str()
                .map(ToString::to_string)
        });

    let name = from_manifest
        .or_else(|| {
            output_root
                .canonicalize()
                .ok()?
                .file_name()?
                .to_str()
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| "app".to_string());
    name.replace('-', "_")
}

fn column_attribute(column: &ResolvedColumn) -> Option<String> {
    let base = column.annotation.attribute(column.nullable);
    if column.field_name() == column.column {
        return base;
    }
    let rename = format!("column_name = \"{}\"", column.column);
    Some(base.map_or_else(
        || format!("#[sea_orm({rename})]"),
        |attr| attr.replacen("#[sea_orm(", &format!("#[sea_orm({rename}, "), 1),
    ))
}

fn column_value(column: &ResolvedColumn, primary_key: Option<&str>) -> Value {
    json!({
        "name": column.name,
        "field": column.field_name(),
        "column": column.column,
        "rustType": column.rust_type(),
        "targetType": column.target_type,
        "annotation": column.annotation.to_string(),
        "attribute": column_attribute(column),
        "sqlType": column.sql_type,
        "nullable": column.nullable,
        "label": column.display_label,
        "primaryKey": Some(column.name.as_str()) == primary_key,
    })
}

/// Struct body: one optional attribute line plus one field line per column
#[must_use]
pub fn model_struct(schema: &ModelSchema) -> String {
    schema
        .columns
        .iter()
        .map(|column| {
            let field = format!("    pub {}: {},", column.field_name(), column.rust_type());
            column_attribute(column)
                .map_or_else(|| field.clone(), |attr| format!("    {attr}\n{field}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn columns(schema: &ModelSchema) -> Vec<Value> {
    schema
        .columns
        .iter()
        .map(|c| column_value(c, schema.primary_key.as_deref()))
        .collect()
}

fn primary_key(schema: &ModelSchema) -> Value {
    schema.primary_key_column().map_or(Value::Null, |pk| {
        json!({
            "name": pk.name,
            "field": pk.field_name(),
            "rustType": pk.target_type,
        })
    })
}

fn names(schema: &ModelSchema) -> Value {
    json!({
        "name": TemplateHelpers::to_pascal_case(&schema.model_name),
        "modelName": schema.model_name,
        "lower": TemplateHelpers::to_file_stem(&schema.model_name),
        "snake": TemplateHelpers::to_snake_case(&schema.model_name),
        "tableName": schema.table_name,
    })
}

fn merge(mut base: Value, extra: Value) -> Value {
    if let (Value::Object(base_map), Value::Object(extra_map)) = (&mut base, extra) {
        base_map.extend(extra_map);
    }
    base
}

/// Context for the `model` kind
#[must_use]
pub fn model_context(schema: &ModelSchema) -> Value {
    merge(
        names(schema),
        json!({
            "packageName": ArtifactKind::Model.package(),
            "modelStruct": model_struct(schema),
            "columns": columns(schema),
            "primaryKey": primary_key(schema),
            "timeImport": schema.needs_time_import,
        }),
    )
}

/// Context for the `controller` kind
///
/// `has_model` records whether a model artifact already exists at its
/// destination; it selects the "with model" template variant.
#[must_use]
pub fn controller_context(schema: &ModelSchema, api_prefix: &str, has_model: bool) -> Value {
    merge(
        names(schema),
        json!({
            "packageName": ArtifactKind::Controller.package(),
            "apiPrefix": api_prefix,
            "apiUrl": api_url(api_prefix, &schema.model_name),
            "hasModel": has_model,
            "columns": columns(schema),
            "primaryKey": primary_key(schema),
            "timeImport": schema.needs_time_import,
        }),
    )
}

/// Context for the `router` kind
#[must_use]
pub fn router_context(schema: &ModelSchema, api_prefix: &str, pkg_path: &str) -> Value {
    let lower = TemplateHelpers::to_file_stem(&schema.model_name);
    merge(
        controller_context(schema, api_prefix, true),
        json!({
            "packageName": ArtifactKind::Router.package(),
            "pkgPath": pkg_path,
            "controllerPath": format!("crate::{}::{lower}", ArtifactKind::Controller.package()),
        }),
    )
}

/// Double-quoted SQL identifier, so mixed-case names keep their case
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Forward DDL for the schema
#[must_use]
pub fn create_table_sql(schema: &ModelSchema) -> String {
    let lines = schema
        .columns
        .iter()
        .map(|column| {
            let mut line = format!("    {} {}", quote_ident(&column.column), column.sql_type);
            if column.annotation.is_primary_key()
                && Some(column.name.as_str()) == schema.primary_key.as_deref()
            {
                line.push_str(" PRIMARY KEY");
            } else if !column.nullable {
                line.push_str(" NOT NULL");
            }
            line
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE {} (\n{lines}\n);", quote_ident(&schema.table_name))
}

/// Backward DDL for the schema
#[must_use]
pub fn drop_table_sql(schema: &ModelSchema) -> String {
    format!("DROP TABLE IF EXISTS {};", quote_ident(&schema.table_name))
}

/// Context for the `migration` kind
#[must_use]
pub fn migration_context(schema: &ModelSchema) -> Value {
    merge(
        names(schema),
        json!({
            "packageName": ArtifactKind::Migration.package(),
            "up": create_table_sql(schema),
            "down": drop_table_sql(schema),
            "columns": columns(schema),
        }),
    )
}

/// Context for the `list-view` and `form-view` kinds
#[must_use]
pub fn view_context(schema: &ModelSchema, kind: ArtifactKind, api_prefix: &str) -> Value {
    let model = &schema.model_name;
    let view_columns: Vec<Value> = schema
        .columns
        .iter()
        .map(|column| {
            json!({
                "title": column.display_label,
                "key": column.field_name(),
                "dataIndex": column.field_name(),
                "inputType": input_type(column),
                "primaryKey": Some(column.name.as_str()) == schema.primary_key.as_deref(),
            })
        })
        .collect();

    merge(
        names(schema),
        json!({
            "packageName": kind.package(),
            "columns": view_columns,
            "apiUrl": api_url(api_prefix, model),
            "pageCreate": format!("/{model}/create"),
            "pageUpdate": format!("/{model}/update"),
            "primaryKey": primary_key(schema),
        }),
    )
}

fn input_type(column: &ResolvedColumn) -> &'static str {
    match (column.annotation, column.target_type.as_str()) {
        (Annotation::LongText, _) => "textarea",
        (Annotation::DateTime, _) => "datetime",
        (Annotation::Date, _) => "date",
        (_, "bool") => "switch",
        (_, "String") => "text",
        _ => "number",
    }
}
