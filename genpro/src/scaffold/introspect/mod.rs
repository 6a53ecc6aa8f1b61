//! Live catalog introspection
//!
//! A [`TableReader`] returns the raw catalog description of one table.
//! [`Dialect`] translates each native SQL type into the same [`MappedType`]
//! shape the text field mapper produces, so a table read from MySQL and the
//! equivalent `name:type` list resolve to the same schema.

mod sqlx_reader;

pub use sqlx_reader::SqlxTableReader;

use super::field_type::{Annotation, MappedType, DEFAULT_STRING_SIZE};
use crate::error::SchemaError;

/// One column as reported by the database catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    /// Column name as stored
    pub name: String,
    /// Native type, e.g. `varchar(64)`, `bigint unsigned`, `timestamp without time zone`
    pub native_type: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Column comment, empty when the catalog has none
    pub comment: String,
    /// Part of the primary key
    pub primary_key: bool,
    /// Values are generated by the database
    pub auto_increment: bool,
}

impl CatalogColumn {
    /// Non-null, uncommented column
    #[must_use]
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            nullable: false,
            comment: String::new(),
            primary_key: false,
            auto_increment: false,
        }
    }

    /// Mark as an auto-increment primary key
    #[must_use]
    pub const fn auto_primary_key(mut self) -> Self {
        self.primary_key = true;
        self.auto_increment = true;
        self
    }

    /// Mark as nullable
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attach a comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Source of table descriptions
///
/// Implementations hold one connection for the whole run and are queried
/// sequentially.
pub trait TableReader {
    /// Read every column of `table`, in catalog order
    ///
    /// Returns `Ok(None)` when the table does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Catalog`] when the catalog query fails.
    fn read_table(&mut self, table: &str) -> Result<Option<Vec<CatalogColumn>>, SchemaError>;
}

/// Driver-specific native type translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// MySQL and MariaDB
    MySql,
    /// PostgreSQL
    Postgres,
    /// SQLite
    Sqlite,
}

/// Native type split into its parts: `varchar(64) unsigned` → (`varchar`, `[64]`, true)
#[derive(Debug, PartialEq, Eq)]
struct NativeType {
    base: String,
    args: Vec<u32>,
    unsigned: bool,
}

impl NativeType {
    fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let unsigned = lowered.split_whitespace().any(|word| word == "unsigned");

        let (head, args) = match (lowered.find('('), lowered.find(')')) {
            (Some(open), Some(close)) if open < close => {
                let args = lowered[open + 1..close]
                    .split(',')
                    .filter_map(|arg| arg.trim().parse().ok())
                    .collect();
                (format!("{}{}", &lowered[..open], &lowered[close + 1..]), args)
            }
            _ => (lowered.clone(), Vec::new()),
        };

        let base = head
            .split_whitespace()
            .filter(|word| !matches!(*word, "unsigned" | "signed" | "zerofill"))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            base,
            args,
            unsigned,
        }
    }

    fn size(&self) -> u32 {
        self.args.first().copied().unwrap_or(DEFAULT_STRING_SIZE)
    }
}

const fn plain(target_type: &'static str) -> MappedType {
    MappedType::annotated(target_type, Annotation::None)
}

impl Dialect {
    /// Look up the translation table for a driver name
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::introspect::Dialect;
    /// assert_eq!(Dialect::for_driver("postgresql"), Some(Dialect::Postgres));
    /// assert_eq!(Dialect::for_driver("MySQL"), Some(Dialect::MySql));
    /// assert_eq!(Dialect::for_driver("oracle"), None);
    /// ```
    #[must_use]
    pub fn for_driver(driver: &str) -> Option<Self> {
        match driver.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Same as [`Dialect::for_driver`], failing with [`SchemaError::UnsupportedDriver`]
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedDriver`] when no table is registered.
    pub fn require(driver: &str) -> Result<Self, SchemaError> {
        Self::for_driver(driver).ok_or_else(|| SchemaError::UnsupportedDriver(driver.to_string()))
    }

    /// Translate a native column type
    ///
    /// Unknown native types map to `String` so a single exotic column does
    /// not reject the whole table.
    #[must_use]
    pub fn translate(self, native_type: &str) -> MappedType {
        let native = NativeType::parse(native_type);
        match self {
            Self::MySql => Self::translate_mysql(&native),
            Self::Postgres => Self::translate_postgres(&native),
            Self::Sqlite => Self::translate_sqlite(&native),
        }
    }

    fn translate_mysql(native: &NativeType) -> MappedType {
        let unsigned = native.unsigned;
        match native.base.as_str() {
            "tinyint" if native.args.first() == Some(&1) => plain("bool"),
            "bool" | "boolean" | "bit" => plain("bool"),
            "tinyint" => plain(if unsigned { "u8" } else { "i8" }),
            "smallint" => plain(if unsigned { "u16" } else { "i16" }),
            "mediumint" | "int" | "integer" => plain(if unsigned { "u32" } else { "i32" }),
            "bigint" => plain(if unsigned { "u64" } else { "i64" }),
            "float" => plain("f32"),
            "double" | "real" | "decimal" | "numeric" => plain("f64"),
            "char" | "varchar" => MappedType::annotated("String", Annotation::Size(native.size())),
            "tinytext" | "text" | "mediumtext" | "longtext" | "json" | "enum" | "set" => {
                MappedType::annotated("String", Annotation::LongText)
            }
            "datetime" | "timestamp" => MappedType::annotated("NaiveDateTime", Annotation::DateTime),
            "date" => MappedType::annotated("NaiveDate", Annotation::Date),
            _ => plain("String"),
        }
    }

    fn translate_postgres(native: &NativeType) -> MappedType {
        match native.base.as_str() {
            "boolean" | "bool" => plain("bool"),
            "smallint" | "int2" | "smallserial" => plain("i16"),
            "integer" | "int" | "int4" | "serial" => plain("i32"),
            "bigint" | "int8" | "bigserial" => plain("i64"),
            "real" | "float4" => plain("f32"),
            "double precision" | "float8" | "numeric" | "decimal" | "money" => plain("f64"),
            "character varying" | "varchar" | "character" | "char" => {
                MappedType::annotated("String", Annotation::Size(native.size()))
            }
            "text" | "json" | "jsonb" | "xml" => MappedType::annotated("String", Annotation::LongText),
            "timestamp" | "timestamp without time zone" | "timestamp with time zone"
            | "timestamptz" => MappedType::annotated("NaiveDateTime", Annotation::DateTime),
            "date" => MappedType::annotated("NaiveDate", Annotation::Date),
            _ => plain("String"),
        }
    }

    fn translate_sqlite(native: &NativeType) -> MappedType {
        // SQLite declared types follow the affinity rules, so match on substrings.
        let base = native.base.as_str();
        if base.contains("bool") {
            plain("bool")
        } else if base.contains("int") {
            plain("i64")
        } else if base.contains("datetime") || base.contains("timestamp") {
            MappedType::annotated("NaiveDateTime", Annotation::DateTime)
        } else if base == "date" {
            MappedType::annotated("NaiveDate", Annotation::Date)
        } else if base.contains("char") {
            MappedType::annotated("String", Annotation::Size(native.size()))
        } else if base.contains("text") || base.contains("clob") {
            MappedType::annotated("String", Annotation::LongText)
        } else if base.contains("real") || base.contains("floa") || base.contains("doub") {
            plain("f64")
        } else {
            plain("String")
        }
    }
}
