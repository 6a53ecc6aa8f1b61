//! Field type mapping for generated models
//!
//! Converts a declared field type token into the Rust type of the generated
//! struct field, the persistence annotation attached to it, and whether the
//! generated module must import chrono types.
//!
//! # Supported Tokens
//!
//! | token | Rust type | annotation |
//! |---|---|---|
//! | `string[:N]` | `String` | size N (default 128) |
//! | `text` | `String` | long text |
//! | `auto` | `i64` | auto-increment primary key |
//! | `pk` | `i64` | primary key |
//! | `datetime` | `NaiveDateTime` | datetime |
//! | `int`, `int8`..`int64` | `i64`, `i8`..`i64` | |
//! | `uint`, `uint8`..`uint64` | `u64`, `u8`..`u64` | |
//! | `bool` | `bool` | |
//! | `float32`, `float64`, `float` | `f32`, `f64`, `f64` | |
//!
//! # Examples
//!
//! ```text
//! title:string:64   → String, #[sea_orm(column_type = "String(StringLen::N(64))")]
//! body:text         → String, #[sea_orm(column_type = "Text")]
//! due:datetime      → NaiveDateTime (chrono import required)
//! ```

use crate::config::FieldSpec;
use crate::error::SchemaError;
use std::fmt;

/// Default VARCHAR length for `string` without an explicit size
pub const DEFAULT_STRING_SIZE: u32 = 128;

/// Persistence annotation attached to a generated column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Plain column
    None,
    /// Bounded string column
    Size(u32),
    /// Unbounded text column
    LongText,
    /// Auto-increment primary key
    AutoIncrement,
    /// Primary key assigned by the application
    PrimaryKey,
    /// Timestamp without time zone
    DateTime,
    /// Calendar date
    Date,
}

impl Annotation {
    /// Whether the column is the model's primary key
    #[must_use]
    pub const fn is_primary_key(self) -> bool {
        matches!(self, Self::AutoIncrement | Self::PrimaryKey)
    }

    /// Render as a `#[sea_orm(...)]` attribute, or `None` when there is nothing to say
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::field_type::Annotation;
    /// assert_eq!(
    ///     Annotation::Size(64).attribute(false).as_deref(),
    ///     Some(r#"#[sea_orm(column_type = "String(StringLen::N(64))")]"#)
    /// );
    /// assert_eq!(Annotation::None.attribute(false), None);
    /// assert_eq!(Annotation::None.attribute(true).as_deref(), Some("#[sea_orm(nullable)]"));
    /// ```
    #[must_use]
    pub fn attribute(self, nullable: bool) -> Option<String> {
        let mut args = match self {
            Self::None => Vec::new(),
            Self::Size(n) => vec![format!("column_type = \"String(StringLen::N({n}))\"")],
            Self::LongText => vec!["column_type = \"Text\"".to_string()],
            Self::AutoIncrement => vec!["primary_key".to_string()],
            Self::PrimaryKey => vec![
                "primary_key".to_string(),
                "auto_increment = false".to_string(),
            ],
            Self::DateTime => vec!["column_type = \"DateTime\"".to_string()],
            Self::Date => vec!["column_type = \"Date\"".to_string()],
        };
        if nullable && !self.is_primary_key() {
            args.push("nullable".to_string());
        }
        if args.is_empty() {
            None
        } else {
            Some(format!("#[sea_orm({})]", args.join(", ")))
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Size(n) => write!(f, "size({n})"),
            Self::LongText => write!(f, "longtext"),
            Self::AutoIncrement => write!(f, "auto"),
            Self::PrimaryKey => write!(f, "pk"),
            Self::DateTime => write!(f, "datetime"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// Result of mapping one declared or native type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// Rust type of the generated field
    pub target_type: &'static str,
    /// Persistence annotation
    pub annotation: Annotation,
    /// Whether the type lives in `chrono`
    pub needs_time: bool,
}

impl MappedType {
    const fn plain(target_type: &'static str) -> Self {
        Self {
            target_type,
            annotation: Annotation::None,
            needs_time: false,
        }
    }

    pub(crate) const fn annotated(target_type: &'static str, annotation: Annotation) -> Self {
        Self {
            target_type,
            annotation,
            needs_time: matches!(annotation, Annotation::DateTime | Annotation::Date),
        }
    }

    /// Portable SQL column type used by the migration renderer
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::field_type::map_type;
    /// assert_eq!(map_type("string:64").unwrap().sql_type(), "VARCHAR(64)");
    /// assert_eq!(map_type("auto").unwrap().sql_type(), "BIGSERIAL");
    /// assert_eq!(map_type("float32").unwrap().sql_type(), "REAL");
    /// ```
    #[must_use]
    pub fn sql_type(&self) -> String {
        match self.annotation {
            Annotation::Size(n) => return format!("VARCHAR({n})"),
            Annotation::LongText => return "TEXT".to_string(),
            Annotation::AutoIncrement => {
                let serial = match self.target_type {
                    "i8" | "i16" | "i32" | "u8" | "u16" => "SERIAL",
                    _ => "BIGSERIAL",
                };
                return serial.to_string();
            }
            Annotation::DateTime => return "TIMESTAMP".to_string(),
            Annotation::Date => return "DATE".to_string(),
            Annotation::None | Annotation::PrimaryKey => {}
        }
        match self.target_type {
            "i8" | "i16" | "u8" => "SMALLINT",
            "i32" | "u16" => "INTEGER",
            "bool" => "BOOLEAN",
            "f32" => "REAL",
            "f64" => "DOUBLE PRECISION",
            "String" => "VARCHAR(255)",
            _ => "BIGINT",
        }
        .to_string()
    }
}

/// Map a declared field type token
///
/// Returns `None` when the base keyword is not recognized, or when the size
/// on `string` is not a positive integer. Only `string` reads the suffix;
/// other keywords ignore it. Matching is case-insensitive and ignores
/// surrounding whitespace.
///
/// # Examples
///
/// ```
/// # use genpro::scaffold::field_type::{map_type, Annotation};
/// let mapped = map_type("string:64").unwrap();
/// assert_eq!(mapped.target_type, "String");
/// assert_eq!(mapped.annotation, Annotation::Size(64));
///
/// assert!(map_type("datetime").unwrap().needs_time);
/// assert_eq!(map_type("int:4").unwrap().target_type, "i64");
/// assert!(map_type("varchar").is_none());
/// ```
#[must_use]
pub fn map_type(token: &str) -> Option<MappedType> {
    let token = token.trim().to_lowercase();
    let (base, suffix) = match token.split_once(':') {
        Some((base, suffix)) => (base, Some(suffix.trim())),
        None => (token.as_str(), None),
    };

    if base == "string" {
        let size = match suffix {
            None => DEFAULT_STRING_SIZE,
            Some(raw) => raw.parse::<u32>().ok().filter(|n| *n > 0)?,
        };
        return Some(MappedType::annotated("String", Annotation::Size(size)));
    }

    let mapped = match base {
        "text" => MappedType::annotated("String", Annotation::LongText),
        "auto" => MappedType::annotated("i64", Annotation::AutoIncrement),
        "pk" => MappedType::annotated("i64", Annotation::PrimaryKey),
        "datetime" => MappedType::annotated("NaiveDateTime", Annotation::DateTime),
        "int" | "int64" => MappedType::plain("i64"),
        "int8" => MappedType::plain("i8"),
        "int16" => MappedType::plain("i16"),
        "int32" => MappedType::plain("i32"),
        "uint" | "uint64" => MappedType::plain("u64"),
        "uint8" => MappedType::plain("u8"),
        "uint16" => MappedType::plain("u16"),
        "uint32" => MappedType::plain("u32"),
        "bool" => MappedType::plain("bool"),
        "float32" => MappedType::plain("f32"),
        "float64" | "float" => MappedType::plain("f64"),
        _ => return None,
    };
    Some(mapped)
}

/// Parse the single-string field list form, `name:type[,name:type]*`
///
/// The type part may itself contain `:` (`title:string:64`). Type tokens are
/// not validated here; the schema resolver does that.
///
/// # Examples
///
/// ```
/// # use genpro::scaffold::field_type::parse_field_list;
/// let fields = parse_field_list("title:string:64, body:text").unwrap();
/// assert_eq!(fields.len(), 2);
/// assert_eq!(fields[0].name, "title");
/// assert_eq!(fields[0].declared_type, "string:64");
/// ```
///
/// # Errors
///
/// Returns [`SchemaError::MalformedFieldSpec`] if an entry has no `:`, or an
/// empty name or type.
pub fn parse_field_list(input: &str) -> Result<Vec<FieldSpec>, SchemaError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let malformed = |reason: &str| SchemaError::MalformedFieldSpec {
                spec: entry.to_string(),
                reason: reason.to_string(),
            };
            let (name, declared_type) = entry
                .split_once(':')
                .ok_or_else(|| malformed("expected name:type"))?;
            let name = name.trim();
            let declared_type = declared_type.trim();
            if name.is_empty() {
                return Err(malformed("field name cannot be empty"));
            }
            if declared_type.is_empty() {
                return Err(malformed("field type cannot be empty"));
            }
            Ok(FieldSpec {
                name: name.to_string(),
                declared_type: declared_type.to_string(),
                comment: String::new(),
            })
        })
        .collect()
}
