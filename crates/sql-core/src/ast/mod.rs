//! Abstract syntax tree for the accepted SQL surface (spec.md §3, §6.1).
//!
//! The tree is a strict hierarchy: every node owns its children, there are
//! no cycles, and the whole thing lives for the duration of one parse.
//! Aliases are resolved by name, never by pointer (spec.md §9).

pub mod expr;
pub mod stmt;

pub use expr::*;
pub use stmt::*;

use crate::types::IcebergType;

/// `[database.]table`, preserving the qualification exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub struct TableIdentifier {
    pub database: Option<String>,
    pub table: String,
}

impl TableIdentifier {
    pub fn unqualified(table: impl Into<String>) -> Self {
        Self {
            database: None,
            table: table.into(),
        }
    }

    pub fn qualified(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            table: table.into(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.database.is_some()
    }
}

/// A scalar settings/default value, as accepted by `SETTINGS k=v` and
/// `DEFAULT literal`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// `DEFAULT` clause payload: a literal or one of the system-timestamp
/// singletons.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Literal(ScalarValue),
    SysDate,
    SysTime,
    SysTimestamp,
    GenUuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyRef {
    pub column: String,
    pub ref_table: TableIdentifier,
    pub ref_column: String,
}

/// A single column definition inside `CREATE TABLE`/`ALTER TABLE ... ALTER COLUMN`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: IcebergType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub is_nullable: bool,
    pub not_null: bool,
    pub unique: bool,
    pub default_value: Option<DefaultValue>,
    pub reference: Option<ForeignKeyRef>,
    pub sequence: bool,
    pub check: Option<Expression>,
    pub compress: bool,
    pub encrypt_key: Option<String>,
    pub element_type: Option<Box<IcebergType>>,
    pub key_type: Option<Box<IcebergType>>,
    pub value_type: Option<Box<IcebergType>>,
    pub fields: Option<Vec<crate::types::StructField>>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: IcebergType) -> Self {
        let (element_type, key_type, value_type, fields) = match &data_type {
            IcebergType::List(inner) => (Some(inner.clone()), None, None, None),
            IcebergType::Map(k, v) => (None, Some(k.clone()), Some(v.clone()), None),
            IcebergType::Struct(fields) => (None, None, None, Some(fields.clone())),
            _ => (None, None, None, None),
        };
        let (precision, scale) = match &data_type {
            IcebergType::Decimal { precision, scale } => (Some(*precision), Some(*scale)),
            _ => (None, None),
        };
        Self {
            name: name.into(),
            data_type,
            length: None,
            precision,
            scale,
            is_nullable: true,
            not_null: false,
            unique: false,
            default_value: None,
            reference: None,
            sequence: false,
            check: None,
            compress: false,
            encrypt_key: None,
            element_type,
            key_type,
            value_type,
            fields,
        }
    }

    pub fn set_not_null(&mut self, not_null: bool) {
        self.not_null = not_null;
        self.is_nullable = !not_null;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEngine {
    Filesystem,
    Memory,
    S3,
}

impl StorageEngine {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "filesystem" => Some(Self::Filesystem),
            "memory" => Some(Self::Memory),
            "s3" => Some(Self::S3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filesystem => "filesystem",
            Self::Memory => "memory",
            Self::S3 => "s3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}
