//! Catalog adapter error type (spec.md §4.7 "validation failures are
//! non-fatal to parsing, surfaced as wrapped errors naming the offending
//! object"), following the teacher's `VfsError` shape.

use sql_core::error::ErrorCode;
use std::fmt;

#[derive(Debug, Clone)]
pub enum CatalogError {
    UnknownDatabase(String),
    UnknownTable(String),
    UnknownColumn { table: String, column: String },
    UnknownDataType(String),
    IncompatibleDataType { source: String, target: String },
    PermissionDenied { user: String, action: String },
    TransactionError(String),
    Cancelled,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::UnknownDatabase(name) => write!(f, "unknown database `{name}`"),
            CatalogError::UnknownTable(name) => write!(f, "unknown table `{name}`"),
            CatalogError::UnknownColumn { table, column } => {
                write!(f, "unknown column `{column}` on table `{table}`")
            }
            CatalogError::UnknownDataType(ty) => write!(f, "unknown data type `{ty}`"),
            CatalogError::IncompatibleDataType { source, target } => {
                write!(f, "`{source}` is not compatible with `{target}`")
            }
            CatalogError::PermissionDenied { user, action } => {
                write!(f, "user `{user}` lacks privilege `{action}`")
            }
            CatalogError::TransactionError(msg) => write!(f, "transaction error: {msg}"),
            CatalogError::Cancelled => write!(f, "validation cancelled"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl CatalogError {
    /// Maps onto a parser-level [`ErrorCode`] where spec.md §6.2 reserves
    /// one (`UnknownTable`/`UnknownColumn`/`UnknownDatabase`). Everything
    /// else is purely a catalog-side concern without a stable parser code.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            CatalogError::UnknownDatabase(_) => Some(ErrorCode::UnknownDatabase),
            CatalogError::UnknownTable(_) => Some(ErrorCode::UnknownTable),
            CatalogError::UnknownColumn { .. } => Some(ErrorCode::UnknownColumn),
            _ => None,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
