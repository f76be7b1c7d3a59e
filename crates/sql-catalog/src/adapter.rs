//! The catalog adapter contract (spec.md §4.7), expressed as an
//! [`async_trait`] the way the teacher exposes platform storage through
//! `logicaffeine_system::fs::Vfs`.

use crate::error::CatalogResult;
use async_trait::async_trait;
use sql_core::ast::{AlterTableAction, ColumnDefinition, Privilege, TableIdentifier};
use sql_core::types::IcebergType;
use tokio_util::sync::CancellationToken;

/// A transaction handle opaque to the caller; adapters assign their own
/// numbering scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub u64);

/// A table's catalog-known shape, returned by [`CatalogAdapter::get_table_schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: TableIdentifier,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Per-validation-pass context: the session's current database and user,
/// and a cancellation handle the adapter must honor (spec.md §5
/// "validation accepts a cancellation handle and returns promptly when
/// cancelled mid-walk").
#[derive(Clone)]
pub struct RequestContext {
    database: Option<String>,
    user: String,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new(user: impl Into<String>, database: Option<String>) -> Self {
        Self {
            database,
            user: user.into(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn current_database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn current_user(&self) -> &str {
        &self.user
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// A child context sharing the same identity but with its own
    /// cancellation scope, for a validation sub-walk that must not
    /// cancel its caller.
    pub fn child(&self) -> Self {
        Self {
            database: self.database.clone(),
            user: self.user.clone(),
            cancellation: self.cancellation.child_token(),
        }
    }
}

/// The full adapter surface a lakehouse catalog must expose (spec.md
/// §4.7): validation, schema lookup, privilege checks, DDL sinks, and
/// transaction bracketing. Implementors may suspend on I/O; every method
/// takes a [`RequestContext`] so a cancellation can unwind a stuck remote
/// call.
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    async fn validate_table(&self, ctx: &RequestContext, table: &TableIdentifier) -> CatalogResult<()>;

    async fn validate_column(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
        column: &str,
    ) -> CatalogResult<()>;

    async fn validate_database(&self, ctx: &RequestContext, database: &str) -> CatalogResult<()>;

    async fn get_table_schema(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
    ) -> CatalogResult<TableSchema>;

    async fn get_column_definition(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
        column: &str,
    ) -> CatalogResult<ColumnDefinition>;

    /// Revalidates a formatted Iceberg type string against whatever the
    /// catalog additionally restricts (e.g. a maximum decimal precision).
    async fn validate_data_type(&self, ctx: &RequestContext, type_str: &str) -> CatalogResult<IcebergType>;

    async fn is_compatible_data_type(
        &self,
        ctx: &RequestContext,
        source: &IcebergType,
        target: &IcebergType,
    ) -> CatalogResult<bool>;

    async fn check_privilege(
        &self,
        ctx: &RequestContext,
        user: &str,
        database: Option<&str>,
        table: Option<&str>,
        action: Privilege,
    ) -> CatalogResult<bool>;

    async fn create_table(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
        schema: &[ColumnDefinition],
    ) -> CatalogResult<()>;

    async fn drop_table(&self, ctx: &RequestContext, table: &TableIdentifier) -> CatalogResult<()>;

    async fn alter_table(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
        action: &AlterTableAction,
    ) -> CatalogResult<()>;

    async fn list_tables(
        &self,
        ctx: &RequestContext,
        database: Option<&str>,
    ) -> CatalogResult<Vec<TableIdentifier>>;

    async fn list_columns(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
    ) -> CatalogResult<Vec<ColumnDefinition>>;

    async fn begin(&self, ctx: &RequestContext) -> CatalogResult<TransactionId>;

    async fn commit(&self, ctx: &RequestContext, tx: TransactionId) -> CatalogResult<()>;

    async fn rollback(&self, ctx: &RequestContext, tx: TransactionId) -> CatalogResult<()>;

    async fn close(&self) -> CatalogResult<()>;
}
