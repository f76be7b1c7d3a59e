//! An in-memory [`CatalogAdapter`] for tests, grounded on the teacher's
//! `NativeVfs` reference implementation pattern (a simple backing store
//! behind the trait, exercised by the same test suite a remote adapter
//! would need to pass).

use crate::adapter::{CatalogAdapter, RequestContext, TableSchema, TransactionId};
use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use sql_core::ast::{AlterTableAction, ColumnDefinition, Privilege, TableIdentifier};
use sql_core::types::IcebergType;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

struct Database {
    tables: HashMap<String, TableSchema>,
}

/// Reference catalog adapter backed by a process-local map. Not meant for
/// production use; `sql-catalog` ships it purely so the `Validator` and
/// the adapter contract have something concrete to run against in tests.
pub struct MemoryCatalog {
    databases: Mutex<HashMap<String, Database>>,
    grants: Mutex<HashMap<(String, String), Vec<Privilege>>>,
    next_tx: AtomicU64,
    open_tx: Mutex<Vec<TransactionId>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            databases: Mutex::new(HashMap::new()),
            grants: Mutex::new(HashMap::new()),
            next_tx: AtomicU64::new(1),
            open_tx: Mutex::new(Vec::new()),
        }
    }

    pub fn with_database(self, name: impl Into<String>) -> Self {
        self.databases
            .lock()
            .unwrap()
            .insert(name.into(), Database { tables: HashMap::new() });
        self
    }

    pub fn with_table(self, database: &str, schema: TableSchema) -> Self {
        self.databases
            .lock()
            .unwrap()
            .entry(database.to_string())
            .or_insert_with(|| Database { tables: HashMap::new() })
            .tables
            .insert(schema.name.table.clone(), schema);
        self
    }

    pub fn grant(self, user: &str, database: &str, privilege: Privilege) -> Self {
        self.grants
            .lock()
            .unwrap()
            .entry((user.to_string(), database.to_string()))
            .or_default()
            .push(privilege);
        self
    }

    fn resolve_database<'a>(&self, ctx: &'a RequestContext, table: &'a TableIdentifier) -> Option<String> {
        table
            .database
            .clone()
            .or_else(|| ctx.current_database().map(|d| d.to_string()))
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogAdapter for MemoryCatalog {
    async fn validate_table(&self, ctx: &RequestContext, table: &TableIdentifier) -> CatalogResult<()> {
        self.get_table_schema(ctx, table).await.map(|_| ())
    }

    async fn validate_column(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
        column: &str,
    ) -> CatalogResult<()> {
        let schema = self.get_table_schema(ctx, table).await?;
        if schema.column(column).is_some() {
            Ok(())
        } else {
            Err(CatalogError::UnknownColumn {
                table: table.table.clone(),
                column: column.to_string(),
            })
        }
    }

    async fn validate_database(&self, _ctx: &RequestContext, database: &str) -> CatalogResult<()> {
        if self.databases.lock().unwrap().contains_key(database) {
            Ok(())
        } else {
            Err(CatalogError::UnknownDatabase(database.to_string()))
        }
    }

    async fn get_table_schema(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
    ) -> CatalogResult<TableSchema> {
        let Some(database) = self.resolve_database(ctx, table) else {
            return Err(CatalogError::UnknownTable(table.table.clone()));
        };
        let databases = self.databases.lock().unwrap();
        databases
            .get(&database)
            .and_then(|db| db.tables.get(&table.table))
            .cloned()
            .ok_or_else(|| CatalogError::UnknownTable(table.table.clone()))
    }

    async fn get_column_definition(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
        column: &str,
    ) -> CatalogResult<ColumnDefinition> {
        let schema = self.get_table_schema(ctx, table).await?;
        schema.column(column).cloned().ok_or_else(|| CatalogError::UnknownColumn {
            table: table.table.clone(),
            column: column.to_string(),
        })
    }

    async fn validate_data_type(&self, _ctx: &RequestContext, type_str: &str) -> CatalogResult<IcebergType> {
        sql_core::types::validate(type_str).map_err(|e| CatalogError::UnknownDataType(e.to_string()))
    }

    async fn is_compatible_data_type(
        &self,
        _ctx: &RequestContext,
        source: &IcebergType,
        target: &IcebergType,
    ) -> CatalogResult<bool> {
        use IcebergType::*;
        let compatible = match (source, target) {
            (a, b) if a == b => true,
            (Int32, Int64) | (Float32, Float64) => true,
            (Int32, Float64) | (Int64, Float64) | (Int32, Float32) => true,
            (Date, Timestamp) | (Date, TimestampTz) | (Timestamp, TimestampTz) => true,
            _ => false,
        };
        Ok(compatible)
    }

    async fn check_privilege(
        &self,
        _ctx: &RequestContext,
        user: &str,
        database: Option<&str>,
        _table: Option<&str>,
        action: Privilege,
    ) -> CatalogResult<bool> {
        let Some(database) = database else { return Ok(true) };
        let grants = self.grants.lock().unwrap();
        let granted = grants
            .get(&(user.to_string(), database.to_string()))
            .is_some_and(|privs| privs.contains(&action) || privs.contains(&Privilege::All));
        Ok(granted)
    }

    async fn create_table(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
        schema: &[ColumnDefinition],
    ) -> CatalogResult<()> {
        let database = self
            .resolve_database(ctx, table)
            .ok_or_else(|| CatalogError::UnknownDatabase("<none selected>".to_string()))?;
        let mut databases = self.databases.lock().unwrap();
        let db = databases
            .get_mut(&database)
            .ok_or_else(|| CatalogError::UnknownDatabase(database.clone()))?;
        db.tables.insert(
            table.table.clone(),
            TableSchema {
                name: table.clone(),
                columns: schema.to_vec(),
            },
        );
        Ok(())
    }

    async fn drop_table(&self, ctx: &RequestContext, table: &TableIdentifier) -> CatalogResult<()> {
        let database = self
            .resolve_database(ctx, table)
            .ok_or_else(|| CatalogError::UnknownTable(table.table.clone()))?;
        let mut databases = self.databases.lock().unwrap();
        let db = databases
            .get_mut(&database)
            .ok_or_else(|| CatalogError::UnknownTable(table.table.clone()))?;
        if db.tables.remove(&table.table).is_some() {
            Ok(())
        } else {
            Err(CatalogError::UnknownTable(table.table.clone()))
        }
    }

    async fn alter_table(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
        action: &AlterTableAction,
    ) -> CatalogResult<()> {
        let database = self
            .resolve_database(ctx, table)
            .ok_or_else(|| CatalogError::UnknownTable(table.table.clone()))?;
        let mut databases = self.databases.lock().unwrap();
        let db = databases
            .get_mut(&database)
            .ok_or_else(|| CatalogError::UnknownTable(table.table.clone()))?;
        let schema = db
            .tables
            .get_mut(&table.table)
            .ok_or_else(|| CatalogError::UnknownTable(table.table.clone()))?;
        match action {
            AlterTableAction::DropColumn(name) => {
                schema.columns.retain(|c| &c.name != name);
            }
            AlterTableAction::AlterColumn(def) => {
                if let Some(existing) = schema.columns.iter_mut().find(|c| c.name == def.name) {
                    *existing = def.clone();
                } else {
                    schema.columns.push(def.clone());
                }
            }
            AlterTableAction::Settings(_) => {}
        }
        Ok(())
    }

    async fn list_tables(
        &self,
        ctx: &RequestContext,
        database: Option<&str>,
    ) -> CatalogResult<Vec<TableIdentifier>> {
        let database = database
            .map(|d| d.to_string())
            .or_else(|| ctx.current_database().map(|d| d.to_string()))
            .ok_or_else(|| CatalogError::UnknownDatabase("<none selected>".to_string()))?;
        let databases = self.databases.lock().unwrap();
        let db = databases
            .get(&database)
            .ok_or_else(|| CatalogError::UnknownDatabase(database.clone()))?;
        let mut names: Vec<&String> = db.tables.keys().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|t| TableIdentifier::qualified(database.clone(), t.clone()))
            .collect())
    }

    async fn list_columns(
        &self,
        ctx: &RequestContext,
        table: &TableIdentifier,
    ) -> CatalogResult<Vec<ColumnDefinition>> {
        Ok(self.get_table_schema(ctx, table).await?.columns)
    }

    async fn begin(&self, _ctx: &RequestContext) -> CatalogResult<TransactionId> {
        let id = TransactionId(self.next_tx.fetch_add(1, Ordering::SeqCst));
        self.open_tx.lock().unwrap().push(id);
        Ok(id)
    }

    async fn commit(&self, _ctx: &RequestContext, tx: TransactionId) -> CatalogResult<()> {
        let mut open = self.open_tx.lock().unwrap();
        if let Some(pos) = open.iter().position(|t| *t == tx) {
            open.remove(pos);
            Ok(())
        } else {
            Err(CatalogError::TransactionError(format!("no open transaction {}", tx.0)))
        }
    }

    async fn rollback(&self, _ctx: &RequestContext, tx: TransactionId) -> CatalogResult<()> {
        let mut open = self.open_tx.lock().unwrap();
        if let Some(pos) = open.iter().position(|t| *t == tx) {
            open.remove(pos);
            Ok(())
        } else {
            Err(CatalogError::TransactionError(format!("no open transaction {}", tx.0)))
        }
    }

    async fn close(&self) -> CatalogResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql_core::types::IcebergType;

    fn schema(table: &str, columns: Vec<(&str, IcebergType)>) -> TableSchema {
        TableSchema {
            name: TableIdentifier::unqualified(table),
            columns: columns
                .into_iter()
                .map(|(name, ty)| ColumnDefinition::new(name, ty))
                .collect(),
        }
    }

    #[tokio::test]
    async fn validates_known_table_and_column() {
        let catalog = MemoryCatalog::new()
            .with_database("sales")
            .with_table("sales", schema("orders", vec![("id", IcebergType::Int64)]));
        let ctx = RequestContext::new("alice", Some("sales".to_string()));

        catalog
            .validate_table(&ctx, &TableIdentifier::unqualified("orders"))
            .await
            .unwrap();
        catalog
            .validate_column(&ctx, &TableIdentifier::unqualified("orders"), "id")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_table_is_rejected() {
        let catalog = MemoryCatalog::new().with_database("sales");
        let ctx = RequestContext::new("alice", Some("sales".to_string()));
        let err = catalog
            .validate_table(&ctx, &TableIdentifier::unqualified("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownTable(_)));
    }

    #[tokio::test]
    async fn unknown_column_is_rejected() {
        let catalog = MemoryCatalog::new()
            .with_database("sales")
            .with_table("sales", schema("orders", vec![("id", IcebergType::Int64)]));
        let ctx = RequestContext::new("alice", Some("sales".to_string()));
        let err = catalog
            .validate_column(&ctx, &TableIdentifier::unqualified("orders"), "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownColumn { .. }));
    }

    #[tokio::test]
    async fn create_then_drop_table_round_trips() {
        let catalog = MemoryCatalog::new().with_database("sales");
        let ctx = RequestContext::new("alice", Some("sales".to_string()));
        let table = TableIdentifier::unqualified("orders");
        catalog
            .create_table(&ctx, &table, &[ColumnDefinition::new("id", IcebergType::Int64)])
            .await
            .unwrap();
        catalog.validate_table(&ctx, &table).await.unwrap();
        catalog.drop_table(&ctx, &table).await.unwrap();
        assert!(catalog.validate_table(&ctx, &table).await.is_err());
    }

    #[tokio::test]
    async fn list_tables_is_sorted() {
        let catalog = MemoryCatalog::new()
            .with_database("sales")
            .with_table("sales", schema("zeta", vec![]))
            .with_table("sales", schema("alpha", vec![]));
        let ctx = RequestContext::new("alice", Some("sales".to_string()));
        let tables = catalog.list_tables(&ctx, None).await.unwrap();
        assert_eq!(tables.iter().map(|t| t.table.as_str()).collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn privilege_check_respects_grants() {
        let catalog = MemoryCatalog::new()
            .with_database("sales")
            .grant("alice", "sales", Privilege::Select);
        let ctx = RequestContext::new("alice", Some("sales".to_string()));
        assert!(catalog
            .check_privilege(&ctx, "alice", Some("sales"), None, Privilege::Select)
            .await
            .unwrap());
        assert!(!catalog
            .check_privilege(&ctx, "alice", Some("sales"), None, Privilege::Drop)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn transaction_commit_requires_open_begin() {
        let catalog = MemoryCatalog::new();
        let ctx = RequestContext::new("alice", None);
        let tx = catalog.begin(&ctx).await.unwrap();
        catalog.commit(&ctx, tx).await.unwrap();
        assert!(catalog.commit(&ctx, tx).await.is_err());
    }
}
