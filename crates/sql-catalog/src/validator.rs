//! Post-parse validation: walks a [`Statement`] and checks every table,
//! column, and database name it names against a [`CatalogAdapter`]
//! (spec.md §4.7). Validation is a separate pass from parsing — a
//! statement can parse perfectly and still fail here, and a validation
//! failure never invalidates the parse that produced the statement.

use crate::adapter::{CatalogAdapter, RequestContext};
use crate::error::{CatalogError, CatalogResult};
use sql_core::ast::{SelectStmt, Statement};
use std::future::Future;
use std::pin::Pin;

pub struct Validator<'a> {
    adapter: &'a dyn CatalogAdapter,
}

impl<'a> Validator<'a> {
    pub fn new(adapter: &'a dyn CatalogAdapter) -> Self {
        Self { adapter }
    }

    pub async fn validate(&self, ctx: &RequestContext, stmt: &Statement) -> CatalogResult<()> {
        if ctx.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        match stmt {
            Statement::Select(s) => self.validate_select(ctx, s).await,
            Statement::Insert(s) => {
                self.adapter.validate_table(ctx, &s.table_name).await?;
                for column in &s.columns {
                    if ctx.is_cancelled() {
                        return Err(CatalogError::Cancelled);
                    }
                    self.adapter.validate_column(ctx, &s.table_name, column).await?;
                }
                Ok(())
            }
            Statement::Update(s) => {
                self.adapter.validate_table(ctx, &s.table_name).await?;
                for (column, _) in &s.assignments {
                    if ctx.is_cancelled() {
                        return Err(CatalogError::Cancelled);
                    }
                    self.adapter.validate_column(ctx, &s.table_name, column).await?;
                }
                Ok(())
            }
            Statement::Delete(s) => self.adapter.validate_table(ctx, &s.table_name).await,
            Statement::DropTable(s) => self.adapter.validate_table(ctx, &s.table_name).await,
            Statement::AlterTable(s) => self.adapter.validate_table(ctx, &s.table_name).await,
            Statement::Use(s) => self.adapter.validate_database(ctx, &s.database).await,
            Statement::CreateTable(s) => {
                for column in &s.table_schema {
                    if ctx.is_cancelled() {
                        return Err(CatalogError::Cancelled);
                    }
                    self.adapter
                        .validate_data_type(ctx, &column.data_type.to_string())
                        .await?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Validates every `FROM`/`JOIN` table in a `SELECT`, following any
    /// `UNION` chain. Aliases are noted but never dereferenced — a join
    /// condition referencing an alias is the parser's concern, not the
    /// catalog's.
    fn validate_select<'f>(
        &'f self,
        ctx: &'f RequestContext,
        s: &'f SelectStmt,
    ) -> Pin<Box<dyn Future<Output = CatalogResult<()>> + Send + 'f>> {
        Box::pin(async move {
            for table_ref in &s.from {
                if ctx.is_cancelled() {
                    return Err(CatalogError::Cancelled);
                }
                self.adapter.validate_table(ctx, &table_ref.name).await?;
            }
            for join in &s.joins {
                if ctx.is_cancelled() {
                    return Err(CatalogError::Cancelled);
                }
                self.adapter.validate_table(ctx, &join.table.name).await?;
            }
            if let Some(union) = &s.union {
                self.validate_select(ctx, &union.select).await?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::TableSchema;
    use crate::memory::MemoryCatalog;
    use sql_core::ast::TableIdentifier;
    use sql_core::parser::parse_one;
    use sql_core::types::IcebergType;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new().with_database("sales").with_table(
            "sales",
            TableSchema {
                name: TableIdentifier::unqualified("orders"),
                columns: vec![
                    sql_core::ast::ColumnDefinition::new("id", IcebergType::Int64),
                    sql_core::ast::ColumnDefinition::new("total", IcebergType::Float64),
                ],
            },
        )
    }

    fn ctx() -> RequestContext {
        RequestContext::new("alice", Some("sales".to_string()))
    }

    #[tokio::test]
    async fn select_validates_from_table() {
        let catalog = catalog();
        let validator = Validator::new(&catalog);
        let stmt = parse_one("SELECT id FROM orders;").unwrap();
        validator.validate(&ctx(), &stmt).await.unwrap();

        let stmt = parse_one("SELECT id FROM ghost;").unwrap();
        let err = validator.validate(&ctx(), &stmt).await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownTable(_)));
    }

    #[tokio::test]
    async fn select_validates_every_join_table() {
        let catalog = catalog();
        let validator = Validator::new(&catalog);
        let stmt = parse_one("SELECT id FROM orders JOIN ghost ON orders.id = ghost.id;").unwrap();
        let err = validator.validate(&ctx(), &stmt).await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownTable(_)));
    }

    #[tokio::test]
    async fn select_follows_union_chain() {
        let catalog = catalog();
        let validator = Validator::new(&catalog);
        let stmt = parse_one("SELECT id FROM orders UNION ALL SELECT id FROM ghost;").unwrap();
        let err = validator.validate(&ctx(), &stmt).await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownTable(_)));
    }

    #[tokio::test]
    async fn insert_validates_table_and_named_columns() {
        let catalog = catalog();
        let validator = Validator::new(&catalog);
        let stmt = parse_one("INSERT INTO orders (id, total) VALUES (1, 2.0);").unwrap();
        validator.validate(&ctx(), &stmt).await.unwrap();

        let stmt = parse_one("INSERT INTO orders (id, ghost) VALUES (1, 2.0);").unwrap();
        let err = validator.validate(&ctx(), &stmt).await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownColumn { .. }));
    }

    #[tokio::test]
    async fn update_validates_set_columns() {
        let catalog = catalog();
        let validator = Validator::new(&catalog);
        let stmt = parse_one("UPDATE orders SET ghost = 1 WHERE id = 1;").unwrap();
        let err = validator.validate(&ctx(), &stmt).await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownColumn { .. }));
    }

    #[tokio::test]
    async fn use_validates_database() {
        let catalog = catalog();
        let validator = Validator::new(&catalog);
        let stmt = parse_one("USE sales;").unwrap();
        validator.validate(&ctx(), &stmt).await.unwrap();

        let stmt = parse_one("USE ghost;").unwrap();
        let err = validator.validate(&ctx(), &stmt).await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownDatabase(_)));
    }

    #[tokio::test]
    async fn create_table_revalidates_every_column_type() {
        let catalog = catalog();
        let validator = Validator::new(&catalog);
        let stmt = parse_one("CREATE TABLE t (a int32, b string) STORAGE filesystem;").unwrap();
        validator.validate(&ctx(), &stmt).await.unwrap();
    }

    #[tokio::test]
    async fn cancellation_short_circuits_validation() {
        let catalog = catalog();
        let validator = Validator::new(&catalog);
        let ctx = ctx();
        ctx.cancel();
        let stmt = parse_one("SELECT id FROM orders;").unwrap();
        let err = validator.validate(&ctx, &stmt).await.unwrap_err();
        assert!(matches!(err, CatalogError::Cancelled));
    }
}
