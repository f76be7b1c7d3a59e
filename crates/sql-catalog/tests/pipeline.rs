//! Cross-crate scenarios: parse with `sql-core`, then validate the
//! resulting statements against a `MemoryCatalog` through the public
//! `CatalogAdapter`/`Validator` surface.

use sql_catalog::{CatalogAdapter, MemoryCatalog, RequestContext, TableSchema, Validator};
use sql_core::ast::{ColumnDefinition, Privilege, TableIdentifier};
use sql_core::parser::parse_strict;
use sql_core::types::IcebergType;

fn seeded_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_database("sales")
        .with_table(
            "sales",
            TableSchema {
                name: TableIdentifier::unqualified("orders"),
                columns: vec![
                    ColumnDefinition::new("id", IcebergType::Int64),
                    ColumnDefinition::new("amount", IcebergType::Decimal { precision: 10, scale: 2 }),
                ],
            },
        )
        .grant("alice", "sales", Privilege::Select)
}

#[tokio::test]
async fn a_parsed_script_validates_statement_by_statement() {
    let catalog = seeded_catalog();
    let ctx = RequestContext::new("alice", Some("sales".to_string()));
    let validator = Validator::new(&catalog);

    let statements = parse_strict(
        "USE sales; SELECT id, amount FROM orders WHERE amount > 0; \
         UPDATE orders SET amount = 1 WHERE id = 1;",
    )
    .unwrap();
    assert_eq!(statements.len(), 3);

    for stmt in &statements {
        validator.validate(&ctx, stmt).await.unwrap();
    }
}

#[tokio::test]
async fn a_statement_naming_an_unknown_table_fails_validation_without_touching_the_parse() {
    let catalog = seeded_catalog();
    let ctx = RequestContext::new("alice", Some("sales".to_string()));
    let validator = Validator::new(&catalog);

    let stmt = parse_strict("DELETE FROM shipments WHERE id = 1;").unwrap().remove(0);
    let err = validator.validate(&ctx, &stmt).await.unwrap_err();
    assert!(err.to_string().contains("shipments"));
}

#[tokio::test]
async fn check_privilege_reflects_grants_made_through_the_builder() {
    let catalog = seeded_catalog();
    let ctx = RequestContext::new("alice", Some("sales".to_string()));

    assert!(catalog
        .check_privilege(&ctx, "alice", Some("sales"), None, Privilege::Select)
        .await
        .unwrap());
    assert!(!catalog
        .check_privilege(&ctx, "alice", Some("sales"), None, Privilege::Insert)
        .await
        .unwrap());
}

#[tokio::test]
async fn is_compatible_data_type_widens_numeric_and_temporal_types() {
    let catalog = seeded_catalog();
    let ctx = RequestContext::new("alice", Some("sales".to_string()));

    assert!(catalog
        .is_compatible_data_type(&ctx, &IcebergType::Int32, &IcebergType::Int64)
        .await
        .unwrap());
    assert!(catalog
        .is_compatible_data_type(&ctx, &IcebergType::Date, &IcebergType::TimestampTz)
        .await
        .unwrap());
    assert!(!catalog
        .is_compatible_data_type(&ctx, &IcebergType::String, &IcebergType::Int64)
        .await
        .unwrap());
}

#[tokio::test]
async fn transaction_lifecycle_begin_commit_rollback() {
    let catalog = seeded_catalog();
    let ctx = RequestContext::new("alice", Some("sales".to_string()));

    let tx = catalog.begin(&ctx).await.unwrap();
    catalog.commit(&ctx, tx).await.unwrap();
    assert!(catalog.rollback(&ctx, tx).await.is_err());
}

#[tokio::test]
async fn a_child_context_cancellation_does_not_cancel_the_parent() {
    let catalog = seeded_catalog();
    let parent = RequestContext::new("alice", Some("sales".to_string()));
    let child = parent.child();
    child.cancel();

    assert!(!parent.is_cancelled());
    assert!(child.is_cancelled());

    let validator = Validator::new(&catalog);
    let stmt = parse_strict("SELECT id FROM orders;").unwrap().remove(0);
    validator.validate(&parent, &stmt).await.unwrap();
    assert!(validator.validate(&child, &stmt).await.is_err());
}
