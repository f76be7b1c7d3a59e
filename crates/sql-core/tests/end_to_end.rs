//! Cross-module scenarios (spec.md §8 "end-to-end scenarios"), run
//! against the public `sql_core` API rather than any one parser
//! submodule in isolation.

use sql_core::ast::{Expression, ScalarValue, SortDirection, Statement, StorageEngine};
use sql_core::error::ErrorCode;
use sql_core::parser::{parse_one, parse_recovering, parse_strict};
use sql_core::types::IcebergType;

#[test]
fn create_database_if_not_exists() {
    let stmt = parse_one("CREATE DATABASE IF NOT EXISTS sales;").unwrap();
    let Statement::CreateDatabase(s) = stmt else { panic!("expected CreateDatabase") };
    assert_eq!(s.name, "sales");
    assert!(s.if_not_exists);
}

#[test]
fn qualified_create_table_with_decimal_list_and_settings() {
    let stmt = parse_one(
        "CREATE TABLE sales.orders (id int64 NOT NULL, amount decimal(10,2), tags list<string>) \
         STORAGE filesystem PARTITION BY (id) SETTINGS cache_enabled=true, batch_size=50000;",
    )
    .unwrap();
    let Statement::CreateTable(s) = stmt else { panic!("expected CreateTable") };
    assert_eq!(s.table_name.database.as_deref(), Some("sales"));
    assert_eq!(s.table_name.table, "orders");
    assert_eq!(s.table_schema.len(), 3);

    let id = s.column("id").unwrap();
    assert!(id.not_null);

    let amount = s.column("amount").unwrap();
    assert_eq!(amount.data_type, IcebergType::Decimal { precision: 10, scale: 2 });

    let tags = s.column("tags").unwrap();
    assert_eq!(*tags.element_type.as_ref().unwrap().as_ref(), IcebergType::String);

    assert_eq!(s.storage_engine, StorageEngine::Filesystem);
    assert_eq!(s.partition_by, vec!["id".to_string()]);
    assert_eq!(s.settings.get("cache_enabled"), Some(&ScalarValue::Bool(true)));
    assert_eq!(s.settings.get("batch_size"), Some(&ScalarValue::Int(50000)));
}

#[test]
fn legacy_type_keyword_is_a_type_error_with_suggestion() {
    let err = parse_strict("CREATE TABLE t (id int);").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidIcebergType);
    assert!(err.message.contains("int"));
    assert!(err.message.contains("int32"));
}

#[test]
fn missing_storage_clause_is_a_validation_error() {
    let err = parse_strict("CREATE TABLE t (id int32);").unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingStorageEngine);
}

#[test]
fn complex_select_with_join_group_by_having_order_limit_offset() {
    let stmt = parse_one(
        "SELECT u.name, COUNT(*) FROM sales.orders o JOIN users u ON o.user = u.id \
         WHERE amount > 100 GROUP BY u.name HAVING COUNT(*) >= 2 ORDER BY u.name DESC \
         LIMIT 10 OFFSET 5;",
    )
    .unwrap();
    let Statement::Select(s) = stmt else { panic!("expected Select") };
    assert!(!s.distinct);
    assert_eq!(s.from[0].name.database.as_deref(), Some("sales"));
    assert_eq!(s.joins.len(), 1);
    assert!(matches!(&s.columns[1], Expression::AggregateFunc { arg: None, .. }));
    assert_eq!(s.group_by.len(), 1);
    assert!(s.having.is_some());
    assert_eq!(s.order_by.len(), 1);
    assert_eq!(s.order_by[0].1, SortDirection::Desc);
    assert_eq!(s.limit, Some(10));
    assert_eq!(s.offset, Some(5));
}

#[test]
fn recovery_mode_reports_missing_paren_for_an_unterminated_column_list() {
    let (statements, errors) = parse_recovering("CREATE TABLE t (id int32, name string").unwrap();
    assert!(statements.is_empty());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].code, ErrorCode::ExpectedRightParen);
}

#[test]
fn recovery_mode_keeps_a_later_statement_after_an_earlier_one_fails() {
    let (statements, errors) =
        parse_recovering("SELECT; CREATE TABLE t (id int32) STORAGE memory;").unwrap();
    assert_eq!(statements.len(), 1);
    assert!(!errors.is_empty());
}

#[test]
fn format_of_parsed_statement_reparses_to_an_equal_ast() {
    let sql = "CREATE TABLE t (id int64 NOT NULL, amount decimal(10,2)) STORAGE memory;";
    let stmt = parse_one(sql).unwrap();
    let rendered = sql_core::format_statement(&stmt);
    let reparsed = parse_one(&format!("{rendered};")).unwrap();
    assert_eq!(stmt, reparsed);
}
