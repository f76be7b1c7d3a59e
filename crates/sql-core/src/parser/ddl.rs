//! `CREATE`/`DROP`/`ALTER` for databases, tables, indexes, users, and
//! procedures (spec.md §4.4 "DDL"), including column-definition parsing.

use super::Parser;
use crate::ast::{
    AlterTableAction, AlterTableStmt, AlterUserAction, AlterUserStmt, ColumnDefinition,
    CreateDatabaseStmt, CreateIndexStmt, CreateProcedureStmt, CreateTableStmt, CreateUserStmt,
    DefaultValue, DropDatabaseStmt, DropIndexStmt, DropProcedureStmt, DropTableStmt, DropUserStmt,
    ForeignKeyRef, ScalarValue, Statement, StorageEngine, UseStmt,
};
use crate::error::{ErrorCode, ParseError};
use crate::token::TokenKind;
use std::collections::HashMap;

impl Parser {
    pub(crate) fn parse_create(&mut self, kw: &str) -> Result<Statement, ParseError> {
        match kw {
            "CREATE TABLE" => self.parse_create_table(),
            "CREATE DATABASE" => self.parse_create_database(),
            "CREATE INDEX" => self.parse_create_index(false),
            "CREATE UNIQUE" => self.parse_create_index(true),
            "CREATE USER" => self.parse_create_user(),
            "CREATE PROCEDURE" => self.parse_create_procedure(),
            other => Err(self.error(
                ErrorCode::UnexpectedToken,
                format!("unsupported `{other}` statement"),
                vec![
                    "CREATE TABLE".into(),
                    "CREATE DATABASE".into(),
                    "CREATE INDEX".into(),
                    "CREATE USER".into(),
                    "CREATE PROCEDURE".into(),
                ],
            )),
        }
    }

    pub(crate) fn parse_drop(&mut self, kw: &str) -> Result<Statement, ParseError> {
        match kw {
            "DROP TABLE" => self.parse_drop_table(),
            "DROP DATABASE" => self.parse_drop_database(),
            "DROP INDEX" => self.parse_drop_index(),
            "DROP USER" => self.parse_drop_user(),
            "DROP PROCEDURE" => self.parse_drop_procedure(),
            other => Err(self.error(
                ErrorCode::UnexpectedToken,
                format!("unsupported `{other}` statement"),
                vec![],
            )),
        }
    }

    pub(crate) fn parse_alter(&mut self, kw: &str) -> Result<Statement, ParseError> {
        match kw {
            "ALTER TABLE" => self.parse_alter_table(),
            "ALTER USER" => self.parse_alter_user(),
            other => Err(self.error(
                ErrorCode::UnexpectedToken,
                format!("unsupported `{other}` statement"),
                vec![],
            )),
        }
    }

    pub(crate) fn parse_use(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("USE")?;
        let database = self.expect_ident()?;
        Ok(Statement::Use(UseStmt { database }))
    }

    // -- database -----------------------------------------------------------

    fn parse_create_database(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("CREATE DATABASE")?;
        let if_not_exists = self.eat_keyword("IF NOT EXISTS");
        let name = self.expect_ident()?;
        Ok(Statement::CreateDatabase(CreateDatabaseStmt {
            name,
            if_not_exists,
        }))
    }

    fn parse_drop_database(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("DROP DATABASE")?;
        let if_exists = self.eat_keyword("IF EXISTS");
        let name = self.expect_ident()?;
        Ok(Statement::DropDatabase(DropDatabaseStmt { name, if_exists }))
    }

    // -- table ----------------------------------------------------------------

    fn parse_create_table(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("CREATE TABLE")?;
        let if_not_exists = self.eat_keyword("IF NOT EXISTS");
        let table_name = self.parse_table_identifier()?;

        self.expect_kind(TokenKind::LParen, "`(`")?;
        let table_schema = self.parse_comma_separated(|p| p.parse_column_definition())?;
        self.expect_kind(TokenKind::RParen, "`)`")?;
        self.check_duplicate_columns(&table_schema)?;

        let storage_engine = if self.eat_keyword("STORAGE") {
            self.eat_eq();
            let tok = self.expect_kind(TokenKind::Ident, "a storage engine name")?;
            let word = tok.value.to_string();
            StorageEngine::parse(&word).ok_or_else(|| {
                ParseError::validation(
                    format!("`{word}` is not a known storage engine"),
                    tok.position,
                    word.clone(),
                    self.context.clone(),
                    ErrorCode::UnknownStorageEngine,
                )
            })?
        } else {
            return Err(ParseError::validation(
                "CREATE TABLE requires a STORAGE clause",
                self.peek().position,
                self.peek().describe(),
                self.context.clone(),
                ErrorCode::MissingStorageEngine,
            ));
        };

        let partition_by = if self.eat_keyword("PARTITION BY") {
            self.expect_kind(TokenKind::LParen, "`(`")?;
            let cols = self.parse_identifier_list()?;
            self.expect_kind(TokenKind::RParen, "`)`")?;
            cols
        } else {
            Vec::new()
        };

        let order_by = if self.eat_keyword("ORDER BY") {
            self.expect_kind(TokenKind::LParen, "`(`")?;
            let cols = self.parse_identifier_list()?;
            self.expect_kind(TokenKind::RParen, "`)`")?;
            cols
        } else {
            Vec::new()
        };

        let settings = if self.eat_keyword("SETTINGS") {
            self.parse_settings_map()?
        } else {
            HashMap::new()
        };

        let compress = self.eat_keyword("COMPRESS");
        let (encrypt, encrypt_key) = self.parse_optional_encrypt()?;

        Ok(Statement::CreateTable(CreateTableStmt {
            table_name,
            table_schema,
            if_not_exists,
            storage_engine,
            partition_by,
            order_by,
            settings,
            compress,
            encrypt,
            encrypt_key,
        }))
    }

    fn check_duplicate_columns(&self, columns: &[ColumnDefinition]) -> Result<(), ParseError> {
        let mut seen = std::collections::HashSet::new();
        for col in columns {
            if !seen.insert(col.name.as_str()) {
                return Err(ParseError::validation(
                    format!("duplicate column name `{}`", col.name),
                    self.peek().position,
                    col.name.clone(),
                    self.context.clone(),
                    ErrorCode::DuplicateColumnName,
                ));
            }
        }
        Ok(())
    }

    fn parse_settings_map(&mut self) -> Result<HashMap<String, ScalarValue>, ParseError> {
        let pairs = self.parse_comma_separated(|p| {
            let key = p.expect_ident()?;
            p.expect_eq()?;
            let value = p.parse_scalar_value()?;
            Ok((key, value))
        })?;
        Ok(pairs.into_iter().collect())
    }

    fn parse_optional_encrypt(&mut self) -> Result<(bool, Option<String>), ParseError> {
        if !self.eat_keyword("ENCRYPT") {
            return Ok((false, None));
        }
        let key = if self.eat_keyword("KEY") {
            match self.parse_scalar_value()? {
                ScalarValue::Str(s) => Some(s),
                _ => {
                    return Err(self.error(
                        ErrorCode::ExpectedLiteral,
                        "ENCRYPT KEY requires a string literal",
                        vec!["string literal".to_string()],
                    ))
                }
            }
        } else {
            None
        };
        Ok((true, key))
    }

    /// One `name type [constraint...]` entry inside a `CREATE TABLE` column
    /// list (spec.md §3's `ColumnDefinition`).
    fn parse_column_definition(&mut self) -> Result<ColumnDefinition, ParseError> {
        let name = self.expect_ident()?;
        let data_type = self.parse_data_type()?;
        let mut col = ColumnDefinition::new(name, data_type);

        loop {
            if self.eat_keyword("NOT NULL") {
                col.set_not_null(true);
            } else if self.eat_keyword("NULL") {
                col.set_not_null(false);
            } else if self.eat_keyword("PRIMARY KEY") {
                col.unique = true;
                col.set_not_null(true);
            } else if self.eat_keyword("UNIQUE") {
                col.unique = true;
            } else if self.eat_keyword("SEQUENCE") {
                col.sequence = true;
            } else if self.eat_keyword("COMPRESS") {
                col.compress = true;
            } else if self.eat_keyword("DEFAULT") {
                col.default_value = Some(self.parse_default_value()?);
            } else if self.eat_keyword("FOREIGN KEY") {
                // optional marker; the binding itself comes from REFERENCES.
                continue;
            } else if self.eat_keyword("REFERENCES") {
                let ref_table = self.parse_table_identifier()?;
                self.expect_kind(TokenKind::LParen, "`(`")?;
                let ref_column = self.expect_ident()?;
                self.expect_kind(TokenKind::RParen, "`)`")?;
                col.reference = Some(ForeignKeyRef {
                    column: col.name.clone(),
                    ref_table,
                    ref_column,
                });
            } else if self.eat_keyword("CHECK") {
                self.expect_kind(TokenKind::LParen, "`(`")?;
                let expr = self.parse_expression()?;
                self.expect_kind(TokenKind::RParen, "`)`")?;
                col.check = Some(expr);
            } else if self.check_keyword("ENCRYPT") {
                let (_, key) = self.parse_optional_encrypt()?;
                col.encrypt_key = key;
            } else {
                break;
            }
        }
        Ok(col)
    }

    fn parse_default_value(&mut self) -> Result<DefaultValue, ParseError> {
        if self.eat_keyword("SYSDATE") {
            return Ok(DefaultValue::SysDate);
        }
        if self.eat_keyword("SYSTIME") {
            return Ok(DefaultValue::SysTime);
        }
        if self.eat_keyword("SYSTIMESTAMP") {
            return Ok(DefaultValue::SysTimestamp);
        }
        if self.eat_keyword("GENUUID") {
            return Ok(DefaultValue::GenUuid);
        }
        Ok(DefaultValue::Literal(self.parse_scalar_value()?))
    }

    fn parse_drop_table(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("DROP TABLE")?;
        let if_exists = self.eat_keyword("IF EXISTS");
        let table_name = self.parse_table_identifier()?;
        Ok(Statement::DropTable(DropTableStmt {
            table_name,
            if_exists,
        }))
    }

    fn parse_alter_table(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("ALTER TABLE")?;
        let table_name = self.parse_table_identifier()?;

        let action = if self.eat_keyword("DROP COLUMN") {
            let col = self.expect_ident()?;
            AlterTableAction::DropColumn(col)
        } else if self.eat_keyword("ALTER COLUMN") {
            let col = self.parse_column_definition()?;
            AlterTableAction::AlterColumn(col)
        } else if self.eat_keyword("SETTINGS") {
            AlterTableAction::Settings(self.parse_settings_map()?)
        } else {
            return Err(self.error(
                ErrorCode::ExpectedKeyword,
                "expected DROP COLUMN, ALTER COLUMN, or SETTINGS",
                vec![
                    "DROP COLUMN".into(),
                    "ALTER COLUMN".into(),
                    "SETTINGS".into(),
                ],
            ));
        };

        Ok(Statement::AlterTable(AlterTableStmt { table_name, action }))
    }

    // -- index ------------------------------------------------------------

    fn parse_create_index(&mut self, unique: bool) -> Result<Statement, ParseError> {
        if unique {
            self.expect_keyword("CREATE UNIQUE")?;
            self.expect_keyword("INDEX")?;
        } else {
            self.expect_keyword("CREATE INDEX")?;
        }
        let name = self.expect_ident()?;
        self.expect_keyword("ON")?;
        let table_name = self.parse_table_identifier()?;
        self.expect_kind(TokenKind::LParen, "`(`")?;
        let columns = self.parse_identifier_list()?;
        self.expect_kind(TokenKind::RParen, "`)`")?;
        Ok(Statement::CreateIndex(CreateIndexStmt {
            name,
            unique,
            table_name,
            columns,
        }))
    }

    fn parse_drop_index(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("DROP INDEX")?;
        let name = self.expect_ident()?;
        self.expect_keyword("ON")?;
        let table_name = self.parse_table_identifier()?;
        Ok(Statement::DropIndex(DropIndexStmt { name, table_name }))
    }

    // -- user / procedure --------------------------------------------------

    fn parse_create_user(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("CREATE USER")?;
        let name = self.expect_ident()?;
        self.expect_keyword("IDENTIFIED BY")?;
        let password = self.expect_string_literal()?;
        Ok(Statement::CreateUser(CreateUserStmt { name, password }))
    }

    fn parse_drop_user(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("DROP USER")?;
        let name = self.expect_ident()?;
        Ok(Statement::DropUser(DropUserStmt { name }))
    }

    fn parse_alter_user(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("ALTER USER")?;
        let name = self.expect_ident()?;
        let action = if self.eat_keyword("SET PASSWORD") {
            AlterUserAction::SetPassword(self.expect_string_literal()?)
        } else if self.eat_keyword("SET USERNAME") {
            AlterUserAction::SetUsername(self.expect_ident()?)
        } else {
            return Err(self.error(
                ErrorCode::ExpectedKeyword,
                "expected SET PASSWORD or SET USERNAME",
                vec!["SET PASSWORD".into(), "SET USERNAME".into()],
            ));
        };
        Ok(Statement::AlterUser(AlterUserStmt { name, action }))
    }

    fn parse_create_procedure(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("CREATE PROCEDURE")?;
        let name = self.expect_ident()?;
        self.expect_kind(TokenKind::LParen, "`(`")?;
        self.expect_kind(TokenKind::RParen, "`)`")?;
        self.expect_keyword("BEGIN")?;
        let start = self.peek().position.offset;
        let mut depth = 1usize;
        let mut end = start;
        while depth > 0 {
            if self.at_eof() {
                return Err(self.error(
                    ErrorCode::ExpectedKeyword,
                    "unterminated procedure body, expected END",
                    vec!["END".to_string()],
                ));
            }
            if self.check_keyword("BEGIN") {
                let tok = self.advance();
                end = tok.position.end();
                depth += 1;
                continue;
            }
            if self.check_keyword("END") {
                depth -= 1;
                let tok = self.advance();
                end = tok.position.end();
                continue;
            }
            end = self.peek().position.end();
            self.advance();
        }
        let body = self.context.source[start..end].trim_end().to_string();
        Ok(Statement::CreateProcedure(CreateProcedureStmt { name, body }))
    }

    fn parse_drop_procedure(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("DROP PROCEDURE")?;
        let name = self.expect_ident()?;
        Ok(Statement::DropProcedure(DropProcedureStmt { name }))
    }

    pub(crate) fn expect_string_literal(&mut self) -> Result<String, ParseError> {
        let tok = self.expect_kind(TokenKind::Literal, "a string literal")?;
        match tok.value {
            crate::token::TokenValue::Str(s) => Ok(super::unquote(&s)),
            other => Err(ParseError::syntax(
                format!("expected a string literal, found `{other}`"),
                tok.position,
                None,
                vec!["string literal".to_string()],
                other.to_string(),
                self.context.clone(),
                ErrorCode::ExpectedLiteral,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_one;
    use crate::types::IcebergType;

    #[test]
    fn create_database_if_not_exists() {
        let stmt = parse_one("CREATE DATABASE IF NOT EXISTS sales;").unwrap();
        let Statement::CreateDatabase(s) = stmt else { panic!("expected CreateDatabase") };
        assert!(s.if_not_exists);
        assert_eq!(s.name, "sales");
    }

    #[test]
    fn create_table_missing_storage_is_a_validation_error() {
        let err = crate::parser::parse_strict("CREATE TABLE t (id int32);").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingStorageEngine);
        assert_eq!(err.category(), crate::error::ErrorCategory::Validation);
    }

    #[test]
    fn storage_clause_tolerates_an_optional_equals_sign() {
        let stmt = parse_one("CREATE TABLE t (id int32) STORAGE = memory;").unwrap();
        let Statement::CreateTable(s) = stmt else { panic!("expected CreateTable") };
        assert_eq!(s.storage_engine, StorageEngine::Memory);
    }

    #[test]
    fn create_table_unknown_storage_engine() {
        let err = crate::parser::parse_strict("CREATE TABLE t (id int32) STORAGE hdfs;").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownStorageEngine);
    }

    #[test]
    fn create_table_duplicate_column_name() {
        let err =
            crate::parser::parse_strict("CREATE TABLE t (id int32, id int64) STORAGE memory;").unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateColumnName);
    }

    #[test]
    fn primary_key_implies_unique_and_not_null() {
        let stmt = parse_one("CREATE TABLE t (id int64 PRIMARY KEY) STORAGE memory;").unwrap();
        let Statement::CreateTable(s) = stmt else { panic!("expected CreateTable") };
        let col = &s.table_schema[0];
        assert!(col.unique);
        assert!(col.not_null);
    }

    #[test]
    fn create_table_with_partition_order_and_settings() {
        let stmt = parse_one(
            "CREATE TABLE t (id int64, region string) STORAGE s3 PARTITION BY (region) ORDER BY (id) SETTINGS retention = 30;",
        )
        .unwrap();
        let Statement::CreateTable(s) = stmt else { panic!("expected CreateTable") };
        assert_eq!(s.partition_by, vec!["region".to_string()]);
        assert_eq!(s.order_by, vec!["id".to_string()]);
        assert_eq!(s.settings.get("retention"), Some(&ScalarValue::Int(30)));
    }

    #[test]
    fn foreign_key_references_binds_to_column() {
        let stmt = parse_one(
            "CREATE TABLE orders (customer_id int64 FOREIGN KEY REFERENCES customers(id)) STORAGE memory;",
        )
        .unwrap();
        let Statement::CreateTable(s) = stmt else { panic!("expected CreateTable") };
        let reference = s.table_schema[0].reference.as_ref().unwrap();
        assert_eq!(reference.ref_table.table, "customers");
        assert_eq!(reference.ref_column, "id");
    }

    #[test]
    fn check_constraint_parses_an_expression() {
        let stmt = parse_one("CREATE TABLE t (age int32 CHECK (age > 0)) STORAGE memory;").unwrap();
        let Statement::CreateTable(s) = stmt else { panic!("expected CreateTable") };
        assert!(s.table_schema[0].check.is_some());
    }

    #[test]
    fn struct_column_type_round_trips() {
        let stmt =
            parse_one("CREATE TABLE t (addr struct<city:string,zip:int32>) STORAGE memory;").unwrap();
        let Statement::CreateTable(s) = stmt else { panic!("expected CreateTable") };
        assert_eq!(s.table_schema[0].data_type, IcebergType::Struct(vec![
            crate::types::StructField { name: "city".to_string(), ty: IcebergType::String },
            crate::types::StructField { name: "zip".to_string(), ty: IcebergType::Int32 },
        ]));
    }

    #[test]
    fn alter_table_drop_column() {
        let stmt = parse_one("ALTER TABLE t DROP COLUMN old_col;").unwrap();
        let Statement::AlterTable(s) = stmt else { panic!("expected AlterTable") };
        assert_eq!(s.action, AlterTableAction::DropColumn("old_col".to_string()));
    }

    #[test]
    fn create_unique_index() {
        let stmt = parse_one("CREATE UNIQUE INDEX idx_email ON users (email);").unwrap();
        let Statement::CreateIndex(s) = stmt else { panic!("expected CreateIndex") };
        assert!(s.unique);
        assert_eq!(s.columns, vec!["email".to_string()]);
    }

    #[test]
    fn create_user_and_alter_password() {
        let stmt = parse_one("CREATE USER alice IDENTIFIED BY 'hunter2';").unwrap();
        let Statement::CreateUser(s) = stmt else { panic!("expected CreateUser") };
        assert_eq!(s.password, "hunter2");

        let stmt = parse_one("ALTER USER alice SET PASSWORD 'newpass';").unwrap();
        let Statement::AlterUser(s) = stmt else { panic!("expected AlterUser") };
        assert_eq!(s.action, AlterUserAction::SetPassword("newpass".to_string()));
    }

    #[test]
    fn create_procedure_captures_body_text() {
        let stmt = parse_one("CREATE PROCEDURE refresh_stats() BEGIN PRINT 'hi'; END;").unwrap();
        let Statement::CreateProcedure(s) = stmt else { panic!("expected CreateProcedure") };
        assert!(s.body.contains("PRINT"));
    }

    #[test]
    fn create_procedure_with_nested_begin_end() {
        let stmt = parse_one(
            "CREATE PROCEDURE p() BEGIN WHILE @x BEGIN PRINT @x; END; END;",
        )
        .unwrap();
        let Statement::CreateProcedure(s) = stmt else { panic!("expected CreateProcedure") };
        assert!(s.body.contains("WHILE"));
    }
}
