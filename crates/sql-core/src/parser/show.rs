//! `SHOW` introspection forms (spec.md §4.4).

use super::Parser;
use crate::ast::{ShowStmt, Statement};
use crate::error::{ErrorCode, ParseError};

impl Parser {
    pub(crate) fn parse_show(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("SHOW")?;

        if self.eat_keyword("DATABASES") {
            return Ok(Statement::Show(ShowStmt::Databases));
        }
        if self.eat_keyword("TABLES") {
            let from = if self.eat_keyword("FROM") {
                Some(self.expect_ident()?)
            } else {
                None
            };
            return Ok(Statement::Show(ShowStmt::Tables { from }));
        }
        if self.eat_keyword("USERS") {
            return Ok(Statement::Show(ShowStmt::Users));
        }
        if self.eat_keyword("INDEXES") {
            self.expect_keyword("FROM")?;
            let table = self.parse_table_identifier()?;
            return Ok(Statement::Show(ShowStmt::Indexes { table }));
        }
        if self.eat_keyword("COLUMNS") {
            self.expect_keyword("FROM")?;
            let table = self.parse_table_identifier()?;
            return Ok(Statement::Show(ShowStmt::Columns { table }));
        }
        if self.eat_keyword("CREATE TABLE") {
            let table = self.parse_table_identifier()?;
            return Ok(Statement::Show(ShowStmt::CreateTable { table }));
        }
        if self.eat_keyword("GRANTS") {
            let user = if self.eat_keyword("FOR") {
                Some(self.expect_ident()?)
            } else {
                None
            };
            return Ok(Statement::Show(ShowStmt::Grants { user }));
        }

        Err(self.error(
            ErrorCode::ExpectedKeyword,
            "expected DATABASES, TABLES, USERS, INDEXES, COLUMNS, CREATE TABLE, or GRANTS",
            vec![
                "DATABASES".into(),
                "TABLES".into(),
                "USERS".into(),
                "INDEXES".into(),
                "COLUMNS".into(),
                "CREATE TABLE".into(),
                "GRANTS".into(),
            ],
        ))
    }
}
