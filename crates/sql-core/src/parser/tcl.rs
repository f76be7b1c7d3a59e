//! Cursor, control-flow, and procedural statements: `DECLARE`/`OPEN`/
//! `CLOSE`/`DEALLOCATE`/`FETCH`/`WHILE`/`PRINT`/`EXEC`/`EXPLAIN`
//! (spec.md §4.4 "procedural surface").

use super::Parser;
use crate::ast::{
    CloseStmt, DeallocateStmt, DeclareStmt, ExecStmt, ExplainStmt, FetchStmt, OpenStmt, PrintStmt,
    Statement, WhileStmt,
};
use crate::error::{ErrorCode, ParseError};
use crate::token::TokenKind;

impl Parser {
    pub(crate) fn parse_declare(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("DECLARE")?;
        let cursor_name = self.expect_ident()?;
        self.expect_keyword("CURSOR")?;
        self.expect_keyword("FOR")?;
        let for_select = self.parse_select_stmt_body()?;
        Ok(Statement::Declare(DeclareStmt {
            cursor_name,
            for_select,
        }))
    }

    pub(crate) fn parse_open(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("OPEN")?;
        let cursor_name = self.expect_ident()?;
        Ok(Statement::Open(OpenStmt { cursor_name }))
    }

    pub(crate) fn parse_close(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("CLOSE")?;
        let cursor_name = self.expect_ident()?;
        Ok(Statement::Close(CloseStmt { cursor_name }))
    }

    pub(crate) fn parse_deallocate(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("DEALLOCATE")?;
        let cursor_name = self.expect_ident()?;
        Ok(Statement::Deallocate(DeallocateStmt { cursor_name }))
    }

    fn parse_variable_name(&mut self) -> Result<String, ParseError> {
        if self.check_kind(TokenKind::At) {
            self.advance();
        }
        self.expect_ident()
    }

    pub(crate) fn parse_fetch(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("FETCH NEXT")?;
        self.expect_keyword("FROM")?;
        let cursor_name = self.expect_ident()?;
        self.expect_keyword("INTO")?;
        let into_variable = self.parse_variable_name()?;
        Ok(Statement::Fetch(FetchStmt {
            cursor_name,
            into_variable,
        }))
    }

    pub(crate) fn parse_while(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("WHILE")?;
        let condition = self.parse_expression()?;
        self.expect_keyword("BEGIN")?;
        let mut body = Vec::new();
        while !self.check_keyword("END") {
            if self.at_eof() {
                return Err(self.error(
                    ErrorCode::ExpectedKeyword,
                    "unterminated WHILE body, expected END",
                    vec!["END".to_string()],
                ));
            }
            let stmt = self.parse_statement()?;
            self.expect_kind(TokenKind::Semicolon, "`;`")?;
            body.push(stmt);
        }
        self.expect_keyword("END")?;
        Ok(Statement::While(WhileStmt { condition, body }))
    }

    pub(crate) fn parse_print(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("PRINT")?;
        let expr = self.parse_expression()?;
        Ok(Statement::Print(PrintStmt { expr }))
    }

    pub(crate) fn parse_exec(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("EXEC")?;
        let name = self.expect_ident()?;
        Ok(Statement::Exec(ExecStmt { name }))
    }

    pub(crate) fn parse_explain(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("EXPLAIN")?;
        let statement = self.parse_statement()?;
        Ok(Statement::Explain(ExplainStmt {
            statement: Box::new(statement),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_one;

    #[test]
    fn declare_cursor_for_select() {
        let stmt = parse_one("DECLARE c CURSOR FOR SELECT id FROM t;").unwrap();
        let Statement::Declare(s) = stmt else { panic!("expected Declare") };
        assert_eq!(s.cursor_name, "c");
        assert_eq!(s.for_select.columns.len(), 1);
    }

    #[test]
    fn open_close_deallocate_cursor() {
        assert!(matches!(parse_one("OPEN c;").unwrap(), Statement::Open(_)));
        assert!(matches!(parse_one("CLOSE c;").unwrap(), Statement::Close(_)));
        assert!(matches!(parse_one("DEALLOCATE c;").unwrap(), Statement::Deallocate(_)));
    }

    #[test]
    fn fetch_next_into_variable() {
        let stmt = parse_one("FETCH NEXT FROM c INTO @x;").unwrap();
        let Statement::Fetch(s) = stmt else { panic!("expected Fetch") };
        assert_eq!(s.cursor_name, "c");
        assert_eq!(s.into_variable, "x");
    }

    #[test]
    fn while_loop_collects_body_statements() {
        let stmt = parse_one("WHILE @x BEGIN PRINT @x; SET @x = 1; END;").map(|_| ());
        assert!(stmt.is_err(), "SET is not a standalone statement form");

        let stmt = parse_one("WHILE @x BEGIN PRINT @x; END;").unwrap();
        let Statement::While(s) = stmt else { panic!("expected While") };
        assert_eq!(s.body.len(), 1);
        assert!(matches!(s.body[0], Statement::Print(_)));
    }

    #[test]
    fn print_exec_explain() {
        assert!(matches!(parse_one("PRINT 'hi';").unwrap(), Statement::Print(_)));
        assert!(matches!(parse_one("EXEC refresh_stats;").unwrap(), Statement::Exec(_)));
        let stmt = parse_one("EXPLAIN SELECT a FROM t;").unwrap();
        let Statement::Explain(s) = stmt else { panic!("expected Explain") };
        assert!(matches!(*s.statement, Statement::Select(_)));
    }
}
