//! `GRANT`/`REVOKE` (spec.md §4.4 "DCL").

use super::Parser;
use crate::ast::{GrantStmt, GrantTarget, Privilege, RevokeStmt, Statement};
use crate::error::{ErrorCode, ParseError};

impl Parser {
    fn parse_privilege(&mut self) -> Result<Privilege, ParseError> {
        let Some(word) = self.peek().keyword_text().map(|s| s.to_string()) else {
            return Err(self.error(
                ErrorCode::ExpectedKeyword,
                "expected a privilege name",
                vec![],
            ));
        };
        let privilege = match word.as_str() {
            "SELECT" => Privilege::Select,
            "INSERT" => Privilege::Insert,
            "UPDATE" => Privilege::Update,
            "DELETE" => Privilege::Delete,
            "ALL" => Privilege::All,
            "DROP" => Privilege::Drop,
            "CREATE" => Privilege::Create,
            "CONNECT" => Privilege::Connect,
            "ALTER" => Privilege::Alter,
            "REVOKE" => Privilege::Revoke,
            "GRANT" => Privilege::Grant,
            "SHOW" => Privilege::Show,
            "EXEC" => Privilege::Exec,
            "EXPLAIN" => Privilege::Explain,
            "PRINT" => Privilege::Print,
            "DECLARE" => Privilege::Declare,
            "OPEN" => Privilege::Open,
            "CLOSE" => Privilege::Close,
            "DEALLOCATE" => Privilege::Deallocate,
            "FETCH" => Privilege::Fetch,
            "WHILE" => Privilege::While,
            "RETURN" => Privilege::Return,
            "BREAK" => Privilege::Break,
            "SET" => Privilege::Set,
            "EXIT" => Privilege::Exit,
            "BEGIN" => Privilege::Begin,
            "COMMIT" => Privilege::Commit,
            "ROLLBACK" => Privilege::Rollback,
            other => {
                return Err(self.error(
                    ErrorCode::UnexpectedToken,
                    format!("`{other}` is not a privilege"),
                    vec![],
                ))
            }
        };
        self.advance();
        Ok(privilege)
    }

    fn parse_grant_target(&mut self) -> Result<GrantTarget, ParseError> {
        if self.eat_keyword("DATABASE") {
            let database = self.expect_ident()?;
            Ok(GrantTarget::AllInDatabase(database))
        } else {
            let table = self.parse_table_identifier()?;
            Ok(GrantTarget::Table(table))
        }
    }

    pub(crate) fn parse_grant(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("GRANT")?;
        let privileges = self.parse_comma_separated(|p| p.parse_privilege())?;
        self.expect_keyword("ON")?;
        let target = self.parse_grant_target()?;
        self.expect_keyword("TO")?;
        let user = self.expect_ident()?;
        Ok(Statement::Grant(GrantStmt {
            privileges,
            target,
            user,
        }))
    }

    pub(crate) fn parse_revoke(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("REVOKE")?;
        let privileges = self.parse_comma_separated(|p| p.parse_privilege())?;
        self.expect_keyword("ON")?;
        let target = self.parse_grant_target()?;
        self.expect_keyword("FROM")?;
        let user = self.expect_ident()?;
        Ok(Statement::Revoke(RevokeStmt {
            privileges,
            target,
            user,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_one;

    #[test]
    fn grant_multiple_privileges_on_table() {
        let stmt = parse_one("GRANT SELECT, INSERT ON sales.orders TO alice;").unwrap();
        let Statement::Grant(s) = stmt else { panic!("expected Grant") };
        assert_eq!(s.privileges, vec![Privilege::Select, Privilege::Insert]);
        assert_eq!(s.target, GrantTarget::Table(crate::ast::TableIdentifier::qualified("sales", "orders")));
        assert_eq!(s.user, "alice");
    }

    #[test]
    fn grant_all_in_database() {
        let stmt = parse_one("GRANT ALL ON DATABASE sales TO bob;").unwrap();
        let Statement::Grant(s) = stmt else { panic!("expected Grant") };
        assert_eq!(s.target, GrantTarget::AllInDatabase("sales".to_string()));
    }

    #[test]
    fn revoke_uses_from_instead_of_to() {
        let stmt = parse_one("REVOKE SELECT ON t FROM alice;").unwrap();
        let Statement::Revoke(s) = stmt else { panic!("expected Revoke") };
        assert_eq!(s.privileges, vec![Privilege::Select]);
    }

    #[test]
    fn unknown_privilege_is_rejected() {
        let err = crate::parser::parse_strict("GRANT FOO ON t TO alice;").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedToken);
    }
}
