//! `SELECT`, `INSERT`, `UPDATE`, `DELETE` (spec.md §4.4 "DML").

use super::Parser;
use crate::ast::{
    DeleteStmt, InsertStmt, JoinClause, JoinKind, SelectStmt, Statement, TableRef, UnionClause,
    UpdateStmt,
};
use crate::error::{ErrorCode, ParseError};
use crate::token::TokenKind;

impl Parser {
    pub(crate) fn parse_select_stmt(&mut self) -> Result<Statement, ParseError> {
        Ok(Statement::Select(self.parse_select_stmt_body()?))
    }

    /// Parses one `SELECT` (with any trailing `UNION [ALL] SELECT ...`
    /// chained on), usable both at statement level and inside a subquery.
    pub(crate) fn parse_select_stmt_body(&mut self) -> Result<SelectStmt, ParseError> {
        let distinct = if self.eat_keyword("SELECT DISTINCT") {
            true
        } else {
            self.expect_keyword("SELECT")?;
            false
        };

        let columns = self.parse_comma_separated(|p| p.parse_expression())?;

        let from = if self.eat_keyword("FROM") {
            self.parse_comma_separated(|p| p.parse_table_ref())?
        } else {
            Vec::new()
        };

        let mut joins = Vec::new();
        loop {
            let kind = if self.eat_keyword("INNER") {
                self.eat_keyword("JOIN");
                JoinKind::Inner
            } else if self.eat_keyword("LEFT") {
                self.eat_keyword("OUTER");
                self.eat_keyword("JOIN");
                JoinKind::Left
            } else if self.eat_keyword("RIGHT") {
                self.eat_keyword("OUTER");
                self.eat_keyword("JOIN");
                JoinKind::Right
            } else if self.eat_keyword("FULL") {
                self.eat_keyword("OUTER");
                self.eat_keyword("JOIN");
                JoinKind::Full
            } else if self.eat_keyword("JOIN") {
                JoinKind::Inner
            } else {
                break;
            };
            let table = self.parse_table_ref()?;
            self.expect_keyword("ON")?;
            let on = self.parse_expression()?;
            joins.push(JoinClause { kind, table, on });
        }

        let where_clause = if self.eat_keyword("WHERE") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let group_by = if self.eat_keyword("GROUP BY") {
            self.parse_comma_separated(|p| p.parse_expression())?
        } else {
            Vec::new()
        };

        let having = if self.eat_keyword("HAVING") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let order_by = if self.eat_keyword("ORDER BY") {
            self.parse_order_by_items()?
        } else {
            Vec::new()
        };

        let limit = if self.eat_keyword("LIMIT") {
            Some(self.parse_u64_literal()?)
        } else {
            None
        };
        let offset = if self.eat_keyword("OFFSET") {
            Some(self.parse_u64_literal()?)
        } else {
            None
        };

        let union = if self.check_any_keyword(&["UNION", "UNION ALL"]) {
            let all = self.check_keyword("UNION ALL");
            self.advance();
            let select = self.parse_select_stmt_body()?;
            Some(Box::new(UnionClause { all, select }))
        } else {
            None
        };

        Ok(SelectStmt {
            distinct,
            columns,
            from,
            joins,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
            offset,
            union,
        })
    }

    fn parse_table_ref(&mut self) -> Result<TableRef, ParseError> {
        let name = self.parse_table_identifier()?;
        let alias = if self.eat_keyword("AS") {
            Some(self.expect_ident()?)
        } else if self.check_kind(TokenKind::Ident) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        Ok(TableRef { name, alias })
    }

    fn parse_u64_literal(&mut self) -> Result<u64, ParseError> {
        let tok = self.expect_kind(TokenKind::Literal, "an integer literal")?;
        match tok.value {
            crate::token::TokenValue::UInt(n) => Ok(n),
            other => Err(ParseError::syntax(
                format!("expected an unsigned integer, found `{other}`"),
                tok.position,
                None,
                vec!["unsigned integer".to_string()],
                other.to_string(),
                self.context.clone(),
                ErrorCode::ExpectedLiteral,
            )),
        }
    }

    pub(crate) fn parse_insert(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("INSERT INTO")?;
        let table_name = self.parse_table_identifier()?;
        let columns = if self.check_kind(TokenKind::LParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect_kind(TokenKind::RParen, "`)`")?;
            cols
        } else {
            Vec::new()
        };
        self.expect_keyword("VALUES")?;
        let values = self.parse_comma_separated(|p| {
            p.expect_kind(TokenKind::LParen, "`(`")?;
            let row = p.parse_comma_separated(|p| p.parse_expression())?;
            p.expect_kind(TokenKind::RParen, "`)`")?;
            Ok(row)
        })?;
        Ok(Statement::Insert(InsertStmt {
            table_name,
            columns,
            values,
        }))
    }

    pub(crate) fn parse_update(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("UPDATE")?;
        let table_name = self.parse_table_identifier()?;
        self.expect_keyword("SET")?;
        let assignments = self.parse_comma_separated(|p| {
            let col = p.expect_ident()?;
            p.expect_eq()?;
            let value = p.parse_expression()?;
            Ok((col, value))
        })?;
        let where_clause = if self.eat_keyword("WHERE") {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Statement::Update(UpdateStmt {
            table_name,
            assignments,
            where_clause,
        }))
    }

    pub(crate) fn parse_delete(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("DELETE FROM")?;
        let table_name = self.parse_table_identifier()?;
        let where_clause = if self.eat_keyword("WHERE") {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Statement::Delete(DeleteStmt {
            table_name,
            where_clause,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_one;

    #[test]
    fn select_with_join_group_by_having_order_limit_offset() {
        let stmt = parse_one(
            "SELECT DISTINCT o.id, COUNT(*) FROM orders o \
             JOIN customers c ON o.customer_id = c.id \
             WHERE o.total > 100 \
             GROUP BY o.id \
             HAVING COUNT(*) > 1 \
             ORDER BY o.id DESC \
             LIMIT 10 OFFSET 5;",
        )
        .unwrap();
        let Statement::Select(s) = stmt else { panic!("expected Select") };
        assert!(s.distinct);
        assert_eq!(s.joins.len(), 1);
        assert_eq!(s.joins[0].kind, JoinKind::Inner);
        assert!(s.where_clause.is_some());
        assert_eq!(s.group_by.len(), 1);
        assert!(s.having.is_some());
        assert_eq!(s.order_by.len(), 1);
        assert_eq!(s.limit, Some(10));
        assert_eq!(s.offset, Some(5));
    }

    #[test]
    fn left_outer_join_is_recognized() {
        let stmt = parse_one("SELECT a FROM t1 LEFT OUTER JOIN t2 ON t1.id = t2.id;").unwrap();
        let Statement::Select(s) = stmt else { panic!("expected Select") };
        assert_eq!(s.joins[0].kind, JoinKind::Left);
    }

    #[test]
    fn union_all_chains_another_select() {
        let stmt = parse_one("SELECT a FROM t1 UNION ALL SELECT a FROM t2;").unwrap();
        let Statement::Select(s) = stmt else { panic!("expected Select") };
        let union = s.union.unwrap();
        assert!(union.all);
    }

    #[test]
    fn table_ref_with_bare_alias() {
        let stmt = parse_one("SELECT x FROM orders o;").unwrap();
        let Statement::Select(s) = stmt else { panic!("expected Select") };
        assert_eq!(s.from[0].alias.as_deref(), Some("o"));
    }

    #[test]
    fn insert_with_explicit_columns_and_multiple_rows() {
        let stmt = parse_one("INSERT INTO t (a, b) VALUES (1, 2), (3, 4);").unwrap();
        let Statement::Insert(s) = stmt else { panic!("expected Insert") };
        assert_eq!(s.columns, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(s.values.len(), 2);
    }

    #[test]
    fn update_sets_multiple_columns_with_where() {
        let stmt = parse_one("UPDATE t SET a = 1, b = 2 WHERE id = 5;").unwrap();
        let Statement::Update(s) = stmt else { panic!("expected Update") };
        assert_eq!(s.assignments.len(), 2);
        assert!(s.where_clause.is_some());
    }

    #[test]
    fn delete_without_where() {
        let stmt = parse_one("DELETE FROM t;").unwrap();
        let Statement::Delete(s) = stmt else { panic!("expected Delete") };
        assert!(s.where_clause.is_none());
    }

    #[test]
    fn in_predicate_with_subquery() {
        let stmt = parse_one("SELECT a FROM t WHERE a IN (SELECT b FROM u);").unwrap();
        let Statement::Select(s) = stmt else { panic!("expected Select") };
        assert!(s.where_clause.is_some());
    }
}
