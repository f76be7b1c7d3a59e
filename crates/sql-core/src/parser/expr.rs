//! Expression grammar: Pratt-style precedence climbing (spec.md §4.4).
//!
//! Tightest to loosest: primary, unary (`-`/`+`), multiplicative, additive,
//! comparison/predicates, `NOT`, `AND`, `OR`.

use super::Parser;
use crate::ast::{
    AggregateKind, BinaryOp, CompareOp, Expression, LogicalOp, ScalarValue, SortDirection,
    SystemFunc, UnaryOp, WhenClause, WindowSpec,
};
use crate::error::{ErrorCode, ParseError};
use crate::token::{Position, TokenKind, TokenValue};

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_and()?;
        while self.check_keyword("OR") {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::LogicalCondition {
                left: Box::new(left),
                op: LogicalOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_not()?;
        while self.check_keyword("AND") {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::LogicalCondition {
                left: Box::new(left),
                op: LogicalOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `NOT` binds tighter than `AND` (spec.md §4.4 precedence note).
    /// `NOT EXISTS (...)` produces a negated `ExistsPredicate` rather than
    /// a `NotExpr` wrapper, matching how the catalog validator expects to
    /// see it (spec.md §6.1).
    fn parse_not(&mut self) -> Result<Expression, ParseError> {
        if self.check_keyword("NOT") {
            if self.peek_at(1).keyword_text() == Some("EXISTS") {
                self.advance();
                return self.parse_exists(true);
            }
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Expression::NotExpr(Box::new(operand)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression, ParseError> {
        let left = self.parse_additive()?;

        if self.check_kind(TokenKind::Comparison) {
            let op_text = self.peek().value.to_string();
            let op = match op_text.as_str() {
                "=" => CompareOp::Eq,
                "<>" => CompareOp::NotEq,
                "<" => CompareOp::Lt,
                "<=" => CompareOp::LtEq,
                ">" => CompareOp::Gt,
                ">=" => CompareOp::GtEq,
                _ => {
                    return Err(self.error(
                        ErrorCode::UnexpectedToken,
                        format!("`{op_text}` is not a valid comparison operator"),
                        vec![],
                    ))
                }
            };
            self.advance();
            let right = self.parse_additive()?;
            return Ok(Expression::ComparisonPredicate {
                left: Box::new(left),
                op,
                right: Box::new(right),
            });
        }

        if self.check_any_keyword(&["BETWEEN", "NOT BETWEEN"]) {
            let negated = self.check_keyword("NOT BETWEEN");
            self.advance();
            let lower = self.parse_additive()?;
            self.expect_keyword("AND")?;
            let upper = self.parse_additive()?;
            return Ok(Expression::BetweenPredicate {
                expr: Box::new(left),
                negated,
                lower: Box::new(lower),
                upper: Box::new(upper),
            });
        }

        if self.check_any_keyword(&["IN", "NOT IN"]) {
            let negated = self.check_keyword("NOT IN");
            self.advance();
            self.expect_kind(TokenKind::LParen, "`(`")?;
            if self.check_keyword("SELECT") {
                let subquery = self.parse_select_stmt_body()?;
                self.expect_kind(TokenKind::RParen, "`)`")?;
                return Ok(Expression::InPredicate {
                    expr: Box::new(left),
                    negated,
                    list: vec![],
                    subquery: Some(Box::new(subquery)),
                });
            }
            let list = self.parse_comma_separated(|p| p.parse_expression())?;
            self.expect_kind(TokenKind::RParen, "`)`")?;
            return Ok(Expression::InPredicate {
                expr: Box::new(left),
                negated,
                list,
                subquery: None,
            });
        }

        if self.check_any_keyword(&["LIKE", "NOT LIKE"]) {
            let negated = self.check_keyword("NOT LIKE");
            self.advance();
            let pattern = self.parse_additive()?;
            return Ok(Expression::LikePredicate {
                expr: Box::new(left),
                negated,
                pattern: Box::new(pattern),
            });
        }

        if self.check_any_keyword(&["IS", "IS NOT"]) {
            let negated = self.check_keyword("IS NOT");
            self.advance();
            self.expect_keyword("NULL")?;
            return Ok(Expression::IsPredicate {
                expr: Box::new(left),
                negated,
            });
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.check_kind(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.check_kind(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expression::BinaryExpression {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.check_kind(TokenKind::Asterisk) {
                BinaryOp::Mul
            } else if self.check_kind(TokenKind::Divide) {
                BinaryOp::Div
            } else if self.check_kind(TokenKind::Modulus) {
                BinaryOp::Mod
            } else {
                break;
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::BinaryExpression {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        if self.check_kind(TokenKind::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::UnaryExpr {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        if self.check_kind(TokenKind::Plus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::UnaryExpr {
                op: UnaryOp::Plus,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        if self.check_kind(TokenKind::Literal) {
            let tok = self.advance();
            let value = match tok.value {
                TokenValue::UInt(n) => ScalarValue::Int(n as i64),
                TokenValue::Float(n) => ScalarValue::Float(n),
                TokenValue::Str(s) => ScalarValue::Str(super::unquote(&s)),
                TokenValue::Bool(b) => ScalarValue::Bool(b),
                TokenValue::Text(s) => ScalarValue::Str(s),
            };
            return Ok(Expression::Literal {
                value,
                position: tok.position,
            });
        }

        if self.check_kind(TokenKind::Asterisk) {
            let tok = self.advance();
            return Ok(Expression::Wildcard {
                position: tok.position,
            });
        }

        if self.check_kind(TokenKind::At) {
            let at = self.advance();
            let name_tok = self.expect_ident_token()?;
            let name = name_tok.value.to_string();
            return Ok(Expression::Variable {
                name,
                position: Position::new(at.position.offset, name_tok.position.end() - at.position.offset),
            });
        }

        if self.check_kind(TokenKind::LParen) {
            self.advance();
            if self.check_keyword("SELECT") {
                let select = self.parse_select_stmt_body()?;
                self.expect_kind(TokenKind::RParen, "`)`")?;
                return Ok(Expression::Subquery(Box::new(select)));
            }
            let inner = self.parse_expression()?;
            self.expect_kind(TokenKind::RParen, "`)`")?;
            return Ok(inner);
        }

        if self.check_kind(TokenKind::Ident) {
            let first = self.advance();
            let start = first.position.offset;
            if self.check_kind(TokenKind::Dot) {
                self.advance();
                if self.check_kind(TokenKind::Asterisk) {
                    let star = self.advance();
                    return Ok(Expression::ColumnSpecification {
                        table: Some(first.value.to_string()),
                        column: "*".to_string(),
                        position: Position::new(start, star.position.end() - start),
                    });
                }
                let col_tok = self.expect_ident_token()?;
                let column = col_tok.value.to_string();
                return Ok(Expression::ColumnSpecification {
                    table: Some(first.value.to_string()),
                    column,
                    position: Position::new(start, col_tok.position.end() - start),
                });
            }
            return Ok(Expression::ColumnSpecification {
                table: None,
                column: first.value.to_string(),
                position: first.position,
            });
        }

        if self.check_keyword("CASE") {
            return self.parse_case();
        }
        if self.check_any_keyword(&["COUNT", "SUM", "AVG", "MIN", "MAX"]) {
            return self.parse_aggregate();
        }
        if self.check_keyword("EXISTS") {
            return self.parse_exists(false);
        }
        if self.check_keyword("SYSDATE") {
            self.advance();
            return Ok(Expression::SysDate);
        }
        if self.check_keyword("SYSTIME") {
            self.advance();
            return Ok(Expression::SysTime);
        }
        if self.check_keyword("SYSTIMESTAMP") {
            self.advance();
            return Ok(Expression::SysTimestamp);
        }
        if self.check_keyword("GENUUID") {
            self.advance();
            return Ok(Expression::GenUuid);
        }
        if self.check_any_keyword(&[
            "UPPER", "LOWER", "CAST", "COALESCE", "REVERSE", "ROUND", "POSITION", "LENGTH",
            "REPLACE", "CONCAT", "SUBSTRING", "TRIM",
        ]) {
            return self.parse_system_func();
        }

        Err(self.error(
            ErrorCode::UnexpectedToken,
            "expected an expression",
            vec!["expression".to_string()],
        ))
    }

    fn expect_ident_token(&mut self) -> Result<crate::token::Token, ParseError> {
        if self.check_kind(TokenKind::Ident) {
            Ok(self.advance())
        } else {
            Err(self.error(
                ErrorCode::ExpectedIdentifier,
                "expected an identifier",
                vec!["identifier".to_string()],
            ))
        }
    }

    fn parse_case(&mut self) -> Result<Expression, ParseError> {
        self.expect_keyword("CASE")?;
        let operand = if self.check_keyword("WHEN") {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        let mut when_clauses = Vec::new();
        while self.eat_keyword("WHEN") {
            let condition = self.parse_expression()?;
            self.expect_keyword("THEN")?;
            let result = self.parse_expression()?;
            when_clauses.push(WhenClause { condition, result });
        }
        if when_clauses.is_empty() {
            return Err(self.error(
                ErrorCode::ExpectedKeyword,
                "CASE requires at least one WHEN clause",
                vec!["WHEN".to_string()],
            ));
        }
        let else_clause = if self.eat_keyword("ELSE") {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.expect_keyword("END")?;
        Ok(Expression::CaseExpr {
            operand,
            when_clauses,
            else_clause,
        })
    }

    fn parse_aggregate(&mut self) -> Result<Expression, ParseError> {
        let kw = self.peek().keyword_text().unwrap().to_string();
        let kind = match kw.as_str() {
            "COUNT" => AggregateKind::Count,
            "SUM" => AggregateKind::Sum,
            "AVG" => AggregateKind::Avg,
            "MIN" => AggregateKind::Min,
            "MAX" => AggregateKind::Max,
            _ => unreachable!("guarded by check_any_keyword in parse_primary"),
        };
        self.advance();
        self.expect_kind(TokenKind::LParen, "`(`")?;
        let distinct = self.eat_keyword("DISTINCT");
        let arg = if self.check_kind(TokenKind::Asterisk) {
            self.advance();
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_kind(TokenKind::RParen, "`)`")?;
        let window = if self.eat_keyword("OVER") {
            Some(self.parse_window_spec()?)
        } else {
            None
        };
        Ok(Expression::AggregateFunc {
            kind,
            distinct,
            arg,
            window,
        })
    }

    fn parse_window_spec(&mut self) -> Result<WindowSpec, ParseError> {
        self.expect_kind(TokenKind::LParen, "`(`")?;
        let partition_by = if self.eat_keyword("PARTITION BY") {
            self.parse_comma_separated(|p| p.parse_expression())?
        } else {
            Vec::new()
        };
        let order_by = if self.eat_keyword("ORDER BY") {
            self.parse_order_by_items()?
        } else {
            Vec::new()
        };
        self.expect_kind(TokenKind::RParen, "`)`")?;
        Ok(WindowSpec {
            partition_by,
            order_by,
        })
    }

    pub(crate) fn parse_order_by_items(
        &mut self,
    ) -> Result<Vec<(Expression, SortDirection)>, ParseError> {
        self.parse_comma_separated(|p| {
            let expr = p.parse_expression()?;
            let direction = if p.eat_keyword("DESC") {
                SortDirection::Desc
            } else {
                p.eat_keyword("ASC");
                SortDirection::Asc
            };
            Ok((expr, direction))
        })
    }

    fn parse_exists(&mut self, negated: bool) -> Result<Expression, ParseError> {
        self.expect_keyword("EXISTS")?;
        self.expect_kind(TokenKind::LParen, "`(`")?;
        let subquery = self.parse_select_stmt_body()?;
        self.expect_kind(TokenKind::RParen, "`)`")?;
        Ok(Expression::ExistsPredicate {
            negated,
            subquery: Box::new(subquery),
        })
    }

    fn parse_system_func(&mut self) -> Result<Expression, ParseError> {
        let kw = self.peek().keyword_text().unwrap().to_string();
        self.advance();
        self.expect_kind(TokenKind::LParen, "`(`")?;
        let func = match kw.as_str() {
            "UPPER" => SystemFunc::Upper(Box::new(self.parse_expression()?)),
            "LOWER" => SystemFunc::Lower(Box::new(self.parse_expression()?)),
            "REVERSE" => SystemFunc::Reverse(Box::new(self.parse_expression()?)),
            "LENGTH" => SystemFunc::Length(Box::new(self.parse_expression()?)),
            "TRIM" => SystemFunc::Trim(Box::new(self.parse_expression()?)),
            "CAST" => {
                let expr = Box::new(self.parse_expression()?);
                self.expect_keyword("AS")?;
                let data_type = self.parse_data_type()?;
                SystemFunc::Cast { expr, data_type }
            }
            "COALESCE" => {
                let args = self.parse_comma_separated(|p| p.parse_expression())?;
                SystemFunc::Coalesce(args)
            }
            "CONCAT" => {
                let args = self.parse_comma_separated(|p| p.parse_expression())?;
                SystemFunc::Concat(args)
            }
            "ROUND" => {
                let expr = Box::new(self.parse_expression()?);
                let digits = if self.check_kind(TokenKind::Comma) {
                    self.advance();
                    Some(Box::new(self.parse_expression()?))
                } else {
                    None
                };
                SystemFunc::Round { expr, digits }
            }
            "POSITION" => {
                let needle = Box::new(self.parse_expression()?);
                self.expect_keyword("IN")?;
                let haystack = Box::new(self.parse_expression()?);
                SystemFunc::Position { needle, haystack }
            }
            "REPLACE" => {
                let expr = Box::new(self.parse_expression()?);
                self.expect_kind(TokenKind::Comma, "`,`")?;
                let pattern = Box::new(self.parse_expression()?);
                self.expect_kind(TokenKind::Comma, "`,`")?;
                let replacement = Box::new(self.parse_expression()?);
                SystemFunc::Replace {
                    expr,
                    pattern,
                    replacement,
                }
            }
            "SUBSTRING" => {
                let expr = Box::new(self.parse_expression()?);
                self.expect_kind(TokenKind::Comma, "`,`")?;
                let start = Box::new(self.parse_expression()?);
                let length = if self.check_kind(TokenKind::Comma) {
                    self.advance();
                    Some(Box::new(self.parse_expression()?))
                } else {
                    None
                };
                SystemFunc::Substring {
                    expr,
                    start,
                    length,
                }
            }
            other => unreachable!("guarded by check_any_keyword: {other}"),
        };
        self.expect_kind(TokenKind::RParen, "`)`")?;
        Ok(Expression::SystemFunc(func))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_one;
    use crate::ast::Statement;

    fn select_expr(sql: &str) -> Expression {
        let stmt = parse_one(&format!("SELECT {sql};")).unwrap();
        let Statement::Select(s) = stmt else { panic!("expected Select") };
        s.columns.into_iter().next().unwrap()
    }

    #[test]
    fn precedence_multiplication_before_addition() {
        let expr = select_expr("1 + 2 * 3");
        match expr {
            Expression::BinaryExpression { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Expression::BinaryExpression { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = select_expr("a = 1 OR b = 2 AND c = 3");
        match expr {
            Expression::LogicalCondition { op: LogicalOp::Or, right, .. } => {
                assert!(matches!(*right, Expression::LogicalCondition { op: LogicalOp::And, .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn not_exists_produces_negated_exists_predicate() {
        let expr = select_expr("NOT EXISTS (SELECT 1 FROM t)");
        match expr {
            Expression::ExistsPredicate { negated, .. } => assert!(negated),
            other => panic!("expected ExistsPredicate, got {other:?}"),
        }
    }

    #[test]
    fn between_and_in_and_like_parse() {
        assert!(matches!(select_expr("a BETWEEN 1 AND 10"), Expression::BetweenPredicate { negated: false, .. }));
        assert!(matches!(select_expr("a NOT IN (1, 2, 3)"), Expression::InPredicate { negated: true, .. }));
        assert!(matches!(select_expr("a LIKE 'foo%'"), Expression::LikePredicate { negated: false, .. }));
        assert!(matches!(select_expr("a IS NOT NULL"), Expression::IsPredicate { negated: true, .. }));
    }

    #[test]
    fn qualified_column_and_wildcard() {
        assert!(matches!(
            select_expr("t.id"),
            Expression::ColumnSpecification { table: Some(ref t), ref column, .. } if t == "t" && column == "id"
        ));
        assert!(matches!(select_expr("*"), Expression::Wildcard { .. }));
        assert!(matches!(
            select_expr("t.*"),
            Expression::ColumnSpecification { table: Some(ref t), ref column, .. } if t == "t" && column == "*"
        ));
    }

    #[test]
    fn variable_reference_parses() {
        assert!(matches!(select_expr("@x"), Expression::Variable { ref name, .. } if name == "x"));
    }

    #[test]
    fn count_star_has_no_argument() {
        let expr = select_expr("COUNT(*)");
        assert!(matches!(expr, Expression::AggregateFunc { arg: None, .. }));
    }

    #[test]
    fn aggregate_with_window_spec() {
        let expr = select_expr("SUM(amount) OVER (PARTITION BY region ORDER BY day DESC)");
        match expr {
            Expression::AggregateFunc { window: Some(w), .. } => {
                assert_eq!(w.partition_by.len(), 1);
                assert_eq!(w.order_by.len(), 1);
                assert_eq!(w.order_by[0].1, SortDirection::Desc);
            }
            other => panic!("expected windowed aggregate, got {other:?}"),
        }
    }

    #[test]
    fn cast_system_func_parses_data_type() {
        let expr = select_expr("CAST(a AS int64)");
        match expr {
            Expression::SystemFunc(SystemFunc::Cast { data_type, .. }) => {
                assert_eq!(data_type.to_string(), "int64");
            }
            other => panic!("expected CAST, got {other:?}"),
        }
    }

    #[test]
    fn case_expression_requires_at_least_one_when() {
        let err = crate::parser::parse_strict("SELECT CASE a END;").unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedKeyword);
    }
}
