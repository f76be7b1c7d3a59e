//! Recursive-descent parser: tokens → AST (spec.md §4.4).
//!
//! Dispatch is by the statement's leading keyword; each sub-parser consumes
//! its keyword(s), mandatory operands, then optional clauses in a fixed
//! order. Hand-written rather than table-driven so every failure site can
//! report its own expected-token list (spec.md §9).

mod ddl;
mod dcl;
mod dml;
mod expr;
mod show;
mod tcl;

use crate::ast::Statement;
use crate::error::{ErrorCode, ParseError, SourceContext};
use crate::lexer::tokenize_for_parse;
use crate::recovery::{ErrorCollector, MAX_SYNC_SKIP, TOP_LEVEL_START_KEYWORDS};
use crate::token::{Position, Token, TokenKind, TokenValue};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) context: SourceContext,
    recovering: bool,
    collector: ErrorCollector,
}

impl Parser {
    fn new(source: &str, recovering: bool) -> Result<Self, ParseError> {
        let context = SourceContext::new(source);
        let tokens = tokenize_for_parse(source)
            .map_err(|e| ParseError::lexical(e.message, e.offset, context.clone()))?;
        Ok(Self {
            tokens,
            pos: 0,
            context,
            recovering,
            collector: ErrorCollector::new(),
        })
    }

    // -- cursor -----------------------------------------------------------

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn peek_at(&self, ahead: usize) -> &Token {
        self.tokens.get(self.pos + ahead).unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if !tok.is_eof() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn check_kind(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn check_keyword(&self, word: &str) -> bool {
        self.peek().keyword_text().map(|k| k == word).unwrap_or(false)
    }

    pub(crate) fn check_any_keyword(&self, words: &[&str]) -> bool {
        self.peek()
            .keyword_text()
            .map(|k| words.contains(&k))
            .unwrap_or(false)
    }

    pub(crate) fn eat_keyword(&mut self, word: &str) -> bool {
        if self.check_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, word: &str) -> Result<Token, ParseError> {
        if self.check_keyword(word) {
            Ok(self.advance())
        } else {
            Err(self.error(
                ErrorCode::ExpectedKeyword,
                format!("expected `{word}`"),
                vec![word.to_string()],
            ))
        }
    }

    pub(crate) fn expect_kind(&mut self, kind: TokenKind, expected_desc: &str) -> Result<Token, ParseError> {
        if self.check_kind(kind) {
            Ok(self.advance())
        } else {
            let code = match kind {
                TokenKind::LParen => ErrorCode::ExpectedLeftParen,
                TokenKind::RParen => ErrorCode::ExpectedRightParen,
                TokenKind::Comma => ErrorCode::ExpectedComma,
                TokenKind::Semicolon => ErrorCode::MissingSemicolon,
                TokenKind::Ident => ErrorCode::ExpectedIdentifier,
                TokenKind::Literal => ErrorCode::ExpectedLiteral,
                _ => ErrorCode::UnexpectedToken,
            };
            Err(self.error(code, format!("expected {expected_desc}"), vec![expected_desc.to_string()]))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<String, ParseError> {
        if self.check_kind(TokenKind::Ident) {
            let tok = self.advance();
            Ok(tok.value.to_string())
        } else {
            Err(self.error(
                ErrorCode::ExpectedIdentifier,
                "expected an identifier",
                vec!["identifier".to_string()],
            ))
        }
    }

    pub(crate) fn error(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        expected: Vec<String>,
    ) -> ParseError {
        let tok = self.peek().clone();
        let position = tok.position;
        let found = tok.describe();
        match code.category() {
            crate::error::ErrorCategory::Syntax => {
                ParseError::syntax(message, position, Some(tok), expected, found, self.context.clone(), code)
            }
            crate::error::ErrorCategory::Type => {
                ParseError::type_error(message, position, found, self.context.clone(), code)
            }
            crate::error::ErrorCategory::Validation => {
                ParseError::validation(message, position, found, self.context.clone(), code)
            }
            crate::error::ErrorCategory::Lexical => {
                ParseError::lexical(message, position.offset, self.context.clone())
            }
        }
    }

    // -- top-level ----------------------------------------------------------

    /// True when the current token is a keyword whose first word starts a
    /// new top-level statement. Multi-word keywords like `CREATE TABLE`
    /// arrive from the lexer already fused into one token, so matching is
    /// done on the leading word rather than the whole keyword text.
    fn at_top_level_start(&self) -> bool {
        self.peek()
            .keyword_text()
            .and_then(|k| k.split_whitespace().next())
            .map(|first| TOP_LEVEL_START_KEYWORDS.contains(&first))
            .unwrap_or(false)
    }

    /// Skips ahead until a `;` (consumed) or a top-level start keyword
    /// (not consumed), or gives up after `MAX_SYNC_SKIP` tokens
    /// (spec.md §4.6 step 3).
    fn synchronize(&mut self) {
        let mut skipped = 0;
        while !self.at_eof() && skipped < MAX_SYNC_SKIP {
            if self.check_kind(TokenKind::Semicolon) {
                self.advance();
                return;
            }
            if self.at_top_level_start() {
                return;
            }
            self.advance();
            skipped += 1;
        }
    }

    fn parse_program(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();

        if self.tokens.len() == 1 {
            return Err(self.error(ErrorCode::EmptyStatement, "empty statement", vec![]));
        }
        if self.tokens.len() == 2 && self.check_kind(TokenKind::Semicolon) {
            return Err(self.error(ErrorCode::InvalidStatement, "invalid statement", vec![]));
        }

        while !self.at_eof() {
            match self.parse_statement() {
                Ok(stmt) => {
                    statements.push(stmt);
                    if self.check_kind(TokenKind::Semicolon) {
                        self.advance();
                    } else {
                        let err = self.error(
                            ErrorCode::MissingSemicolon,
                            "missing semicolon",
                            vec![";".to_string()],
                        );
                        if !self.recovering {
                            return Err(err);
                        }
                        if self.collector.push(err) {
                            self.synchronize();
                        } else {
                            break;
                        }
                    }
                }
                Err(err) => {
                    if !self.recovering {
                        return Err(err);
                    }
                    let recoverable = err.code.is_recoverable();
                    if !self.collector.push(err) {
                        break;
                    }
                    if !recoverable {
                        break;
                    }
                    self.synchronize();
                }
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let Some(kw) = self.peek().keyword_text().map(|s| s.to_string()) else {
            return Err(self.error(
                ErrorCode::UnexpectedToken,
                "expected a statement keyword",
                TOP_LEVEL_START_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            ));
        };
        let first_word = kw.split_whitespace().next().unwrap_or("");
        match first_word {
            "CREATE" => self.parse_create(&kw),
            "DROP" => self.parse_drop(&kw),
            "ALTER" => self.parse_alter(&kw),
            "USE" => self.parse_use(),
            "SELECT" => self.parse_select_stmt(),
            "INSERT" => self.parse_insert(),
            "UPDATE" => self.parse_update(),
            "DELETE" => self.parse_delete(),
            "BEGIN" => {
                self.advance();
                Ok(Statement::Begin)
            }
            "COMMIT" => {
                self.advance();
                Ok(Statement::Commit)
            }
            "ROLLBACK" => {
                self.advance();
                Ok(Statement::Rollback)
            }
            "GRANT" => self.parse_grant(),
            "REVOKE" => self.parse_revoke(),
            "SHOW" => self.parse_show(),
            "DECLARE" => self.parse_declare(),
            "OPEN" => self.parse_open(),
            "CLOSE" => self.parse_close(),
            "DEALLOCATE" => self.parse_deallocate(),
            "FETCH" => self.parse_fetch(),
            "WHILE" => self.parse_while(),
            "PRINT" => self.parse_print(),
            "EXEC" => self.parse_exec(),
            "EXPLAIN" => self.parse_explain(),
            other => Err(self.error(
                ErrorCode::UnexpectedToken,
                format!("unexpected keyword `{other}` at statement start"),
                TOP_LEVEL_START_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            )),
        }
    }

    // -- shared helpers used by multiple sub-parsers -----------------------

    pub(crate) fn parse_table_identifier(&mut self) -> Result<crate::ast::TableIdentifier, ParseError> {
        let first = self.expect_ident()?;
        if self.check_kind(TokenKind::Dot) {
            self.advance();
            let second = self.expect_ident()?;
            Ok(crate::ast::TableIdentifier::qualified(first, second))
        } else {
            Ok(crate::ast::TableIdentifier::unqualified(first))
        }
    }

    /// Parses and validates a data-type token's text, consuming any
    /// following `<...>` or `(...)` continuation for complex/decimal types.
    pub(crate) fn parse_data_type(&mut self) -> Result<crate::types::IcebergType, ParseError> {
        if self.check_kind(TokenKind::Keyword) {
            // legacy spelling: recognized lexically as a keyword, but it
            // lives in the type grammar, so report a precise type error.
            let tok = self.advance();
            let word = tok.value.to_string();
            let lower = word.to_ascii_lowercase();
            if let Some((_, suggestion)) = crate::types::LEGACY_TYPE_SUGGESTIONS
                .iter()
                .find(|(legacy, _)| *legacy == lower)
            {
                return Err(ParseError::type_error_with_suggestion(
                    word,
                    suggestion,
                    tok.position,
                    self.context.clone(),
                ));
            }
            return Err(self.error(
                ErrorCode::UnexpectedDataType,
                format!("`{word}` is not a data type"),
                vec![],
            ));
        }

        let start_tok = self.expect_kind(TokenKind::DataType, "a data type")?;
        let start = start_tok.position.offset;
        let mut end = start_tok.position.end();
        let head = start_tok.value.to_string();

        match head.as_str() {
            "decimal" => {
                if self.check_kind(TokenKind::LParen) {
                    self.advance();
                    self.skip_balanced_until_close(&mut end)?;
                } else {
                    return Err(ParseError::type_error(
                        "bare `decimal` requires (precision,scale)",
                        start_tok.position,
                        "decimal",
                        self.context.clone(),
                        ErrorCode::InvalidIcebergType,
                    ));
                }
            }
            // the opening `<` arrives as a Comparison("<") token, handled
            // by consume_complex_type_tail rather than a generic expect.
            "list" | "map" | "struct" => self.consume_complex_type_tail(&mut end)?,
            _ => {}
        }

        let text = &self.context.source[start..end];
        crate::types::validate(text).map_err(|type_err| {
            ParseError::type_error(
                type_err.to_string(),
                Position::new(start, end - start),
                text.to_string(),
                self.context.clone(),
                ErrorCode::InvalidIcebergType,
            )
        })
    }

    /// Consumes `(...)` balancing parens/brackets, used for `decimal(P,S)`.
    fn skip_balanced_until_close(&mut self, end: &mut usize) -> Result<(), ParseError> {
        let mut depth = 1i32;
        while depth > 0 {
            if self.at_eof() {
                return Err(self.error(
                    ErrorCode::ExpectedRightParen,
                    "unterminated decimal(P,S)",
                    vec![")".to_string()],
                ));
            }
            let tok = self.advance();
            *end = tok.position.end();
            match tok.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// Consumes the `<...>` continuation for `list`/`map`/`struct`,
    /// concatenating whatever token text it sees until the matching `>`
    /// closes (spec.md §4.4 "complex types").
    fn consume_complex_type_tail(&mut self, end: &mut usize) -> Result<(), ParseError> {
        if !self.check_kind(TokenKind::Comparison) || self.peek().value.to_string() != "<" {
            return Err(self.error(
                ErrorCode::UnexpectedToken,
                "expected `<` to open a complex type",
                vec!["<".to_string()],
            ));
        }
        self.advance();
        let mut depth = 1i32;
        while depth > 0 {
            if self.at_eof() {
                return Err(self.error(
                    ErrorCode::UnexpectedToken,
                    "unterminated complex type",
                    vec![">".to_string()],
                ));
            }
            let tok = self.advance();
            *end = tok.position.end();
            if tok.kind == TokenKind::Comparison {
                match tok.value.to_string().as_str() {
                    "<" => depth += 1,
                    ">" => depth -= 1,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Parses `item (COMMA item)*`, used by column lists, value tuples,
    /// `IN (...)` lists, and settings maps alike.
    pub(crate) fn parse_comma_separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut out = vec![item(self)?];
        while self.check_kind(TokenKind::Comma) {
            self.advance();
            out.push(item(self)?);
        }
        Ok(out)
    }

    pub(crate) fn parse_identifier_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.parse_comma_separated(|p| p.expect_ident())
    }

    pub(crate) fn expect_eq(&mut self) -> Result<(), ParseError> {
        if self.check_kind(TokenKind::Comparison) && self.peek().value.to_string() == "=" {
            self.advance();
            Ok(())
        } else {
            Err(self.error(ErrorCode::UnexpectedToken, "expected `=`", vec!["=".to_string()]))
        }
    }

    /// Consumes a bare `=` if present, without requiring one. Used where a
    /// clause's argument follows its keyword directly (e.g. `STORAGE
    /// filesystem`) but an `=` is tolerated as a separator.
    pub(crate) fn eat_eq(&mut self) -> bool {
        if self.check_kind(TokenKind::Comparison) && self.peek().value.to_string() == "=" {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_scalar_value(&mut self) -> Result<crate::ast::ScalarValue, ParseError> {
        use crate::ast::ScalarValue;
        if self.check_kind(TokenKind::Literal) {
            let tok = self.advance();
            return Ok(match tok.value {
                TokenValue::UInt(n) => ScalarValue::Int(n as i64),
                TokenValue::Float(n) => ScalarValue::Float(n),
                TokenValue::Str(s) => ScalarValue::Str(unquote(&s)),
                TokenValue::Bool(b) => ScalarValue::Bool(b),
                TokenValue::Text(s) => ScalarValue::Str(s),
            });
        }
        if self.check_kind(TokenKind::Minus) {
            self.advance();
            let tok = self.expect_kind(TokenKind::Literal, "a literal")?;
            return Ok(match tok.value {
                TokenValue::UInt(n) => ScalarValue::Int(-(n as i64)),
                TokenValue::Float(n) => ScalarValue::Float(-n),
                other => ScalarValue::Str(other.to_string()),
            });
        }
        Err(self.error(ErrorCode::ExpectedLiteral, "expected a literal value", vec!["literal".to_string()]))
    }
}

/// Strips the surrounding quote characters from a retained string-literal
/// token value, resolving the single backslash-escape form.
pub(crate) fn unquote(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() < 2 {
        return raw.to_string();
    }
    let quote = bytes[0] as char;
    let inner = &raw[1..raw.len() - 1];
    inner.replace(&format!("\\{quote}"), &quote.to_string())
}

/// Strict entry point: parses a full program, returning on the first error
/// with the collector left empty (spec.md §4.6).
pub fn parse_strict(source: &str) -> Result<Vec<Statement>, ParseError> {
    let mut parser = Parser::new(source, false)?;
    parser.parse_program()
}

/// Convenience wrapper for the common case of a single terminated statement.
pub fn parse_one(source: &str) -> Result<Statement, ParseError> {
    let mut statements = parse_strict(source)?;
    if statements.len() != 1 {
        let context = SourceContext::new(source);
        return Err(ParseError::syntax(
            "expected exactly one statement",
            Position::new(0, 0),
            None,
            vec![],
            format!("{} statements", statements.len()),
            context,
            ErrorCode::InvalidStatement,
        ));
    }
    Ok(statements.remove(0))
}

/// Recovering entry point: parses as much as possible, collecting up to
/// [`crate::recovery::MAX_ERRORS`] diagnostics and resynchronizing at
/// statement boundaries (spec.md §4.6).
pub fn parse_recovering(source: &str) -> Result<(Vec<Statement>, ErrorCollector), ParseError> {
    let mut parser = Parser::new(source, true)?;
    match parser.parse_program() {
        Ok(statements) => Ok((statements, parser.collector)),
        Err(lexical_err) => Err(lexical_err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_rejected() {
        let err = parse_strict("").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyStatement);
    }

    #[test]
    fn bare_semicolon_is_rejected() {
        let err = parse_strict(";").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatement);
    }

    #[test]
    fn missing_semicolon_is_reported() {
        let err = parse_strict("SELECT a FROM t").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingSemicolon);
    }

    #[test]
    fn parse_one_rejects_multiple_statements() {
        let err = parse_one("BEGIN; COMMIT;").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatement);
    }

    #[test]
    fn two_statements_parse_in_sequence() {
        let stmts = parse_strict("BEGIN; COMMIT;").unwrap();
        assert_eq!(stmts, vec![Statement::Begin, Statement::Commit]);
    }

    #[test]
    fn recovering_mode_collects_multiple_errors_and_keeps_going() {
        let (stmts, errors) = parse_recovering("SELECT; SELECT b FROM t; CREATE TABLE (x int32);").unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(errors.len() >= 2);
    }

    #[test]
    fn legacy_type_keyword_suggests_iceberg_replacement() {
        let err = parse_strict("CREATE TABLE t (id int) STORAGE memory;").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIcebergType);
        assert!(err.message.contains("int32"));
    }

    #[test]
    fn decimal_type_round_trips_through_validate() {
        let stmt = parse_one("CREATE TABLE t (price decimal(10,2)) STORAGE memory;").unwrap();
        let Statement::CreateTable(ct) = stmt else { panic!("expected CreateTable") };
        assert_eq!(ct.table_schema[0].data_type.to_string(), "decimal(10,2)");
    }

    #[test]
    fn list_type_is_parsed_with_angle_brackets() {
        let stmt = parse_one("CREATE TABLE t (tags list<string>) STORAGE memory;").unwrap();
        let Statement::CreateTable(ct) = stmt else { panic!("expected CreateTable") };
        assert_eq!(ct.table_schema[0].data_type.to_string(), "list<string>");
    }

    #[test]
    fn qualified_table_identifier_is_parsed() {
        let stmt = parse_one("DROP TABLE sales.orders;").unwrap();
        let Statement::DropTable(d) = stmt else { panic!("expected DropTable") };
        assert_eq!(d.table_name.database.as_deref(), Some("sales"));
        assert_eq!(d.table_name.table, "orders");
    }

    #[test]
    fn unquote_resolves_escaped_quote() {
        assert_eq!(unquote("'it\\'s'"), "it's");
    }
}
