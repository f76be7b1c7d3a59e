//! Structured diagnostics: categories, three render views, stable codes.
//!
//! Every [`ParseError`] shares a [`SourceContext`] (source text + position
//! tracker) with the parse that produced it, following the teacher's
//! `SpannedError` shape but widened to carry category, expected/found, and
//! a stable machine-readable code (spec.md §4.5, §6.2).

use crate::position::PositionTracker;
use crate::token::{Position, Token};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Source text plus its tracker, shared read-only by the lexer, parser,
/// and every error born of one parse (spec.md §5 "shared-resource policy").
#[derive(Clone)]
pub struct SourceContext {
    pub source: Rc<str>,
    pub tracker: Rc<PositionTracker>,
}

impl SourceContext {
    pub fn new(source: &str) -> Self {
        let tracker = PositionTracker::new(source);
        Self {
            source: Rc::from(source),
            tracker: Rc::new(tracker),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Type,
    Validation,
    Lexical,
}

/// Stable error codes. `as_code_str` renders the dotted identifier form
/// used in the machine view and in spec.md §6.2's examples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    ExpectedIdentifier,
    ExpectedLiteral,
    ExpectedKeyword,
    ExpectedComma,
    ExpectedLeftParen,
    ExpectedRightParen,
    MissingSemicolon,
    UnexpectedToken,
    EmptyStatement,
    InvalidStatement,
    InvalidIcebergType,
    UnexpectedDataType,
    DuplicateColumnName,
    MissingStorageEngine,
    UnknownStorageEngine,
    DuplicateStructField,
    UnknownTable,
    UnknownColumn,
    UnknownDatabase,
    LexicalError,
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        use ErrorCode::*;
        match self {
            ExpectedIdentifier | ExpectedLiteral | ExpectedKeyword | ExpectedComma
            | ExpectedLeftParen | ExpectedRightParen | MissingSemicolon | UnexpectedToken
            | EmptyStatement | InvalidStatement => ErrorCategory::Syntax,
            InvalidIcebergType | UnexpectedDataType => ErrorCategory::Type,
            DuplicateColumnName | MissingStorageEngine | UnknownStorageEngine
            | DuplicateStructField | UnknownTable | UnknownColumn | UnknownDatabase => {
                ErrorCategory::Validation
            }
            LexicalError => ErrorCategory::Lexical,
        }
    }

    pub fn as_code_str(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            ExpectedIdentifier => "parser.syntax.expected_identifier",
            ExpectedLiteral => "parser.syntax.expected_literal",
            ExpectedKeyword => "parser.syntax.expected_keyword",
            ExpectedComma => "parser.syntax.expected_comma",
            ExpectedLeftParen => "parser.syntax.expected_left_paren",
            ExpectedRightParen => "parser.syntax.expected_right_paren",
            MissingSemicolon => "parser.syntax.missing_semicolon",
            UnexpectedToken => "parser.syntax.unexpected_token",
            EmptyStatement => "parser.syntax.empty_statement",
            InvalidStatement => "parser.syntax.invalid_statement",
            InvalidIcebergType => "parser.type.invalid_iceberg_type",
            UnexpectedDataType => "parser.parse.unexpected_data_type",
            DuplicateColumnName => "parser.validation.duplicate_column_name",
            MissingStorageEngine => "parser.validation.missing_storage_engine",
            UnknownStorageEngine => "parser.validation.unknown_storage_engine",
            DuplicateStructField => "parser.type.duplicate_struct_field",
            UnknownTable => "parser.validation.unknown_table",
            UnknownColumn => "parser.validation.unknown_column",
            UnknownDatabase => "parser.validation.unknown_database",
            LexicalError => "parser.lexical.error",
        }
    }

    /// Whether error recovery may resynchronize past this error
    /// (spec.md §4.6 step 1).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::ExpectedComma
                | ErrorCode::ExpectedRightParen
                | ErrorCode::ExpectedLeftParen
                | ErrorCode::ExpectedKeyword
                | ErrorCode::ExpectedIdentifier
                | ErrorCode::ExpectedLiteral
                | ErrorCode::MissingSemicolon
        )
    }
}

/// A structured parse diagnostic with three render views (spec.md §4.5).
#[derive(Clone)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub position: Position,
    pub token: Option<Token>,
    pub expected: Vec<String>,
    pub found: String,
    pub context: SourceContext,
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseError")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("position", &self.position)
            .field("expected", &self.expected)
            .field("found", &self.found)
            .finish()
    }
}

impl PartialEq for ParseError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.message == other.message && self.position == other.position
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineContext {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub category: ErrorCategory,
    pub code: String,
    pub expected: Vec<String>,
    pub found: String,
}

const TRUNCATE_THRESHOLD: usize = 120;

impl ParseError {
    fn new(
        code: ErrorCode,
        message: impl Into<String>,
        position: Position,
        token: Option<Token>,
        expected: Vec<String>,
        found: impl Into<String>,
        context: SourceContext,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            position,
            token,
            expected,
            found: found.into(),
            context,
        }
    }

    pub fn syntax(
        message: impl Into<String>,
        position: Position,
        token: Option<Token>,
        expected: Vec<String>,
        found: impl Into<String>,
        context: SourceContext,
        code: ErrorCode,
    ) -> Self {
        debug_assert_eq!(code.category(), ErrorCategory::Syntax);
        Self::new(code, message, position, token, expected, found, context)
    }

    pub fn type_error(
        message: impl Into<String>,
        position: Position,
        found: impl Into<String>,
        context: SourceContext,
        code: ErrorCode,
    ) -> Self {
        debug_assert_eq!(code.category(), ErrorCategory::Type);
        Self::new(code, message, position, None, vec![], found, context)
    }

    /// Type error with an Iceberg-substitute suggestion baked into the message
    /// (spec.md §4.5 "type-error constructor additionally provides Iceberg
    /// type suggestions").
    pub fn type_error_with_suggestion(
        found: impl Into<String>,
        suggestion: &str,
        position: Position,
        context: SourceContext,
    ) -> Self {
        let found = found.into();
        Self::new(
            ErrorCode::InvalidIcebergType,
            format!("`{found}` is not an Iceberg type; use `{suggestion}`"),
            position,
            None,
            vec![suggestion.to_string()],
            found,
            context,
        )
    }

    pub fn validation(
        message: impl Into<String>,
        position: Position,
        found: impl Into<String>,
        context: SourceContext,
        code: ErrorCode,
    ) -> Self {
        debug_assert_eq!(code.category(), ErrorCategory::Validation);
        Self::new(code, message, position, None, vec![], found, context)
    }

    pub fn lexical(message: impl Into<String>, offset: usize, context: SourceContext) -> Self {
        Self::new(
            ErrorCode::LexicalError,
            message,
            Position::new(offset, 0),
            None,
            vec![],
            "end of input",
            context,
        )
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    fn line_column(&self) -> (usize, usize) {
        self.context
            .tracker
            .line_column(self.position.offset as i64, &self.context.source)
    }

    /// View 1: `parse error at line L, column C: <message>`.
    pub fn short(&self) -> String {
        let (line, column) = self.line_column();
        format!("parse error at line {line}, column {column}: {}", self.message)
    }

    /// View 2: header + gutter + caret underline + expected/found.
    pub fn detailed(&self) -> String {
        let (line, column) = self.line_column();
        let raw_line = self.context.tracker.source_line(line, &self.context.source);
        let (display_line, caret_col) = truncate_for_display(raw_line, column);
        let gutter = format!("{line:>4} | ");
        let caret_len = self.position.length.max(1);
        let mut out = String::new();
        out.push_str(&format!(
            "Error at line {line}, column {column} ({}):\n",
            category_name(self.category())
        ));
        out.push_str(&gutter);
        out.push_str(display_line);
        out.push('\n');
        out.push_str(&" ".repeat(gutter.len() + caret_col.saturating_sub(1)));
        out.push_str(&"^".repeat(caret_len));
        out.push('\n');
        if !self.expected.is_empty() {
            out.push_str(&format!("Expected: {}\n", self.expected.join(", ")));
        }
        out.push_str(&format!("Found: {}\n", self.found));
        out
    }

    /// View 3: machine-readable context for structured consumers.
    pub fn machine(&self) -> MachineContext {
        let (line, column) = self.line_column();
        MachineContext {
            line,
            column,
            offset: self.position.offset,
            category: self.category(),
            code: self.code.as_code_str().to_string(),
            expected: self.expected.clone(),
            found: self.found.clone(),
        }
    }
}

fn category_name(c: ErrorCategory) -> &'static str {
    match c {
        ErrorCategory::Syntax => "syntax",
        ErrorCategory::Type => "type",
        ErrorCategory::Validation => "validation",
        ErrorCategory::Lexical => "lexical",
    }
}

/// Elides the middle of an overlong line with `…`, keeping the caret
/// column correctly re-aligned to the truncated text.
fn truncate_for_display(line: &str, caret_col: usize) -> (std::borrow::Cow<'_, str>, usize) {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= TRUNCATE_THRESHOLD {
        return (std::borrow::Cow::Borrowed(line), caret_col);
    }
    let half = TRUNCATE_THRESHOLD / 2;
    let caret_idx = caret_col.saturating_sub(1).min(chars.len().saturating_sub(1));
    let start = caret_idx.saturating_sub(half);
    let end = (caret_idx + half).min(chars.len());
    let mut out = String::new();
    if start > 0 {
        out.push('\u{2026}');
    }
    out.push_str(&chars[start..end].iter().collect::<String>());
    if end < chars.len() {
        out.push('\u{2026}');
    }
    let new_caret = caret_idx - start + if start > 0 { 2 } else { 1 };
    (std::borrow::Cow::Owned(out), new_caret)
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SourceContext {
        SourceContext::new("SELECT * FROM t\nWHERE 1 = 1;")
    }

    #[test]
    fn short_view_format() {
        let err = ParseError::syntax(
            "expected identifier",
            Position::new(7, 1),
            None,
            vec!["identifier".into()],
            "`*`",
            ctx(),
            ErrorCode::ExpectedIdentifier,
        );
        assert!(err.short().starts_with("parse error at line 1, column 8:"));
    }

    #[test]
    fn detailed_view_has_gutter_and_caret() {
        let err = ParseError::syntax(
            "expected identifier",
            Position::new(7, 1),
            None,
            vec!["identifier".into()],
            "`*`",
            ctx(),
            ErrorCode::ExpectedIdentifier,
        );
        let d = err.detailed();
        assert!(d.contains("Error at line 1, column 8 (syntax):"));
        assert!(d.contains("^"));
        assert!(d.contains("Expected: identifier"));
        assert!(d.contains("Found: `*`"));
    }

    #[test]
    fn machine_view_reports_code_and_category() {
        let err = ParseError::type_error_with_suggestion(
            "varchar",
            "string",
            Position::new(0, 7),
            ctx(),
        );
        let m = err.machine();
        assert_eq!(m.category, ErrorCategory::Type);
        assert_eq!(m.code, "parser.type.invalid_iceberg_type");
    }

    #[test]
    fn long_line_truncated_with_ellipsis_and_aligned_caret() {
        let long_line = "x".repeat(200);
        let ctx = SourceContext::new(&long_line);
        let err = ParseError::syntax(
            "oops",
            Position::new(150, 1),
            None,
            vec![],
            "x",
            ctx,
            ErrorCode::UnexpectedToken,
        );
        let d = err.detailed();
        assert!(d.contains('\u{2026}'));
    }
}
