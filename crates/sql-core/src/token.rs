//! Token types produced by the lexer and consumed by the parser.

use std::fmt;

/// Half-open byte range `[offset, offset+length)` into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub length: usize,
}

impl Position {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// The kind of lexeme a [`Token`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Keyword,
    Ident,
    Comment,
    Literal,
    LParen,
    RParen,
    Semicolon,
    DataType,
    Comma,
    Asterisk,
    Comparison,
    Plus,
    Minus,
    Divide,
    Modulus,
    At,
    Dot,
    Colon,
}

/// The typed value a token carries, per spec.md §3's `Token.value` rule.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    UInt(u64),
    Float(f64),
    Str(String),
    Bool(bool),
    /// Keywords, identifiers, data types, and punctuation all carry their
    /// literal text.
    Text(String),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::UInt(n) => write!(f, "{n}"),
            TokenValue::Float(n) => write!(f, "{n}"),
            TokenValue::Str(s) => write!(f, "{s}"),
            TokenValue::Bool(b) => write!(f, "{b}"),
            TokenValue::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, position: Position) -> Self {
        Self {
            kind,
            value,
            position,
        }
    }

    pub fn eof(offset: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            value: TokenValue::Text(String::new()),
            position: Position::new(offset, 0),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Upper-cased keyword text, for matching against the keyword table.
    pub fn keyword_text(&self) -> Option<&str> {
        match (&self.kind, &self.value) {
            (TokenKind::Keyword, TokenValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Human-readable description of this token for error messages
    /// ("found" field of spec.md's ParseError).
    pub fn describe(&self) -> String {
        if self.is_eof() {
            return "end of input".to_string();
        }
        match self.kind {
            TokenKind::Keyword => format!("keyword `{}`", self.value),
            TokenKind::Ident => format!("identifier `{}`", self.value),
            TokenKind::DataType => format!("data type `{}`", self.value),
            TokenKind::Literal => format!("literal `{}`", self.value),
            TokenKind::Comment => "comment".to_string(),
            _ => format!("`{}`", self.value),
        }
    }
}

/// Multi-word keywords that must be matched greedily before falling back
/// to word-at-a-time tokenization (spec.md §4.3 "multi-word keyword
/// lookahead"). Ordered longest-first so a scan need not backtrack across
/// overlapping prefixes.
pub const MULTI_WORD_KEYWORDS: &[&str] = &[
    "IF NOT EXISTS",
    "IF EXISTS",
    "PRIMARY KEY",
    "FOREIGN KEY",
    "NOT NULL",
    "ORDER BY",
    "GROUP BY",
    "PARTITION BY",
    "UNION ALL",
    "IS NOT",
    "NOT IN",
    "NOT LIKE",
    "NOT BETWEEN",
    "CREATE TABLE",
    "CREATE DATABASE",
    "CREATE INDEX",
    "CREATE UNIQUE",
    "CREATE USER",
    "CREATE PROCEDURE",
    "DROP TABLE",
    "DROP DATABASE",
    "DROP INDEX",
    "DROP USER",
    "DROP PROCEDURE",
    "DROP COLUMN",
    "ALTER TABLE",
    "ALTER COLUMN",
    "ALTER USER",
    "IDENTIFIED BY",
    "SET PASSWORD",
    "SET USERNAME",
    "INSERT INTO",
    "DELETE FROM",
    "SELECT DISTINCT",
    "FETCH NEXT",
];

/// Single-word keyword set (value is stored upper-cased). Legacy SQL type
/// spellings are deliberately included here (not only in `types::LEGACY_TYPE_SUGGESTIONS`)
/// so the lexer still classifies them as keywords, letting the parser raise
/// a precise `type` error rather than an opaque syntax error.
pub const KEYWORDS: &[&str] = &[
    "CREATE", "DROP", "ALTER", "USE", "DATABASE", "TABLE", "INDEX", "UNIQUE", "USER", "PROCEDURE",
    "IF", "NOT", "EXISTS", "STORAGE", "PARTITION", "ORDER", "BY", "SETTINGS", "COMPRESS",
    "ENCRYPT", "ASC", "DESC", "COLUMN", "NULL", "DEFAULT", "SEQUENCE", "PRIMARY", "KEY",
    "FOREIGN", "REFERENCES", "CHECK", "IDENTIFIED", "SET", "PASSWORD", "USERNAME",
    "SELECT", "DISTINCT", "FROM", "WHERE", "GROUP", "HAVING", "LIMIT", "OFFSET", "UNION", "ALL",
    "AS", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "ON", "INSERT", "INTO", "VALUES",
    "UPDATE", "DELETE", "BEGIN", "COMMIT", "ROLLBACK", "GRANT", "REVOKE", "TO", "FOR", "SHOW",
    "DATABASES", "TABLES", "USERS", "INDEXES", "COLUMNS", "GRANTS",
    "DECLARE", "CURSOR", "OPEN", "CLOSE", "DEALLOCATE", "FETCH", "NEXT", "WHILE",
    "PRINT", "EXEC", "EXPLAIN", "END", "RETURN", "BREAK", "EXIT",
    "AND", "OR", "BETWEEN", "IN", "LIKE", "IS", "CASE", "WHEN", "THEN", "ELSE",
    "COUNT", "SUM", "AVG", "MIN", "MAX", "OVER", "UPPER", "LOWER", "CAST",
    "COALESCE", "REVERSE", "ROUND", "POSITION", "LENGTH", "REPLACE", "CONCAT", "SUBSTRING",
    "TRIM", "SYSDATE", "SYSTIME", "SYSTIMESTAMP", "GENUUID", "TRUE", "FALSE",
    "CONNECT",
    // Legacy type spellings, kept in the keyword set per spec.md §9.
    "INT", "INTEGER", "SMALLINT", "BIGINT", "VARCHAR", "CHAR", "TEXT", "FLOAT", "DOUBLE", "REAL",
    "BOOL", "BLOB", "BYTEA", "DATETIME", "DECIMAL", "NUMERIC",
];

/// Iceberg primitive/complex type keywords, classified as `DataType` tokens.
pub const DATA_TYPE_WORDS: &[&str] = &[
    "boolean", "int32", "int64", "float32", "float64", "string", "binary", "date", "time",
    "timestamp", "timestamptz", "uuid", "decimal", "list", "map", "struct",
];
