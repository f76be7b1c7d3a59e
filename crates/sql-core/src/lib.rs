//! # sql-core
//!
//! Lexer, parser, AST, Iceberg type system, and error model for a
//! lakehouse query server's SQL front end.
//!
//! This crate turns source text into either a validated [`ast::Statement`]
//! tree or a structured [`error::ParseError`] — nothing in here talks to a
//! catalog or executes anything. Catalog-aware semantic validation lives
//! one layer up, in `sql-catalog`.
//!
//! ## Pipeline
//!
//! 1. **Position tracking** ([`position`]) - maps byte offsets to
//!    line/column for every diagnostic.
//! 2. **Type system** ([`types`]) - the Iceberg type grammar
//!    (`decimal(P,S)`, `list<...>`, `map<...>`, `struct<...>`), validated
//!    independently of parsing so the parser and the catalog adapter share
//!    one source of truth.
//! 3. **Lexer** ([`lexer`], [`token`]) - tokenizes source text, fusing
//!    multi-word keywords (`CREATE TABLE`, `NOT EXISTS`, ...) into single
//!    keyword tokens.
//! 4. **Parser** ([`parser`]) - recursive-descent parser producing
//!    [`ast::Statement`] values, with statement-boundary error recovery
//!    via [`recovery::ErrorCollector`].
//! 5. **AST** ([`ast`]) - the statement and expression node types.
//! 6. **Formatter** ([`format`]) - canonical AST to SQL text rendering.
//!
//! ## Quick Start
//!
//! ```rust
//! use sql_core::parser::parse_one;
//! use sql_core::format::format_statement;
//!
//! let stmt = parse_one("SELECT a FROM t WHERE a > 1;").unwrap();
//! assert_eq!(format_statement(&stmt), "SELECT a FROM t WHERE a > 1");
//! ```
//!
//! ## Error Recovery
//!
//! For tooling that wants to report every error in a batch of statements
//! rather than stopping at the first one, use [`parser::parse_recovering`]:
//!
//! ```rust
//! use sql_core::parser::parse_recovering;
//!
//! let (statements, errors) = parse_recovering("SELECT;\nSELECT b FROM t;").unwrap();
//! assert!(!errors.is_empty());
//! assert_eq!(statements.len(), 1);
//! ```

pub mod ast;
pub mod error;
pub mod format;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod recovery;
pub mod token;
pub mod types;

pub use ast::Statement;
pub use error::{ErrorCode, ParseError};
pub use format::format_statement;
pub use parser::{parse_one, parse_recovering, parse_strict};
pub use recovery::ErrorCollector;
pub use types::IcebergType;
