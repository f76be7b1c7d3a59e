//! # sql-catalog
//!
//! The catalog adapter contract and post-parse validator for the
//! lakehouse SQL front end. `sql-core` only knows syntax and the Iceberg
//! type grammar; whether `orders` actually exists, or `alice` may
//! `SELECT` from it, is a catalog question — this crate is the seam
//! between the two.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sql_catalog::{CatalogAdapter, MemoryCatalog, RequestContext, Validator};
//! use sql_core::parser::parse_one;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = MemoryCatalog::new().with_database("sales");
//! let ctx = RequestContext::new("alice", Some("sales".to_string()));
//! let stmt = parse_one("SELECT id FROM orders;")?;
//!
//! let validator = Validator::new(&catalog);
//! if let Err(e) = validator.validate(&ctx, &stmt).await {
//!     eprintln!("validation failed: {e}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. [`adapter`] — the [`CatalogAdapter`] trait every real catalog
//!    (Iceberg REST, Hive metastore, Glue) must implement, plus
//!    [`RequestContext`] carrying the session identity and a
//!    cancellation handle.
//! 2. [`validator`] — walks a parsed [`sql_core::ast::Statement`] and
//!    checks every table, column, and database name it names against
//!    the adapter.
//! 3. [`memory`] — [`MemoryCatalog`], a reference adapter for tests.
//!
//! Validation is a separate pass from parsing: a statement that parses
//! cleanly can still fail here, and that failure never retroactively
//! invalidates the parse.

pub mod adapter;
pub mod error;
pub mod memory;
pub mod validator;

pub use adapter::{CatalogAdapter, RequestContext, TableSchema, TransactionId};
pub use error::{CatalogError, CatalogResult};
pub use memory::MemoryCatalog;
pub use validator::Validator;
