//! Backing relational store boundary.
//!
//! The store builds parameterized statements and hands them to a
//! [`RelationalBackend`]. The backend reports a hard ceiling on bound
//! parameters per statement; the store never exceeds it. No retry is
//! provided anywhere on this boundary; execution failures propagate to the
//! caller unchanged.

use crate::error::Result;

/// A bound parameter or result cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

/// One result row, positional in the statement's column order.
pub type Row = Vec<Value>;

/// A parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The SQL text, with `?` placeholders.
    pub sql: String,
    /// Bound parameters, one per placeholder.
    pub params: Vec<Value>,
}

impl Statement {
    /// Create a statement without parameters.
    pub fn new<S: Into<String>>(sql: S) -> Self {
        Statement {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Create a statement with bound parameters.
    pub fn with_params<S: Into<String>>(sql: S, params: Vec<Value>) -> Self {
        Statement {
            sql: sql.into(),
            params,
        }
    }
}

/// A backend that executes parameterized statements and statement batches.
///
/// A batch executes as one unit (one transaction in the SQLite backend);
/// statements within it apply in order. Implementations must be shareable
/// across scopes; only scope-level write ordering is enforced above this
/// trait, never connection-level locking.
#[allow(async_fn_in_trait)]
pub trait RelationalBackend: Send + Sync {
    /// Hard ceiling on bound parameters per statement.
    fn max_bound_parameters(&self) -> usize;

    /// Execute a single statement, discarding any result rows.
    async fn execute(&self, stmt: Statement) -> Result<()>;

    /// Execute a batch of statements as one unit, in order.
    async fn execute_batch(&self, stmts: Vec<Statement>) -> Result<()>;

    /// Run a query and collect all result rows.
    async fn query(&self, stmt: Statement) -> Result<Vec<Row>>;

    /// Run a query and return the first row, if any.
    async fn query_first(&self, stmt: Statement) -> Result<Option<Row>>;
}
