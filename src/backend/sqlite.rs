//! SQLite implementation of the backing store boundary.
//!
//! Wraps a single rusqlite connection behind a mutex. SQLite calls are
//! short and in-process, so statements run on the caller's task; batches
//! execute inside one transaction, matching the batch contract.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use rusqlite::types::Value as SqlValue;

use crate::backend::traits::{RelationalBackend, Row, Statement, Value};
use crate::error::Result;

/// Default bound-parameter ceiling, matching the original adapter's limit.
pub const DEFAULT_MAX_PARAMETERS: usize = 100;

/// A SQLite-backed relational store.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    max_parameters: usize,
}

impl SqliteBackend {
    /// Open a file-backed database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        SqliteBackend {
            conn: Arc::new(Mutex::new(conn)),
            max_parameters: DEFAULT_MAX_PARAMETERS,
        }
    }

    /// Override the bound-parameter ceiling reported to callers.
    pub fn with_max_parameters(mut self, max_parameters: usize) -> Self {
        self.max_parameters = max_parameters.max(1);
        self
    }

    fn bind(params: &[Value]) -> Vec<SqlValue> {
        params.iter().map(to_sql_value).collect()
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Int(n) => SqlValue::Integer(*n),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}

fn from_sql_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(n) => Value::Int(n),
        SqlValue::Real(f) => Value::Float(f),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(b) => Value::Blob(b),
    }
}

fn read_rows(conn: &Connection, stmt: &Statement) -> Result<Vec<Row>> {
    let mut prepared = conn.prepare(&stmt.sql)?;
    let column_count = prepared.column_count();
    let params = SqliteBackend::bind(&stmt.params);

    let mut rows = prepared.query(rusqlite::params_from_iter(params))?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let value: SqlValue = row.get(i)?;
            values.push(from_sql_value(value));
        }
        result.push(values);
    }
    Ok(result)
}

impl RelationalBackend for SqliteBackend {
    fn max_bound_parameters(&self) -> usize {
        self.max_parameters
    }

    async fn execute(&self, stmt: Statement) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            &stmt.sql,
            rusqlite::params_from_iter(Self::bind(&stmt.params)),
        )?;
        Ok(())
    }

    async fn execute_batch(&self, stmts: Vec<Statement>) -> Result<()> {
        let conn = self.conn.lock();
        let tx = conn.unchecked_transaction()?;
        for stmt in &stmts {
            tx.execute(
                &stmt.sql,
                rusqlite::params_from_iter(Self::bind(&stmt.params)),
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn query(&self, stmt: Statement) -> Result<Vec<Row>> {
        let conn = self.conn.lock();
        read_rows(&conn, &stmt)
    }

    async fn query_first(&self, stmt: Statement) -> Result<Option<Row>> {
        let conn = self.conn.lock();
        let mut rows = read_rows(&conn, &stmt)?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }
}
