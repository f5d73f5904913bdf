//! The database driver interface
//!
//! `Db` talks to the server only through [`Driver`]. A driver owns a single
//! connection; transactions are plain state on that connection.

use futures::stream::BoxStream;
use sqlshape_core::{Binds, Prepared, Result, Row, Value};
use std::future::Future;
use std::sync::Arc;

/// One result row. Column names are shared by every record of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value by position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value by column name
    pub fn get_by_name(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Column-keyed form. A repeated column name keeps its last value.
    pub fn into_row(self) -> Row {
        self.columns.iter().cloned().zip(self.values).collect()
    }
}

/// Rows streamed from an open result set
pub type Cursor<'c> = BoxStream<'c, Result<Record>>;

/// A single database connection
pub trait Driver: Send {
    /// Prepare (and cache) a statement
    fn prepare(&mut self, statement: &Prepared) -> impl Future<Output = Result<()>> + Send;

    /// Execute a prepared statement once and return the affected-row count
    fn execute(
        &mut self,
        statement: &Prepared,
        binds: &Binds,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Execute SQL text without binding
    fn execute_unprepared(&mut self, sql: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Run a prepared query and collect every row
    fn fetch_all(
        &mut self,
        statement: &Prepared,
        binds: &Binds,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Run a query without binding and collect every row
    fn fetch_unprepared(&mut self, sql: &str) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Stream the rows of a query. `None` runs the statement unbound.
    fn fetch<'c>(&'c mut self, statement: &'c Prepared, binds: Option<&'c Binds>) -> Cursor<'c>;

    fn begin(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Whether a transaction is open on this connection
    fn in_transaction(&self) -> bool;

    /// Id generated by the last insert on this connection
    fn last_insert_id(&self) -> u64;

    /// Quote a string as a SQL literal
    fn quote(&self, value: &str) -> String {
        quote_mysql(value)
    }
}

/// MySQL string-literal escaping, with surrounding single quotes
pub fn quote_mysql(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\0' => quoted.push_str("\\0"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '"' => quoted.push_str("\\\""),
            '\x1a' => quoted.push_str("\\Z"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
