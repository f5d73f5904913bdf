//! Scripted in-memory driver for tests

use crate::driver::{Cursor, Driver, Record};
use futures::StreamExt;
use sqlshape_core::{Binds, Error, Prepared, Result, Value};
use std::collections::VecDeque;
use std::sync::Arc;

/// A driver call as observed by [`MockDriver`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Prepare(String),
    Execute(String, Vec<Value>),
    ExecuteUnprepared(String),
    FetchAll(String, Vec<Value>),
    FetchUnprepared(String),
    Fetch(String),
    Begin,
    Commit,
    Rollback,
}

/// Records every call and answers from a script.
///
/// Executions return the scripted affected counts in order (1 once the script
/// runs out); fetches pop the scripted result sets in order (empty once the
/// script runs out).
#[derive(Debug, Default)]
pub struct MockDriver {
    calls: Vec<Call>,
    affected: VecDeque<u64>,
    results: VecDeque<Vec<Record>>,
    fail_on_execute: Option<usize>,
    fail_rollback: bool,
    executions: usize,
    in_tx: bool,
    last_insert_id: u64,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn affected(mut self, counts: impl IntoIterator<Item = u64>) -> Self {
        self.affected.extend(counts);
        self
    }

    /// Queue one result set
    pub fn rows(mut self, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
        self.results.push_back(
            rows.into_iter()
                .map(|values| Record::new(Arc::clone(&columns), values))
                .collect(),
        );
        self
    }

    /// Fail the `n`th execution (1-based)
    pub fn fail_on_execute(mut self, n: usize) -> Self {
        self.fail_on_execute = Some(n);
        self
    }

    pub fn fail_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn prepared_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Prepare(_)))
            .count()
    }

    pub fn executed_count(&self) -> usize {
        self.executions
    }

    fn next_affected(&mut self) -> Result<u64> {
        self.executions += 1;
        if self.fail_on_execute == Some(self.executions) {
            return Err(Error::driver(format!("execution {} failed", self.executions)));
        }
        let affected = self.affected.pop_front().unwrap_or(1);
        if affected > 0 {
            self.last_insert_id += 1;
        }
        Ok(affected)
    }

    fn next_result(&mut self) -> Vec<Record> {
        self.results.pop_front().unwrap_or_default()
    }
}

impl Driver for MockDriver {
    async fn prepare(&mut self, statement: &Prepared) -> Result<()> {
        self.calls
            .push(Call::Prepare(statement.positional_sql().to_string()));
        Ok(())
    }

    async fn execute(&mut self, statement: &Prepared, binds: &Binds) -> Result<u64> {
        let values = statement.arrange(binds)?;
        self.calls
            .push(Call::Execute(statement.positional_sql().to_string(), values));
        self.next_affected()
    }

    async fn execute_unprepared(&mut self, sql: &str) -> Result<u64> {
        self.calls.push(Call::ExecuteUnprepared(sql.to_string()));
        self.next_affected()
    }

    async fn fetch_all(&mut self, statement: &Prepared, binds: &Binds) -> Result<Vec<Record>> {
        let values = statement.arrange(binds)?;
        self.calls
            .push(Call::FetchAll(statement.positional_sql().to_string(), values));
        Ok(self.next_result())
    }

    async fn fetch_unprepared(&mut self, sql: &str) -> Result<Vec<Record>> {
        self.calls.push(Call::FetchUnprepared(sql.to_string()));
        Ok(self.next_result())
    }

    fn fetch<'c>(&'c mut self, statement: &'c Prepared, binds: Option<&'c Binds>) -> Cursor<'c> {
        if let Some(binds) = binds {
            if let Err(e) = statement.arrange(binds) {
                return futures::stream::once(async move { Err(e) }).boxed();
            }
        }
        self.calls
            .push(Call::Fetch(statement.positional_sql().to_string()));
        let records = self.next_result();
        futures::stream::iter(records.into_iter().map(Ok)).boxed()
    }

    async fn begin(&mut self) -> Result<()> {
        self.calls.push(Call::Begin);
        self.in_tx = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.calls.push(Call::Commit);
        self.in_tx = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.calls.push(Call::Rollback);
        self.in_tx = false;
        if self.fail_rollback {
            return Err(Error::driver("connection lost during rollback"));
        }
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_tx
    }

    fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }
}
