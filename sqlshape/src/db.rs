//! The `Db` handle: public operations over one driver connection

use crate::config::DebugConfig;
use crate::debug::DebugSink;
use crate::driver::{Cursor, Driver, Record};
use crate::executor;
use sqlshape_core::script::split_statements;
use sqlshape_core::{
    Arg, Binds, DeleteBuilder, Error, InsertBuilder, Params, QueryBuilder, Result, Row,
    SelectBuilder, Statement, UpdateBuilder, Value,
};
use std::path::Path;

/// How a read returns its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultMode {
    /// Each row as a list of values in column order
    #[default]
    Positional,
    /// Each row keyed by column name
    Keyed,
    /// A live stream of records
    Cursor,
}

/// The result of [`Db::fetch`]
pub enum Selection<'c> {
    Positional(Vec<Vec<Value>>),
    Keyed(Vec<Row>),
    Cursor(Cursor<'c>),
}

impl<'c> Selection<'c> {
    pub fn into_positional(self) -> Option<Vec<Vec<Value>>> {
        match self {
            Selection::Positional(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_keyed(self) -> Option<Vec<Row>> {
        match self {
            Selection::Keyed(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_cursor(self) -> Option<Cursor<'c>> {
        match self {
            Selection::Cursor(cursor) => Some(cursor),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Selection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Positional(rows) => f.debug_tuple("Positional").field(rows).finish(),
            Selection::Keyed(rows) => f.debug_tuple("Keyed").field(rows).finish(),
            Selection::Cursor(_) => f.write_str("Cursor(..)"),
        }
    }
}

/// A database handle over a single connection
///
/// Every operation takes `&mut self`, so one handle is never used by two
/// callers at once.
pub struct Db<D: Driver> {
    driver: D,
    debug: DebugSink,
}

impl<D: Driver> Db<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            debug: DebugSink::default(),
        }
    }

    pub fn with_debug(driver: D, config: &DebugConfig) -> Self {
        Self {
            driver,
            debug: DebugSink::from(config),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Turn statement logging on or off. `max_len` of 0 logs payloads in full.
    pub fn set_debug(&mut self, enabled: bool, max_len: usize) {
        self.debug.set(enabled, max_len);
    }

    pub fn debug(&self) -> &DebugSink {
        &self.debug
    }

    /// Run a statement and return the affected-row count
    pub async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.debug.statement(statement);
        executor::execute(&mut self.driver, statement).await
    }

    pub async fn insert(&mut self, builder: InsertBuilder) -> Result<u64> {
        let statement = builder.build()?;
        self.execute(&statement).await
    }

    pub async fn replace(
        &mut self,
        table: &str,
        keys: impl Into<Arg>,
        entries: impl Into<Arg>,
    ) -> Result<u64> {
        self.insert(InsertBuilder::replace(table).keys(keys).entries(entries))
            .await
    }

    pub async fn update(&mut self, builder: UpdateBuilder) -> Result<u64> {
        let statement = builder.build()?;
        self.execute(&statement).await
    }

    pub async fn update_ignore(&mut self, builder: UpdateBuilder) -> Result<u64> {
        self.update(builder.ignore()).await
    }

    /// Delete matching rows. The condition literals `"TABLE"` and `"ALL"`
    /// drop and truncate the table instead.
    pub async fn delete(&mut self, table: &str, condition: impl Into<Arg>) -> Result<u64> {
        let statement = DeleteBuilder::new(table).where_(condition).build()?;
        self.execute(&statement).await
    }

    pub async fn drop_table(&mut self, table: &str) -> Result<u64> {
        let statement = DeleteBuilder::drop_table(table).build()?;
        self.execute(&statement).await
    }

    pub async fn truncate_table(&mut self, table: &str) -> Result<u64> {
        let statement = DeleteBuilder::truncate(table).build()?;
        self.execute(&statement).await
    }

    async fn records(&mut self, statement: &Statement) -> Result<Vec<Record>> {
        self.debug.statement(statement);
        match statement.params() {
            Params::None => self.driver.fetch_unprepared(statement.sql()).await,
            Params::Single(binds) => self.driver.fetch_all(statement.prepared(), binds).await,
            Params::Batch(_) => Err(Error::validation(1, "a batch statement returns no rows")),
        }
    }

    /// Rows as positional value lists
    pub async fn select(&mut self, query: SelectBuilder) -> Result<Vec<Vec<Value>>> {
        let statement = query.build()?;
        let records = self.records(&statement).await?;
        Ok(records.into_iter().map(Record::into_values).collect())
    }

    /// Rows keyed by column name
    pub async fn select_assoc(&mut self, query: SelectBuilder) -> Result<Vec<Row>> {
        let statement = query.build()?;
        let records = self.records(&statement).await?;
        Ok(records.into_iter().map(Record::into_row).collect())
    }

    /// The first column of the first row, or `default` when there is no row
    pub async fn select_single_val(
        &mut self,
        query: SelectBuilder,
        default: impl Into<Value>,
    ) -> Result<Value> {
        let rows = self.select(query.limit_one()).await?;
        Ok(first_value(rows).unwrap_or_else(|| default.into()))
    }

    /// Run a statement and return its rows in the requested form
    pub async fn fetch<'c>(
        &'c mut self,
        statement: &'c Statement,
        mode: ResultMode,
    ) -> Result<Selection<'c>> {
        match mode {
            ResultMode::Positional => {
                let records = self.records(statement).await?;
                Ok(Selection::Positional(
                    records.into_iter().map(Record::into_values).collect(),
                ))
            }
            ResultMode::Keyed => {
                let records = self.records(statement).await?;
                Ok(Selection::Keyed(
                    records.into_iter().map(Record::into_row).collect(),
                ))
            }
            ResultMode::Cursor => self.select_cursor(statement).map(Selection::Cursor),
        }
    }

    /// Stream the rows of a statement without collecting them
    pub fn select_cursor<'c>(&'c mut self, statement: &'c Statement) -> Result<Cursor<'c>> {
        self.debug.statement(statement);
        match statement.params() {
            Params::None => Ok(self.driver.fetch(statement.prepared(), None)),
            Params::Single(binds) => Ok(self.driver.fetch(statement.prepared(), Some(binds))),
            Params::Batch(_) => Err(Error::validation(1, "a batch statement returns no rows")),
        }
    }

    /// Run SQL with binds and return its records
    pub async fn query(&mut self, sql: &str, binds: impl Into<Binds>) -> Result<Vec<Record>> {
        let statement = Statement::new(sql, Params::Single(binds.into()))?;
        self.records(&statement).await
    }

    /// First column of the first row of an unbound query
    pub async fn query_val(&mut self, sql: &str) -> Result<Option<Value>> {
        let statement = Statement::raw(sql)?;
        let records = self.records(&statement).await?;
        Ok(first_value(records.into_iter().map(Record::into_values).collect()))
    }

    pub async fn begin_transaction(&mut self) -> Result<()> {
        self.debug.text("START TRANSACTION");
        self.driver.begin().await
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.debug.text("COMMIT");
        self.driver.commit().await
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.debug.text("ROLLBACK");
        self.driver.rollback().await
    }

    pub fn in_transaction(&self) -> bool {
        self.driver.in_transaction()
    }

    pub fn last_insert_id(&self) -> u64 {
        self.driver.last_insert_id()
    }

    /// Quote a string as a SQL literal
    pub fn quote(&self, value: &str) -> String {
        self.driver.quote(value)
    }

    /// Escape a string for use inside a literal, without the surrounding quotes
    pub fn escape(&self, value: &str) -> String {
        let quoted = self.driver.quote(value);
        let inner = quoted
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .map(str::to_string);
        inner.unwrap_or(quoted)
    }

    /// Name of the selected database, if any
    pub async fn database_name(&mut self) -> Result<Option<String>> {
        let value = self.query_val("SELECT DATABASE()").await?;
        Ok(value.as_ref().and_then(text))
    }

    pub async fn database_list(&mut self) -> Result<Vec<String>> {
        self.first_column("SHOW DATABASES").await
    }

    pub async fn has_database(&mut self, name: &str) -> Result<bool> {
        Ok(self.database_list().await?.iter().any(|db| db == name))
    }

    /// Tables of `database`, or of the selected database when `None`
    pub async fn table_list(&mut self, database: Option<&str>) -> Result<Vec<String>> {
        match database {
            Some(db) => {
                if !self.has_database(db).await? {
                    return Err(Error::unknown_database(db));
                }
                self.first_column(&format!("SHOW TABLES FROM {db}")).await
            }
            None => self.first_column("SHOW TABLES").await,
        }
    }

    /// Column descriptions of `table`, one keyed row per column
    pub async fn show_columns(&mut self, table: &str, database: Option<&str>) -> Result<Vec<Row>> {
        let sql = match database {
            Some(db) => format!("SHOW COLUMNS FROM {table} FROM {db}"),
            None => format!("SHOW COLUMNS FROM {table}"),
        };
        let records = self.records(&Statement::raw(sql)?).await?;
        Ok(records.into_iter().map(Record::into_row).collect())
    }

    async fn first_column(&mut self, sql: &str) -> Result<Vec<String>> {
        let records = self.records(&Statement::raw(sql)?).await?;
        Ok(records
            .iter()
            .filter_map(|record| record.get(0).and_then(text))
            .collect())
    }

    /// Run a script of `;`-separated statements one by one, unbound.
    /// Returns how many statements ran.
    pub async fn multi_query(&mut self, script: &str) -> Result<usize> {
        let statements = split_statements(script);
        for sql in &statements {
            self.debug.text(sql);
            self.driver.execute_unprepared(sql).await?;
        }
        Ok(statements.len())
    }

    pub async fn multi_query_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let script = tokio::fs::read_to_string(path).await?;
        self.multi_query(&script).await
    }
}

fn first_value(rows: Vec<Vec<Value>>) -> Option<Value> {
    rows.into_iter().next().and_then(|row| row.into_iter().next())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        other => Some(other.to_string()),
    }
}
