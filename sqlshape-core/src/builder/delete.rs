//! DELETE statement builder

use super::common::{where_fragment, BindSpec, Joiner, QueryBuilder};
use crate::statement::{Binds, Params};
use crate::{Arg, Error, Result, Statement};

/// Condition literal that drops the whole table
pub const DROP_TABLE: &str = "TABLE";

/// Condition literal that empties the table
pub const TRUNCATE_ALL: &str = "ALL";

const WHERE: u8 = 2;

/// DELETE statement builder
///
/// A condition is required. The literals [`DROP_TABLE`] and [`TRUNCATE_ALL`]
/// turn the statement into `DROP TABLE IF EXISTS` / `TRUNCATE TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteBuilder {
    table: String,
    condition: Arg,
    bind_spec: BindSpec,
    tail: Option<String>,
}

impl DeleteBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            condition: Arg::Empty,
            bind_spec: BindSpec::default(),
            tail: None,
        }
    }

    /// `DROP TABLE IF EXISTS <table>`
    pub fn drop_table(table: impl Into<String>) -> Self {
        Self::new(table).where_(DROP_TABLE)
    }

    /// `TRUNCATE TABLE <table>`
    pub fn truncate(table: impl Into<String>) -> Self {
        Self::new(table).where_(TRUNCATE_ALL)
    }

    /// WHERE condition: a raw SQL string or a column mapping
    pub fn where_(mut self, condition: impl Into<Arg>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Extra binds for a raw condition, or the joiner for a mapping condition
    pub fn binds(mut self, spec: impl Into<BindSpec>) -> Self {
        self.bind_spec = spec.into();
        self
    }

    pub fn joiner(mut self, joiner: Joiner) -> Self {
        self.bind_spec.joiner = joiner;
        self
    }

    /// Raw SQL after the WHERE clause, e.g. `LIMIT 100`
    pub fn tail(mut self, tail: impl AsRef<str>) -> Self {
        let tail = tail.as_ref().trim();
        self.tail = (!tail.is_empty()).then(|| tail.to_string());
        self
    }
}

impl QueryBuilder for DeleteBuilder {
    fn build(&self) -> Result<Statement> {
        let table = self.table.trim();
        if table.is_empty() {
            return Err(Error::empty_input(1));
        }

        match &self.condition {
            Arg::Text(literal) if literal == DROP_TABLE => {
                return Statement::raw(format!("DROP TABLE IF EXISTS {table}"));
            }
            Arg::Text(literal) if literal == TRUNCATE_ALL => {
                return Statement::raw(format!("TRUNCATE TABLE {table}"));
            }
            _ if self.condition.is_empty() => return Err(Error::empty_input(WHERE)),
            _ => {}
        }

        let filter = where_fragment(&self.condition, &self.bind_spec, WHERE)?;
        let mut sql = format!("DELETE FROM {table} WHERE {}", filter.sql);
        if let Some(tail) = &self.tail {
            sql.push(' ');
            sql.push_str(tail);
        }

        Statement::new(sql, Params::Single(Binds::Named(filter.binds)))
    }
}
