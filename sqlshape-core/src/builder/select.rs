//! SELECT statement builder

use super::common::{column_names, where_fragment, BindSpec, Joiner, QueryBuilder};
use crate::statement::{Binds, Params};
use crate::{Arg, Error, Result, Statement};
use regex::Regex;
use std::sync::LazyLock;

const COLUMNS: u8 = 2;
const WHERE: u8 = 3;

/// A trailing `LIMIT n`, `LIMIT offset, n` or `LIMIT n OFFSET offset`
static TRAILING_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bLIMIT\s+(?:(\d+)\s*,\s*)?\d+(\s+OFFSET\s+\d+)?\s*$")
        .expect("limit pattern is valid")
});

/// SELECT statement builder
///
/// # Examples
/// ```
/// use sqlshape_core::{row, select, QueryBuilder};
///
/// let sql = select("persons")
///     .columns("FirstName, LastName")
///     .where_(row! { "ID" => 1 })
///     .to_sql()
///     .unwrap();
/// assert_eq!(sql, "SELECT FirstName, LastName FROM persons WHERE ID = :where_ID");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectBuilder {
    table: String,
    columns: Arg,
    condition: Arg,
    bind_spec: BindSpec,
    tail: Option<String>,
}

impl SelectBuilder {
    /// Create a new SELECT builder for all columns
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Arg::Empty,
            condition: Arg::Empty,
            bind_spec: BindSpec::default(),
            tail: None,
        }
    }

    /// Columns: a raw select list or a list of names
    pub fn columns(mut self, columns: impl Into<Arg>) -> Self {
        self.columns = columns.into();
        self
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

    /// Raw SQL after the WHERE clause: `ORDER BY`, `GROUP BY`, `LIMIT`…
    pub fn tail(mut self, tail: impl AsRef<str>) -> Self {
        let tail = tail.as_ref().trim();
        self.tail = (!tail.is_empty()).then(|| tail.to_string());
        self
    }

    /// Limit the result to one row. A trailing LIMIT in the tail is narrowed
    /// to one row and keeps its offset.
    pub fn limit_one(mut self) -> Self {
        self.tail = Some(match self.tail.take() {
            Some(tail) => match TRAILING_LIMIT.captures(&tail) {
                Some(caps) => {
                    let start = caps.get(0).map_or(tail.len(), |m| m.start());
                    let limit = match (caps.get(1), caps.get(2)) {
                        (Some(offset), _) => format!("LIMIT {}, 1", offset.as_str()),
                        (None, Some(offset)) => format!("LIMIT 1{}", offset.as_str()),
                        (None, None) => "LIMIT 1".to_string(),
                    };
                    format!("{}{limit}", &tail[..start])
                }
                None => format!("{tail} LIMIT 1"),
            },
            None => "LIMIT 1".to_string(),
        });
        self
    }

    fn column_sql(&self) -> Result<String> {
        match &self.columns {
            Arg::Empty => Ok("*".to_string()),
            Arg::Text(sql) => Ok(sql.clone()),
            Arg::List(_) => {
                let names = column_names(&self.columns, COLUMNS)?;
                if names.is_empty() {
                    return Ok("*".to_string());
                }
                Ok(names.join(", "))
            }
            other => Err(Error::validation(
                COLUMNS,
                format!("columns must be a SQL string or a list of names, got {}", other.kind()),
            )),
        }
    }
}

impl QueryBuilder for SelectBuilder {
    fn build(&self) -> Result<Statement> {
        let table = self.table.trim();
        if table.is_empty() {
            return Err(Error::empty_input(1));
        }

        let columns = self.column_sql()?;
        let filter = where_fragment(&self.condition, &self.bind_spec, WHERE)?;

        let mut sql = format!("SELECT {columns} FROM {table}");
        if !filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.sql);
        }
        if let Some(tail) = &self.tail {
            sql.push(' ');
            sql.push_str(tail);
        }

        Statement::new(sql, Params::Single(Binds::Named(filter.binds)))
    }
}
