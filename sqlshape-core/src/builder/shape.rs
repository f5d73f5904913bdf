//! Argument normalization
//!
//! The insert path accepts its columns and entries in several forms. This
//! module classifies a `(keys, entries)` pair into exactly one [`Shape`], or
//! rejects it, before any SQL is written.

use super::common::column_names;
use crate::placeholder::sanitize;
use crate::statement::{Binds, Params};
use crate::{Arg, BindMap, Error, Result, Row, Value};
use std::collections::HashSet;

/// Argument position of the column/key specification
pub const KEYS: u8 = 2;
/// Argument position of the entries
pub const ENTRIES: u8 = 3;

/// The normalized, unambiguous form of an insert's arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Caller-written SQL after `INTO <table>`; `tail` is a raw VALUES part
    RawSqlText {
        fragment: String,
        tail: Option<String>,
        params: Params,
    },
    /// One mapping: keys are columns, values are binds
    ColumnValueMap(Row),
    /// Parallel column and value lists
    ColumnListWithValueList {
        columns: Vec<String>,
        values: Vec<Value>,
    },
    /// Column list plus a bind map with its own placeholder names
    ColumnListWithBindMap { columns: Vec<String>, binds: BindMap },
    /// Column list plus a batch of mappings
    ColumnListWithRowBatch { columns: Vec<String>, rows: Vec<Row> },
    /// A batch of mappings sharing `columns`
    RowListBatch { columns: Vec<String>, rows: Vec<Row> },
}

impl Shape {
    pub fn is_batch(&self) -> bool {
        match self {
            Shape::RawSqlText { params, .. } => matches!(params, Params::Batch(_)),
            Shape::ColumnListWithRowBatch { .. } | Shape::RowListBatch { .. } => true,
            _ => false,
        }
    }
}

/// Classify the keys/entries of an insert.
pub fn normalize_insert(keys: &Arg, entries: &Arg) -> Result<Shape> {
    match (keys, entries) {
        (Arg::Empty, Arg::Empty) | (Arg::Empty, Arg::Text(_)) => Err(Error::empty_input(KEYS)),
        (Arg::Text(fragment), entries) => raw_sql_text(fragment, entries),
        (Arg::Empty, Arg::Map(row)) | (Arg::Map(row), Arg::Empty) => {
            if row.is_empty() {
                return Err(Error::empty_input(KEYS));
            }
            Ok(Shape::ColumnValueMap(row.clone()))
        }
        (Arg::Empty, Arg::Rows(rows)) | (Arg::Rows(rows), Arg::Empty) => {
            check_rows(rows)?;
            let columns = rows[0].keys().cloned().collect();
            Ok(Shape::RowListBatch {
                columns,
                rows: rows.clone(),
            })
        }
        (Arg::Map(_), _) => Err(Error::validation(
            KEYS,
            "with entries given, keys must be a plain list of column names",
        )),
        (Arg::List(_), entries) => {
            let columns = column_names(keys, KEYS)?;
            check_columns(&columns)?;
            with_column_list(columns, entries)
        }
        (Arg::Empty, other) => Err(Error::validation(
            ENTRIES,
            format!(
                "without a column list, entries must be a mapping or a list of mappings, got {}",
                other.kind()
            ),
        )),
        (other, _) => Err(Error::validation(
            KEYS,
            format!("keys must be a SQL string, a mapping or a list of column names, got {}", other.kind()),
        )),
    }
}

fn raw_sql_text(fragment: &str, entries: &Arg) -> Result<Shape> {
    let (tail, params) = match entries {
        Arg::Empty => (None, Params::None),
        Arg::Text(tail) => (Some(tail.clone()), Params::None),
        Arg::Map(binds) => (None, Params::Single(Binds::Named(binds.clone()))),
        Arg::List(values) => (None, Params::Single(Binds::Positional(values.clone()))),
        Arg::Rows(rows) => {
            check_rows(rows)?;
            (
                None,
                Params::Batch(rows.iter().cloned().map(Binds::Named).collect()),
            )
        }
        Arg::Lists(lists) => (
            None,
            Params::Batch(lists.iter().cloned().map(Binds::Positional).collect()),
        ),
    };
    Ok(Shape::RawSqlText {
        fragment: fragment.to_string(),
        tail,
        params,
    })
}

fn with_column_list(columns: Vec<String>, entries: &Arg) -> Result<Shape> {
    match entries {
        Arg::Map(binds) => {
            if binds.is_empty() {
                return Err(Error::empty_input(ENTRIES));
            }
            if binds.len() != columns.len() {
                return Err(Error::validation(
                    ENTRIES,
                    format!("{} columns but {} binds", columns.len(), binds.len()),
                ));
            }
            Ok(Shape::ColumnListWithBindMap {
                columns,
                binds: binds.clone(),
            })
        }
        Arg::List(values) => {
            if values.len() != columns.len() {
                return Err(Error::validation(
                    ENTRIES,
                    format!("{} columns but {} values", columns.len(), values.len()),
                ));
            }
            Ok(Shape::ColumnListWithValueList {
                columns,
                values: values.clone(),
            })
        }
        Arg::Rows(rows) => {
            check_rows(rows)?;
            if rows[0].len() != columns.len() {
                return Err(Error::validation(
                    ENTRIES,
                    format!("{} columns but rows carry {} keys", columns.len(), rows[0].len()),
                ));
            }
            Ok(Shape::ColumnListWithRowBatch {
                columns,
                rows: rows.clone(),
            })
        }
        Arg::Lists(lists) => {
            if lists.is_empty() {
                return Err(Error::empty_input(ENTRIES));
            }
            let rows = lists
                .iter()
                .enumerate()
                .map(|(i, values)| {
                    if values.len() != columns.len() {
                        return Err(Error::validation(
                            ENTRIES,
                            format!("row {i} has {} values for {} columns", values.len(), columns.len()),
                        ));
                    }
                    Ok(columns.iter().cloned().zip(values.iter().cloned()).collect())
                })
                .collect::<Result<Vec<Row>>>()?;
            Ok(Shape::RowListBatch { columns, rows })
        }
        // A column list with nothing (or only raw text) has no defined meaning
        Arg::Empty | Arg::Text(_) => Err(Error::validation(
            ENTRIES,
            "a column list needs values, a bind map or rows as entries",
        )),
    }
}

fn check_columns(columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(Error::empty_input(KEYS));
    }
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(sanitize(column)) {
            return Err(Error::validation(KEYS, format!("column '{column}' is listed twice")));
        }
    }
    Ok(())
}

/// Batches must be non-empty and every row must carry the first row's keys.
fn check_rows(rows: &[Row]) -> Result<()> {
    let first = rows.first().ok_or_else(|| Error::empty_input(ENTRIES))?;
    if first.is_empty() {
        return Err(Error::empty_input(ENTRIES));
    }
    for (i, row) in rows.iter().enumerate().skip(1) {
        if row.len() != first.len() || !row.keys().all(|k| first.contains_key(k)) {
            return Err(Error::validation(
                ENTRIES,
                format!("row {i} does not have the same columns as the first row"),
            ));
        }
    }
    Ok(())
}

/// Sanitize the keys of a caller mapping so they can serve as bind names.
/// A leading `:` is dropped as well.
pub fn sanitize_keys(row: &Row, position: u8) -> Result<BindMap> {
    let mut binds = BindMap::with_capacity(row.len());
    for (key, value) in row {
        let name = sanitize(key.strip_prefix(':').unwrap_or(key));
        if binds.insert(name.clone(), value.clone()).is_some() {
            return Err(Error::validation(
                position,
                format!("'{key}' collides with another key once backticks are removed"),
            ));
        }
    }
    Ok(binds)
}
