//! INSERT / REPLACE statement builder

use super::common::{
    column_list, duplicate_update_clause, merge_binds, values_clause, Fragment, OnConflict,
    QueryBuilder,
};
use super::shape::{normalize_insert, sanitize_keys, Shape, ENTRIES};
use crate::statement::{Binds, Params};
use crate::{Arg, BindMap, Error, Result, Row, Statement};

/// Argument position of the conflict clause
pub const CONFLICT: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Insert,
    Replace,
}

impl Verb {
    fn as_str(&self) -> &'static str {
        match self {
            Verb::Insert => "INSERT",
            Verb::Replace => "REPLACE",
        }
    }
}

/// INSERT (or REPLACE) builder
///
/// `keys` and `entries` take any of the accepted argument shapes; they are
/// only interpreted when the statement is built.
///
/// # Examples
/// ```
/// use sqlshape_core::{insert, row, QueryBuilder};
///
/// let sql = insert("persons")
///     .entries(row! { "FirstName" => "Jimmy", "LastName" => "Miller" })
///     .to_sql()
///     .unwrap();
/// assert_eq!(
///     sql,
///     "INSERT INTO persons (FirstName, LastName) VALUES (:FirstName, :LastName)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InsertBuilder {
    table: String,
    verb: Verb,
    keys: Arg,
    entries: Arg,
    on_conflict: OnConflict,
}

impl InsertBuilder {
    /// Create a new INSERT builder
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            verb: Verb::Insert,
            keys: Arg::Empty,
            entries: Arg::Empty,
            on_conflict: OnConflict::Error,
        }
    }

    /// Create a REPLACE builder
    pub fn replace(table: impl Into<String>) -> Self {
        Self {
            verb: Verb::Replace,
            ..Self::new(table)
        }
    }

    /// Column specification: a column list, a mapping, or a raw SQL fragment
    pub fn keys(mut self, keys: impl Into<Arg>) -> Self {
        self.keys = keys.into();
        self
    }

    /// Values: a list, a bind map, a batch of rows or a raw VALUES tail
    pub fn entries(mut self, entries: impl Into<Arg>) -> Self {
        self.entries = entries.into();
        self
    }

    /// `INSERT IGNORE`
    pub fn ignore(self) -> Self {
        self.on_conflict(OnConflict::Ignore)
    }

    /// Append `ON DUPLICATE KEY UPDATE` from a raw tail or a column mapping
    pub fn on_duplicate_update(self, update: impl Into<Arg>) -> Self {
        self.on_conflict(OnConflict::Update(update.into()))
    }

    pub fn on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = on_conflict;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The normalized form of this builder's keys and entries
    pub fn shape(&self) -> Result<Shape> {
        normalize_insert(&self.keys, &self.entries)
    }
}

impl QueryBuilder for InsertBuilder {
    fn build(&self) -> Result<Statement> {
        let table = self.table.trim();
        if table.is_empty() {
            return Err(Error::empty_input(1));
        }

        let (body, params) = match self.shape()? {
            Shape::RawSqlText {
                fragment,
                tail,
                params,
            } => {
                let body = match tail {
                    Some(tail) => format!("{fragment} {tail}"),
                    None => fragment,
                };
                (body, params)
            }
            Shape::ColumnValueMap(row) => {
                let binds = sanitize_keys(&row, ENTRIES)?;
                let columns: Vec<&String> = row.keys().collect();
                let names: Vec<&String> = binds.keys().collect();
                let body = format!("{} {}", column_list(&columns), values_clause(&names));
                (body, Params::Single(Binds::Named(binds)))
            }
            Shape::ColumnListWithValueList { columns, values } => {
                let row: Row = columns.iter().cloned().zip(values).collect();
                let binds = sanitize_keys(&row, ENTRIES)?;
                let body = format!("{} {}", column_list(&columns), values_clause(&columns));
                (body, Params::Single(Binds::Named(binds)))
            }
            Shape::ColumnListWithBindMap { columns, binds } => {
                let binds = sanitize_keys(&binds, ENTRIES)?;
                let names: Vec<&String> = binds.keys().collect();
                let body = format!("{} {}", column_list(&columns), values_clause(&names));
                (body, Params::Single(Binds::Named(binds)))
            }
            Shape::ColumnListWithRowBatch { columns, rows } => {
                let rows = rows
                    .iter()
                    .map(|row| sanitize_keys(row, ENTRIES).map(Binds::Named))
                    .collect::<Result<Vec<_>>>()?;
                let names: Vec<String> = match rows.first() {
                    Some(Binds::Named(first)) => first.keys().cloned().collect(),
                    _ => Vec::new(),
                };
                let body = format!("{} {}", column_list(&columns), values_clause(&names));
                (body, Params::Batch(rows))
            }
            Shape::RowListBatch { columns, rows } => {
                let rows = rows
                    .iter()
                    .map(|row| sanitize_keys(row, ENTRIES).map(Binds::Named))
                    .collect::<Result<Vec<_>>>()?;
                let body = format!("{} {}", column_list(&columns), values_clause(&columns));
                (body, Params::Batch(rows))
            }
        };

        let (modifier, duplicate) = match (&self.on_conflict, self.verb) {
            (OnConflict::Error, _) => ("", Fragment::default()),
            (OnConflict::Ignore, Verb::Insert) => (" IGNORE", Fragment::default()),
            (OnConflict::Update(update), Verb::Insert) => {
                ("", duplicate_update_clause(update, CONFLICT)?)
            }
            (_, Verb::Replace) => {
                return Err(Error::validation(
                    CONFLICT,
                    "REPLACE takes neither IGNORE nor a duplicate-key update",
                ));
            }
        };

        let params = with_duplicate_binds(params, &duplicate.binds)?;
        let sql = format!(
            "{}{modifier} INTO {table} {body}{}",
            self.verb.as_str(),
            duplicate.sql
        );
        Statement::new(sql, params)
    }
}

/// Merge the duplicate-update binds after the insert's own, once per row for
/// batches.
fn with_duplicate_binds(params: Params, extra: &BindMap) -> Result<Params> {
    if extra.is_empty() {
        return Ok(params);
    }
    let merge = |binds: Binds| match binds {
        Binds::Named(map) => merge_binds(map, extra).map(Binds::Named),
        Binds::Positional(_) => Err(Error::validation(
            CONFLICT,
            "a duplicate-key update mapping cannot be combined with positional values",
        )),
    };
    match params {
        Params::None => Ok(Params::Single(Binds::Named(extra.clone()))),
        Params::Single(binds) => merge(binds).map(Params::Single),
        Params::Batch(rows) => rows
            .into_iter()
            .map(merge)
            .collect::<Result<Vec<_>>>()
            .map(Params::Batch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{row, Value};

    #[test]
    fn test_insert_from_mapping() {
        let stmt = InsertBuilder::new("persons")
            .entries(row! { "FirstName" => "Jimmy", "LastName" => "Miller" })
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO persons (FirstName, LastName) VALUES (:FirstName, :LastName)"
        );
        assert_eq!(
            stmt.bind_map().unwrap(),
            &row! { "FirstName" => "Jimmy", "LastName" => "Miller" }
        );
    }

    #[test]
    fn test_backticked_columns_keep_quoting_in_column_list() {
        let stmt = InsertBuilder::new("t")
            .entries(row! { "`order`" => 3 })
            .build()
            .unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO t (`order`) VALUES (:order)");
        assert_eq!(stmt.bind_map().unwrap()["order"], Value::I32(3));
    }

    #[test]
    fn test_raw_text_is_passed_through() {
        let stmt = InsertBuilder::new("persons")
            .keys("(FirstName, LastName)")
            .entries("VALUES ('Jimmy', 'Miller')")
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO persons (FirstName, LastName) VALUES ('Jimmy', 'Miller')"
        );
        assert_eq!(stmt.params(), &Params::None);
    }

    #[test]
    fn test_raw_fragment_with_positional_values() {
        let stmt = InsertBuilder::new("persons")
            .keys("(FirstName, LastName) VALUES (?, ?)")
            .entries(vec![Value::from("Jimmy"), Value::from("Miller")])
            .build()
            .unwrap();
        assert!(matches!(stmt.params(), Params::Single(Binds::Positional(v)) if v.len() == 2));
    }

    #[test]
    fn test_column_list_with_values() {
        let stmt = InsertBuilder::new("persons")
            .keys(["FirstName", "LastName"])
            .entries(vec![Value::from("Jimmy"), Value::from("Miller")])
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO persons (FirstName, LastName) VALUES (:FirstName, :LastName)"
        );
        assert_eq!(stmt.bind_map().unwrap()["LastName"], Value::from("Miller"));
    }

    #[test]
    fn test_column_list_with_bind_map() {
        let stmt = InsertBuilder::new("persons")
            .keys(["FirstName", "LastName"])
            .entries(row! { ":col1" => "Jimmy", "col2" => "Miller" })
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO persons (FirstName, LastName) VALUES (:col1, :col2)"
        );
    }

    #[test]
    fn test_batch_uses_first_row_keys_for_placeholders() {
        let stmt = InsertBuilder::new("persons")
            .keys(["FirstName", "LastName"])
            .entries(vec![
                row! { "FirstName" => "Jimmy", "LastName" => "Miller" },
                row! { "FirstName" => "Susan", "LastName" => "Mullingham" },
            ])
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO persons (FirstName, LastName) VALUES (:FirstName, :LastName)"
        );
        match stmt.params() {
            Params::Batch(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected a batch, got {other:?}"),
        }
    }

    #[test]
    fn test_ignore_and_replace() {
        let sql = InsertBuilder::new("t")
            .entries(row! { "ID" => 1 })
            .ignore()
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT IGNORE INTO t (ID) VALUES (:ID)");

        let sql = InsertBuilder::replace("t")
            .entries(row! { "ID" => 1 })
            .to_sql()
            .unwrap();
        assert_eq!(sql, "REPLACE INTO t (ID) VALUES (:ID)");

        let err = InsertBuilder::replace("t")
            .entries(row! { "ID" => 1 })
            .ignore()
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation { position: CONFLICT, .. }));
    }

    #[test]
    fn test_duplicate_update_mapping_binds() {
        let stmt = InsertBuilder::new("scores")
            .entries(row! { "ID" => 7, "LuckyPoints" => 10 })
            .on_duplicate_update(row! { "LuckyPoints" => 11 })
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO scores (ID, LuckyPoints) VALUES (:ID, :LuckyPoints) \
             ON DUPLICATE KEY UPDATE LuckyPoints = :duplupd_LuckyPoints"
        );
        let binds = stmt.bind_map().unwrap();
        assert_eq!(binds["LuckyPoints"], Value::I32(10));
        assert_eq!(binds["duplupd_LuckyPoints"], Value::I32(11));
        assert_eq!(binds.keys().last().unwrap(), "duplupd_LuckyPoints");
    }

    #[test]
    fn test_duplicate_update_binds_every_batch_row() {
        let stmt = InsertBuilder::new("scores")
            .entries(vec![row! { "ID" => 1 }, row! { "ID" => 2 }])
            .on_duplicate_update(row! { "Seen" => true })
            .build()
            .unwrap();
        match stmt.params() {
            Params::Batch(rows) => {
                for binds in rows {
                    match binds {
                        Binds::Named(map) => assert_eq!(map["duplupd_Seen"], Value::Bool(true)),
                        other => panic!("unexpected binds {other:?}"),
                    }
                }
            }
            other => panic!("expected a batch, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_duplicate_update() {
        let sql = InsertBuilder::new("scores")
            .entries(row! { "ID" => 7 })
            .on_duplicate_update("LuckyPoints = LuckyPoints + 1")
            .to_sql()
            .unwrap();
        assert!(sql.ends_with(" ON DUPLICATE KEY UPDATE LuckyPoints = LuckyPoints + 1"));
    }

    #[test]
    fn test_duplicate_mapping_with_positional_values_is_rejected() {
        let err = InsertBuilder::new("t")
            .keys("(a) VALUES (?)")
            .entries(vec![Value::from(1)])
            .on_duplicate_update(row! { "a" => 2 })
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation { position: CONFLICT, .. }));
    }

    #[test]
    fn test_empty_table_and_keys() {
        assert!(matches!(
            InsertBuilder::new(" ").entries(row! { "a" => 1 }).build().unwrap_err(),
            Error::EmptyInput { position: 1 }
        ));
        assert!(matches!(
            InsertBuilder::new("t").build().unwrap_err(),
            Error::EmptyInput { position: 2 }
        ));
    }

    #[test]
    fn test_column_list_rejects_mismatched_bind_count() {
        let err = InsertBuilder::new("t")
            .keys(["a", "b"])
            .entries(row! { "x" => 1, "y" => 2, "z" => 3 })
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation { position: 3, .. }));

        let err = InsertBuilder::new("t")
            .keys(["a", "b"])
            .entries(vec![row! { "x" => 1 }])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation { position: 3, .. }));
    }
}
