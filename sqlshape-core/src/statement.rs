//! Assembled statements and their bind parameters

use crate::placeholder::Prepared;
use crate::{BindMap, Result, Value};

/// Values for one execution of a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Binds {
    /// Values keyed by placeholder name
    Named(BindMap),
    /// Values for `?` markers, in order
    Positional(Vec<Value>),
}

impl Binds {
    pub fn len(&self) -> usize {
        match self {
            Binds::Named(map) => map.len(),
            Binds::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Binds {
    fn default() -> Self {
        Binds::Named(BindMap::new())
    }
}

impl From<BindMap> for Binds {
    fn from(map: BindMap) -> Self {
        Binds::Named(map)
    }
}

impl From<Vec<Value>> for Binds {
    fn from(values: Vec<Value>) -> Self {
        Binds::Positional(values)
    }
}

/// How a statement is executed
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// No parameters: run as plain text
    None,
    /// One prepared execution
    Single(Binds),
    /// One prepared execution per entry, inside a transaction
    Batch(Vec<Binds>),
}

/// A finished statement: SQL text plus how to bind it
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    prepared: Prepared,
    params: Params,
}

impl Statement {
    /// Create a statement, collapsing an empty single bind set to [`Params::None`].
    ///
    /// Every bind set is checked against the statement's placeholders here, so
    /// a mismatch surfaces before anything reaches the driver.
    pub fn new(sql: impl Into<String>, params: Params) -> Result<Self> {
        let prepared = Prepared::parse(sql)?;
        let params = match params {
            Params::Single(binds) if binds.is_empty() => Params::None,
            other => other,
        };
        match &params {
            Params::None => {
                prepared.arrange(&Binds::default())?;
            }
            Params::Single(binds) => {
                prepared.arrange(binds)?;
            }
            Params::Batch(rows) => {
                for binds in rows {
                    prepared.arrange(binds)?;
                }
            }
        }
        Ok(Self { prepared, params })
    }

    /// A statement executed as plain text
    pub fn raw(sql: impl Into<String>) -> Result<Self> {
        Self::new(sql, Params::None)
    }

    pub fn sql(&self) -> &str {
        self.prepared.sql()
    }

    pub fn prepared(&self) -> &Prepared {
        &self.prepared
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The single bind map, if this statement has exactly one
    pub fn bind_map(&self) -> Option<&BindMap> {
        match &self.params {
            Params::Single(Binds::Named(map)) => Some(map),
            _ => None,
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self.params, Params::Batch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[test]
    fn test_empty_binds_collapse_to_text() {
        let stmt = Statement::new("SELECT 1", Params::Single(Binds::default())).unwrap();
        assert_eq!(stmt.params(), &Params::None);
    }

    #[test]
    fn test_bind_map_accessor() {
        let stmt = Statement::new(
            "SELECT * FROM t WHERE ID = :where_ID",
            Params::Single(row! { "where_ID" => 1 }.into()),
        )
        .unwrap();
        assert_eq!(stmt.bind_map().unwrap()["where_ID"], Value::I32(1));
        assert_eq!(stmt.prepared().positional_sql(), "SELECT * FROM t WHERE ID = ?");
        assert!(!stmt.is_batch());
    }

    #[test]
    fn test_unbound_placeholder_is_rejected() {
        let err = Statement::raw("DELETE FROM t WHERE ID = :id").unwrap_err();
        assert!(matches!(err, crate::Error::MissingBind { ref name } if name == "id"));
    }

    #[test]
    fn test_batch_rows_are_checked() {
        let err = Statement::new(
            "INSERT INTO t (a) VALUES (:a)",
            Params::Batch(vec![row! { "a" => 1 }.into(), row! { "b" => 2 }.into()]),
        )
        .unwrap_err();
        assert!(matches!(err, crate::Error::MissingBind { .. }));
    }

    #[test]
    fn test_empty_batch_is_kept() {
        let stmt = Statement::new("INSERT INTO t (a) VALUES (:a)", Params::Batch(vec![])).unwrap();
        assert!(stmt.is_batch());
    }
}
