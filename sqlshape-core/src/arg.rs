//! Loosely-typed call arguments
//!
//! The public operations accept "whatever the caller has at hand" for their
//! column, entry and condition arguments. [`Arg`] captures those inputs
//! without interpreting them; the normalizer in [`crate::builder::shape`]
//! decides what they mean.

use crate::{Row, Value};

/// A caller-supplied argument before normalization
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Arg {
    /// Nothing supplied (or a blank string)
    #[default]
    Empty,
    /// A raw SQL fragment, already trimmed
    Text(String),
    /// A key/value mapping
    Map(Row),
    /// A flat sequence of scalars (column names or values)
    List(Vec<Value>),
    /// A sequence of mappings
    Rows(Vec<Row>),
    /// A sequence of positional value lists
    Lists(Vec<Vec<Value>>),
}

impl Arg {
    /// Build a text argument; blank input collapses to [`Arg::Empty`]
    pub fn text(sql: impl AsRef<str>) -> Self {
        let trimmed = sql.as_ref().trim();
        if trimmed.is_empty() {
            Arg::Empty
        } else {
            Arg::Text(trimmed.to_string())
        }
    }

    /// Build a list of column names
    pub fn columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arg::List(names.into_iter().map(|n| Value::String(n.into())).collect())
    }

    /// True for [`Arg::Empty`] and for empty collections
    pub fn is_empty(&self) -> bool {
        match self {
            Arg::Empty => true,
            Arg::Text(s) => s.is_empty(),
            Arg::Map(m) => m.is_empty(),
            Arg::List(l) => l.is_empty(),
            Arg::Rows(r) => r.is_empty(),
            Arg::Lists(l) => l.is_empty(),
        }
    }

    /// Short description used in validation messages
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Empty => "nothing",
            Arg::Text(_) => "a SQL string",
            Arg::Map(_) => "a mapping",
            Arg::List(_) => "a list of values",
            Arg::Rows(_) => "a list of mappings",
            Arg::Lists(_) => "a list of lists",
        }
    }
}

impl From<()> for Arg {
    fn from(_: ()) -> Self {
        Arg::Empty
    }
}

impl From<&str> for Arg {
    fn from(val: &str) -> Self {
        Arg::text(val)
    }
}

impl From<String> for Arg {
    fn from(val: String) -> Self {
        Arg::text(val)
    }
}

impl From<Row> for Arg {
    fn from(val: Row) -> Self {
        Arg::Map(val)
    }
}

impl From<Vec<Value>> for Arg {
    fn from(val: Vec<Value>) -> Self {
        Arg::List(val)
    }
}

impl From<Vec<&str>> for Arg {
    fn from(val: Vec<&str>) -> Self {
        Arg::List(val.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<String>> for Arg {
    fn from(val: Vec<String>) -> Self {
        Arg::List(val.into_iter().map(Value::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Arg {
    fn from(val: [&str; N]) -> Self {
        Arg::List(val.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<Row>> for Arg {
    fn from(val: Vec<Row>) -> Self {
        Arg::Rows(val)
    }
}

impl From<Vec<Vec<Value>>> for Arg {
    fn from(val: Vec<Vec<Value>>) -> Self {
        Arg::Lists(val)
    }
}

impl<T> From<Option<T>> for Arg
where
    T: Into<Arg>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Arg::Empty, Into::into)
    }
}
