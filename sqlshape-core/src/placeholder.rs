//! Placeholder names and named-parameter preparation
//!
//! Column names become placeholder tokens through [`sanitize`]. MySQL's
//! binary protocol only understands `?` markers, so [`Prepared::parse`]
//! rewrites `:name` placeholders once per statement and [`Prepared::arrange`]
//! lines up a bind map with the marker order for each execution.

use crate::statement::Binds;
use crate::{Error, Result, Value};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Prefix for placeholders contributed by a WHERE mapping
pub const WHERE_PREFIX: &str = "where_";

/// Prefix for placeholders contributed by an ON DUPLICATE KEY UPDATE mapping
pub const DUPLICATE_PREFIX: &str = "duplupd_";

/// Quoted literals, quoted identifiers and comments are matched first so that
/// markers inside them are skipped.
static TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"'(?:[^'\\]|\\.|'')*'|"(?:[^"\\]|\\.|"")*"|`[^`]*`|--[^\n]*|#[^\n]*|/\*(?s:.*?)\*/|:([A-Za-z_][A-Za-z0-9_]*)|\?"#,
    )
    .expect("placeholder pattern is valid")
});

/// Turn a column name into a placeholder token by removing backticks.
pub fn sanitize(name: &str) -> String {
    name.replace('`', "")
}

/// Sanitized placeholder name with a clause prefix, e.g. `where_ID`.
pub fn prefixed(prefix: &str, name: &str) -> String {
    format!("{prefix}{}", sanitize(name))
}

fn bind_key(key: &str) -> &str {
    key.strip_prefix(':').unwrap_or(key)
}

/// Markers found in a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markers {
    None,
    /// `:name` placeholders in order of appearance (repeats included)
    Named(Vec<String>),
    /// Number of `?` markers
    Positional(usize),
}

/// A statement parsed for placeholders, ready to be handed to a driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    sql: String,
    positional_sql: String,
    markers: Markers,
}

impl Prepared {
    /// Parse `sql`, rewriting named placeholders to `?`.
    pub fn parse(sql: impl Into<String>) -> Result<Self> {
        let sql = sql.into();
        let mut positional_sql = String::with_capacity(sql.len());
        let mut names = Vec::new();
        let mut question_marks = 0usize;
        let mut last = 0;

        for caps in TOKENS.captures_iter(&sql) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if let Some(name) = caps.get(1) {
                positional_sql.push_str(&sql[last..whole.start()]);
                positional_sql.push('?');
                last = whole.end();
                names.push(name.as_str().to_string());
            } else if whole.as_str() == "?" {
                question_marks += 1;
            }
        }
        positional_sql.push_str(&sql[last..]);

        let markers = match (names.is_empty(), question_marks) {
            (true, 0) => Markers::None,
            (true, n) => Markers::Positional(n),
            (false, 0) => Markers::Named(names),
            (false, _) => return Err(Error::MixedPlaceholders),
        };

        Ok(Self {
            sql,
            positional_sql,
            markers,
        })
    }

    /// The statement as written
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The statement with every placeholder replaced by `?`
    pub fn positional_sql(&self) -> &str {
        &self.positional_sql
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Order `binds` to match the statement's markers.
    pub fn arrange(&self, binds: &Binds) -> Result<Vec<Value>> {
        match (&self.markers, binds) {
            (Markers::Named(names), Binds::Named(map)) => {
                let mut used = HashSet::with_capacity(map.len());
                let mut ordered = Vec::with_capacity(names.len());
                for name in names {
                    let value = map
                        .iter()
                        .find(|(k, _)| bind_key(k) == name)
                        .map(|(_, v)| v.clone())
                        .ok_or_else(|| Error::MissingBind { name: name.clone() })?;
                    used.insert(name.as_str());
                    ordered.push(value);
                }
                if let Some(unused) = map.keys().find(|k| !used.contains(bind_key(k))) {
                    return Err(Error::UnusedBind {
                        name: bind_key(unused).to_string(),
                    });
                }
                Ok(ordered)
            }
            (Markers::Named(names), Binds::Positional(_)) => Err(Error::MissingBind {
                name: names[0].clone(),
            }),
            (Markers::Positional(expected), Binds::Positional(values)) => {
                if *expected != values.len() {
                    return Err(Error::BindCount {
                        expected: *expected,
                        found: values.len(),
                    });
                }
                Ok(values.clone())
            }
            (Markers::Positional(expected), Binds::Named(map)) => Err(Error::BindCount {
                expected: *expected,
                found: map.len(),
            }),
            (Markers::None, Binds::Named(map)) => match map.keys().next() {
                Some(key) => Err(Error::UnusedBind {
                    name: bind_key(key).to_string(),
                }),
                None => Ok(Vec::new()),
            },
            (Markers::None, Binds::Positional(values)) if values.is_empty() => Ok(Vec::new()),
            (Markers::None, Binds::Positional(values)) => Err(Error::BindCount {
                expected: 0,
                found: values.len(),
            }),
        }
    }
}
