//! Common types and clause assemblers shared across all statement builders

use crate::placeholder::{prefixed, sanitize, DUPLICATE_PREFIX, WHERE_PREFIX};
use crate::{Arg, BindMap, Error, Result, Row, Statement, Value};

/// Core trait for all statement builders
pub trait QueryBuilder {
    /// Assemble the statement and its parameters
    fn build(&self) -> Result<Statement>;

    /// Generate the SQL query string
    fn to_sql(&self) -> Result<String> {
        Ok(self.build()?.sql().to_string())
    }
}

/// How WHERE comparisons built from a mapping are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Joiner {
    #[default]
    And,
    Or,
}

impl Joiner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Joiner::And => "AND",
            Joiner::Or => "OR",
        }
    }

    /// `"OR"` in any case or padding selects [`Joiner::Or`]; anything else is AND.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("or") {
            Joiner::Or
        } else {
            Joiner::And
        }
    }
}

impl std::fmt::Display for Joiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra input for a WHERE clause: values for a raw condition's own
/// placeholders, and/or the joiner for a mapping condition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BindSpec {
    pub binds: BindMap,
    pub joiner: Joiner,
}

impl From<BindMap> for BindSpec {
    fn from(binds: BindMap) -> Self {
        Self {
            binds,
            joiner: Joiner::And,
        }
    }
}

impl From<Joiner> for BindSpec {
    fn from(joiner: Joiner) -> Self {
        Self {
            binds: BindMap::new(),
            joiner,
        }
    }
}

impl From<&str> for BindSpec {
    fn from(joiner: &str) -> Self {
        Joiner::parse(joiner).into()
    }
}

impl From<()> for BindSpec {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

/// A piece of SQL together with the binds it contributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub sql: String,
    pub binds: BindMap,
}

impl Fragment {
    /// A fragment with no binds
    pub fn text(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            binds: BindMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Disjoint union of two bind maps; a shared name is an error.
pub fn merge_binds(mut base: BindMap, extra: &BindMap) -> Result<BindMap> {
    for (name, value) in extra {
        if base.contains_key(name) {
            return Err(Error::collision(name.clone()));
        }
        base.insert(name.clone(), value.clone());
    }
    Ok(base)
}

/// `(c1, c2, …)`
pub fn column_list<S: AsRef<str>>(columns: &[S]) -> String {
    let names: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
    format!("({})", names.join(", "))
}

/// `VALUES (:c1, :c2, …)`
pub fn values_clause<S: AsRef<str>>(names: &[S]) -> String {
    let placeholders: Vec<String> = names
        .iter()
        .map(|n| format!(":{}", sanitize(n.as_ref())))
        .collect();
    format!("VALUES ({})", placeholders.join(", "))
}

/// Insert one bind; a name already taken within the fragment is an error.
fn bind_once(binds: &mut BindMap, name: String, value: &Value) -> Result<()> {
    if binds.contains_key(&name) {
        return Err(Error::collision(name));
    }
    binds.insert(name, value.clone());
    Ok(())
}

/// `c1 = :c1, c2 = :c2` for a mapping.
pub fn set_clause(row: &Row) -> Result<Fragment> {
    let mut binds = BindMap::with_capacity(row.len());
    let mut parts = Vec::with_capacity(row.len());
    for (column, value) in row {
        let name = sanitize(column);
        parts.push(format!("{column} = :{name}"));
        bind_once(&mut binds, name, value)?;
    }
    Ok(Fragment {
        sql: parts.join(", "),
        binds,
    })
}

/// WHERE comparisons for a mapping. `NULL` values become `IS NULL` and bind
/// nothing; everything else binds a `where_`-prefixed placeholder.
pub fn where_clause(row: &Row, joiner: Joiner) -> Result<Fragment> {
    let mut binds = BindMap::new();
    let mut parts = Vec::with_capacity(row.len());
    for (column, value) in row {
        if value.is_null() {
            parts.push(format!("{column} IS NULL"));
        } else {
            let name = prefixed(WHERE_PREFIX, column);
            parts.push(format!("{column} = :{name}"));
            bind_once(&mut binds, name, value)?;
        }
    }
    Ok(Fragment {
        sql: parts.join(&format!(" {joiner} ")),
        binds,
    })
}

/// Resolve a WHERE argument into a fragment (without the `WHERE` keyword).
///
/// A raw condition keeps its text and takes `spec.binds` as-is; a mapping is
/// assembled with `spec.joiner` and the extra binds are merged after it.
pub fn where_fragment(arg: &Arg, spec: &BindSpec, position: u8) -> Result<Fragment> {
    let fragment = match arg {
        Arg::Empty => Fragment::default(),
        Arg::Text(sql) => Fragment::text(sql.clone()),
        Arg::Map(row) => where_clause(row, spec.joiner)?,
        other => {
            return Err(Error::validation(
                position,
                format!("condition must be a SQL string or a mapping, got {}", other.kind()),
            ));
        }
    };
    let binds = merge_binds(fragment.binds, &spec.binds)?;
    Ok(Fragment {
        sql: fragment.sql,
        binds,
    })
}

/// What an insert does when it hits a unique-key collision
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OnConflict {
    /// Let the driver report the error
    #[default]
    Error,
    /// `INSERT IGNORE`
    Ignore,
    /// `ON DUPLICATE KEY UPDATE` with a raw tail or a column mapping
    Update(Arg),
}

/// ` ON DUPLICATE KEY UPDATE …`, with the binds kept apart so they can be
/// merged after the insert's own values.
pub fn duplicate_update_clause(update: &Arg, position: u8) -> Result<Fragment> {
    match update {
        Arg::Text(sql) => Ok(Fragment::text(format!(" ON DUPLICATE KEY UPDATE {sql}"))),
        Arg::Map(row) if !row.is_empty() => {
            let mut binds = BindMap::with_capacity(row.len());
            let mut parts = Vec::with_capacity(row.len());
            for (column, value) in row {
                let name = prefixed(DUPLICATE_PREFIX, column);
                parts.push(format!("{column} = :{name}"));
                bind_once(&mut binds, name, value)?;
            }
            Ok(Fragment {
                sql: format!(" ON DUPLICATE KEY UPDATE {}", parts.join(", ")),
                binds,
            })
        }
        Arg::Empty | Arg::Map(_) => Err(Error::empty_input(position)),
        other => Err(Error::validation(
            position,
            format!("duplicate-key update must be a SQL string or a mapping, got {}", other.kind()),
        )),
    }
}

/// Column names from a list argument; every entry must be a string.
pub fn column_names(arg: &Arg, position: u8) -> Result<Vec<String>> {
    match arg {
        Arg::List(values) => values
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    Error::validation(position, format!("column name must be a string, got {v:?}"))
                })
            })
            .collect(),
        Arg::Map(_) => Err(Error::validation(
            position,
            "columns must be a plain list, not a mapping",
        )),
        other => Err(Error::validation(
            position,
            format!("columns must be a list of names, got {}", other.kind()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[test]
    fn test_column_list_and_values() {
        assert_eq!(column_list(&["FirstName", "LastName"]), "(FirstName, LastName)");
        assert_eq!(
            values_clause(&["`FirstName`", "LastName"]),
            "VALUES (:FirstName, :LastName)"
        );
    }

    #[test]
    fn test_set_clause() {
        let f = set_clause(&row! { "`Name`" => "Jane", "Age" => 25 }).unwrap();
        assert_eq!(f.sql, "`Name` = :Name, Age = :Age");
        assert_eq!(f.binds, row! { "Name" => "Jane", "Age" => 25 });
    }

    #[test]
    fn test_where_clause_null_binds_nothing() {
        let f = where_clause(&row! { "ID" => 1, "City" => () }, Joiner::And).unwrap();
        assert_eq!(f.sql, "ID = :where_ID AND City IS NULL");
        assert_eq!(f.binds.len(), 1);
        assert!(!f.binds.contains_key("where_City"));
    }

    #[test]
    fn test_where_clause_or() {
        let f = where_clause(&row! { "a" => 1, "b" => 2 }, Joiner::parse(" or ")).unwrap();
        assert_eq!(f.sql, "a = :where_a OR b = :where_b");
    }

    #[test]
    fn test_where_fragment_raw_with_binds() {
        let spec = BindSpec::from(row! { "since" => "2024-01-01" });
        let f = where_fragment(&Arg::from("created >= :since"), &spec, 3).unwrap();
        assert_eq!(f.sql, "created >= :since");
        assert_eq!(f.binds["since"], Value::from("2024-01-01"));
    }

    #[test]
    fn test_where_fragment_rejects_lists() {
        let err = where_fragment(&Arg::from(vec!["a"]), &BindSpec::default(), 3).unwrap_err();
        assert!(matches!(err, Error::Validation { position: 3, .. }));
    }

    #[test]
    fn test_set_and_where_never_collide() {
        let set = set_clause(&row! { "ID" => 2, "Name" => "x" }).unwrap();
        let filter = where_clause(&row! { "ID" => 1, "Name" => "y" }, Joiner::And).unwrap();
        let merged = merge_binds(set.binds, &filter.binds).unwrap();
        assert_eq!(merged.len(), 4);
        assert_eq!(merged["ID"], Value::I32(2));
        assert_eq!(merged["where_ID"], Value::I32(1));
    }

    #[test]
    fn test_merge_reports_collision() {
        let err = merge_binds(row! { "where_ID" => 1 }, &row! { "where_ID" => 2 }).unwrap_err();
        assert!(matches!(err, Error::PlaceholderCollision { ref name } if name == "where_ID"));
    }

    #[test]
    fn test_duplicate_update_mapping() {
        let f = duplicate_update_clause(&Arg::from(row! { "LuckyPoints" => 11 }), 4).unwrap();
        assert_eq!(f.sql, " ON DUPLICATE KEY UPDATE LuckyPoints = :duplupd_LuckyPoints");
        assert_eq!(f.binds["duplupd_LuckyPoints"], Value::I32(11));
    }

    #[test]
    fn test_duplicate_update_raw() {
        let f = duplicate_update_clause(&Arg::from("LuckyPoints = LuckyPoints + 1"), 4).unwrap();
        assert_eq!(f.sql, " ON DUPLICATE KEY UPDATE LuckyPoints = LuckyPoints + 1");
        assert!(f.binds.is_empty());
    }

    #[test]
    fn test_column_names_rejects_mapping() {
        let err = column_names(&Arg::from(row! { "a" => "b" }), 2).unwrap_err();
        assert!(matches!(err, Error::Validation { position: 2, .. }));
        let err = column_names(&Arg::List(vec![Value::I32(1)]), 2).unwrap_err();
        assert!(matches!(err, Error::Validation { position: 2, .. }));
    }

    #[test]
    fn test_set_clause_rejects_backtick_twins() {
        let err = set_clause(&row! { "`a`" => 1, "a" => 2 }).unwrap_err();
        assert!(matches!(err, Error::PlaceholderCollision { ref name } if name == "a"));
    }

    #[test]
    fn test_where_clause_rejects_backtick_twins() {
        let err = where_clause(&row! { "`ID`" => 1, "ID" => 2 }, Joiner::And).unwrap_err();
        assert!(matches!(err, Error::PlaceholderCollision { ref name } if name == "where_ID"));
    }

    #[test]
    fn test_where_clause_null_twins_bind_nothing() {
        let f = where_clause(&row! { "`City`" => (), "City" => () }, Joiner::Or).unwrap();
        assert_eq!(f.sql, "`City` IS NULL OR City IS NULL");
        assert!(f.binds.is_empty());
    }

    #[test]
    fn test_duplicate_update_rejects_backtick_twins() {
        let update = Arg::from(row! { "`LuckyPoints`" => 1, "LuckyPoints" => 2 });
        let err = duplicate_update_clause(&update, 4).unwrap_err();
        assert!(
            matches!(err, Error::PlaceholderCollision { ref name } if name == "duplupd_LuckyPoints")
        );
    }
}
