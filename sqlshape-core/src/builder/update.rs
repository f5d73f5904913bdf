//! UPDATE statement builder

use super::common::{
    column_names, merge_binds, set_clause, where_fragment, BindSpec, Fragment, Joiner,
    QueryBuilder,
};
use crate::statement::{Binds, Params};
use crate::{Arg, Error, Result, Row, Statement};

const SET: u8 = 2;
const WHERE: u8 = 3;

/// UPDATE statement builder
///
/// # Examples
/// ```
/// use sqlshape_core::{row, update, QueryBuilder};
///
/// let sql = update("persons")
///     .set(row! { "LastName" => "Mullingham" })
///     .where_(row! { "ID" => 1 })
///     .to_sql()
///     .unwrap();
/// assert_eq!(sql, "UPDATE persons SET LastName = :LastName WHERE ID = :where_ID");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBuilder {
    table: String,
    set: Arg,
    values: Arg,
    condition: Arg,
    bind_spec: BindSpec,
    tail: Option<String>,
    ignore: bool,
}

impl UpdateBuilder {
    /// Create a new UPDATE builder
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            set: Arg::Empty,
            values: Arg::Empty,
            condition: Arg::Empty,
            bind_spec: BindSpec::default(),
            tail: None,
            ignore: false,
        }
    }

    /// Columns to set: a mapping, a column list (see [`values`](Self::values))
    /// or a raw SET fragment
    pub fn set(mut self, set: impl Into<Arg>) -> Self {
        self.set = set.into();
        self
    }

    /// Values for a column list given to [`set`](Self::set), in the same order
    pub fn values(mut self, values: impl Into<Arg>) -> Self {
        self.values = values.into();
        self
    }

    /// WHERE condition: a raw SQL string or a column mapping
    pub fn where_(mut self, condition: impl Into<Arg>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Extra binds for raw fragments, or the joiner for a mapping condition
    pub fn binds(mut self, spec: impl Into<BindSpec>) -> Self {
        self.bind_spec = spec.into();
        self
    }

    pub fn joiner(mut self, joiner: Joiner) -> Self {
        self.bind_spec.joiner = joiner;
        self
    }

    /// Raw SQL appended after the WHERE clause, e.g. `LIMIT 10`
    pub fn tail(mut self, tail: impl AsRef<str>) -> Self {
        let tail = tail.as_ref().trim();
        self.tail = (!tail.is_empty()).then(|| tail.to_string());
        self
    }

    /// `UPDATE IGNORE`
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    fn set_fragment(&self) -> Result<Fragment> {
        match (&self.set, &self.values) {
            (Arg::Map(row), Arg::Empty) if !row.is_empty() => set_clause(row),
            (Arg::Text(sql), Arg::Empty) => Ok(Fragment::text(sql.clone())),
            (Arg::List(_), Arg::List(values)) => {
                let columns = column_names(&self.set, SET)?;
                if columns.is_empty() {
                    return Err(Error::empty_input(SET));
                }
                if columns.len() != values.len() {
                    return Err(Error::validation(
                        SET,
                        format!("{} columns but {} values", columns.len(), values.len()),
                    ));
                }
                let row: Row = columns.into_iter().zip(values.iter().cloned()).collect();
                set_clause(&row)
            }
            (Arg::Empty, _) | (Arg::Map(_), Arg::Empty) => Err(Error::empty_input(SET)),
            (Arg::List(_), _) => Err(Error::validation(
                SET,
                "a column list needs a list of values of the same length",
            )),
            (set, _) => Err(Error::validation(
                SET,
                format!("expected a mapping, a column list with values, or a SQL string, got {}", set.kind()),
            )),
        }
    }
}

impl QueryBuilder for UpdateBuilder {
    fn build(&self) -> Result<Statement> {
        let table = self.table.trim();
        if table.is_empty() {
            return Err(Error::empty_input(1));
        }

        let set = self.set_fragment()?;
        let filter = where_fragment(&self.condition, &self.bind_spec, WHERE)?;
        let binds = merge_binds(set.binds, &filter.binds)?;

        let mut sql = String::from("UPDATE ");
        if self.ignore {
            sql.push_str("IGNORE ");
        }
        sql.push_str(table);
        sql.push_str(" SET ");
        sql.push_str(&set.sql);
        if !filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.sql);
        }
        if let Some(tail) = &self.tail {
            sql.push(' ');
            sql.push_str(tail);
        }

        Statement::new(sql, Params::Single(Binds::Named(binds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{row, Value};

    #[test]
    fn test_update_with_mapping_condition() {
        let stmt = UpdateBuilder::new("persons")
            .set(row! { "Name" => "Jane", "Age" => 25 })
            .where_(row! { "ID" => 1 })
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE persons SET Name = :Name, Age = :Age WHERE ID = :where_ID"
        );
        assert_eq!(
            stmt.bind_map().unwrap(),
            &row! { "Name" => "Jane", "Age" => 25, "where_ID" => 1 }
        );
    }

    #[test]
    fn test_same_column_in_set_and_where() {
        let stmt = UpdateBuilder::new("persons")
            .set(row! { "ID" => 2 })
            .where_(row! { "ID" => 1 })
            .build()
            .unwrap();
        let binds = stmt.bind_map().unwrap();
        assert_eq!(binds["ID"], Value::I32(2));
        assert_eq!(binds["where_ID"], Value::I32(1));
    }

    #[test]
    fn test_null_condition() {
        let stmt = UpdateBuilder::new("persons")
            .set(row! { "Active" => false })
            .where_(row! { "DeletedAt" => (), "City" => "Oslo" })
            .binds("OR")
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE persons SET Active = :Active WHERE DeletedAt IS NULL OR City = :where_City"
        );
        assert!(!stmt.bind_map().unwrap().contains_key("where_DeletedAt"));
    }

    #[test]
    fn test_column_list_with_values() {
        let sql = UpdateBuilder::new("persons")
            .set(["FirstName", "LastName"])
            .values(vec![Value::from("Jimmy"), Value::from("Miller")])
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE persons SET FirstName = :FirstName, LastName = :LastName"
        );

        let err = UpdateBuilder::new("persons")
            .set(["FirstName", "LastName"])
            .values(vec![Value::from("Jimmy")])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation { position: 2, .. }));
    }

    #[test]
    fn test_raw_set_and_condition_with_binds() {
        let stmt = UpdateBuilder::new("scores")
            .set("LuckyPoints = LuckyPoints + :step")
            .where_("ID = :id")
            .binds(row! { "step" => 1, "id" => 7 })
            .tail("LIMIT 1")
            .ignore()
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE IGNORE scores SET LuckyPoints = LuckyPoints + :step WHERE ID = :id LIMIT 1"
        );
        assert_eq!(stmt.bind_map().unwrap().len(), 2);
    }

    #[test]
    fn test_raw_text_without_binds_runs_unbound() {
        let stmt = UpdateBuilder::new("t")
            .set("a = a + 1")
            .where_("b > 3")
            .build()
            .unwrap();
        assert_eq!(stmt.params(), &Params::None);
    }

    #[test]
    fn test_collision_between_set_and_extra_binds() {
        let err = UpdateBuilder::new("t")
            .set(row! { "a" => 1 })
            .where_("b = :a")
            .binds(row! { "a" => 2 })
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::PlaceholderCollision { ref name } if name == "a"));
    }

    #[test]
    fn test_empty_set() {
        let err = UpdateBuilder::new("t").where_(row! { "ID" => 1 }).build().unwrap_err();
        assert!(matches!(err, Error::EmptyInput { position: 2 }));
    }

    #[test]
    fn test_set_mapping_with_backtick_twins_is_rejected() {
        let err = UpdateBuilder::new("t")
            .set(row! { "`a`" => 1, "a" => 2 })
            .where_(row! { "ID" => 1 })
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::PlaceholderCollision { ref name } if name == "a"));
    }
}
