//! sqlshape core - statement building for MySQL-style SQL
//!
//! This crate turns loosely-shaped arguments (mappings, column lists, row
//! batches or raw SQL fragments) into statements with named bind parameters.
//! Execution lives in the `sqlshape` crate.

pub mod arg;
pub mod builder;
pub mod error;
pub mod placeholder;
pub mod script;
pub mod statement;
pub mod value;

// Re-export main types
pub use arg::Arg;
pub use builder::{
    BindSpec, DeleteBuilder, InsertBuilder, Joiner, OnConflict, QueryBuilder, SelectBuilder,
    Shape, UpdateBuilder,
};
pub use error::{Error, Result};
pub use placeholder::Prepared;
pub use statement::{Binds, Params, Statement};
pub use value::{BindMap, Row, Value};

/// Create an INSERT builder for the given table
pub fn insert(table: impl Into<String>) -> InsertBuilder {
    InsertBuilder::new(table)
}

/// Create a REPLACE builder for the given table
pub fn replace(table: impl Into<String>) -> InsertBuilder {
    InsertBuilder::replace(table)
}

/// Create an UPDATE builder for the given table
pub fn update(table: impl Into<String>) -> UpdateBuilder {
    UpdateBuilder::new(table)
}

/// Create a SELECT builder for the given table
pub fn select(table: impl Into<String>) -> SelectBuilder {
    SelectBuilder::new(table)
}

/// Create a DELETE builder for the given table
pub fn delete(table: impl Into<String>) -> DeleteBuilder {
    DeleteBuilder::new(table)
}
