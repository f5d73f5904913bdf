//! Statement builders

pub mod common;
pub mod delete;
pub mod insert;
pub mod select;
pub mod shape;
pub mod update;

pub use common::{BindSpec, Fragment, Joiner, OnConflict, QueryBuilder};
pub use delete::{DeleteBuilder, DROP_TABLE, TRUNCATE_ALL};
pub use insert::InsertBuilder;
pub use select::SelectBuilder;
pub use shape::{normalize_insert, Shape};
pub use update::UpdateBuilder;
