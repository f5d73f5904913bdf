//! sqlshape - a forgiving MySQL statement layer
//!
//! Statements are built by `sqlshape-core` from whatever argument shape the
//! caller has at hand and executed here through a [`Driver`]. Batches run in
//! a transaction and roll back as a whole.
//!
//! ```no_run
//! # #[cfg(feature = "mysql")]
//! # async fn demo() -> sqlshape::Result<()> {
//! use sqlshape::{insert, row, select, Db, DbConfig};
//!
//! let mut db = Db::connect(&DbConfig::new("shop")).await?;
//! db.insert(insert("persons").entries(row! { "FirstName" => "Jimmy", "LastName" => "Miller" }))
//!     .await?;
//! let rows = db
//!     .select_assoc(select("persons").where_(row! { "LastName" => "Miller" }))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod debug;
pub mod driver;
pub mod executor;
#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use config::{DbConfig, DebugConfig};
pub use db::{Db, ResultMode, Selection};
pub use debug::DebugSink;
pub use driver::{Cursor, Driver, Record};
#[cfg(feature = "mysql")]
pub use mysql::MySqlDriver;

pub use sqlshape_core::builder::{DROP_TABLE, TRUNCATE_ALL};
pub use sqlshape_core::{
    delete, insert, replace, row, select, update, Arg, BindMap, BindSpec, Binds, DeleteBuilder,
    Error, InsertBuilder, Joiner, OnConflict, Params, QueryBuilder, Result, Row, SelectBuilder,
    Statement, UpdateBuilder, Value,
};
