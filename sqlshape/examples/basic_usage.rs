//! Run against a local MySQL server:
//!
//! ```sh
//! SQLSHAPE_DATABASE=test cargo run --example basic_usage --features mysql
//! ```

use futures::TryStreamExt;
use sqlshape::{insert, row, select, update, Db, DbConfig, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let database = std::env::var("SQLSHAPE_DATABASE").unwrap_or_else(|_| "test".to_string());
    let config = DbConfig::new(database)
        .credentials(
            std::env::var("SQLSHAPE_USER").unwrap_or_else(|_| "root".to_string()),
            std::env::var("SQLSHAPE_PASSWORD").unwrap_or_default(),
        )
        .debug(true, 200);

    let mut db = Db::connect(&config).await?;

    db.multi_query(
        "DROP TABLE IF EXISTS persons;
         -- scratch table for this example
         CREATE TABLE persons (
             ID INT AUTO_INCREMENT PRIMARY KEY,
             FirstName VARCHAR(64),
             LastName VARCHAR(64),
             LuckyPoints INT DEFAULT 0
         );",
    )
    .await?;

    db.insert(insert("persons").entries(row! { "FirstName" => "Jimmy", "LastName" => "Miller" }))
        .await?;
    println!("Inserted id {}", db.last_insert_id());

    let affected = db
        .insert(insert("persons").keys(["FirstName", "LastName"]).entries(vec![
            vec![Value::from("Susan"), Value::from("Mullingham")],
            vec![Value::from("Carl"), Value::from("Stone")],
        ]))
        .await?;
    println!("Batch inserted {affected} rows");

    db.update(update("persons").set(row! { "LuckyPoints" => 7 }).where_(row! { "ID" => 1 }))
        .await?;

    let rows = db
        .select(select("persons").columns("FirstName, LastName").where_(row! { "ID" => 1 }))
        .await?;
    println!("Positional: {rows:?}");

    let rows = db
        .select_assoc(select("persons").columns("FirstName, LastName").where_(row! { "ID" => 1 }))
        .await?;
    println!("Keyed: {rows:?}");

    let statement = sqlshape::QueryBuilder::build(&select("persons").tail("ORDER BY ID"))?;
    let mut cursor = db.select_cursor(&statement)?;
    while let Some(record) = cursor.try_next().await? {
        println!("Streamed: {:?}", record.values());
    }
    drop(cursor);

    println!("Tables: {:?}", db.table_list(None).await?);
    db.drop_table("persons").await?;
    Ok(())
}
