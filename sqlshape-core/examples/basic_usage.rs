use sqlshape_core::{delete, insert, row, select, update, Joiner, QueryBuilder, Value};

fn main() {
    // INSERT from a mapping
    let person = insert("persons").entries(row! { "FirstName" => "Jimmy", "LastName" => "Miller" });
    let statement = person.build().unwrap();
    println!("INSERT SQL: {}", statement.sql());
    println!("   Binds: {:?}", statement.bind_map());

    // INSERT from a column list and a batch of value lists
    let batch = insert("persons")
        .keys(["FirstName", "LastName"])
        .entries(vec![
            vec![Value::from("Jimmy"), Value::from("Miller")],
            vec![Value::from("Susan"), Value::from("Mullingham")],
        ])
        .build()
        .unwrap();
    println!("BATCH SQL: {} ({} rows)", batch.sql(), match batch.params() {
        sqlshape_core::Params::Batch(rows) => rows.len(),
        _ => 1,
    });

    // INSERT ... ON DUPLICATE KEY UPDATE
    let upsert = insert("scores")
        .entries(row! { "ID" => 7, "LuckyPoints" => 10 })
        .on_duplicate_update(row! { "LuckyPoints" => 11 });
    println!("UPSERT SQL: {}", upsert.to_sql().unwrap());

    // UPDATE with a NULL check in the condition
    let deactivate = update("persons")
        .set(row! { "Active" => false })
        .where_(row! { "DeletedAt" => (), "City" => "Oslo" })
        .joiner(Joiner::Or);
    println!("UPDATE SQL: {}", deactivate.to_sql().unwrap());

    // SELECT with a raw condition and its own binds
    let lookup = select("persons")
        .columns(["FirstName", "LastName"])
        .where_("LastName LIKE :pattern")
        .binds(row! { "pattern" => "Mil%" })
        .tail("ORDER BY FirstName");
    println!("SELECT SQL: {}", lookup.to_sql().unwrap());

    // DELETE, DROP and TRUNCATE
    println!("DELETE SQL: {}", delete("persons").where_(row! { "ID" => 1 }).to_sql().unwrap());
    println!("DROP SQL: {}", delete("persons").where_("TABLE").to_sql().unwrap());
    println!("TRUNCATE SQL: {}", delete("persons").where_("ALL").to_sql().unwrap());
}
