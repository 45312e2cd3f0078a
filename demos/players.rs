//! Players example
//!
//! This example walks through the binding layer end to end:
//! - Opening a named in-memory database from properties
//! - Creating a table
//! - Inserting rows with a persistent prepared statement
//! - Listing result columns
//! - Reading typed rows through the execution driver
//!
//! Run with: cargo run --example players

use rust_sql_bridge::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust SQL Bridge - Players Example ===\n");

    let mut db = Connection::new(
        Properties::memory()
            .filename("memdb")
            .create(true),
    );

    println!("1. Connecting to database...");
    db.connect()?;
    println!("   ✓ Connected\n");

    println!("2. Creating table...");
    Statement::new(
        &db,
        "CREATE TABLE players (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            cash REAL NOT NULL DEFAULT 0
        )",
    )?
    .execute()?;
    println!("   ✓ Table created\n");

    println!("3. Inserting players...");
    {
        let mut insert = Statement::persistent(&db, "INSERT INTO players (name, cash) VALUES (?, ?)")?;
        for i in 0..10 {
            insert.bind_many(1, (format!("Player{}", i), i * 1000))?;
            insert.execute()?;
        }
    }
    println!("   ✓ Inserted 10 rows (last id {})\n", db.last_insert_rowid()?);

    {
        let mut fetch = Statement::new(&db, "SELECT * FROM players")?;

        println!("4. Columns:");
        let mut columns: Vec<_> = fetch.columns()?.into_iter().collect();
        columns.sort_by_key(|(_, index)| *index);
        for (name, index) in columns {
            println!("   {} at index {}", name, index);
        }
        println!();

        println!("5. Rows:");
        let rows = fetch.execute_with(|row, _| {
            let (id, name, cash) = row.results::<(i64, String, f64)>(0)?;
            println!(
                "   id = {}, name = {}, cash = {}",
                id.unwrap_or_default(),
                name.unwrap_or_default(),
                cash.unwrap_or_default()
            );
            Ok(())
        })?;
        println!("   ✓ Read {} rows\n", rows);
    }

    db.disconnect();
    println!("=== Example completed successfully ===");

    Ok(())
}
