use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use tracing::info;

use crate::error::Result;
use crate::generator::{NewItem, NewUser};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        passwordHash TEXT NOT NULL,
        email TEXT UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        category TEXT,
        type TEXT NOT NULL CHECK (type IN ('lost', 'found')),
        status TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'resolved')),
        location TEXT,
        itemDate DATETIME,
        userId INTEGER NOT NULL,
        FOREIGN KEY (userId) REFERENCES users(id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_items_user ON items(userId)",
];

pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn reset_schema(pool: &SqlitePool) -> Result<()> {
    info!("Dropping existing users and items tables");

    sqlx::query("DROP TABLE IF EXISTS items").execute(pool).await?;
    sqlx::query("DROP TABLE IF EXISTS users").execute(pool).await?;

    Ok(())
}

pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Inserts users with their precomputed hashes and returns the new row ids in
/// input order.
pub async fn insert_users(
    tx: &mut Transaction<'_, Sqlite>,
    users: &[(NewUser, String)],
) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(users.len());

    for (user, password_hash) in users {
        let result = sqlx::query("INSERT INTO users (username, passwordHash, email) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(password_hash)
            .bind(&user.email)
            .execute(&mut **tx)
            .await?;
        ids.push(result.last_insert_rowid());
    }

    Ok(ids)
}

pub async fn insert_items(
    tx: &mut Transaction<'_, Sqlite>,
    items: &[NewItem],
    user_ids: &[i64],
) -> Result<u64> {
    let mut inserted = 0;

    for item in items {
        sqlx::query(
            r#"
            INSERT INTO items (name, description, category, type, status, location, itemDate, userId)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.category)
        .bind(item.item_type.as_str())
        .bind(item.status)
        .bind(&item.location)
        .bind(item.item_date)
        .bind(user_ids[item.owner])
        .execute(&mut **tx)
        .await?;
        inserted += 1;
    }

    Ok(inserted)
}
