use campus_seed::{password::verify_password, run, SeedConfig, SeedError};
use sqlx::{Row, SqlitePool};
use tempfile::TempDir;

fn seed_config(dir: &TempDir, name: &str) -> SeedConfig {
    SeedConfig {
        database_url: format!("sqlite:{}", dir.path().join(name).display()),
        users: 3,
        items: 12,
        password: "password123".to_string(),
        rng_seed: Some(2024),
        reset: true,
    }
}

async fn open(config: &SeedConfig) -> SqlitePool {
    SqlitePool::connect(&config.database_url).await.unwrap()
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
        .get("n")
}

#[tokio::test]
async fn test_seed_populates_both_tables() {
    let dir = TempDir::new().unwrap();
    let config = seed_config(&dir, "campus.db");

    let summary = run(&config).await.unwrap();
    assert_eq!(summary.users, 3);
    assert_eq!(summary.items, 12);

    let pool = open(&config).await;
    assert_eq!(count(&pool, "users").await, 3);
    assert_eq!(count(&pool, "items").await, 12);

    let hashes: Vec<String> = sqlx::query("SELECT passwordHash FROM users")
        .fetch_all(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.get("passwordHash"))
        .collect();
    for hash in &hashes {
        assert_ne!(hash, "password123");
        assert!(verify_password("password123", hash).unwrap());
    }

    let orphans: i64 = sqlx::query(
        "SELECT COUNT(*) AS n FROM items WHERE userId NOT IN (SELECT id FROM users)",
    )
    .fetch_one(&pool)
    .await
    .unwrap()
    .get("n");
    assert_eq!(orphans, 0);

    let bad_rows: i64 = sqlx::query(
        "SELECT COUNT(*) AS n FROM items WHERE type NOT IN ('lost', 'found') OR status != 'open'",
    )
    .fetch_one(&pool)
    .await
    .unwrap()
    .get("n");
    assert_eq!(bad_rows, 0);
}

#[tokio::test]
async fn test_reset_replaces_previous_rows() {
    let dir = TempDir::new().unwrap();
    let config = seed_config(&dir, "campus.db");

    run(&config).await.unwrap();
    run(&config).await.unwrap();

    let pool = open(&config).await;
    assert_eq!(count(&pool, "users").await, 3);
    assert_eq!(count(&pool, "items").await, 12);
}

#[tokio::test]
async fn test_failed_seed_leaves_existing_rows_untouched() {
    let dir = TempDir::new().unwrap();
    let mut config = seed_config(&dir, "campus.db");

    run(&config).await.unwrap();

    // Same seed without a reset regenerates the same usernames.
    config.reset = false;
    let result = run(&config).await;
    assert!(matches!(result, Err(SeedError::Database(_))));

    let pool = open(&config).await;
    assert_eq!(count(&pool, "users").await, 3);
    assert_eq!(count(&pool, "items").await, 12);
}

#[tokio::test]
async fn test_same_seed_reproduces_rows() {
    let dir = TempDir::new().unwrap();
    let first = seed_config(&dir, "first.db");
    let second = seed_config(&dir, "second.db");

    run(&first).await.unwrap();
    run(&second).await.unwrap();

    let query = "SELECT u.username, u.email, i.name, i.category, i.type, i.location \
                 FROM items i JOIN users u ON u.id = i.userId ORDER BY i.id";

    let rows = |pool: SqlitePool| async move {
        sqlx::query(query)
            .fetch_all(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|row| {
                (0..6)
                    .map(|i| row.get::<String, _>(i))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };

    let a = rows(open(&first).await).await;
    let b = rows(open(&second).await).await;
    assert_eq!(a.len(), 12);
    assert_eq!(a, b);
}
