//! Seeds the campus marketplace database with synthetic users and
//! lost/found items.

pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod password;

pub use config::SeedConfig;
pub use error::{Result, SeedError};
pub use generator::{DataGenerator, ItemType, NewItem, NewUser};

use chrono::Utc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: u64,
    pub items: u64,
}

pub async fn run(config: &SeedConfig) -> Result<SeedSummary> {
    let pool = db::connect(&config.database_url).await?;

    if config.reset {
        db::reset_schema(&pool).await?;
    }
    db::create_schema(&pool).await?;

    let mut generator = DataGenerator::new(config.rng_seed, Utc::now());

    info!("Generating {} users", config.users);
    let users = generator
        .users(config.users)
        .into_iter()
        .map(|user| Ok((user, password::hash_password(&config.password)?)))
        .collect::<Result<Vec<_>>>()?;

    info!("Generating {} items", config.items);
    let items = generator.items(config.items, users.len());

    let seeded = insert_rows(&pool, &users, &items).await;
    pool.close().await;
    let summary = seeded?;

    info!("Seeded {} users and {} items", summary.users, summary.items);

    Ok(summary)
}

/// All rows land in one transaction; on failure nothing is kept.
async fn insert_rows(
    pool: &sqlx::SqlitePool,
    users: &[(NewUser, String)],
    items: &[NewItem],
) -> Result<SeedSummary> {
    let mut tx = pool.begin().await?;

    let inserted = async {
        let user_ids = db::insert_users(&mut tx, users).await?;
        let item_count = db::insert_items(&mut tx, items, &user_ids).await?;
        Ok::<_, SeedError>(SeedSummary {
            users: user_ids.len() as u64,
            items: item_count,
        })
    }
    .await;

    match inserted {
        Ok(summary) => {
            tx.commit().await?;
            Ok(summary)
        }
        Err(e) => {
            tracing::warn!("Seeding failed, rolling back: {}", e);
            tx.rollback().await?;
            Err(e)
        }
    }
}
