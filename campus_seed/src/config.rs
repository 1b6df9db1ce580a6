use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub database_url: String,
    pub users: usize,
    pub items: usize,
    /// Plaintext given to every generated account before hashing.
    pub password: String,
    /// Fixes the generator so repeated runs produce the same rows.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Drop existing `users`/`items` tables before seeding.
    pub reset: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:campus.db".to_string(),
            users: 10,
            items: 50,
            password: "password123".to_string(),
            rng_seed: None,
            reset: true,
        }
    }
}

impl SeedConfig {
    /// Defaults, then `seed.toml` if present, then `SEED_*` variables
    /// (`SEED_USERS=20`, `SEED_RNG_SEED=42`, ...).
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&SeedConfig::default())?);

        if std::path::Path::new("seed.toml").exists() {
            builder = builder.add_source(File::with_name("seed"));
        }

        builder = builder.add_source(
            Environment::with_prefix("SEED")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let seed_config: SeedConfig = builder.build()?.try_deserialize()?;
        seed_config.validate()?;

        Ok(seed_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.is_empty() {
            return Err(ConfigError::Message("Database URL cannot be empty".to_string()));
        }

        if self.items > 0 && self.users == 0 {
            return Err(ConfigError::Message(
                "Items need at least one user to belong to".to_string(),
            ));
        }

        if self.password.is_empty() {
            return Err(ConfigError::Message("Seed password cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SeedConfig::default();
        assert_eq!(config.users, 10);
        assert_eq!(config.items, 50);
        assert!(config.rng_seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_items_require_users() {
        let config = SeedConfig {
            users: 0,
            items: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SeedConfig {
            users: 0,
            items: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
