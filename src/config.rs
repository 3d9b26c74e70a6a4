use std::env;

/// Ambient process configuration: database connection string and listen port, loaded from
/// the environment (with an optional `.env` file) the way a long-running service process
/// reads its own configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_dsn: String,
    pub port: u16,
}

impl Config {
    /// Reads `.env` (if present) then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_dsn = env::var("DB_DSN").map_err(|_| ConfigError::MissingEnv("DB_DSN"))?;
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        Ok(Self { db_dsn, port })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
