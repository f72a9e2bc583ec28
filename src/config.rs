use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub concurrency_limit: usize,
    pub migrations_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let concurrency_limit = env::var("APP_CONCURRENCY_LIMIT")
            .ok()
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(100);
        let migrations_dir =
            env::var("MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            concurrency_limit,
            migrations_dir,
        })
    }
}
