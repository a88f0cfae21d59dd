use anyhow::{Context, Result};

#[derive(Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database_url: String,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://learn:@localhost:5432/learnserver".to_string());
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid SERVER_PORT: {raw}"))?,
            Err(_) => 8080,
        };

        Ok(Self {
            server: ServerConfig { host, port },
            database_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Only read defaults here; setting env vars would race other tests.
        let config = AppConfig::from_env().unwrap();
        assert!(!config.server.host.is_empty());
        assert!(!config.database_url.is_empty());
    }
}
