use std::env;

/// Server configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
}

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATABASE_URL: &str = "sqlite:oncall.db";
const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000,\
                               http://localhost:3002,http://127.0.0.1:3002";

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a number, got {:?}", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let allowed_origins =
            parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.into()));

        Ok(Self {
            port,
            database_url,
            allowed_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = parse_origins("http://localhost:3000, http://127.0.0.1:3000 ,");
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
    }

    #[test]
    fn test_default_origins_parse_cleanly() {
        let origins = parse_origins(DEFAULT_ORIGINS);
        assert_eq!(origins.len(), 4);
        assert!(origins.iter().all(|o| o.starts_with("http://")));
    }
}
