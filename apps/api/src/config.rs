use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Reject meal/grocery requests that carry no bearer token.
    pub require_auth: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: require_env("JWT_SECRET")?,
            token_ttl_hours: parse_env("TOKEN_TTL_HOURS", 24 * 7)?,
            require_auth: parse_env("REQUIRE_AUTH", false)?,
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by router tests: in-memory storage, auth optional.
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            database_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            require_auth: false,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("MEALPLAN_TEST_UNSET_PORT", 5000).unwrap();
        assert_eq!(port, 5000);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("MEALPLAN_TEST_BAD_BOOL", "maybe");
        let parsed: Result<bool> = parse_env("MEALPLAN_TEST_BAD_BOOL", false);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_env_trims_whitespace() {
        std::env::set_var("MEALPLAN_TEST_PADDED", " 42 ");
        let parsed: u32 = parse_env("MEALPLAN_TEST_PADDED", 1).unwrap();
        assert_eq!(parsed, 42);
    }
}
