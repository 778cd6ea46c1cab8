//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use blogger_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub blog: BlogSettings,
    pub seed_demo_data: bool,
}

/// Settings the request handlers read.
#[derive(Debug, Clone)]
pub struct BlogSettings {
    pub posts_per_page: u64,
    /// Where unauthenticated visitors are sent.
    pub login_url: String,
    pub secure_cookies: bool,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            posts_per_page: 10,
            login_url: "/accounts/login/".to_string(),
            secure_cookies: false,
        }
    }
}

/// Parse `key`, falling back to `default` when unset or malformed.
fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 20),
            min_connections: parsed("DB_MIN_CONNECTIONS", 2),
        });

        let defaults = BlogSettings::default();
        let blog = BlogSettings {
            posts_per_page: parsed("POSTS_PER_PAGE", defaults.posts_per_page).max(1),
            login_url: env::var("LOGIN_URL").unwrap_or(defaults.login_url),
            secure_cookies: flag("SESSION_COOKIE_SECURE"),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database,
            blog,
            seed_demo_data: flag("SEED_DEMO_DATA"),
        }
    }
}
