use anyhow::{Context, Result};

use std::env;

/// Process-wide configuration, read once at startup. Nothing here is
/// reconfigurable at runtime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream LeetCode stats API.
    pub leetcode_api_base: String,
    /// Path to the SQLite database file.
    pub database_path: String,
    /// Secret used to sign and verify auth tokens.
    pub jwt_secret: String,
    /// Upper bound on a single upstream fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

pub const DEFAULT_API_BASE: &str = "https://alfa-leetcode-api.onrender.com";
pub const DEFAULT_DATABASE_PATH: &str = "leetboard.db";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

impl Config {
    /// Loads configuration from the environment. `JWT_SECRET` is required;
    /// everything else has a sensible default.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .context("Expected 'JWT_SECRET=<secret>' in .env in project root.")?;

        let fetch_timeout_secs = match env::var("FETCH_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("FETCH_TIMEOUT_SECS is not a number: {raw}"))?,
            Err(_) => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Ok(Self {
            leetcode_api_base: env::var("LEETCODE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
            jwt_secret,
            fetch_timeout_secs,
        })
    }
}
