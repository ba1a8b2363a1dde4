use std::env;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub default_vote_budget: i64,
    pub rust_log: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `RSLIST_DB_PATH` (default: data/rslist.db)
    /// - `RSLIST_DEFAULT_VOTE_BUDGET` (default: 10) - votes granted to a newly registered user
    /// - `RUST_LOG` (optional)
    pub fn from_env() -> Self {
        let db_path = env::var("RSLIST_DB_PATH").unwrap_or_else(|_| "data/rslist.db".to_string());

        let default_vote_budget = env::var("RSLIST_DEFAULT_VOTE_BUDGET")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|budget: &i64| *budget >= 0)
            .unwrap_or(10);

        let rust_log = env::var("RUST_LOG").ok();

        Self {
            db_path,
            default_vote_budget,
            rust_log,
        }
    }
}
