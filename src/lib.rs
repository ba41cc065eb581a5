//! O2Jam Community Web Backend
//!
//! Rust implementation of the community site backend for an O2Jam private
//! server: player and chart scoreboards, global player rankings, account
//! recovery flows, chart search and the gem/premium-cash exchange, backed
//! by two MySQL databases (gameplay and trade).

pub mod config;
pub mod error;
pub mod model;
pub mod route;
pub mod service;

// Re-export commonly used types for convenience
pub use config::{Config, Constants, CONFIG};
pub use error::{WebError, WebResult};

use sqlx::{MySql, Pool};

/// Database connection pool type alias
pub type DbPool = Pool<MySql>;

/// Database connection manager for the two commit domains
pub struct Database;

impl Database {
    /// Connect to the gameplay database
    pub async fn connect_game() -> Result<DbPool, sqlx::Error> {
        sqlx::MySqlPool::connect(&CONFIG.database_url).await
    }

    /// Connect to the trade database
    ///
    /// This is a separate commit domain from the gameplay database: the
    /// premium-cash mirror written by the currency exchange lives here.
    pub async fn connect_trade() -> Result<DbPool, sqlx::Error> {
        sqlx::MySqlPool::connect(&CONFIG.trade_database_url).await
    }

    /// Check if a database connection is healthy
    pub async fn check_health(pool: &DbPool) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}

/// Utility functions for the application
pub mod utils {
    use base64::{engine::general_purpose, Engine as _};
    use rand::RngCore;

    /// Generate an opaque URL-safe token from `n` random bytes
    fn random_token(n: usize) -> String {
        let mut bytes = vec![0u8; n];
        rand::thread_rng().fill_bytes(&mut bytes);
        general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Generate a login token stored on the member row
    pub fn make_login_token() -> String {
        random_token(crate::Constants::LOGIN_TOKEN_BYTES)
    }

    /// Generate a short-lived mail-auth token (password reset, nickname change)
    pub fn make_auth_token() -> String {
        random_token(crate::Constants::AUTH_TOKEN_BYTES)
    }

    /// Check that a gauge difficulty identifier is one of the four channels
    ///
    /// Chart difficulty rows use the same 0..=3 numbering, so a value valid
    /// here is also a valid chart difficulty; the chart's own difficulty
    /// column stays the ground truth when the two schemes meet.
    pub fn is_valid_gauge_difficulty(difficulty: i32) -> bool {
        (0..=3).contains(&difficulty)
    }
}

/// Prelude module for commonly used imports
pub mod prelude {
    pub use crate::config::{Config, Constants, CONFIG};
    pub use crate::error::{WebError, WebResult};
    pub use crate::model::{
        ChartInfo, ChartRecord, ExchangeDirection, ExchangeOutcome, PlayCountDelta, PlayerInfo,
        PlayerRankingRow, RankingCategory, RecentRecord, TierInfo, TopRecord, Wallet,
    };
    pub use crate::route::{success_return, ApiResponse, RouteResult};
    pub use crate::service::{
        AccountService, ExchangeService, InfoService, ScoreboardService, SearchService,
    };
    pub use crate::utils;
    pub use crate::DbPool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        let login = utils::make_login_token();
        let auth = utils::make_auth_token();

        // base64 url-safe without padding: 4 chars per 3 bytes
        assert_eq!(login.len(), 20);
        assert_eq!(auth.len(), 16);
        assert!(login
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(utils::make_login_token(), login);
    }

    #[test]
    fn test_gauge_difficulty_validation() {
        assert!(utils::is_valid_gauge_difficulty(0));
        assert!(utils::is_valid_gauge_difficulty(2));
        assert!(utils::is_valid_gauge_difficulty(3));
        assert!(!utils::is_valid_gauge_difficulty(-1));
        assert!(!utils::is_valid_gauge_difficulty(4));
    }
}
