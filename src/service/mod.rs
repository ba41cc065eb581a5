pub mod account;
pub mod exchange;
pub mod info;
pub mod scoreboard;
pub mod search;

// Re-export commonly used service types for convenience
pub use account::AccountService;
pub use exchange::ExchangeService;
pub use info::InfoService;
pub use scoreboard::ScoreboardService;
pub use search::SearchService;
