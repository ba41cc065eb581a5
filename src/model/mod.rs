pub mod account;
pub mod chart;
pub mod player;
pub mod score;

// Re-export commonly used types for convenience
pub use account::{ExchangeDirection, ExchangeOutcome, MemberRow, Wallet};

pub use chart::{ChartInfo, ChartSearchRow, SearchOptions, SearchRequest};

pub use player::{
    BadgeInfo, ClearHistory, GameChannel, OnlinePlayerEntry, OnlinePlayers, PlayerInfo,
    PlayerProfileRow, TierInfo,
};

pub use score::{
    BestPlay, ChartRecord, HistoryRecord, PlayCountDelta, PlayerRanking, PlayerRankingRow,
    RankingCategory, RecentRecord, TopRecord,
};
