use crate::error::{WebError, WebResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Global player-ranking categories
///
/// The wire value (0..=8) comes straight from the request path. Each
/// category maps to a fully specified ORDER BY clause below; the clause is
/// chosen from this closed enum so no user-derived text ever reaches the
/// query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingCategory {
    P,
    Ss,
    S,
    A,
    B,
    C,
    D,
    Clear,
    PlayCount,
}

impl RankingCategory {
    /// Parse the wire ordinal, rejecting anything outside 0..=8
    pub fn from_ordinal(value: i32) -> WebResult<Self> {
        match value {
            0 => Ok(Self::P),
            1 => Ok(Self::Ss),
            2 => Ok(Self::S),
            3 => Ok(Self::A),
            4 => Ok(Self::B),
            5 => Ok(Self::C),
            6 => Ok(Self::D),
            7 => Ok(Self::Clear),
            8 => Ok(Self::PlayCount),
            _ => Err(WebError::input(format!(
                "Unknown ranking category: {value}"
            ))),
        }
    }

    /// Ordinal as it appears on the wire
    pub fn ordinal(&self) -> i32 {
        match self {
            Self::P => 0,
            Self::Ss => 1,
            Self::S => 2,
            Self::A => 3,
            Self::B => 4,
            Self::C => 5,
            Self::D => 6,
            Self::Clear => 7,
            Self::PlayCount => 8,
        }
    }

    /// Human-readable category name returned alongside the ranking
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::P => "P",
            Self::Ss => "SS",
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::Clear => "Clear",
            Self::PlayCount => "PlayCount",
        }
    }

    /// Status-table column holding this category's counter
    ///
    /// PlayCount has no status column; it ranks from the profile table.
    pub fn status_column(&self) -> Option<&'static str> {
        match self {
            Self::P => Some("p_count"),
            Self::Ss => Some("ss_count"),
            Self::S => Some("s_count"),
            Self::A => Some("a_count"),
            Self::B => Some("b_count"),
            Self::C => Some("c_count"),
            Self::D => Some("d_count"),
            Self::Clear => Some("clear_count"),
            Self::PlayCount => None,
        }
    }

    /// Complete ORDER BY body for the ranking query
    ///
    /// Clear cascades through the grade hierarchy from D upward so a tie
    /// favors the player with more higher-quality clears, then the most
    /// recently active one. Single grades tiebreak on activity alone, and
    /// PlayCount leaves ties to the engine.
    pub fn order_clause(&self) -> &'static str {
        match self {
            Self::P => "s.p_count DESC, s.updated_time DESC",
            Self::Ss => "s.ss_count DESC, s.updated_time DESC",
            Self::S => "s.s_count DESC, s.updated_time DESC",
            Self::A => "s.a_count DESC, s.updated_time DESC",
            Self::B => "s.b_count DESC, s.updated_time DESC",
            Self::C => "s.c_count DESC, s.updated_time DESC",
            Self::D => "s.d_count DESC, s.updated_time DESC",
            Self::Clear => {
                "s.clear_count DESC, s.d_count DESC, s.c_count DESC, s.b_count DESC, \
                 s.a_count DESC, s.s_count DESC, s.ss_count DESC, s.p_count DESC, \
                 s.updated_time DESC"
            }
            Self::PlayCount => "c.play_count DESC",
        }
    }

    /// Progress gate for the best-play view: deeper categories demand
    /// deeper stage progress
    pub fn progress_gate(&self) -> i32 {
        self.ordinal() + 1
    }
}

/// One row of a player's best-score list
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TopRecord {
    pub player_id: i32,
    pub chart_id: i32,
    pub title: Option<String>,
    pub difficulty: i32,
    pub note_level: i32,
    pub score: i32,
    pub progress: Option<String>,
    pub is_clear: bool,
    pub played_time: Option<NaiveDateTime>,
    /// RANK() among all players on this exact chart+difficulty
    pub chart_rank: i64,
    pub pattern_order: i32,
    pub play_speed_rate: Option<f64>,
    pub play_timing_rate: Option<f64>,
    pub fln_option: i32,
    pub sln_option: i32,
    pub is_nln: bool,
    /// 1-based position in the note-level/score ordering, the page key
    pub row_number: i64,
}

/// One row of a chart's leaderboard
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChartRecord {
    pub player_id: i32,
    pub nickname: Option<String>,
    pub cool: i32,
    pub good: i32,
    pub bad: i32,
    pub miss: i32,
    pub max_combo: i32,
    pub score: i32,
    pub is_clear: bool,
    pub played_time: Option<NaiveDateTime>,
    pub progress: Option<String>,
    /// Strictly sequential leaderboard position, no tie-skipping
    pub row_number: i64,
}

/// One play-log attempt in the per-chart history view
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub played_time: Option<NaiveDateTime>,
    pub score: i32,
    pub progress: i32,
    pub is_clear: bool,
    pub cool: i32,
    pub good: i32,
    pub bad: i32,
    pub miss: i32,
    pub max_combo: i32,
    pub pattern_order: i32,
    pub play_speed_rate: Option<f64>,
    pub play_timing_rate: Option<f64>,
    pub fln_option: i32,
    pub sln_option: i32,
    pub is_nln: bool,
    pub row_number: i64,
}

/// One play-log attempt in the recent-records view
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RecentRecord {
    pub chart_id: i32,
    pub title: Option<String>,
    pub note_level: i32,
    pub played_time: Option<NaiveDateTime>,
    pub score: i32,
    pub progress: i32,
    pub is_clear: bool,
    pub cool: i32,
    pub good: i32,
    pub bad: i32,
    pub miss: i32,
    pub max_combo: i32,
    pub pattern_order: i32,
    pub play_speed_rate: Option<f64>,
    pub play_timing_rate: Option<f64>,
    pub fln_option: i32,
    pub sln_option: i32,
    pub is_nln: bool,
    pub row_number: i64,
}

/// One row of the global player ranking
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlayerRankingRow {
    pub player_id: i32,
    pub nickname: Option<String>,
    /// Value of the selected stat category for this player
    pub value: i64,
    pub tier: Option<String>,
    /// RANK(): equal values share a rank, gaps follow
    pub rank: i64,
}

/// Player ranking response: the ordered rows plus the category label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRanking {
    pub players: Vec<PlayerRankingRow>,
    pub category_name: String,
}

/// Per-chart play-count increase over the snapshot window
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlayCountDelta {
    pub chart_id: i32,
    pub title: Option<String>,
    pub note_level: i32,
    /// Latest in-window snapshot minus the earliest one
    pub delta: i64,
    pub rank_index: i64,
}

/// One chart in a player's best-play summary
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BestPlay {
    pub chart_id: i32,
    pub title: Option<String>,
    pub note_level: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ordinal_round_trip() {
        for value in 0..=8 {
            let category = RankingCategory::from_ordinal(value).unwrap();
            assert_eq!(category.ordinal(), value);
        }
        assert!(RankingCategory::from_ordinal(-1).is_err());
        assert!(RankingCategory::from_ordinal(9).is_err());
    }

    #[test]
    fn test_category_display_names() {
        assert_eq!(RankingCategory::Clear.display_name(), "Clear");
        assert_eq!(RankingCategory::PlayCount.display_name(), "PlayCount");
        assert_eq!(RankingCategory::Ss.display_name(), "SS");
    }

    #[test]
    fn test_category_status_columns() {
        assert_eq!(RankingCategory::P.status_column(), Some("p_count"));
        assert_eq!(RankingCategory::Clear.status_column(), Some("clear_count"));
        assert_eq!(RankingCategory::PlayCount.status_column(), None);
    }

    #[test]
    fn test_clear_order_cascades_grade_hierarchy() {
        let clause = RankingCategory::Clear.order_clause();
        let d = clause.find("d_count").unwrap();
        let c = clause.find("c_count").unwrap();
        let p = clause.rfind("p_count").unwrap();
        assert!(d < c && c < p);
        assert!(clause.ends_with("updated_time DESC"));
    }

    #[test]
    fn test_play_count_has_no_secondary_key() {
        assert_eq!(
            RankingCategory::PlayCount.order_clause(),
            "c.play_count DESC"
        );
    }

    #[test]
    fn test_progress_gate() {
        assert_eq!(RankingCategory::P.progress_gate(), 1);
        assert_eq!(RankingCategory::Clear.progress_gate(), 8);
    }
}
