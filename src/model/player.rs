use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Game channels, one per gauge difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameChannel {
    SuperHard,
    Hard,
    Normal,
    Easy,
}

impl GameChannel {
    /// Map a login sub-channel value onto a channel
    pub fn from_sub_channel(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::SuperHard),
            1 => Some(Self::Hard),
            2 => Some(Self::Normal),
            3 => Some(Self::Easy),
            _ => None,
        }
    }
}

/// Raw profile row from `char_info`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlayerProfileRow {
    pub player_id: i32,
    pub nickname: String,
    pub level: i32,
    pub play_count: i32,
    pub admin_level: i32,
    pub last_access: Option<chrono::NaiveDateTime>,
}

/// A badge granted for clearing a specific chart
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BadgeInfo {
    pub badge_name: String,
    pub badge_css_tag: String,
    pub badge_chart_id: i32,
}

/// 60-day clear-level trend, parallel date/level series for the profile chart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearHistory {
    pub date: Vec<String>,
    pub level: Vec<i32>,
}

/// Assembled player profile returned by the info component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub player_id: i32,
    pub nickname: String,
    pub level: i32,
    pub play_count: i32,
    pub admin_level: i32,
    pub last_access: Option<chrono::NaiveDateTime>,
    /// Global rank by total clears, 0 when the player has no status row
    pub player_ranking: i64,
    /// How many players share the same clear count
    pub tie_player_count: i64,
    pub cleared_charts_count: i64,
    pub current_view_difficulty: i32,
    pub nickname_history: Vec<String>,
    pub badge: Option<BadgeInfo>,
    pub clear_history: ClearHistory,
}

/// Grade counters joined to the tier label
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TierInfo {
    pub p_count: i32,
    pub ss_count: i32,
    pub s_count: i32,
    pub a_count: i32,
    pub b_count: i32,
    pub c_count: i32,
    pub d_count: i32,
    pub clear_count: i32,
    pub tier: Option<String>,
}

/// One player on the online list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlinePlayerEntry {
    pub nickname: String,
    pub level: i32,
}

/// Online players grouped by game channel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnlinePlayers {
    pub super_hard_channel: Vec<OnlinePlayerEntry>,
    pub hard_channel: Vec<OnlinePlayerEntry>,
    pub normal_channel: Vec<OnlinePlayerEntry>,
    pub easy_channel: Vec<OnlinePlayerEntry>,
    pub all_players_count: usize,
}

impl OnlinePlayers {
    /// File a player under their channel; rows with an unknown sub-channel
    /// still count toward the total
    pub fn push(&mut self, channel: Option<GameChannel>, entry: OnlinePlayerEntry) {
        self.all_players_count += 1;
        match channel {
            Some(GameChannel::SuperHard) => self.super_hard_channel.push(entry),
            Some(GameChannel::Hard) => self.hard_channel.push(entry),
            Some(GameChannel::Normal) => self.normal_channel.push(entry),
            Some(GameChannel::Easy) => self.easy_channel.push(entry),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mapping() {
        assert_eq!(GameChannel::from_sub_channel(0), Some(GameChannel::SuperHard));
        assert_eq!(GameChannel::from_sub_channel(3), Some(GameChannel::Easy));
        assert_eq!(GameChannel::from_sub_channel(4), None);
        assert_eq!(GameChannel::from_sub_channel(-1), None);
    }

    #[test]
    fn test_online_players_grouping() {
        let mut online = OnlinePlayers::default();
        online.push(
            Some(GameChannel::Normal),
            OnlinePlayerEntry {
                nickname: "alpha".to_string(),
                level: 42,
            },
        );
        online.push(
            None,
            OnlinePlayerEntry {
                nickname: "ghost".to_string(),
                level: 1,
            },
        );

        assert_eq!(online.normal_channel.len(), 1);
        assert!(online.easy_channel.is_empty());
        assert_eq!(online.all_players_count, 2);
    }
}
