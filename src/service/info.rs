use crate::config::Constants;
use crate::error::WebResult;
use crate::model::chart::ChartInfo;
use crate::model::player::{
    BadgeInfo, ClearHistory, GameChannel, OnlinePlayerEntry, OnlinePlayers, PlayerInfo,
    PlayerProfileRow, TierInfo,
};
use crate::utils;
use crate::WebError;
use sqlx::MySqlPool;

/// Read-only lookups of player and chart metadata
pub struct InfoService {
    pool: MySqlPool,
}

impl InfoService {
    /// Create a new info service instance
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Assemble the full player profile
    ///
    /// Combines the profile row with the player's global clear rank, the
    /// number of players tied with them, their cleared chart count,
    /// nickname history, best badge and 60-day clear-level trend.
    /// `None` when no such player exists.
    pub async fn get_player_info(
        &self,
        player_id: i32,
        difficulty: i32,
    ) -> WebResult<Option<PlayerInfo>> {
        if !utils::is_valid_gauge_difficulty(difficulty) {
            return Err(WebError::input(format!(
                "Unknown gauge difficulty: {difficulty}"
            )));
        }

        let profile = sqlx::query_as::<_, PlayerProfileRow>(
            "SELECT player_id, nickname, level, play_count, admin_level, last_access
             FROM char_info
             WHERE player_id = ?",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(profile) = profile else {
            return Ok(None);
        };

        // Players without a status row rank as 0.
        let player_ranking: i64 = sqlx::query_scalar(
            "WITH status_rank AS (
                SELECT
                    player_id,
                    CAST(RANK() OVER (ORDER BY clear_count DESC) AS SIGNED) AS ranking
                FROM player_status
            )
            SELECT ranking FROM status_rank WHERE player_id = ?",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?
        .unwrap_or(0);

        let tie_player_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM player_status
             WHERE clear_count = (
                SELECT clear_count FROM player_status WHERE player_id = ?
             )",
        )
        .bind(player_id)
        .fetch_one(&self.pool)
        .await?;

        let cleared_charts_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM highscore
             WHERE player_id = ? AND is_clear = 1 AND difficulty = ?",
        )
        .bind(player_id)
        .bind(Constants::DEFAULT_GAUGE_DIFFICULTY)
        .fetch_one(&self.pool)
        .await?;

        let nickname_history: Vec<String> =
            sqlx::query_scalar("SELECT nickname FROM nickname_history WHERE player_id = ?")
                .bind(player_id)
                .fetch_all(&self.pool)
                .await?;

        let badge = sqlx::query_as::<_, BadgeInfo>(
            "SELECT
                b.badge_name,
                b.badge_css_tag,
                h.chart_id AS badge_chart_id
            FROM player_badge b
            INNER JOIN highscore h ON b.chart_id = h.chart_id
            INNER JOIN chart_data m
                ON h.chart_id = m.chart_id AND h.difficulty = m.difficulty
            WHERE h.is_clear = 1 AND h.difficulty = ? AND h.player_id = ?
            ORDER BY b.badge_priority
            LIMIT 1",
        )
        .bind(Constants::DEFAULT_GAUGE_DIFFICULTY)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        let history_rows = sqlx::query_as::<_, (String, i32)>(
            "SELECT DATE_FORMAT(date, '%Y-%m-%d'), level
             FROM clear_history
             WHERE date >= DATE_SUB(CURDATE(), INTERVAL 60 DAY) AND player_id = ?
             ORDER BY date",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;

        let mut clear_history = ClearHistory::default();
        for (date, level) in history_rows {
            clear_history.date.push(date);
            clear_history.level.push(level);
        }

        Ok(Some(PlayerInfo {
            player_id: profile.player_id,
            nickname: profile.nickname,
            level: profile.level,
            play_count: profile.play_count,
            admin_level: profile.admin_level,
            last_access: profile.last_access,
            player_ranking,
            tie_player_count,
            cleared_charts_count,
            current_view_difficulty: difficulty,
            nickname_history,
            badge,
            clear_history,
        }))
    }

    /// Get a player's grade counters and tier label, `None` when absent
    pub async fn get_tier_info(&self, player_id: i32) -> WebResult<Option<TierInfo>> {
        let tier = sqlx::query_as::<_, TierInfo>(
            "SELECT
                s.p_count,
                s.ss_count,
                s.s_count,
                s.a_count,
                s.b_count,
                s.c_count,
                s.d_count,
                s.clear_count,
                t.tier_name AS tier
            FROM player_status s
            LEFT JOIN tier_info t ON s.tier = t.tier_index
            WHERE s.player_id = ?",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tier)
    }

    /// Get chart metadata for one song+difficulty pair, `None` when absent
    pub async fn get_chart_info(
        &self,
        chart_id: i32,
        difficulty: i32,
    ) -> WebResult<Option<ChartInfo>> {
        if !utils::is_valid_gauge_difficulty(difficulty) {
            return Err(WebError::input(format!(
                "Unknown gauge difficulty: {difficulty}"
            )));
        }

        let chart = sqlx::query_as::<_, ChartInfo>(
            "SELECT
                d.chart_id,
                m.title,
                d.difficulty,
                d.note_level,
                d.note_count,
                d.play_count,
                m.artist,
                m.charter,
                m.bpm
            FROM chart_data d
            LEFT JOIN chart_meta m ON m.chart_id = d.chart_id
            WHERE d.chart_id = ? AND d.difficulty = ?",
        )
        .bind(chart_id)
        .bind(difficulty)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chart)
    }

    /// List players currently online, grouped by game channel
    pub async fn get_online_players(&self) -> WebResult<OnlinePlayers> {
        let rows = sqlx::query_as::<_, (Option<String>, Option<i32>, i32)>(
            "SELECT c.nickname, c.level, l.sub_channel
             FROM login_session l
             LEFT JOIN char_info c ON c.player_id = l.player_id
             ORDER BY c.level DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut online = OnlinePlayers::default();
        for (nickname, level, sub_channel) in rows {
            online.push(
                GameChannel::from_sub_channel(sub_channel),
                OnlinePlayerEntry {
                    nickname: nickname.unwrap_or_default(),
                    level: level.unwrap_or(0),
                },
            );
        }

        Ok(online)
    }

    /// Resolve a nickname to its player id, `None` when unused
    pub async fn nickname_to_player_id(&self, nickname: &str) -> WebResult<Option<i32>> {
        let player_id: Option<i32> =
            sqlx::query_scalar("SELECT player_id FROM char_info WHERE nickname = ?")
                .bind(nickname)
                .fetch_optional(&self.pool)
                .await?;

        Ok(player_id)
    }
}
