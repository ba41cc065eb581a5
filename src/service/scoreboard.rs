use crate::config::Constants;
use crate::error::{WebError, WebResult};
use crate::model::score::{
    BestPlay, ChartRecord, HistoryRecord, PlayCountDelta, PlayerRanking, PlayerRankingRow,
    RankingCategory, RecentRecord, TopRecord,
};
use crate::utils;
use chrono::{Duration, NaiveDate, Utc};
use sqlx::MySqlPool;

/// Scoreboard service: every ranking and leaderboard query in the system
///
/// Rankings are always computed at request time by the database engine;
/// no rank position is ever stored. Every dynamic SQL fragment below is
/// selected from a closed enum match, never built from request text.
pub struct ScoreboardService {
    pool: MySqlPool,
}

/// Visibility filter of the player scoreboard views
///
/// `show_full_rank` widens the view from cleared records to everything at
/// or above the fixed score floor. Both views read the same best-score
/// table; this only changes what is shown.
fn view_filter(show_full_rank: bool) -> String {
    if show_full_rank {
        format!("h.score >= {}", Constants::FULL_RANK_SCORE_THRESHOLD)
    } else {
        "h.is_clear = 1".to_string()
    }
}

/// Inclusive row-number bounds of one scoreboard page
fn page_bounds(page: i64) -> (i64, i64) {
    (
        page * Constants::PAGE_SIZE + 1,
        (page + 1) * Constants::PAGE_SIZE,
    )
}

/// Normalize the `top` argument of the play-count ranking
///
/// Zero means "all rows"; a negative value is treated as its magnitude.
fn normalize_top(top: i64) -> Option<i64> {
    match top {
        0 => None,
        n => Some(n.abs()),
    }
}

/// Resolve the play-count ranking date window into a half-open range
///
/// Bounds arrive as `YYYY-MM-DD` strings. A missing bound defaults to a
/// 60-day span from the given one; with neither, the window is the last
/// 60 days. The end bound is extended by one day so the full end date is
/// included, and malformed input is a typed validation error.
fn resolve_snapshot_window(
    day_start: Option<&str>,
    day_end: Option<&str>,
) -> WebResult<(NaiveDate, NaiveDate)> {
    let parse = |raw: &str| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| WebError::input(format!("Malformed date: {raw}")))
    };

    let span = Duration::days(Constants::PLAYCOUNT_WINDOW_DAYS);
    let (start, end) = match (day_start, day_end) {
        (Some(s), Some(e)) => (parse(s)?, parse(e)?),
        (Some(s), None) => {
            let start = parse(s)?;
            (start, start + span)
        }
        (None, Some(e)) => {
            let end = parse(e)?;
            (end - span, end)
        }
        (None, None) => {
            let today = Utc::now().date_naive();
            (today - span, today)
        }
    };

    Ok((start, end + Duration::days(1)))
}

/// Build the per-chart history query
///
/// The 50-row cap always selects by the clear-partitioned ordering, so
/// `order_by_date` reorders that same set by timestamp instead of
/// changing which attempts are kept.
fn history_sql(order_by_date: bool) -> String {
    let final_order = if order_by_date {
        "played_time DESC"
    } else {
        "is_clear DESC, `row_number`"
    };

    format!(
        "SELECT * FROM (
            SELECT
                played_time,
                score,
                progress,
                is_clear,
                cool,
                good,
                bad,
                miss,
                max_combo,
                pattern_order,
                ROUND(play_speed_rate, 3) AS play_speed_rate,
                play_timing_rate,
                fln_option,
                sln_option,
                is_nln,
                CAST(row_num AS SIGNED) AS `row_number`
            FROM (
                SELECT *,
                    ROW_NUMBER() OVER (
                        PARTITION BY is_clear
                        ORDER BY CASE
                            WHEN is_clear = 1 THEN score
                            ELSE cool + good + bad + miss
                        END DESC
                    ) AS row_num
                FROM play_log
                WHERE player_id = ? AND chart_id = ? AND difficulty = ?
            ) ranked
            ORDER BY is_clear DESC, row_num
            LIMIT ?
        ) limited
        ORDER BY {final_order}"
    )
}

fn check_difficulty(difficulty: i32) -> WebResult<()> {
    if utils::is_valid_gauge_difficulty(difficulty) {
        Ok(())
    } else {
        Err(WebError::input(format!(
            "Unknown gauge difficulty: {difficulty}"
        )))
    }
}

impl ScoreboardService {
    /// Create a new scoreboard service instance
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Get a player's best score per chart at one gauge difficulty
    ///
    /// Rows are ordered by chart note level descending then score
    /// descending, each annotated with the player's RANK() among all
    /// players on that exact chart+difficulty (equal scores share a rank,
    /// the next distinct score resumes past the tie). When `page` is set,
    /// only rows whose position in the note-level/score ordering falls in
    /// `[page*100+1, (page+1)*100]` are returned, so concatenating the
    /// pages reproduces the unpaginated ordering without gaps or
    /// duplicates. `None` means the player has no matching record at all.
    pub async fn get_player_top_records(
        &self,
        player_id: i32,
        difficulty: i32,
        show_full_rank: bool,
        page: Option<i64>,
    ) -> WebResult<Option<Vec<TopRecord>>> {
        check_difficulty(difficulty)?;

        let page_clause = if page.is_some() {
            "WHERE `row_number` BETWEEN ? AND ?"
        } else {
            ""
        };

        let sql = format!(
            "WITH ranked_results AS (
                SELECT
                    h.player_id,
                    h.chart_id,
                    md.title,
                    h.difficulty,
                    d.note_level,
                    h.score,
                    p.progress_name AS progress,
                    h.is_clear,
                    h.played_time,
                    h.pattern_order,
                    ROUND(h.play_speed_rate, 3) AS play_speed_rate,
                    h.play_timing_rate,
                    h.fln_option,
                    h.sln_option,
                    h.is_nln,
                    CAST(sr.chart_rank AS SIGNED) AS chart_rank,
                    CAST(ROW_NUMBER() OVER (
                        ORDER BY d.note_level DESC, h.score DESC
                    ) AS SIGNED) AS `row_number`
                FROM highscore h
                INNER JOIN chart_data d
                    ON d.chart_id = h.chart_id AND d.difficulty = h.difficulty
                LEFT JOIN chart_meta md ON md.chart_id = h.chart_id
                LEFT JOIN progress_info p ON p.progress_index = h.progress
                LEFT JOIN (
                    SELECT
                        player_id,
                        chart_id,
                        difficulty,
                        RANK() OVER (
                            PARTITION BY chart_id, difficulty
                            ORDER BY score DESC
                        ) AS chart_rank
                    FROM highscore
                ) sr ON sr.player_id = h.player_id
                    AND sr.chart_id = h.chart_id
                    AND sr.difficulty = h.difficulty
                WHERE h.player_id = ? AND h.difficulty = ? AND {}
            )
            SELECT * FROM ranked_results
            {}
            ORDER BY `row_number`",
            view_filter(show_full_rank),
            page_clause
        );

        let mut query = sqlx::query_as::<_, TopRecord>(&sql)
            .bind(player_id)
            .bind(difficulty);

        if let Some(page) = page {
            let (first, last) = page_bounds(page);
            query = query.bind(first).bind(last);
        }

        let records = query.fetch_all(&self.pool).await?;

        Ok(if records.is_empty() {
            None
        } else {
            Some(records)
        })
    }

    /// Count the rows the player-top-records view would match
    ///
    /// Used by callers to compute page bounds (`max_page = count / 100`).
    pub async fn get_player_top_records_count(
        &self,
        player_id: i32,
        difficulty: i32,
        show_full_rank: bool,
    ) -> WebResult<i64> {
        check_difficulty(difficulty)?;

        let sql = format!(
            "SELECT COUNT(*) FROM highscore h
             WHERE h.player_id = ? AND h.difficulty = ? AND {}",
            view_filter(show_full_rank)
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(player_id)
            .bind(difficulty)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Get the full leaderboard of one chart+difficulty
    ///
    /// Ties on score prefer cleared records, then more cool judges, then
    /// the player with the lower global clear aggregate (newer players
    /// win the tie), then the more recent play. Positions are strict
    /// ROW_NUMBER() with no tie-skipping. `order_by_date` moves played
    /// time to the front of the chain.
    pub async fn get_chart_top_records(
        &self,
        chart_id: i32,
        difficulty: i32,
        order_by_date: bool,
    ) -> WebResult<Option<Vec<ChartRecord>>> {
        check_difficulty(difficulty)?;

        let order = if order_by_date {
            "h.played_time DESC, h.score DESC, h.is_clear DESC, h.cool DESC, \
             s.clear_count ASC, h.player_id DESC"
        } else {
            "h.score DESC, h.is_clear DESC, h.cool DESC, s.clear_count ASC, \
             h.played_time DESC, h.player_id DESC"
        };

        let sql = format!(
            "SELECT
                h.player_id,
                c.nickname,
                h.cool,
                h.good,
                h.bad,
                h.miss,
                h.max_combo,
                h.score,
                h.is_clear,
                h.played_time,
                p.progress_name AS progress,
                CAST(ROW_NUMBER() OVER (ORDER BY {order}) AS SIGNED) AS `row_number`
            FROM highscore h
            LEFT JOIN char_info c ON h.player_id = c.player_id
            LEFT JOIN progress_info p ON p.progress_index = h.progress
            LEFT JOIN player_status s ON h.player_id = s.player_id
            WHERE h.chart_id = ? AND h.difficulty = ?
            ORDER BY `row_number`"
        );

        let records = sqlx::query_as::<_, ChartRecord>(&sql)
            .bind(chart_id)
            .bind(difficulty)
            .fetch_all(&self.pool)
            .await?;

        Ok(if records.is_empty() {
            None
        } else {
            Some(records)
        })
    }

    /// Rank all players by one stat category
    ///
    /// RANK() semantics: equal stat values share a rank and the next
    /// distinct value resumes past the tie, so the output is non-increasing
    /// in the selected stat. The play-count category ranks from the player
    /// profile table (ties unbroken); everything else reads the status
    /// aggregate with the category's tiebreak chain.
    pub async fn get_player_ranking(&self, category: RankingCategory) -> WebResult<PlayerRanking> {
        let sql = match category.status_column() {
            None => "SELECT
                    c.player_id,
                    c.nickname,
                    CAST(c.play_count AS SIGNED) AS value,
                    t.tier_name AS tier,
                    CAST(RANK() OVER (ORDER BY c.play_count DESC) AS SIGNED) AS `rank`
                FROM char_info c
                LEFT JOIN player_status s ON s.player_id = c.player_id
                LEFT JOIN tier_info t ON s.tier = t.tier_index
                ORDER BY `rank`"
                .to_string(),
            Some(column) => format!(
                "SELECT
                    s.player_id,
                    c.nickname,
                    CAST(s.{column} AS SIGNED) AS value,
                    t.tier_name AS tier,
                    CAST(RANK() OVER (ORDER BY {}) AS SIGNED) AS `rank`
                FROM player_status s
                LEFT JOIN char_info c ON s.player_id = c.player_id
                LEFT JOIN tier_info t ON s.tier = t.tier_index
                ORDER BY `rank`",
                category.order_clause()
            ),
        };

        let players = sqlx::query_as::<_, PlayerRankingRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(PlayerRanking {
            players,
            category_name: category.display_name().to_string(),
        })
    }

    /// Get up to 50 play-log attempts for one player on one chart
    ///
    /// Attempts are partitioned by the cleared flag. Cleared attempts
    /// order by score; uncleared ones by total judge count, since their
    /// score may be meaningless. The cleared partition comes first, unless
    /// `order_by_date` reorders everything by timestamp.
    pub async fn get_record_histories(
        &self,
        player_id: i32,
        chart_id: i32,
        difficulty: i32,
        order_by_date: bool,
    ) -> WebResult<Vec<HistoryRecord>> {
        check_difficulty(difficulty)?;

        let sql = history_sql(order_by_date);

        let records = sqlx::query_as::<_, HistoryRecord>(&sql)
            .bind(player_id)
            .bind(chart_id)
            .bind(difficulty)
            .bind(Constants::HISTORY_RECORD_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Get up to 150 play-log rows from the last 15 days, newest first
    pub async fn get_recent_records(
        &self,
        player_id: i32,
        difficulty: i32,
        show_full_rank: bool,
    ) -> WebResult<Vec<RecentRecord>> {
        check_difficulty(difficulty)?;

        let clear_filter = if show_full_rank {
            ""
        } else {
            "AND p.is_clear = 1"
        };

        let sql = format!(
            "SELECT
                p.chart_id,
                mt.title,
                m.note_level,
                p.played_time,
                p.score,
                p.progress,
                p.is_clear,
                p.cool,
                p.good,
                p.bad,
                p.miss,
                p.max_combo,
                p.pattern_order,
                ROUND(p.play_speed_rate, 3) AS play_speed_rate,
                p.play_timing_rate,
                p.fln_option,
                p.sln_option,
                p.is_nln,
                CAST(ROW_NUMBER() OVER (ORDER BY p.played_time DESC) AS SIGNED) AS `row_number`
            FROM play_log p
            LEFT JOIN chart_meta mt ON p.chart_id = mt.chart_id
            LEFT JOIN chart_data m
                ON p.chart_id = m.chart_id AND p.difficulty = m.difficulty
            WHERE p.player_id = ?
                AND p.difficulty = ?
                AND p.played_time > DATE_SUB(NOW(), INTERVAL {} DAY)
                {}
            ORDER BY `row_number`
            LIMIT ?",
            Constants::RECENT_WINDOW_DAYS,
            clear_filter
        );

        let records = sqlx::query_as::<_, RecentRecord>(&sql)
            .bind(player_id)
            .bind(difficulty)
            .bind(Constants::RECENT_RECORD_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Rank charts by play-count increase over a date window
    ///
    /// The increase is the latest in-window snapshot minus the earliest
    /// one, so a chart with a single snapshot has delta 0 and is excluded
    /// along with anything non-positive. `top` caps the output (see
    /// `normalize_top`); malformed dates surface as an input error.
    pub async fn get_play_count_ranking(
        &self,
        top: i64,
        day_start: Option<&str>,
        day_end: Option<&str>,
    ) -> WebResult<Vec<PlayCountDelta>> {
        let (start, end_exclusive) = resolve_snapshot_window(day_start, day_end)?;

        let limit_clause = if normalize_top(top).is_some() {
            "LIMIT ?"
        } else {
            ""
        };

        let sql = format!(
            "WITH windowed AS (
                SELECT
                    chart_id,
                    FIRST_VALUE(play_count) OVER (
                        PARTITION BY chart_id ORDER BY snapshot_date ASC
                    ) AS first_count,
                    FIRST_VALUE(play_count) OVER (
                        PARTITION BY chart_id ORDER BY snapshot_date DESC
                    ) AS last_count
                FROM chart_playcount_snapshot
                WHERE snapshot_date >= ? AND snapshot_date < ?
            ),
            deltas AS (
                SELECT DISTINCT
                    chart_id,
                    CAST(last_count - first_count AS SIGNED) AS delta
                FROM windowed
            )
            SELECT
                d.chart_id,
                mm.title,
                m.note_level,
                d.delta,
                CAST(ROW_NUMBER() OVER (
                    ORDER BY d.delta DESC, m.note_level DESC
                ) AS SIGNED) AS rank_index
            FROM deltas d
            LEFT JOIN chart_meta mm ON d.chart_id = mm.chart_id
            LEFT JOIN chart_data m
                ON d.chart_id = m.chart_id AND m.difficulty = {}
            WHERE d.delta > 0
            ORDER BY rank_index
            {}",
            Constants::DEFAULT_GAUGE_DIFFICULTY,
            limit_clause
        );

        let mut query = sqlx::query_as::<_, PlayCountDelta>(&sql)
            .bind(start)
            .bind(end_exclusive);

        if let Some(limit) = normalize_top(top) {
            query = query.bind(limit);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows)
    }

    /// Get a player's hardest charts within the category's progress gate
    ///
    /// The Clear category narrows to cleared records and returns 8 rows;
    /// other grade categories return 10. Not applicable to PlayCount.
    pub async fn get_best_play(
        &self,
        player_id: i32,
        category: RankingCategory,
    ) -> WebResult<Option<Vec<BestPlay>>> {
        if category == RankingCategory::PlayCount {
            return Ok(None);
        }

        let (limit, clear_filter) = if category == RankingCategory::Clear {
            (Constants::BEST_PLAY_CLEAR_COUNT, "AND h.is_clear = 1")
        } else {
            (Constants::BEST_PLAY_DEFAULT_COUNT, "")
        };

        let sql = format!(
            "SELECT
                h.chart_id,
                mm.title,
                m.note_level
            FROM highscore h
            LEFT JOIN chart_data m
                ON h.chart_id = m.chart_id AND h.difficulty = m.difficulty
            LEFT JOIN chart_meta mm ON h.chart_id = mm.chart_id
            WHERE h.player_id = ?
                AND h.progress <= ?
                AND h.difficulty = {}
                {}
            ORDER BY m.note_level DESC
            LIMIT ?",
            Constants::DEFAULT_GAUGE_DIFFICULTY,
            clear_filter
        );

        let rows = sqlx::query_as::<_, BestPlay>(&sql)
            .bind(player_id)
            .bind(category.progress_gate())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(if rows.is_empty() { None } else { Some(rows) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_filter() {
        assert_eq!(view_filter(true), "h.score >= 50000");
        assert_eq!(view_filter(false), "h.is_clear = 1");
        // the full-rank view is a score floor, not a clear filter
        assert!(!view_filter(true).contains("is_clear"));
    }

    #[test]
    fn test_page_bounds_are_contiguous() {
        assert_eq!(page_bounds(0), (1, 100));
        assert_eq!(page_bounds(1), (101, 200));

        // no gap or overlap at any boundary
        for page in 0..10 {
            let (_, last) = page_bounds(page);
            let (next_first, _) = page_bounds(page + 1);
            assert_eq!(next_first, last + 1);
        }
    }

    #[test]
    fn test_normalize_top() {
        assert_eq!(normalize_top(0), None);
        assert_eq!(normalize_top(5), Some(5));
        assert_eq!(normalize_top(-5), Some(5));
    }

    #[test]
    fn test_window_both_bounds() {
        let (start, end) =
            resolve_snapshot_window(Some("2024-01-01"), Some("2024-01-01")).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        // end of the half-open range covers the whole end date
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_window_single_bound_spans_60_days() {
        let (start, end) = resolve_snapshot_window(Some("2024-01-01"), None).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end - start, Duration::days(61));

        let (start, end) = resolve_snapshot_window(None, Some("2024-03-01")).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(end - start, Duration::days(61));
    }

    #[test]
    fn test_window_defaults_to_recent_60_days() {
        let (start, end) = resolve_snapshot_window(None, None).unwrap();
        assert_eq!(end - start, Duration::days(61));
    }

    #[test]
    fn test_window_rejects_malformed_dates() {
        assert!(resolve_snapshot_window(Some("01-01-2024"), None).is_err());
        assert!(resolve_snapshot_window(None, Some("not-a-date")).is_err());
        assert!(resolve_snapshot_window(Some("2024-13-40"), Some("2024-01-01")).is_err());
    }

    #[test]
    fn test_history_cap_keeps_partition_ordering() {
        // the row cap is taken by the clear-partitioned ordering; the date
        // view only reorders the capped set
        let sql = history_sql(true);
        let limit = sql.find("LIMIT ?").unwrap();
        let outer_order = sql.rfind("ORDER BY").unwrap();
        assert!(limit < outer_order);
        assert!(sql.trim_end().ends_with("ORDER BY played_time DESC"));

        let sql = history_sql(false);
        assert!(sql.trim_end().ends_with("ORDER BY is_clear DESC, `row_number`"));
    }

    #[test]
    fn test_difficulty_check() {
        assert!(check_difficulty(2).is_ok());
        assert!(check_difficulty(7).is_err());
    }
}
