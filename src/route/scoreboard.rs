use crate::config::Constants;
use crate::error::{WebError, WebResult};
use crate::model::score::{
    BestPlay, ChartRecord, HistoryRecord, PlayCountDelta, PlayerRanking, RankingCategory,
    RecentRecord, TopRecord,
};
use crate::route::{success_return, RouteResult};
use crate::service::ScoreboardService;
use rocket::{get, routes, Route, State};
use serde::{Deserialize, Serialize};

/// Scoreboard routes
pub fn routes() -> Vec<Route> {
    routes![
        player_scoreboard,
        player_scoreboard_count,
        player_recent_records,
        chart_scoreboard,
        record_histories,
        player_ranking,
        chart_playcount_ranking,
        best_play
    ]
}

/// Player scoreboard page: the records plus the page bound for the pager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerScoreboardResponse {
    pub records: Vec<TopRecord>,
    pub max_page: i64,
}

fn difficulty_or_default(gauge_difficulty: Option<i32>) -> i32 {
    gauge_difficulty.unwrap_or(Constants::DEFAULT_GAUGE_DIFFICULTY)
}

fn category_from_path(category: i32) -> WebResult<RankingCategory> {
    // Out-of-range categories surface as a not-found, not a bad request.
    RankingCategory::from_ordinal(category)
        .map_err(|_| WebError::no_data(format!("Unknown ranking category: {category}")))
}

/// Get a player's best records at one gauge difficulty
///
/// `show_full_rank` widens the view from cleared records to everything
/// over the score floor; `page` selects one 100-row page of the ordering.
#[get("/scoreboard/player/<player_id>?<gauge_difficulty>&<show_full_rank>&<page>")]
pub async fn player_scoreboard(
    scoreboard_service: &State<ScoreboardService>,
    player_id: i32,
    gauge_difficulty: Option<i32>,
    show_full_rank: Option<bool>,
    page: Option<i64>,
) -> RouteResult<PlayerScoreboardResponse> {
    let difficulty = difficulty_or_default(gauge_difficulty);
    let show_full_rank = show_full_rank.unwrap_or(true);

    if matches!(page, Some(p) if p < 0) {
        return Err(WebError::input("Page must be non-negative."));
    }

    let records = scoreboard_service
        .get_player_top_records(player_id, difficulty, show_full_rank, page)
        .await?
        .ok_or_else(|| WebError::no_data("Player has no records."))?;

    let count = scoreboard_service
        .get_player_top_records_count(player_id, difficulty, show_full_rank)
        .await?;

    Ok(success_return(PlayerScoreboardResponse {
        records,
        max_page: count / Constants::PAGE_SIZE,
    }))
}

/// Count the rows of a player scoreboard view
#[get("/scoreboard/player/<player_id>/count?<gauge_difficulty>&<show_full_rank>")]
pub async fn player_scoreboard_count(
    scoreboard_service: &State<ScoreboardService>,
    player_id: i32,
    gauge_difficulty: Option<i32>,
    show_full_rank: Option<bool>,
) -> RouteResult<i64> {
    let count = scoreboard_service
        .get_player_top_records_count(
            player_id,
            difficulty_or_default(gauge_difficulty),
            show_full_rank.unwrap_or(true),
        )
        .await?;

    Ok(success_return(count))
}

/// Get a player's play-log rows from the last 15 days
#[get("/scoreboard/player/<player_id>/recent?<gauge_difficulty>&<show_full_rank>")]
pub async fn player_recent_records(
    scoreboard_service: &State<ScoreboardService>,
    player_id: i32,
    gauge_difficulty: Option<i32>,
    show_full_rank: Option<bool>,
) -> RouteResult<Vec<RecentRecord>> {
    let records = scoreboard_service
        .get_recent_records(
            player_id,
            difficulty_or_default(gauge_difficulty),
            show_full_rank.unwrap_or(true),
        )
        .await?;

    Ok(success_return(records))
}

/// Get the full leaderboard of one chart
#[get("/scoreboard/chart/<chart_id>?<gauge_difficulty>&<order_by_date>")]
pub async fn chart_scoreboard(
    scoreboard_service: &State<ScoreboardService>,
    chart_id: i32,
    gauge_difficulty: Option<i32>,
    order_by_date: Option<bool>,
) -> RouteResult<Vec<ChartRecord>> {
    let records = scoreboard_service
        .get_chart_top_records(
            chart_id,
            difficulty_or_default(gauge_difficulty),
            order_by_date.unwrap_or(false),
        )
        .await?
        .ok_or_else(|| WebError::no_data("Chart has no records."))?;

    Ok(success_return(records))
}

/// Get a player's attempt history on one chart
#[get("/scoreboard/history?<player_id>&<chart_id>&<gauge_difficulty>&<order_by_date>")]
pub async fn record_histories(
    scoreboard_service: &State<ScoreboardService>,
    player_id: Option<i32>,
    chart_id: Option<i32>,
    gauge_difficulty: Option<i32>,
    order_by_date: Option<bool>,
) -> RouteResult<Vec<HistoryRecord>> {
    let (Some(player_id), Some(chart_id)) = (player_id, chart_id) else {
        return Err(WebError::no_data("History requires player_id and chart_id."));
    };

    let histories = scoreboard_service
        .get_record_histories(
            player_id,
            chart_id,
            difficulty_or_default(gauge_difficulty),
            order_by_date.unwrap_or(false),
        )
        .await?;

    Ok(success_return(histories))
}

/// Rank all players by one stat category (0..=8)
#[get("/ranking/player/<category>")]
pub async fn player_ranking(
    scoreboard_service: &State<ScoreboardService>,
    category: i32,
) -> RouteResult<PlayerRanking> {
    let category = category_from_path(category)?;
    let ranking = scoreboard_service.get_player_ranking(category).await?;

    Ok(success_return(ranking))
}

/// Rank charts by play-count increase over a date window
///
/// A malformed date bound yields an empty ranking rather than an error,
/// so the page renders with nothing instead of breaking.
#[get("/ranking/chart?<top>&<day_start>&<day_end>")]
pub async fn chart_playcount_ranking(
    scoreboard_service: &State<ScoreboardService>,
    top: Option<i64>,
    day_start: Option<String>,
    day_end: Option<String>,
) -> RouteResult<Vec<PlayCountDelta>> {
    let result = scoreboard_service
        .get_play_count_ranking(
            top.unwrap_or(Constants::PLAYCOUNT_DEFAULT_TOP),
            day_start.as_deref(),
            day_end.as_deref(),
        )
        .await;

    match result {
        Ok(rows) => Ok(success_return(rows)),
        Err(WebError::Input { .. }) => Ok(success_return(Vec::new())),
        Err(err) => Err(err),
    }
}

/// Get a player's hardest charts for one ranking category
#[get("/player/<player_id>/best-play/<category>")]
pub async fn best_play(
    scoreboard_service: &State<ScoreboardService>,
    player_id: i32,
    category: i32,
) -> RouteResult<Vec<BestPlay>> {
    let category = category_from_path(category)?;

    let plays = scoreboard_service
        .get_best_play(player_id, category)
        .await?
        .ok_or_else(|| WebError::no_data("No best play for this category."))?;

    Ok(success_return(plays))
}
