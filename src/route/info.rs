use crate::config::Constants;
use crate::error::WebError;
use crate::model::chart::ChartInfo;
use crate::model::player::{OnlinePlayers, PlayerInfo, TierInfo};
use crate::route::{success_return, RouteResult};
use crate::service::InfoService;
use rocket::{get, routes, Route, State};

/// Player and chart info routes
pub fn routes() -> Vec<Route> {
    routes![
        player_info,
        player_info_by_nickname,
        tier_info,
        chart_info,
        online_players
    ]
}

/// Get the assembled profile of one player
#[get("/player/<player_id>?<gauge_difficulty>")]
pub async fn player_info(
    info_service: &State<InfoService>,
    player_id: i32,
    gauge_difficulty: Option<i32>,
) -> RouteResult<PlayerInfo> {
    let difficulty = gauge_difficulty.unwrap_or(Constants::DEFAULT_GAUGE_DIFFICULTY);

    let info = info_service
        .get_player_info(player_id, difficulty)
        .await?
        .ok_or_else(|| WebError::no_data("Player not found."))?;

    Ok(success_return(info))
}

/// Get a player's profile by exact nickname
#[get("/player/by-nickname/<nickname>?<gauge_difficulty>", rank = 2)]
pub async fn player_info_by_nickname(
    info_service: &State<InfoService>,
    nickname: &str,
    gauge_difficulty: Option<i32>,
) -> RouteResult<PlayerInfo> {
    let player_id = info_service
        .nickname_to_player_id(nickname)
        .await?
        .ok_or_else(|| WebError::no_data("Player not found."))?;

    let difficulty = gauge_difficulty.unwrap_or(Constants::DEFAULT_GAUGE_DIFFICULTY);

    let info = info_service
        .get_player_info(player_id, difficulty)
        .await?
        .ok_or_else(|| WebError::no_data("Player not found."))?;

    Ok(success_return(info))
}

/// Get the grade counters backing a player's tier page
#[get("/player/<player_id>/tier")]
pub async fn tier_info(
    info_service: &State<InfoService>,
    player_id: i32,
) -> RouteResult<TierInfo> {
    let tier = info_service
        .get_tier_info(player_id)
        .await?
        .ok_or_else(|| WebError::no_data("Player has no tier data."))?;

    Ok(success_return(tier))
}

/// Get the metadata and note counts of one chart
#[get("/chart/<chart_id>?<gauge_difficulty>")]
pub async fn chart_info(
    info_service: &State<InfoService>,
    chart_id: i32,
    gauge_difficulty: Option<i32>,
) -> RouteResult<ChartInfo> {
    let difficulty = gauge_difficulty.unwrap_or(Constants::DEFAULT_GAUGE_DIFFICULTY);

    let chart = info_service
        .get_chart_info(chart_id, difficulty)
        .await?
        .ok_or_else(|| WebError::no_data("Chart not found."))?;

    Ok(success_return(chart))
}

/// List who is logged in right now, grouped by game channel
#[get("/online-players")]
pub async fn online_players(info_service: &State<InfoService>) -> RouteResult<OnlinePlayers> {
    let players = info_service.get_online_players().await?;

    Ok(success_return(players))
}
