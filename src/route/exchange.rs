use crate::error::WebError;
use crate::model::account::Wallet;
use crate::route::{success_return, RouteResult};
use crate::service::ExchangeService;
use rocket::serde::json::Json;
use rocket::{post, routes, Route, State};
use serde::{Deserialize, Serialize};

/// Troubleshoot routes: stuck-login cleanup and currency exchange
pub fn routes() -> Vec<Route> {
    routes![fix_login, cash_to_gem, gem_to_cash, wallet_info]
}

#[derive(Debug, Clone, Deserialize)]
pub struct TroubleshootRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRequest {
    pub username: String,
    pub password: String,
    pub amount: i64,
}

/// Exchange result: the outcome code plus the wallet after the attempt
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeResponse {
    pub code: i32,
    pub wallet: Option<Wallet>,
}

/// Drop stale login sessions so the player can log in again
#[post("/troubleshoot/fix-login", data = "<request>")]
pub async fn fix_login(
    exchange_service: &State<ExchangeService>,
    request: Json<TroubleshootRequest>,
) -> RouteResult<bool> {
    exchange_service
        .clean_login_data(&request.username, &request.password)
        .await?;

    Ok(success_return(true))
}

/// Show both balances of the player's wallet
#[post("/troubleshoot/wallet", data = "<request>")]
pub async fn wallet_info(
    exchange_service: &State<ExchangeService>,
    request: Json<TroubleshootRequest>,
) -> RouteResult<Wallet> {
    let wallet = exchange_service
        .get_wallet_info(&request.username)
        .await?
        .ok_or_else(|| WebError::no_data("Player not found."))?;

    Ok(success_return(wallet))
}

/// Convert premium cash into gems at 1 mcash = 100 gem
#[post("/troubleshoot/cash-to-gem", data = "<request>")]
pub async fn cash_to_gem(
    exchange_service: &State<ExchangeService>,
    request: Json<ExchangeRequest>,
) -> RouteResult<ExchangeResponse> {
    run_exchange(exchange_service, &request, "gem").await
}

/// Convert gems back into premium cash at 100 gem = 1 mcash
#[post("/troubleshoot/gem-to-cash", data = "<request>")]
pub async fn gem_to_cash(
    exchange_service: &State<ExchangeService>,
    request: Json<ExchangeRequest>,
) -> RouteResult<ExchangeResponse> {
    run_exchange(exchange_service, &request, "mcash").await
}

async fn run_exchange(
    exchange_service: &State<ExchangeService>,
    request: &ExchangeRequest,
    direction: &str,
) -> RouteResult<ExchangeResponse> {
    let code = exchange_service
        .exchange_cash(&request.username, &request.password, request.amount, direction)
        .await?;

    let wallet = exchange_service.get_wallet_info(&request.username).await?;

    Ok(success_return(ExchangeResponse { code, wallet }))
}
