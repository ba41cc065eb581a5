use crate::error::WebError;
use crate::route::{success_return, RouteResult};
use crate::service::AccountService;
use rocket::serde::json::Json;
use rocket::{post, routes, Route, State};
use serde::{Deserialize, Serialize};

/// Account routes: login, password recovery, nickname change
pub fn routes() -> Vec<Route> {
    routes![
        login,
        issue_password_reset_token,
        check_password,
        reset_password,
        nickname_changeable,
        issue_nickname_token,
        change_nickname
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetTokenRequest {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordCheckRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NicknameChangeRequest {
    pub token: String,
    pub nickname: String,
}

/// Reset token handed to the mail sender, with the address it goes to
#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetIssued {
    pub token: String,
    pub email: Option<String>,
}

/// Exchange credentials for a short-lived login token
#[post("/player/login", data = "<request>")]
pub async fn login(
    account_service: &State<AccountService>,
    request: Json<CredentialRequest>,
) -> RouteResult<String> {
    let token = account_service
        .generate_login_token(&request.username, &request.password)
        .await?
        .ok_or_else(|| WebError::auth("Invalid username or password."))?;

    Ok(success_return(token))
}

/// Issue a password reset token for an account
///
/// Unknown accounts 404 so the caller can tell the user the name is wrong;
/// the token itself only ever travels to the registered address.
#[post("/account/password-reset/token", data = "<request>")]
pub async fn issue_password_reset_token(
    account_service: &State<AccountService>,
    request: Json<PasswordResetTokenRequest>,
) -> RouteResult<PasswordResetIssued> {
    let (token, email) = account_service
        .get_password_reset_token(&request.username)
        .await?
        .ok_or_else(|| WebError::no_data("Account not found."))?;

    Ok(success_return(PasswordResetIssued { token, email }))
}

/// Pre-validate a candidate password against a live reset token
#[post("/account/password-reset/check", data = "<request>")]
pub async fn check_password(
    account_service: &State<AccountService>,
    request: Json<PasswordCheckRequest>,
) -> RouteResult<bool> {
    let acceptable = account_service
        .check_password_strength(&request.token, &request.password)
        .await?;

    Ok(success_return(acceptable))
}

/// Consume a reset token and set the new password
#[post("/account/password-reset", data = "<request>")]
pub async fn reset_password(
    account_service: &State<AccountService>,
    request: Json<PasswordResetRequest>,
) -> RouteResult<bool> {
    let changed = account_service
        .reset_password(&request.token, &request.new_password)
        .await?;

    Ok(success_return(changed))
}

/// Tell whether the account can afford its next nickname change
#[post("/account/nickname/changeable", data = "<request>")]
pub async fn nickname_changeable(
    account_service: &State<AccountService>,
    request: Json<CredentialRequest>,
) -> RouteResult<bool> {
    let changeable = account_service
        .get_nickname_changeable(&request.username, &request.password)
        .await?;

    Ok(success_return(changeable))
}

/// Issue a nickname change token for valid credentials
#[post("/account/nickname/token", data = "<request>")]
pub async fn issue_nickname_token(
    account_service: &State<AccountService>,
    request: Json<CredentialRequest>,
) -> RouteResult<String> {
    let token = account_service
        .get_change_nickname_token(&request.username, &request.password)
        .await?
        .ok_or_else(|| WebError::auth("Invalid username or password."))?;

    Ok(success_return(token))
}

/// Consume a nickname token: charge the gem price and rename
#[post("/account/nickname", data = "<request>")]
pub async fn change_nickname(
    account_service: &State<AccountService>,
    request: Json<NicknameChangeRequest>,
) -> RouteResult<bool> {
    let changed = account_service
        .change_nickname(&request.token, &request.nickname)
        .await?;

    Ok(success_return(changed))
}
