use crate::{
    dtos::account::{
        AccountResponse, AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest,
        TokenResponse, UpdateAccountRequest,
    },
    error::ApiResult,
    extract::Authenticated,
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use database::services::accounts::{AccountChanges, AccountService, PasswordChange, Registration};

/// Create an account, provision its profile and log it in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid registration")
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (account, token) = AccountService::register(
        &state.db,
        &state.policy,
        Registration {
            username: body.username,
            email: body.email,
            password: body.password,
            password_confirmation: body.password_confirmation,
            first_name: body.first_name,
            last_name: body.last_name,
            role: body.role,
        },
    )
    .await?;

    let group = AccountService::group_label(&state.db, &account).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            account: AccountResponse::new(account, group),
        }),
    ))
}

/// Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (account, token) = AccountService::login(&state.db, &body.username, &body.password).await?;
    let group = AccountService::group_label(&state.db, &account).await?;

    Ok(Json(AuthResponse {
        token,
        account: AccountResponse::new(account, group),
    }))
}

/// Revoke the caller's tokens
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("token" = [])),
    tag = "Authentication"
)]
pub async fn logout(State(state): State<AppState>, caller: Authenticated) -> ApiResult<StatusCode> {
    AccountService::logout(&state.db, caller.account.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's account
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("token" = [])),
    tag = "Authentication"
)]
pub async fn me(
    State(state): State<AppState>,
    caller: Authenticated,
) -> ApiResult<Json<AccountResponse>> {
    let group = AccountService::group_label(&state.db, &caller.account).await?;
    Ok(Json(AccountResponse::new(caller.account, group)))
}

/// Update the caller's name and e-mail
#[utoipa::path(
    patch,
    path = "/auth/me",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("token" = [])),
    tag = "Authentication"
)]
pub async fn update_me(
    State(state): State<AppState>,
    caller: Authenticated,
    Json(body): Json<UpdateAccountRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let account = AccountService::update_profile(
        &state.db,
        caller.account,
        AccountChanges {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
        },
    )
    .await?;
    let group = AccountService::group_label(&state.db, &account).await?;

    Ok(Json(AccountResponse::new(account, group)))
}

/// Change the caller's password; every other session is logged out
#[utoipa::path(
    post,
    path = "/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = TokenResponse),
        (status = 400, description = "Invalid password change"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("token" = [])),
    tag = "Authentication"
)]
pub async fn change_password(
    State(state): State<AppState>,
    caller: Authenticated,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = AccountService::change_password(
        &state.db,
        &state.policy,
        caller.account,
        PasswordChange {
            old_password: body.old_password,
            new_password: body.new_password,
            confirm_password: body.confirm_password,
        },
    )
    .await?;

    Ok(Json(TokenResponse { token }))
}
