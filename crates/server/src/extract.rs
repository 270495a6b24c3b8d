use crate::{error::ApiError, state::AppState};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use database::{
    entities::accounts,
    services::{accounts::AccountService, identity::IdentityService},
};
use models::identity::Identity;

/// The caller of a request; anonymous when no credentials were sent.
///
/// A token that does not resolve to an active account is rejected with 401.
pub struct Caller {
    pub account: Option<accounts::Model>,
    pub identity: Identity,
}

/// A caller that must present a valid token
pub struct Authenticated {
    pub account: accounts::Model,
    pub identity: Identity,
}

/// Token from `Authorization: Token <key>` or `Authorization: Bearer <key>`
pub fn token_from_header(value: &str) -> Option<&str> {
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();

    if key.is_empty() {
        return None;
    }

    (scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")).then_some(key)
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self {
                account: None,
                identity: Identity::Anonymous,
            });
        };

        let token = header
            .to_str()
            .ok()
            .and_then(token_from_header)
            .ok_or_else(ApiError::unauthenticated)?;

        let account = AccountService::authenticate(&state.db, token)
            .await?
            .ok_or_else(ApiError::unauthenticated)?;
        let identity = IdentityService::resolve(&state.db, Some(&account)).await?;

        Ok(Self {
            account: Some(account),
            identity,
        })
    }
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;

        match caller.account {
            Some(account) => Ok(Self {
                account,
                identity: caller.identity,
            }),
            None => Err(ApiError::unauthenticated()),
        }
    }
}
