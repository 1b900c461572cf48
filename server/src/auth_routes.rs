use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use jiff::Timestamp;
use types::{LoginRequest, LoginResponse};

use crate::{
    auth::{self, LoginState},
    config::Config,
};

#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<Config>,
}

pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .with_state(state)
}

async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, LoginError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(%rejection, "malformed login request");
        LoginError::Malformed
    })?;

    if auth::check_credentials(&state.config, &request.username, &request.password)
        == LoginState::Unauthenticated
    {
        tracing::warn!(username = %request.username, "login rejected");
        return Err(LoginError::Rejected);
    }

    let (session, token) = auth::issue_session(&state.config, &request.username, Timestamp::now())
        .map_err(|error| {
            tracing::error!(%error, "failed to issue session");
            LoginError::Session
        })?;
    tracing::info!(username = %session.username, expires_at = %session.expires_at, "admin logged in");

    let cookie = auth::session_cookie(&state.config, token);
    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Json(LoginResponse::success()),
    )
        .into_response())
}

async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, auth::removal_cookie().to_string())],
        Redirect::to("/login"),
    )
}

#[derive(Debug)]
enum LoginError {
    Malformed,
    Rejected,
    Session,
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            LoginError::Rejected => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            LoginError::Malformed | LoginError::Session => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        };
        (status, Json(LoginResponse::failure(message))).into_response()
    }
}
