pub mod auth;
mod auth_routes;
mod backend;
mod config;

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::http::HeaderMap;
use dioxus::fullstack::FullstackContext;
use jiff::Timestamp;
use tracing_subscriber::EnvFilter;
use types::{AdminSession, Error, Result, err};

use crate::auth_routes::{AuthState, auth_router};
pub use crate::backend::BackendClient;
pub use crate::config::Config;

static CONFIG: OnceLock<Arc<Config>> = OnceLock::new();
static BACKEND_CLIENT: OnceLock<BackendClient> = OnceLock::new();

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load configuration, build the backend client and return the routes this
/// crate serves next to the app.
pub async fn init() -> Result<Router> {
    let config = Arc::new(Config::load()?);
    let client = BackendClient::new(config.backend_url.clone())?;

    tracing::info!(
        backend_url = %config.backend_url,
        app_name = %config.app_name,
        admin_configured = config.admin_username.is_some() && config.admin_password.is_some(),
        "configuration loaded"
    );
    if config.admin_username.is_none() || config.admin_password.is_none() {
        tracing::warn!("admin credentials are not configured; every login will be refused");
    }

    CONFIG
        .set(config.clone())
        .map_err(|_| err!("server already initialized"))?;
    BACKEND_CLIENT
        .set(client)
        .map_err(|_| err!("server already initialized"))?;

    Ok(auth_router(AuthState { config }))
}

pub fn config() -> Result<&'static Config> {
    CONFIG
        .get()
        .map(Arc::as_ref)
        .ok_or_else(|| err!("server not initialized"))
}

pub fn backend() -> Result<&'static BackendClient> {
    BACKEND_CLIENT
        .get()
        .ok_or_else(|| err!("server not initialized"))
}

/// Extract and verify the admin session from the current request's cookie.
pub async fn get_session_from_cookie() -> Result<AdminSession> {
    let headers: HeaderMap = FullstackContext::extract()
        .await
        .map_err(Error::internal)?;

    let token = auth::session_token(&headers).ok_or(Error::Auth)?;
    auth::verify(&config()?.session_secret, &token, Timestamp::now())
}

/// Require an authenticated admin session, returning the session if valid.
///
/// Sessions issued to a previous admin username stop working once the
/// configured username changes.
pub async fn require_admin_session() -> Result<AdminSession> {
    let session = get_session_from_cookie().await?;

    if config()?.admin_username.as_deref() != Some(session.username.as_str()) {
        tracing::warn!(username = %session.username, "session does not belong to the configured admin");
        return Err(Error::Auth);
    }

    Ok(session)
}
