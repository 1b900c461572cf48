//! Server functions backing the dashboard.
//!
//! Everything except [`app_name`] and [`get_current_session`] requires a
//! valid admin session and answers 401 without one.

use dioxus::prelude::*;
use serde_json::Value;
use types::{AdminSession, UserSubscription};

#[cfg(feature = "server")]
fn server_error(error: types::Error) -> ServerFnError {
    ServerFnError::ServerError {
        message: error.to_string(),
        code: error.status_code(),
        details: serde_json::to_value(&error).ok(),
    }
}

#[cfg(feature = "server")]
async fn admin_backend() -> ServerFnResult<&'static server::BackendClient> {
    server::require_admin_session().await.map_err(server_error)?;
    server::backend().map_err(server_error)
}

#[post("/api/dashboard/app-name")]
pub async fn app_name() -> ServerFnResult<String> {
    Ok(server::config().map_err(server_error)?.app_name.clone())
}

#[post("/api/dashboard/session")]
pub async fn get_current_session() -> ServerFnResult<Option<AdminSession>> {
    match server::require_admin_session().await {
        Ok(session) => Ok(Some(session)),
        Err(_) => Ok(None),
    }
}

#[post("/api/dashboard/users")]
pub async fn list_users() -> ServerFnResult<Vec<UserSubscription>> {
    admin_backend().await?.list_users().await.map_err(server_error)
}

#[post("/api/dashboard/users/by-email")]
pub async fn get_user_by_email(email: String) -> ServerFnResult<UserSubscription> {
    admin_backend()
        .await?
        .get_user_by_email(&email)
        .await
        .map_err(server_error)
}

#[post("/api/dashboard/users/create")]
pub async fn create_user(email: String) -> ServerFnResult<UserSubscription> {
    admin_backend()
        .await?
        .create_user(&email)
        .await
        .map_err(server_error)
}

#[post("/api/dashboard/users/sync")]
pub async fn sync_user_subscription(user_id: i64) -> ServerFnResult<Value> {
    let result = admin_backend()
        .await?
        .sync_user_subscription(user_id)
        .await
        .map_err(server_error)?;
    tracing::info!(user_id, "synced user subscription");
    Ok(result)
}

#[post("/api/dashboard/subscriptions/sync-all")]
pub async fn sync_all_subscriptions() -> ServerFnResult<Value> {
    let backend = admin_backend().await?;
    tracing::info!("syncing all subscriptions");
    let result = backend
        .sync_all_subscriptions()
        .await
        .map_err(server_error)?;
    tracing::info!(%result, "sync of all subscriptions finished");
    Ok(result)
}

#[post("/api/dashboard/subscriptions/check")]
pub async fn check_subscription(email: String) -> ServerFnResult<Value> {
    admin_backend()
        .await?
        .check_subscription(&email)
        .await
        .map_err(server_error)
}

#[post("/api/dashboard/subscriptions/cached")]
pub async fn get_cached_subscription(email: String) -> ServerFnResult<Value> {
    admin_backend()
        .await?
        .get_cached_subscription(&email)
        .await
        .map_err(server_error)
}
