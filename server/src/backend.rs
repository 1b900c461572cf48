use reqwest::{
    Client, Method, RequestBuilder, StatusCode, Url,
    header::{self, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use types::{Error, Result, UserSubscription, err};

trait ReqwestExt {
    async fn try_send<T: DeserializeOwned>(self) -> Result<T>;
}

impl ReqwestExt for RequestBuilder {
    async fn try_send<T: DeserializeOwned>(self) -> Result<T> {
        let response = self
            .send()
            .await
            .map_err(|e| Error::Network(e.without_url().to_string()))?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = failure_message(status, &body);
            tracing::warn!(%status, %url, %message, "backend request failed");
            return Err(if status == StatusCode::NOT_FOUND {
                Error::NotFound(message)
            } else {
                Error::Http {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        match serde_json::from_slice(&body) {
            Ok(r) => Ok(r),
            Err(error) => {
                tracing::debug!(?error, %url, "failed to parse backend response");
                Err(err!("unexpected response from backend: {error}"))
            }
        }
    }
}

/// Pull a human readable message out of an error response. The backend
/// reports errors as `{"detail": ...}`.
fn failure_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body)
        && let Some(detail) = map.get("detail")
    {
        return match detail {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("error").to_string()
    } else {
        text.to_string()
    }
}

/// Client for the subscriptions backend.
///
/// Every call is a single request. Nothing is retried.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| err!("failed to build http client: {e}"))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a URL below the base URL. Segments are percent-encoded, so an
    /// email can't escape its path segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| err!("backend url '{}' cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.request(method, self.url(segments)?))
    }

    fn get(&self, segments: &[&str]) -> Result<RequestBuilder> {
        self.request(Method::GET, segments)
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder> {
        self.request(Method::POST, segments)
    }

    pub async fn list_users(&self) -> Result<Vec<UserSubscription>> {
        self.get(&["api", "users", ""])?.try_send().await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<UserSubscription> {
        self.get(&["api", "users", "by-email", email])?
            .try_send()
            .await
    }

    pub async fn create_user(&self, email: &str) -> Result<UserSubscription> {
        self.post(&["api", "users", ""])?
            .json(&json!({ "email": email }))
            .try_send()
            .await
    }

    pub async fn sync_user_subscription(&self, user_id: i64) -> Result<Value> {
        self.post(&["api", "users", "sync", &user_id.to_string()])?
            .try_send()
            .await
    }

    pub async fn sync_all_subscriptions(&self) -> Result<Value> {
        self.post(&["api", "subscriptions", "sync-all"])?
            .try_send()
            .await
    }

    pub async fn check_subscription(&self, email: &str) -> Result<Value> {
        self.get(&["api", "subscriptions", "check", email])?
            .try_send()
            .await
    }

    pub async fn get_cached_subscription(&self, email: &str) -> Result<Value> {
        self.get(&["api", "subscriptions", "cached", email])?
            .try_send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Path,
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
    };
    use types::SubscriptionStatus;

    fn record(id: i64, email: &str) -> Value {
        json!({
            "id": id,
            "email": email,
            "subscription_status": "PAID",
            "plan_id": 2,
            "created_at": "2024-03-01T09:00:00"
        })
    }

    fn stub() -> Router {
        Router::new()
            .route(
                "/api/users/",
                get(|| async { Json(json!([record(1, "a@example.com"), record(2, "b@example.com")])) })
                    .post(|Json(body): Json<Value>| async move {
                        let email = body["email"].as_str().unwrap_or_default().to_string();
                        Json(record(42, &email))
                    }),
            )
            .route(
                "/api/users/by-email/{email}",
                get(|Path(email): Path<String>| async move {
                    if email == "a@example.com" {
                        Json(record(1, &email)).into_response()
                    } else {
                        (
                            StatusCode::NOT_FOUND,
                            Json(json!({ "detail": format!("no user {email}") })),
                        )
                            .into_response()
                    }
                }),
            )
            .route(
                "/api/users/sync/{id}",
                post(|Path(id): Path<i64>| async move { Json(json!({ "synced": id })) }),
            )
            .route(
                "/api/subscriptions/sync-all",
                post(|| async {
                    (StatusCode::SERVICE_UNAVAILABLE, "upstream billing is down")
                }),
            )
            .route(
                "/api/subscriptions/check/{email}",
                get(|Path(email): Path<String>| async move {
                    Json(json!({ "email": email, "status": "PAID" }))
                }),
            )
            .route(
                "/api/subscriptions/cached/{email}",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "") }),
            )
    }

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    async fn client() -> BackendClient {
        BackendClient::new(serve(stub()).await).unwrap()
    }

    #[tokio::test]
    async fn lists_users() {
        let users = client().await.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "a@example.com");
        assert_eq!(users[1].subscription_status, Some(SubscriptionStatus::Paid));
    }

    #[tokio::test]
    async fn finds_user_by_email() {
        let user = client().await.get_user_by_email("a@example.com").await.unwrap();
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let error = client()
            .await
            .get_user_by_email("no/such@example.com")
            .await
            .unwrap_err();
        // The slash arrives intact, so it was encoded rather than routed.
        assert_eq!(error, Error::NotFound("no user no/such@example.com".into()));
    }

    #[tokio::test]
    async fn creates_user() {
        let user = client().await.create_user("new@example.com").await.unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.email, "new@example.com");
    }

    #[tokio::test]
    async fn syncs_one_user() {
        let result = client().await.sync_user_subscription(9).await.unwrap();
        assert_eq!(result, json!({ "synced": 9 }));
    }

    #[tokio::test]
    async fn sync_all_failure_carries_status_and_body() {
        let error = client().await.sync_all_subscriptions().await.unwrap_err();
        assert_eq!(
            error,
            Error::Http {
                status: 503,
                message: "upstream billing is down".into()
            }
        );
    }

    #[tokio::test]
    async fn checks_subscription() {
        let result = client().await.check_subscription("a@example.com").await.unwrap();
        assert_eq!(result["status"], "PAID");
    }

    #[tokio::test]
    async fn empty_error_body_uses_reason_phrase() {
        let error = client()
            .await
            .get_cached_subscription("a@example.com")
            .await
            .unwrap_err();
        assert_eq!(
            error,
            Error::Http {
                status: 500,
                message: "Internal Server Error".into()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = BackendClient::new(Url::parse(&format!("http://{addr}")).unwrap()).unwrap();
        let error = client.list_users().await.unwrap_err();
        assert!(matches!(error, Error::Network(_)), "{error:?}");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let client =
            BackendClient::new(Url::parse("https://billing.internal/v2/").unwrap()).unwrap();
        assert_eq!(
            client.url(&["api", "users", ""]).unwrap().as_str(),
            "https://billing.internal/v2/api/users/"
        );
        assert_eq!(
            client
                .url(&["api", "subscriptions", "check", "a b@example.com"])
                .unwrap()
                .as_str(),
            "https://billing.internal/v2/api/subscriptions/check/a%20b@example.com"
        );
    }

    #[test]
    fn failure_message_prefers_detail() {
        assert_eq!(
            failure_message(StatusCode::UNPROCESSABLE_ENTITY, br#"{"detail":[{"msg":"bad"}]}"#),
            r#"[{"msg":"bad"}]"#
        );
        assert_eq!(
            failure_message(StatusCode::BAD_REQUEST, br#"{"detail":"nope"}"#),
            "nope"
        );
        assert_eq!(failure_message(StatusCode::BAD_GATEWAY, b"  "), "Bad Gateway");
    }
}
