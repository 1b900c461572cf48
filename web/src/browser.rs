//! Small bridges to browser APIs via `eval`.
//!
//! Values are passed over the eval channel instead of being formatted into
//! the script, so nothing user-supplied is ever interpreted as JavaScript.

use dioxus::document::eval;
use serde::Deserialize;
use types::{Error, LoginRequest, Result};

const LOGIN_JS: &str = r#"
const body = await dioxus.recv();
try {
    const response = await fetch("/auth/login", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        credentials: "same-origin",
        body: JSON.stringify(body),
    });
    let payload = {};
    try { payload = await response.json(); } catch (_) {}
    dioxus.send({ status: response.status, error: payload.error ?? null });
} catch (e) {
    dioxus.send({ status: 0, error: String(e) });
}
"#;

const COPY_JS: &str = r#"
const text = await dioxus.recv();
try {
    await navigator.clipboard.writeText(text);
    dioxus.send(null);
} catch (e) {
    dioxus.send(String(e));
}
"#;

#[derive(Deserialize)]
struct LoginOutcome {
    status: u16,
    error: Option<String>,
}

/// Post credentials to `/auth/login`. On success the browser now holds the
/// session cookie.
pub async fn login(request: &LoginRequest) -> Result<()> {
    let mut js = eval(LOGIN_JS);
    js.send(request).map_err(|e| Error::Network(e.to_string()))?;
    let outcome: LoginOutcome = js
        .recv()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    match outcome.status {
        200 => Ok(()),
        401 => Err(Error::Auth),
        0 => Err(Error::Network(outcome.error.unwrap_or_default())),
        status => Err(Error::Http {
            status,
            message: outcome.error.unwrap_or_else(|| "Server error".to_string()),
        }),
    }
}

pub async fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut js = eval(COPY_JS);
    js.send(text).map_err(|e| Error::Clipboard(e.to_string()))?;
    match js.recv::<Option<String>>().await {
        Ok(None) => Ok(()),
        Ok(Some(reason)) => Err(Error::Clipboard(reason)),
        Err(e) => Err(Error::Clipboard(e.to_string())),
    }
}
