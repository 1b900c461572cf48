use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const SESSION_COOKIE_NAME: &str = "subdash_session";

/// Claims carried by the session cookie. The server signs these; see
/// `server::auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub username: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl AdminSession {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Success { success: bool },
    Failure { error: String },
}

impl LoginResponse {
    pub fn success() -> Self {
        Self::Success { success: true }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }
}

pub fn encode_claims(session: &AdminSession) -> Result<String> {
    let json = serde_json::to_vec(session)?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_claims(encoded: &str) -> Result<AdminSession> {
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(encoded)?;
    serde_json::from_slice(&bytes).map_err(|_| Error::Auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::ToSpan;

    #[test]
    fn claims_round_trip() {
        let issued_at = Timestamp::from_second(1_700_000_000).unwrap();
        let session = AdminSession {
            username: "admin".into(),
            issued_at,
            expires_at: issued_at + 12.hours(),
        };

        let encoded = encode_claims(&session).unwrap();
        assert!(!encoded.contains('.'));
        assert_eq!(decode_claims(&encoded).unwrap(), session);
        assert!(!session.is_expired_at(issued_at + 11.hours()));
        assert!(session.is_expired_at(issued_at + 12.hours()));
    }

    #[test]
    fn login_response_shapes() {
        assert_eq!(
            serde_json::to_value(LoginResponse::success()).unwrap(),
            serde_json::json!({ "success": true })
        );
        assert_eq!(
            serde_json::to_value(LoginResponse::failure("Invalid credentials")).unwrap(),
            serde_json::json!({ "error": "Invalid credentials" })
        );
    }
}
