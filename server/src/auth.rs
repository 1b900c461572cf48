use axum::http::{HeaderMap, header};
use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use jiff::{Timestamp, ToSpan};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use types::{
    AdminSession, Error, Result, SESSION_COOKIE_NAME,
    session::{decode_claims, encode_claims},
};

use crate::config::Config;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Authenticated,
    Unauthenticated,
}

/// Compare submitted credentials against the configured ones. If either is
/// not configured, nobody gets in.
pub fn check_credentials(config: &Config, username: &str, password: &str) -> LoginState {
    let (Some(expected_user), Some(expected_password)) =
        (&config.admin_username, &config.admin_password)
    else {
        return LoginState::Unauthenticated;
    };

    let key = &config.session_secret;
    let user_ok = digests_match(key, username, expected_user);
    let password_ok = digests_match(key, password, expected_password.expose_secret());
    if user_ok & password_ok {
        LoginState::Authenticated
    } else {
        LoginState::Unauthenticated
    }
}

/// Constant-time equality: both sides are reduced to HMAC digests, which
/// `verify_slice` compares without short-circuiting.
fn digests_match(key: &SecretString, submitted: &str, expected: &str) -> bool {
    let Ok(expected) = mac(key, expected).map(|m| m.finalize().into_bytes()) else {
        return false;
    };
    mac(key, submitted).is_ok_and(|m| m.verify_slice(&expected).is_ok())
}

/// Start a session for `username`, returning the claims and the signed
/// cookie value.
pub fn issue_session(
    config: &Config,
    username: &str,
    now: Timestamp,
) -> Result<(AdminSession, String)> {
    let session = AdminSession {
        username: username.to_string(),
        issued_at: now,
        expires_at: now.checked_add(i64::from(config.session_ttl_hours).hours())?,
    };
    let token = sign(&config.session_secret, &session)?;
    Ok((session, token))
}

fn mac(secret: &SecretString, payload: &str) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(Error::internal)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

/// `payload.signature`, both base64url.
pub fn sign(secret: &SecretString, session: &AdminSession) -> Result<String> {
    let payload = encode_claims(session)?;
    let signature = BASE64_URL_SAFE_NO_PAD.encode(mac(secret, &payload)?.finalize().into_bytes());
    Ok(format!("{payload}.{signature}"))
}

/// Check the signature, then the expiry. Any failure is [`Error::Auth`].
pub fn verify(secret: &SecretString, token: &str, now: Timestamp) -> Result<AdminSession> {
    let (payload, signature_b64) = token.split_once('.').ok_or(Error::Auth)?;

    let signature = BASE64_URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| Error::Auth)?;
    mac(secret, payload)?
        .verify_slice(&signature)
        .map_err(|_| Error::Auth)?;

    let session = decode_claims(payload).map_err(|_| Error::Auth)?;
    if session.is_expired_at(now) {
        return Err(Error::Auth);
    }

    Ok(session)
}

/// Find the session cookie's value in request headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse(v))
        .filter_map(|c| c.ok())
        .find(|c| c.name() == SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
}

pub fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(cookie::time::Duration::hours(i64::from(config.session_ttl_hours)))
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use axum::http::HeaderValue;

    fn now() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    #[test]
    fn credentials_must_match_exactly() {
        let config = test_config(Some("admin"), Some("s3cret"));
        assert_eq!(
            check_credentials(&config, "admin", "s3cret"),
            LoginState::Authenticated
        );
        for (user, pass) in [
            ("admin", "wrong"),
            ("root", "s3cret"),
            ("Admin", "s3cret"),
            ("admin", "s3cret "),
            ("", ""),
        ] {
            assert_eq!(
                check_credentials(&config, user, pass),
                LoginState::Unauthenticated,
                "{user}/{pass}"
            );
        }
    }

    #[test]
    fn digest_comparison_is_exact() {
        let key = SecretString::from("k".to_string());
        assert!(digests_match(&key, "s3cret", "s3cret"));
        assert!(digests_match(&key, "", ""));
        for (submitted, expected) in [
            ("s3cret", "s3cre"),
            ("s3cre", "s3cret"),
            ("0012", "12"),
            ("", "x"),
        ] {
            assert!(
                !digests_match(&key, submitted, expected),
                "{submitted}/{expected}"
            );
        }
    }

    #[test]
    fn missing_configuration_never_authenticates() {
        for config in [
            test_config(None, None),
            test_config(Some("admin"), None),
            test_config(None, Some("s3cret")),
        ] {
            assert_eq!(
                check_credentials(&config, "admin", "s3cret"),
                LoginState::Unauthenticated
            );
            assert_eq!(check_credentials(&config, "", ""), LoginState::Unauthenticated);
        }
    }

    #[test]
    fn issued_session_verifies() {
        let config = test_config(Some("admin"), Some("s3cret"));
        let (session, token) = issue_session(&config, "admin", now()).unwrap();

        assert_eq!(session.expires_at, now() + 12.hours());
        let verified = verify(&config.session_secret, &token, now() + 1.hour()).unwrap();
        assert_eq!(verified, session);
    }

    #[test]
    fn rejects_expired_session() {
        let config = test_config(Some("admin"), Some("s3cret"));
        let (_, token) = issue_session(&config, "admin", now()).unwrap();
        assert_eq!(
            verify(&config.session_secret, &token, now() + 12.hours()),
            Err(Error::Auth)
        );
    }

    #[test]
    fn rejects_tampering() {
        let config = test_config(Some("admin"), Some("s3cret"));
        let (mut session, token) = issue_session(&config, "admin", now()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        session.expires_at = now() + 1000.hours();
        let forged = format!("{}.{signature}", encode_claims(&session).unwrap());
        assert_eq!(
            verify(&config.session_secret, &forged, now()),
            Err(Error::Auth)
        );

        for garbage in ["", ".", "abc", "abc.def", "a.b.c"] {
            assert_eq!(
                verify(&config.session_secret, garbage, now()),
                Err(Error::Auth)
            );
        }
    }

    #[test]
    fn rejects_other_secret() {
        let config = test_config(Some("admin"), Some("s3cret"));
        let (_, token) = issue_session(&config, "admin", now()).unwrap();
        let other = SecretString::from("another-key".to_string());
        assert_eq!(verify(&other, &token, now()), Err(Error::Auth));
    }

    #[test]
    fn finds_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("a=1; subdash_session=tok.sig; b=2"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok.sig"));
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn cookies_are_http_only() {
        let config = test_config(None, None);
        let cookie = session_cookie(&config, "tok.sig".into()).to_string();
        assert!(cookie.starts_with("subdash_session=tok.sig"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
        assert!(removal_cookie().to_string().contains("Max-Age=0"));
    }
}
