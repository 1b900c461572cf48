use config::{Environment, File, builder::DefaultState};
use secrecy::SecretString;
use serde::Deserialize;
use types::{Error, Result, err};
use url::Url;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_APP_NAME: &str = "Subscriptions Admin";
const DEFAULT_SESSION_TTL_HOURS: u32 = 12;

#[derive(Debug)]
pub struct Config {
    /// `None` when unset; login is then always refused.
    pub admin_username: Option<String>,
    pub admin_password: Option<SecretString>,
    pub backend_url: Url,
    pub app_name: String,
    pub session_secret: SecretString,
    pub session_ttl_hours: u32,
    pub secure_cookies: bool,
}

/// What the `config` crate hands us before validation.
#[derive(Deserialize)]
struct RawConfig {
    admin_username: Option<String>,
    admin_password: Option<String>,
    backend_url: Option<String>,
    app_name: Option<String>,
    session_secret: Option<String>,
    session_ttl_hours: Option<u32>,
    secure_cookies: Option<bool>,
}

impl Config {
    /// Load from an optional `subdash.toml` in the working directory,
    /// overridden by `SUBDASH_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::from_builder(
            config::Config::builder()
                .add_source(File::with_name("subdash").required(false))
                .add_source(environment()),
        )
    }

    fn from_builder(builder: config::ConfigBuilder<DefaultState>) -> Result<Self> {
        let raw: RawConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| err!("invalid configuration: {e}"))?;

        raw.try_into()
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let backend_url = raw.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL);
        let backend_url = Url::parse(backend_url)
            .map_err(|e| err!("invalid SUBDASH_BACKEND_URL '{backend_url}': {e}"))?;

        let session_secret = non_empty(raw.session_secret)
            .ok_or_else(|| err!("missing configuration: SUBDASH_SESSION_SECRET"))?;

        Ok(Self {
            admin_username: non_empty(raw.admin_username),
            admin_password: non_empty(raw.admin_password).map(Into::into),
            backend_url,
            app_name: non_empty(raw.app_name).unwrap_or_else(|| DEFAULT_APP_NAME.into()),
            session_secret: session_secret.into(),
            session_ttl_hours: raw.session_ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            secure_cookies: raw.secure_cookies.unwrap_or(false),
        })
    }
}

/// Values stay strings here. Numbers and booleans are converted when
/// `RawConfig` is deserialized, so credentials like `0012` survive intact.
fn environment() -> Environment {
    Environment::with_prefix("SUBDASH")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) fn test_config(username: Option<&str>, password: Option<&str>) -> Config {
    let mut builder = config::Config::builder()
        .set_override("session_secret", "test-signing-key")
        .unwrap();
    if let Some(username) = username {
        builder = builder.set_override("admin_username", username).unwrap();
    }
    if let Some(password) = password {
        builder = builder.set_override("admin_password", password).unwrap();
    }
    Config::from_builder(builder).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn builder() -> config::ConfigBuilder<DefaultState> {
        config::Config::builder()
    }

    #[test]
    fn defaults() {
        let config = Config::from_builder(builder().set_override("session_secret", "k").unwrap())
            .unwrap();

        assert_eq!(config.backend_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.app_name, "Subscriptions Admin");
        assert_eq!(config.session_ttl_hours, 12);
        assert!(!config.secure_cookies);
        assert!(config.admin_username.is_none());
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn overrides() {
        let config = Config::from_builder(
            builder()
                .set_override("session_secret", "k")
                .and_then(|b| b.set_override("admin_username", "admin"))
                .and_then(|b| b.set_override("admin_password", "s3cret"))
                .and_then(|b| b.set_override("backend_url", "https://billing.internal/v2/"))
                .and_then(|b| b.set_override("app_name", "Acme"))
                .and_then(|b| b.set_override("session_ttl_hours", 1))
                .and_then(|b| b.set_override("secure_cookies", true))
                .unwrap(),
        )
        .unwrap();

        assert_eq!(config.admin_username.as_deref(), Some("admin"));
        assert_eq!(
            config.admin_password.as_ref().map(|p| p.expose_secret()),
            Some("s3cret")
        );
        assert_eq!(config.backend_url.as_str(), "https://billing.internal/v2/");
        assert_eq!(config.app_name, "Acme");
        assert_eq!(config.session_ttl_hours, 1);
        assert!(config.secure_cookies);
    }

    #[test]
    fn empty_credentials_count_as_missing() {
        let config = test_config(Some(""), Some(""));
        assert!(config.admin_username.is_none());
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn session_secret_is_required() {
        let error = Config::from_builder(builder()).unwrap_err();
        assert!(error.to_string().contains("SUBDASH_SESSION_SECRET"));
    }

    #[test]
    fn rejects_bad_backend_url() {
        let error = Config::from_builder(
            builder()
                .set_override("session_secret", "k")
                .and_then(|b| b.set_override("backend_url", "not a url"))
                .unwrap(),
        )
        .unwrap_err();
        assert!(error.to_string().contains("SUBDASH_BACKEND_URL"));
    }

    fn from_env(vars: &[(&str, &str)]) -> Result<Config> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<_, _>>();
        Config::from_builder(builder().add_source(environment().source(Some(vars))))
    }

    #[test]
    fn env_credentials_are_kept_verbatim() {
        for password in ["0012", "Infinity", "TRUE", "1e3", "  padded "] {
            let config = from_env(&[
                ("SUBDASH_SESSION_SECRET", "k"),
                ("SUBDASH_ADMIN_USERNAME", "007"),
                ("SUBDASH_ADMIN_PASSWORD", password),
            ])
            .unwrap();

            assert_eq!(config.admin_username.as_deref(), Some("007"));
            assert_eq!(
                config.admin_password.as_ref().map(|p| p.expose_secret()),
                Some(password)
            );
            assert_eq!(
                crate::auth::check_credentials(&config, "007", password),
                crate::auth::LoginState::Authenticated
            );
        }
    }

    #[test]
    fn env_numbers_and_flags_are_parsed() {
        let config = from_env(&[
            ("SUBDASH_SESSION_SECRET", "k"),
            ("SUBDASH_SESSION_TTL_HOURS", "6"),
            ("SUBDASH_SECURE_COOKIES", "true"),
            ("SUBDASH_APP_NAME", "Billing"),
        ])
        .unwrap();

        assert_eq!(config.session_ttl_hours, 6);
        assert!(config.secure_cookies);
        assert_eq!(config.app_name, "Billing");
    }

    #[test]
    fn env_rejects_non_numeric_ttl() {
        let error = from_env(&[
            ("SUBDASH_SESSION_SECRET", "k"),
            ("SUBDASH_SESSION_TTL_HOURS", "soon"),
        ])
        .unwrap_err();
        assert!(error.to_string().contains("invalid configuration"));
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let config = test_config(Some("admin"), Some("s3cret"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("test-signing-key"));
    }
}
