use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "HealthPredict";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "healthpredict_lib=info,tower_http=warn"
}

/// Get the application data directory (`<platform data dir>/HealthPredict`).
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_NAME))
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Cannot determine a data directory; set HEALTHPREDICT_DB")]
    NoDataDir,
}

/// Connection settings for the OpenAI-compatible chat completion API.
#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Built frontend to serve for non-API paths.
    pub static_dir: Option<PathBuf>,
    pub secure_cookies: bool,
    pub cors_origin: Option<String>,
    /// Key anonymous rate limits on `X-Forwarded-For` instead of the peer
    /// address. Only safe behind a proxy that overwrites the header.
    pub trust_proxy: bool,
    pub password_iterations: u32,
    /// `None` when no API key is set; AI endpoints then answer 503.
    pub llm: Option<LlmConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_or(
            "HEALTHPREDICT_BIND",
            get("HEALTHPREDICT_BIND"),
            DEFAULT_BIND,
        )?;

        let db_path = match get("HEALTHPREDICT_DB") {
            Some(path) => PathBuf::from(path),
            None => app_data_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join("healthpredict.db"),
        };

        let secure_cookies = match get("HEALTHPREDICT_SECURE_COOKIES") {
            Some(v) => parse_bool("HEALTHPREDICT_SECURE_COOKIES", &v)?,
            None => false,
        };

        let trust_proxy = match get("HEALTHPREDICT_TRUST_PROXY") {
            Some(v) => parse_bool("HEALTHPREDICT_TRUST_PROXY", &v)?,
            None => false,
        };

        let password_iterations: u32 = parse_or(
            "HEALTHPREDICT_PBKDF2_ITERATIONS",
            get("HEALTHPREDICT_PBKDF2_ITERATIONS"),
            &crate::auth::DEFAULT_ITERATIONS.to_string(),
        )?;
        if password_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                var: "HEALTHPREDICT_PBKDF2_ITERATIONS",
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }

        let llm = match get("OPENAI_API_KEY") {
            Some(api_key) => Some(LlmConfig {
                api_key,
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                timeout_secs: parse_or(
                    "OPENAI_TIMEOUT_SECS",
                    get("OPENAI_TIMEOUT_SECS"),
                    &DEFAULT_LLM_TIMEOUT_SECS.to_string(),
                )?,
            }),
            None => None,
        };

        Ok(Self {
            bind_addr,
            db_path,
            static_dir: get("HEALTHPREDICT_STATIC_DIR").map(PathBuf::from),
            secure_cookies,
            cors_origin: get("HEALTHPREDICT_CORS_ORIGIN"),
            trust_proxy,
            password_iterations,
            llm,
        })
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        reason: e.to_string(),
        value: raw.clone(),
    })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "expected true or false".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = AppConfig::from_lookup(lookup(&[("HEALTHPREDICT_DB", "/tmp/hp.db")])).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND);
        assert_eq!(config.db_path, PathBuf::from("/tmp/hp.db"));
        assert!(!config.secure_cookies);
        assert!(!config.trust_proxy);
        assert!(config.static_dir.is_none());
        assert!(config.llm.is_none());
        assert_eq!(config.password_iterations, crate::auth::DEFAULT_ITERATIONS);
    }

    #[test]
    fn llm_enabled_by_api_key() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HEALTHPREDICT_DB", "/tmp/hp.db"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
        ]))
        .unwrap();
        let llm = config.llm.unwrap();
        assert_eq!(llm.base_url, "http://localhost:8080/v1");
        assert_eq!(llm.model, DEFAULT_LLM_MODEL);
        assert_eq!(llm.timeout_secs, DEFAULT_LLM_TIMEOUT_SECS);
    }

    #[test]
    fn blank_api_key_means_unconfigured() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HEALTHPREDICT_DB", "/tmp/hp.db"),
            ("OPENAI_API_KEY", "   "),
        ]))
        .unwrap();
        assert!(config.llm.is_none());
    }

    #[test]
    fn invalid_bind_reported_with_variable() {
        let err = AppConfig::from_lookup(lookup(&[
            ("HEALTHPREDICT_DB", "/tmp/hp.db"),
            ("HEALTHPREDICT_BIND", "not-an-addr"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: "HEALTHPREDICT_BIND", .. }
        ));
    }

    #[test]
    fn secure_cookie_flag_parsing() {
        let on = AppConfig::from_lookup(lookup(&[
            ("HEALTHPREDICT_DB", "/tmp/hp.db"),
            ("HEALTHPREDICT_SECURE_COOKIES", "TRUE"),
        ]))
        .unwrap();
        assert!(on.secure_cookies);

        let bad = AppConfig::from_lookup(lookup(&[
            ("HEALTHPREDICT_DB", "/tmp/hp.db"),
            ("HEALTHPREDICT_SECURE_COOKIES", "maybe"),
        ]));
        assert!(bad.is_err());
    }

    #[test]
    fn trust_proxy_flag_parsing() {
        let on = AppConfig::from_lookup(lookup(&[
            ("HEALTHPREDICT_DB", "/tmp/hp.db"),
            ("HEALTHPREDICT_TRUST_PROXY", "1"),
        ]))
        .unwrap();
        assert!(on.trust_proxy);

        let err = AppConfig::from_lookup(lookup(&[
            ("HEALTHPREDICT_DB", "/tmp/hp.db"),
            ("HEALTHPREDICT_TRUST_PROXY", "sometimes"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: "HEALTHPREDICT_TRUST_PROXY", .. }
        ));
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("HEALTHPREDICT_DB", "/tmp/hp.db"),
            ("HEALTHPREDICT_PBKDF2_ITERATIONS", "0"),
        ]));
        assert!(err.is_err());
    }

    #[test]
    fn api_key_not_in_debug_output() {
        let llm = LlmConfig {
            api_key: "sk-very-secret".into(),
            base_url: DEFAULT_LLM_BASE_URL.into(),
            model: DEFAULT_LLM_MODEL.into(),
            timeout_secs: 5,
        };
        assert!(!format!("{llm:?}").contains("sk-very-secret"));
    }

    #[test]
    fn app_name_is_healthpredict() {
        assert_eq!(APP_NAME, "HealthPredict");
    }
}
