use std::env;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub session_token: Option<String>,
    pub session_user_id: Option<String>,
    pub jwt_secret: Option<String>,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = get("API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = get("REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            session_token: get("SESSION_TOKEN"),
            session_user_id: get("SESSION_USER_ID"),
            jwt_secret: get("JWT_SECRET"),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
