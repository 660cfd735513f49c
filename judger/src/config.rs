use crate::provider::{JudgeResult, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_BASE_URL: &str = "https://leetcode.com";
pub const DEFAULT_SESSION_ENV: &str = "LEETCODE_SESSION";
pub const DEFAULT_CSRF_ENV: &str = "LEETCODE_CSRFTOKEN";

/// Client-side settings, read from `~/.kata/config.toml` unless told otherwise.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Registry name of the backend to use.
    pub provider: String,
    /// Language passed to the backend, e.g. `go` or `python3`.
    pub language: String,
    pub base_url: String,
    /// Timeout of a single HTTP request, independent of polling.
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_timeout_secs: u64,
    /// Environment variable holding the session cookie.
    pub session_env: String,
    /// Environment variable holding the CSRF token.
    pub csrf_env: String,
    /// Literal credentials, used when the environment has none.
    pub session: Option<String>,
    pub csrf_token: Option<String>,
    /// Where solution files live, one directory per problem.
    pub solutions_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            provider: "leetcode".into(),
            language: "go".into(),
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout_secs: 30,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT.as_secs(),
            session_env: DEFAULT_SESSION_ENV.into(),
            csrf_env: DEFAULT_CSRF_ENV.into(),
            session: None,
            csrf_token: None,
            solutions_dir: PathBuf::from("solutions"),
        }
    }
}

impl ClientConfig {
    /// Read config from `path`. A missing file yields the defaults.
    pub async fn load(path: &Path) -> JudgeResult<ClientConfig> {
        match tokio::fs::read_to_string(path).await {
            Ok(s) => Ok(toml::from_str(&s)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(ClientConfig::default())
            }
            Err(e) => Err(crate::judge::files::reading(e, path)),
        }
    }

    pub fn default_path() -> PathBuf {
        let mut p = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push(".kata");
        p.push("config.toml");
        p
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: ClientConfig = toml::from_str(
            r#"
            language = "python3"
            poll_interval_ms = 250
            session = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.language, "python3");
        assert_eq!(cfg.poll_interval(), Duration::from_millis(250));
        assert_eq!(cfg.poll_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.session.as_deref(), Some("abc"));
        assert_eq!(cfg.csrf_token, None);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let cfg = ClientConfig::load(Path::new("/definitely/not/here/config.toml"))
            .await
            .unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[tokio::test]
    async fn unreadable_file_is_named() {
        let dir = std::env::temp_dir();
        let err = ClientConfig::load(&dir).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(&dir.display().to_string()), "{}", msg);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = toml::from_str::<ClientConfig>("poll_interval_ms = \"soon\"")
            .map_err(crate::provider::JudgeError::from)
            .unwrap_err();
        assert!(matches!(err, crate::provider::JudgeError::Config(_)));
    }
}
