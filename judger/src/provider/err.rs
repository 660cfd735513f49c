use err_derive::Error;
use std::{fmt::Debug, time::Duration};

pub type JudgeResult<T> = Result<T, JudgeError>;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error(display = "Web request error: {}", _0)]
    Request(#[error(source)] reqwest::Error),

    #[error(display = "{}: HTTP {}: {}", endpoint, status, body)]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error(display = "Malformed response: {}", _0)]
    Json(#[error(source)] serde_json::Error),

    #[error(display = "IO error: {}", _0)]
    Io(#[error(source)] std::io::Error),

    #[error(display = "Config error: {}", _0)]
    Config(#[error(source)] toml::de::Error),

    #[error(display = "not authenticated: {}", _0)]
    NotAuthenticated(String),

    #[error(display = "missing credentials: {}", _0)]
    MissingCredentials(String),

    #[error(display = "{}: empty {} (auth may have expired)", problem, field)]
    AuthExpired {
        problem: String,
        field: &'static str,
    },

    #[error(display = "{} not found", _0)]
    NotFound(String),

    #[error(display = "Timed out after {:?} waiting for a result", _0)]
    Timeout(Duration),

    #[error(display = "Provider {:?} does not support {}", provider, capability)]
    UnsupportedCapability {
        provider: String,
        capability: &'static str,
    },

    #[error(display = "unknown provider: {:?} (available: {})", name, available)]
    UnknownProvider { name: String, available: String },

    #[error(display = "{:#}", _0)]
    Any(anyhow::Error),
}

impl JudgeError {
    /// Whether trying the same request again later might succeed. Judged
    /// verdicts never reach this type, so `false` means the caller has to fix
    /// something (credentials, problem id, provider) first.
    pub fn is_retryable(&self) -> bool {
        match self {
            JudgeError::Timeout(_) | JudgeError::Request(_) => true,
            JudgeError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Whether fixing credentials is the way out of this error.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            JudgeError::NotAuthenticated(_)
                | JudgeError::MissingCredentials(_)
                | JudgeError::AuthExpired { .. }
                | JudgeError::Http {
                    status: 401 | 403,
                    ..
                }
        )
    }
}

macro_rules! anyhow_downcast_chain {
    ($e:expr, $($ty:ty),*) => {
        // only an error without context is unwrapped, so the context survives
        $(if $e.chain().next().map_or(false, |top| top.is::<$ty>()) {
            return match $e.downcast::<$ty>() {
                Ok(e) => e.into(),
                Err(e) => JudgeError::Any(e),
            };
        })*
    };
}

impl From<anyhow::Error> for JudgeError {
    fn from(e: anyhow::Error) -> Self {
        anyhow_downcast_chain!(
            e,
            JudgeError,
            std::io::Error,
            serde_json::Error,
            reqwest::Error
        );
        JudgeError::Any(e)
    }
}
