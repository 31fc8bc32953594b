use std::fmt;

use thiserror::Error;

/// Why a resource could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The server answered with a non-success status.
    Status(u16),
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The resource does not exist in a local mirror.
    Missing,
    /// Connection, TLS or body read failure.
    Transport(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Status(code) => write!(f, "HTTP {}", code),
            Unavailable::Timeout => write!(f, "timed out"),
            Unavailable::Missing => write!(f, "missing"),
            Unavailable::Transport(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource {resource} unavailable: {reason}")]
    ResourceUnavailable {
        resource: String,
        reason: Unavailable,
    },

    #[error("failed to decode {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("metadata unavailable: {0}")]
    MetadataMissing(#[source] Box<AppError>),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn unavailable(resource: impl Into<String>, reason: Unavailable) -> Self {
        AppError::ResourceUnavailable {
            resource: resource.into(),
            reason,
        }
    }

    /// True when the resource simply does not exist, as opposed to a
    /// transport failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::ResourceUnavailable {
                reason: Unavailable::Status(404) | Unavailable::Status(410) | Unavailable::Missing,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
