use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::{AppError, Result, Unavailable};

/// Retrieves one named JSON resource. Implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, resource: &str) -> Result<Value>;
}

/// Fetches `<base_url>/<resource>.json` over HTTP.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, resource: &str) -> String {
        format!("{}/{}.json", self.base_url, resource)
    }
}

fn transport_failure(resource: &str, err: reqwest::Error) -> AppError {
    let reason = if err.is_timeout() {
        Unavailable::Timeout
    } else {
        Unavailable::Transport(err.to_string())
    };
    AppError::unavailable(resource, reason)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, resource: &str) -> Result<Value> {
        let url = self.url(resource);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_failure(resource, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::unavailable(
                resource,
                Unavailable::Status(status.as_u16()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_failure(resource, e))?;

        serde_json::from_slice(&bytes).map_err(|source| AppError::Decode {
            resource: resource.to_string(),
            source,
        })
    }
}

/// Reads `<dir>/<resource>.json` from a local mirror of the API.
pub struct DirTransport {
    root: PathBuf,
}

impl DirTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, resource: &str) -> PathBuf {
        self.root.join(format!("{}.json", resource))
    }
}

#[async_trait]
impl Transport for DirTransport {
    async fn get_json(&self, resource: &str) -> Result<Value> {
        let path = self.path(resource);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::unavailable(resource, Unavailable::Missing));
            }
            Err(e) => {
                return Err(AppError::unavailable(
                    resource,
                    Unavailable::Transport(e.to_string()),
                ));
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| AppError::Decode {
            resource: resource.to_string(),
            source,
        })
    }
}
