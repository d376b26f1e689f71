//! HTTP client for the admin listing endpoint.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::application::ApplicationRow;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("invalid or missing admin secret")]
    Unauthorized,

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    base_url: String,
}

impl AdminClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DashboardError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetches every application, newest first. A 401 maps to `Unauthorized`.
    pub async fn fetch_applications(
        &self,
        secret: &str,
    ) -> Result<Vec<ApplicationRow>, DashboardError> {
        let url = format!("{}/api/applications", self.base_url);
        debug!("GET {url}");

        let response = self.client.get(&url).bearer_auth(secret).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(DashboardError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(DashboardError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
