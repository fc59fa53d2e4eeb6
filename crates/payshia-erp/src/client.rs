//! # ERP HTTP Client
//!
//! Thin wrapper over `reqwest` shared by the catalog, stock and invoice
//! calls.
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transport failure / timeout ─────────► ErpError::Http                  │
//! │  non-2xx with {"message": "..."} ─────► ErpError::Api { message }       │
//! │  non-2xx, any other body ─────────────► ErpError::Api { body text }     │
//! │  2xx, body not the expected shape ────► ErpError::InvalidResponse       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::ErpConfig;
use crate::error::{ErpError, ErpResult};

/// Error body the ERP sends with failures.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client bound to one backend and one company/location.
#[derive(Debug, Clone)]
pub struct ErpClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    company_id: String,
    location_id: String,
}

impl ErpClient {
    pub fn new(config: &ErpConfig) -> ErpResult<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(ErpClient {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            token: config.api.token.clone(),
            company_id: config.terminal.company_id.clone(),
            location_id: config.terminal.location_id.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ErpResult<T> {
        debug!(path, "GET");
        let request = self.authorize(self.http.get(self.url(path)).query(query));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> ErpResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(path, "POST");
        let request = self.authorize(self.http.post(self.url(path)).json(body));
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> ErpResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => body.message,
                Err(_) if text.trim().is_empty() => status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
                Err(_) => text,
            };
            return Err(ErpError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(status = status.as_u16(), body = %text, error = %e, "Unreadable ERP response");
            ErpError::InvalidResponse(e.to_string())
        })
    }
}
