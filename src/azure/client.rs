use crate::azure::auth::Credential;
use reqwest::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("{}", status_message(.status, .url, .body))]
    Status { status: u16, url: String, body: String },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("PR response missing repository.id")]
    MissingRepositoryId,
}

impl AzureError {
    /// HTTP status of a non-2xx response, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AzureError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn status_message(status: &u16, url: &str, body: &str) -> String {
    if body.is_empty() {
        format!("request failed ({}): {}", status, url)
    } else {
        format!("request failed ({}): {}: {}", status, url, body)
    }
}

/// Authenticated GET-only client for the Azure DevOps REST API.
pub struct AzureDevOpsClient {
    client: Client,
    credential: Credential,
    base_url: String,
}

impl AzureDevOpsClient {
    pub fn new(credential: Credential) -> Result<Self, AzureError> {
        Self::with_base_url(credential, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(credential: Credential, base_url: &str) -> Result<Self, AzureError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = match base_url.trim_end_matches('/') {
            "" => DEFAULT_BASE_URL.to_string(),
            trimmed => trimmed.to_string(),
        };
        Ok(Self {
            client,
            credential,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds `{base}/{org}/{project}/_apis/{path}` with the org and project
    /// percent-encoded.
    pub fn api_url(&self, organization: &str, project: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/_apis/{}",
            self.base_url,
            urlencoding::encode(organization),
            urlencoding::encode(project),
            path
        )
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, AzureError> {
        let (data, _) = self.get_with_headers(url).await?;
        Ok(data)
    }

    /// GET request that returns both the decoded body and the response headers.
    pub async fn get_with_headers<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(T, HeaderMap), AzureError> {
        log::debug!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.credential.authorization_header())
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let headers = response.headers().clone();

        log::debug!("Response status: {}", status);

        if !status.is_success() {
            let body = read_error_body(response).await;
            log::debug!("Error response: {}", body);
            return Err(AzureError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let response_text = response.text().await?;
        let data = serde_json::from_str(&response_text)?;
        Ok((data, headers))
    }
}

/// Reads at most [`MAX_ERROR_BODY_BYTES`] of an error response. A broken body
/// ends the read early; the status is what matters.
async fn read_error_body(mut response: Response) -> String {
    let mut buf = Vec::new();
    while buf.len() < MAX_ERROR_BODY_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(MAX_ERROR_BODY_BYTES - buf.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(e) => {
                log::debug!("Error body read failed: {}", e);
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).trim().to_string()
}
