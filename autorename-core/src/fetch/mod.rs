//! Fetching the renumbering workbook from the document store

use crate::config::{Backend, RenameConfig};
use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub mod graph;
pub mod legacy;
pub mod local;

pub use graph::GraphFetcher;
pub use legacy::LegacyFetcher;
pub use local::LocalFetcher;

/// Trait that every workbook source must implement
pub trait RemoteFetcher {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Download the workbook to `destination`, overwriting any existing file
    fn fetch(&self, destination: &Path) -> Result<()>;
}

/// Create the fetcher selected by the `backend` key
pub fn create_fetcher(config: &RenameConfig) -> Result<Box<dyn RemoteFetcher>> {
    let fetcher: Box<dyn RemoteFetcher> = match config.backend {
        Backend::Graph => Box::new(GraphFetcher::from_config(config)?),
        Backend::Legacy => Box::new(LegacyFetcher::from_config(config)?),
        Backend::Local => Box::new(LocalFetcher::from_config(config)?),
    };
    Ok(fetcher)
}

/// OAuth token endpoint answer (Azure AD and ACS share this shape)
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: Option<String>,
    error_description: Option<String>,
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::Transfer(format!("unable to build HTTP client: {}", e)))
}

/// POST a client-credentials form and extract the access token
pub(crate) fn request_token(client: &Client, url: &str, form: &[(&str, &str)]) -> Result<String> {
    let response = client
        .post(url)
        .form(form)
        .send()
        .map_err(|e| Error::Transfer(format!("token request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        let detail = serde_json::from_str::<TokenError>(&body)
            .ok()
            .and_then(|e| e.error_description.or(e.error))
            .unwrap_or_else(|| status.to_string());
        return Err(if is_auth_status(status) || status == StatusCode::BAD_REQUEST {
            Error::Authentication(detail)
        } else {
            Error::Transfer(format!("token endpoint answered {}: {}", status, detail))
        });
    }

    let token: TokenResponse = response
        .json()
        .map_err(|e| Error::Authentication(format!("malformed token response: {}", e)))?;
    Ok(token.access_token)
}

/// GET a resource with a bearer token and return its bytes
pub(crate) fn download(client: &Client, url: &str, token: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .bearer_auth(token)
        .send()
        .map_err(|e| Error::Transfer(format!("download from {} failed: {}", url, e)))?;
    let response = check_download_status(response)?;
    let bytes = response
        .bytes()
        .map_err(|e| Error::Transfer(format!("download interrupted: {}", e)))?;
    Ok(bytes.to_vec())
}

fn check_download_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if is_auth_status(status) {
        Err(Error::Authentication(format!(
            "document store refused access ({})",
            status
        )))
    } else {
        Err(Error::Transfer(format!(
            "document store answered {} for {}",
            status,
            response.url()
        )))
    }
}

fn is_auth_status(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Write the downloaded workbook, replacing whatever was there
pub(crate) fn write_payload(destination: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(destination, bytes).map_err(|e| Error::filesystem(destination, e))?;
    tracing::info!(
        "Saved workbook to {} ({} bytes)",
        destination.display(),
        bytes.len()
    );
    Ok(())
}
