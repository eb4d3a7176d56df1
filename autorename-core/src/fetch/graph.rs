//! Microsoft Graph backend (app registration, client credentials)

use super::{RemoteFetcher, download, http_client, request_token, write_payload};
use crate::config::RenameConfig;
use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::path::Path;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

pub struct GraphFetcher {
    tenant_name: String,
    client_id: String,
    client_secret: String,
    file_abs_url: String,
    timeout_secs: u64,
}

impl GraphFetcher {
    pub fn from_config(config: &RenameConfig) -> Result<Self> {
        Ok(Self {
            tenant_name: required(&config.tenant_name, "tenant_name")?,
            client_id: required(&config.client_id, "client_id")?,
            client_secret: required(&config.client_secret, "client_secret")?,
            file_abs_url: required(&config.file_abs_url, "file_abs_url")?,
            timeout_secs: config.timeout_seconds,
        })
    }
}

impl RemoteFetcher for GraphFetcher {
    fn name(&self) -> &str {
        "graph"
    }

    fn fetch(&self, destination: &Path) -> Result<()> {
        let client = http_client(self.timeout_secs)?;

        tracing::info!("Acquiring Graph token for tenant {}", self.tenant_name);
        let token = request_token(
            &client,
            &token_url(&self.tenant_name),
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
                ("grant_type", "client_credentials"),
            ],
        )?;

        let url = content_url(&self.file_abs_url);
        tracing::info!("Downloading {}", self.file_abs_url);
        let bytes = download(&client, &url, &token)?;
        write_payload(destination, &bytes)
    }
}

fn token_url(tenant_name: &str) -> String {
    format!(
        "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
        tenant_name
    )
}

/// Encode a sharing URL as a Graph share id (`u!` + unpadded base64url)
pub fn share_id(file_abs_url: &str) -> String {
    format!("u!{}", URL_SAFE_NO_PAD.encode(file_abs_url.trim()))
}

fn content_url(file_abs_url: &str) -> String {
    format!(
        "{}/shares/{}/driveItem/content",
        GRAPH_BASE,
        share_id(file_abs_url)
    )
}

pub(super) fn required(value: &Option<String>, key: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Configuration(format!("missing required key: {}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_id_matches_graph_encoding() {
        // Example from the Graph "shares" documentation
        assert_eq!(
            share_id("https://onedrive.live.com/redir?resid=1231244193912!12&authKey=1201919!12921!1"),
            "u!aHR0cHM6Ly9vbmVkcml2ZS5saXZlLmNvbS9yZWRpcj9yZXNpZD0xMjMxMjQ0MTkzOTEyITEyJmF1dGhLZXk9MTIwMTkxOSExMjkyMSEx"
        );
    }

    #[test]
    fn test_share_id_is_url_safe() {
        let id = share_id("https://contoso.sharepoint.com/sites/Ops/Shared Documents/Nums?.xlsm");
        assert!(id.starts_with("u!"));
        assert!(!id.contains('='));
        assert!(!id.contains('+'));
        assert!(!id.contains('/'));
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            token_url("contoso.onmicrosoft.com"),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/v2.0/token"
        );
        let url = content_url("https://a/b");
        assert!(url.starts_with("https://graph.microsoft.com/v1.0/shares/u!"));
        assert!(url.ends_with("/driveItem/content"));
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(required(&Some("  ".into()), "client_id").is_err());
        assert!(required(&None, "client_id").is_err());
        assert_eq!(required(&Some(" x ".into()), "client_id").unwrap(), "x");
    }
}
