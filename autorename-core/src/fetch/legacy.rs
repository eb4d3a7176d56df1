//! Legacy SharePoint backend: app-only ACS token and the REST file API

use super::graph::required;
use super::{RemoteFetcher, download, http_client, request_token, write_payload};
use crate::config::RenameConfig;
use crate::error::{Error, Result};
use regex::Regex;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use std::path::Path;
use std::sync::OnceLock;

/// Well-known principal id of SharePoint Online
const SHAREPOINT_PRINCIPAL: &str = "00000003-0000-0ff1-ce00-000000000000";

pub struct LegacyFetcher {
    site_url: String,
    client_id: String,
    client_secret: String,
    file_abs_url: String,
    timeout_secs: u64,
}

impl LegacyFetcher {
    pub fn from_config(config: &RenameConfig) -> Result<Self> {
        Ok(Self {
            site_url: required(&config.site_url, "site_url")?
                .trim_end_matches('/')
                .to_string(),
            client_id: required(&config.client_id, "client_id")?,
            client_secret: required(&config.client_secret, "client_secret")?,
            file_abs_url: required(&config.file_abs_url, "file_abs_url")?,
            timeout_secs: config.timeout_seconds,
        })
    }

    /// The tenant realm is advertised in the challenge of an anonymous call
    fn discover_realm(&self, client: &Client) -> Result<String> {
        let probe = format!("{}/_vti_bin/client.svc", self.site_url);
        let response = client
            .get(&probe)
            .header(AUTHORIZATION, "Bearer")
            .send()
            .map_err(|e| Error::Transfer(format!("realm discovery at {} failed: {}", probe, e)))?;

        response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_realm)
            .ok_or_else(|| {
                Error::Authentication(format!(
                    "{} did not advertise a realm (status {})",
                    probe,
                    response.status()
                ))
            })
    }
}

impl RemoteFetcher for LegacyFetcher {
    fn name(&self) -> &str {
        "legacy"
    }

    fn fetch(&self, destination: &Path) -> Result<()> {
        let client = http_client(self.timeout_secs)?;
        let host = host_of(&self.site_url)?;

        let realm = self.discover_realm(&client)?;
        tracing::info!("Acquiring SharePoint app-only token for realm {}", realm);

        let client_id = format!("{}@{}", self.client_id, realm);
        let resource = format!("{}/{}@{}", SHAREPOINT_PRINCIPAL, host, realm);
        let token = request_token(
            &client,
            &format!(
                "https://accounts.accesscontrol.windows.net/{}/tokens/OAuth/2",
                realm
            ),
            &[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("resource", resource.as_str()),
            ],
        )?;

        let url = file_value_url(&self.site_url, &self.file_abs_url)?;
        tracing::info!("Downloading {}", self.file_abs_url);
        let bytes = download(&client, &url, &token)?;
        write_payload(destination, &bytes)
    }
}

/// Extract `realm="..."` from a `WWW-Authenticate` challenge
pub fn parse_realm(challenge: &str) -> Option<String> {
    static REALM: OnceLock<Regex> = OnceLock::new();
    let re = REALM.get_or_init(|| Regex::new(r#"realm="([^"]+)""#).unwrap());
    re.captures(challenge).map(|c| c[1].to_string())
}

fn host_of(url: &str) -> Result<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .ok_or_else(|| Error::Configuration(format!("'{}' is not an absolute URL", url)))
}

/// REST endpoint streaming the raw content of the file behind `file_abs_url`
pub fn file_value_url(site_url: &str, file_abs_url: &str) -> Result<String> {
    let url = Url::parse(file_abs_url).map_err(|e| {
        Error::Configuration(format!("file_abs_url '{}' is invalid: {}", file_abs_url, e))
    })?;
    let server_relative = urlencoding::decode(url.path())
        .map_err(|e| Error::Configuration(format!("file_abs_url is not UTF-8: {}", e)))?;

    // Quotes are doubled inside OData string literals
    let encoded = server_relative
        .replace('\'', "''")
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    Ok(format!(
        "{}/_api/web/GetFileByServerRelativeUrl('{}')/$value",
        site_url.trim_end_matches('/'),
        encoded
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_realm() {
        let challenge = r#"Bearer realm="8a9b7c6d-1111-2222-3333-444455556666",client_id="00000003-0000-0ff1-ce00-000000000000",trusted_issuers="00000001-0000-0000-c000-000000000000@*""#;
        assert_eq!(
            parse_realm(challenge).as_deref(),
            Some("8a9b7c6d-1111-2222-3333-444455556666")
        );
        assert_eq!(parse_realm("Bearer"), None);
    }

    #[test]
    fn test_file_value_url() {
        let url = file_value_url(
            "https://contoso.sharepoint.com/sites/Ops/",
            "https://contoso.sharepoint.com/sites/Ops/Shared%20Documents/O'Brien%20numbers.xlsm",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://contoso.sharepoint.com/sites/Ops/_api/web/GetFileByServerRelativeUrl('/sites/Ops/Shared%20Documents/O%27%27Brien%20numbers.xlsm')/$value"
        );
    }

    #[test]
    fn test_invalid_urls_are_configuration_errors() {
        assert!(matches!(
            file_value_url("https://a", "not a url"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(host_of("relative/path"), Err(Error::Configuration(_))));
        assert_eq!(host_of("https://contoso.sharepoint.com/sites/a").unwrap(), "contoso.sharepoint.com");
    }
}
