//! Configuration for a rename run
//!
//! Loaded once from `auto_rename_conf.json` (or a TOML file) and read-only
//! afterwards.

use crate::error::{Error, Result};
use crate::reader::CellRange;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "auto_rename_conf.json";

/// Local copy of the downloaded workbook
pub const DEFAULT_TEMP_PATH: &str = "./temp_excel.xlsm";

/// Where the workbook is fetched from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Microsoft Graph with an app registration (client credentials)
    #[default]
    Graph,
    /// SharePoint REST API with an app-only ACS token
    Legacy,
    /// A file on the local filesystem
    Local,
}

impl Backend {
    pub fn as_str(&self) -> &str {
        match self {
            Backend::Graph => "graph",
            Backend::Legacy => "legacy",
            Backend::Local => "local",
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenameConfig {
    #[serde(default)]
    pub backend: Backend,
    pub tenant_name: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Absolute URL of the workbook in the document library
    pub file_abs_url: Option<String>,
    /// Site URL used by the legacy backend
    pub site_url: Option<String>,
    /// Source file for the local backend
    pub local_path: Option<PathBuf>,
    #[serde(default = "default_temp_path")]
    pub temp_path: PathBuf,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            tenant_name: None,
            client_id: None,
            client_secret: None,
            file_abs_url: None,
            site_url: None,
            local_path: None,
            temp_path: default_temp_path(),
            timeout_seconds: default_timeout(),
            layout: LayoutConfig::default(),
        }
    }
}

fn default_temp_path() -> PathBuf {
    PathBuf::from(DEFAULT_TEMP_PATH)
}

fn default_timeout() -> u64 {
    60
}

impl RenameConfig {
    /// Load and validate configuration from a JSON or TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("unable to read {}: {}", path.display(), e))
        })?;

        let is_toml = path.extension().and_then(|s| s.to_str()) == Some("toml");
        let config = if is_toml {
            Self::from_toml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };
        tracing::debug!(
            "Loaded configuration from {} (backend: {})",
            path.display(),
            config.backend.as_str()
        );
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| Error::Configuration(format!("invalid JSON: {}", e)))?;
        if is_falsy(&value) {
            return Err(Error::Configuration(
                "unable to fetch configuration: file is empty".to_string(),
            ));
        }
        let config: RenameConfig = serde_json::from_value(value)
            .map_err(|e| Error::Configuration(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("invalid TOML: {}", e)))?;
        if table.is_empty() {
            return Err(Error::Configuration(
                "unable to fetch configuration: file is empty".to_string(),
            ));
        }
        let config: RenameConfig = toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every key required by the backend is present and that the
    /// layout is usable. All problems are reported in one error.
    pub fn validate(&self) -> Result<()> {
        let required: Vec<(&str, bool)> = match self.backend {
            Backend::Graph => vec![
                ("tenant_name", has_text(&self.tenant_name)),
                ("client_id", has_text(&self.client_id)),
                ("client_secret", has_text(&self.client_secret)),
                ("file_abs_url", has_text(&self.file_abs_url)),
            ],
            Backend::Legacy => vec![
                ("site_url", has_text(&self.site_url)),
                ("client_id", has_text(&self.client_id)),
                ("client_secret", has_text(&self.client_secret)),
                ("file_abs_url", has_text(&self.file_abs_url)),
            ],
            Backend::Local => vec![(
                "local_path",
                self.local_path
                    .as_ref()
                    .is_some_and(|p| !p.as_os_str().is_empty()),
            )],
        };

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, present)| !present)
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(Error::Configuration(format!(
                "missing required key(s) for backend '{}': {}",
                self.backend.as_str(),
                missing.join(", ")
            )));
        }

        self.layout.validate()
    }
}

/// Where labels and identifiers live in the renumbering sheet
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Header text of the old identifier column
    pub old_label: String,
    /// Header text of every new identifier column
    pub new_label: String,
    pub old_label_range: String,
    pub new_label_range: String,
    /// First worksheet row (1-based, inclusive) scanned for identifiers
    pub first_row: u32,
    /// Last worksheet row (1-based, inclusive) scanned for identifiers
    pub last_row: u32,
    /// Substring identifying equipment directories
    pub equipment_marker: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            old_label: "ancienne".to_string(),
            new_label: "nouvelle".to_string(),
            old_label_range: "A17:G24".to_string(),
            new_label_range: "A17:BK24".to_string(),
            first_row: 15,
            last_row: 120,
            equipment_marker: "EQUIPT".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Parsed range searched for the old identifier label
    pub fn old_range(&self) -> Result<CellRange> {
        parse_range("old_label_range", &self.old_label_range)
    }

    /// Parsed range searched for the new identifier labels
    pub fn new_range(&self) -> Result<CellRange> {
        parse_range("new_label_range", &self.new_label_range)
    }

    fn validate(&self) -> Result<()> {
        self.old_range()?;
        self.new_range()?;
        if self.first_row == 0 || self.first_row > self.last_row {
            return Err(Error::Configuration(format!(
                "invalid row span {}..={}: rows are 1-based and first_row must not exceed last_row",
                self.first_row, self.last_row
            )));
        }
        if self.old_label.trim().is_empty() || self.new_label.trim().is_empty() {
            return Err(Error::Configuration(
                "column labels must not be empty".to_string(),
            ));
        }
        if self.equipment_marker.is_empty() {
            return Err(Error::Configuration(
                "equipment_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_range(key: &str, value: &str) -> Result<CellRange> {
    value
        .parse()
        .map_err(|e| Error::Configuration(format!("{}: {}", key, e)))
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn is_falsy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
