//! Local backend: copy a workbook that is already on disk

use super::{RemoteFetcher, write_payload};
use crate::config::RenameConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalFetcher {
    source: PathBuf,
}

impl LocalFetcher {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn from_config(config: &RenameConfig) -> Result<Self> {
        config
            .local_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .map(LocalFetcher::new)
            .ok_or_else(|| Error::Configuration("missing required key: local_path".to_string()))
    }
}

impl RemoteFetcher for LocalFetcher {
    fn name(&self) -> &str {
        "local"
    }

    fn fetch(&self, destination: &Path) -> Result<()> {
        // The temp copy is deleted at the end of the run, never let it be the source
        if let (Ok(a), Ok(b)) = (self.source.canonicalize(), destination.canonicalize()) {
            if a == b {
                return Err(Error::Configuration(format!(
                    "local_path and temp_path both point to {}",
                    a.display()
                )));
            }
        }

        let bytes = fs::read(&self.source).map_err(|e| {
            Error::Transfer(format!("unable to read {}: {}", self.source.display(), e))
        })?;
        write_payload(destination, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("numbers.xlsx");
        let dest = dir.path().join("temp_excel.xlsm");
        fs::write(&source, b"workbook").unwrap();

        LocalFetcher::new(&source).fetch(&dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"workbook");
    }

    #[test]
    fn test_missing_source_is_transfer_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFetcher::new(dir.path().join("absent.xlsx"))
            .fetch(&dir.path().join("temp.xlsm"))
            .unwrap_err();
        assert!(matches!(err, Error::Transfer(_)));
    }

    #[test]
    fn test_from_config_rejects_empty_path() {
        let config = RenameConfig {
            local_path: Some(PathBuf::new()),
            ..RenameConfig::default()
        };
        assert!(matches!(
            LocalFetcher::from_config(&config),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_refuses_to_overwrite_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("numbers.xlsx");
        fs::write(&source, b"workbook").unwrap();

        let err = LocalFetcher::new(&source).fetch(&source).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(fs::read(&source).unwrap(), b"workbook");
    }
}
