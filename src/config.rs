//! Process configuration
//!
//! Everything is read from the process environment, optionally seeded from a
//! dotenv file first. Settings are built once in `main` and passed by
//! reference to whatever needs them.

use crate::portfolio::PageRequest;
use eyre::{Context, Result};
use std::path::Path;
use url::Url;

/// Public endpoint serving the daily index portfolio
pub const DEFAULT_BASE_URL: &str =
    "https://sistemaswebb3-listados.b3.com.br/indexProxy/indexCall/GetPortfolioDay/";

/// Glue job started by the trigger when `GLUE_JOB_NAME` is not set
pub const DEFAULT_JOB_NAME: &str = "b3scrape_etl";

/// Load a dotenv file into the process environment if it exists
///
/// Returns whether a file was loaded. A missing file is not an error: in
/// deployed environments the variables come from the runtime instead.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }

    dotenvy::from_path(path)
        .with_context(|| format!("Failed to load env file: {}", path.display()))?;
    Ok(true)
}

/// Extractor settings
///
/// Expected environment variables:
/// - S3_BUCKET: Destination bucket (required for upload)
/// - S3_BUCKET_PATH: Key prefix inside the bucket (optional, e.g. `raw/`)
/// - AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY: Explicit credentials (optional)
/// - AWS_SESSION_TOKEN: Session token for temporary credentials (optional)
/// - B3_BASE_URL: Override for the portfolio endpoint (optional)
/// - B3_INDEX: Index to extract (optional, defaults to IBOV)
/// - B3_PAGE_SIZE: Rows per page (optional, defaults to 20)
#[derive(Clone, Debug)]
pub struct Settings {
    pub base_url: Url,
    pub index: String,
    pub page_size: u32,
    pub bucket: Option<String>,
    pub bucket_path: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let request = PageRequest::default();
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            index: request.index,
            page_size: request.page_size,
            bucket: None,
            bucket_path: String::new(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url = match env_var("B3_BASE_URL") {
            Some(raw) => {
                Url::parse(&raw).with_context(|| format!("Invalid B3_BASE_URL: {}", raw))?
            }
            None => defaults.base_url,
        };

        let page_size = match env_var("B3_PAGE_SIZE") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid B3_PAGE_SIZE: {}", raw))?,
            None => defaults.page_size,
        };

        Ok(Self {
            base_url,
            index: env_var("B3_INDEX").unwrap_or(defaults.index),
            page_size,
            bucket: env_var("S3_BUCKET"),
            bucket_path: env_var("S3_BUCKET_PATH").unwrap_or_default(),
            access_key_id: env_var("AWS_ACCESS_KEY_ID"),
            secret_access_key: env_var("AWS_SECRET_ACCESS_KEY"),
            session_token: env_var("AWS_SESSION_TOKEN"),
        })
    }

    /// The request for page 1 of the configured index
    pub fn first_page(&self) -> PageRequest {
        PageRequest {
            index: self.index.clone(),
            page_size: self.page_size,
            ..PageRequest::default()
        }
    }

    /// Explicit credentials, if both the key id and the secret are set
    pub fn credentials(&self) -> Option<(&str, &str, Option<&str>)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => {
                Some((id.as_str(), secret.as_str(), self.session_token.as_deref()))
            }
            _ => None,
        }
    }
}

/// Job trigger settings
///
/// Expected environment variables:
/// - GLUE_JOB_NAME: Job to start (optional, defaults to `b3scrape_etl`)
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerConfig {
    pub job_name: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            job_name: DEFAULT_JOB_NAME.to_string(),
        }
    }
}

impl TriggerConfig {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
        }
    }

    pub fn from_env() -> Self {
        env_var("GLUE_JOB_NAME")
            .map(Self::new)
            .unwrap_or_default()
    }
}

/// Read a variable, treating empty values as unset
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const KEYS: &[&str] = &[
        "B3_BASE_URL",
        "B3_INDEX",
        "B3_PAGE_SIZE",
        "S3_BUCKET",
        "S3_BUCKET_PATH",
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "AWS_SESSION_TOKEN",
        "GLUE_JOB_NAME",
    ];

    fn clear_env() {
        for key in KEYS {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clear_env();
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(settings.index, "IBOV");
        assert_eq!(settings.page_size, 20);
        assert!(settings.bucket.is_none());
        assert_eq!(settings.bucket_path, "");
        assert!(settings.credentials().is_none());

        assert_eq!(TriggerConfig::from_env().job_name, "b3scrape_etl");
    }

    #[test]
    #[serial]
    fn test_overrides_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("B3_INDEX", "SMLL");
            std::env::set_var("B3_PAGE_SIZE", "120");
            std::env::set_var("S3_BUCKET", "my-bucket");
            std::env::set_var("S3_BUCKET_PATH", "raw/");
            std::env::set_var("AWS_ACCESS_KEY_ID", "AKIA");
            std::env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
            std::env::set_var("GLUE_JOB_NAME", "nightly");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.index, "SMLL");
        assert_eq!(settings.page_size, 120);
        assert_eq!(settings.bucket.as_deref(), Some("my-bucket"));
        assert_eq!(settings.bucket_path, "raw/");
        assert_eq!(settings.credentials(), Some(("AKIA", "secret", None)));

        let request = settings.first_page();
        assert_eq!(request.index, "SMLL");
        assert_eq!(request.page_size, 120);
        assert_eq!(request.page_number, 1);

        assert_eq!(TriggerConfig::from_env(), TriggerConfig::new("nightly"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_page_size() {
        clear_env();
        unsafe { std::env::set_var("B3_PAGE_SIZE", "twenty") };
        let err = Settings::from_env().unwrap_err();
        assert!(err.to_string().contains("Invalid B3_PAGE_SIZE"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_env_file() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "S3_BUCKET=from-file\nGLUE_JOB_NAME=file_job").unwrap();

        assert!(load_env_file(file.path()).unwrap());
        assert_eq!(Settings::from_env().unwrap().bucket.as_deref(), Some("from-file"));
        assert_eq!(TriggerConfig::from_env().job_name, "file_job");
        clear_env();
    }

    #[test]
    fn test_missing_env_file_is_ok() {
        assert!(!load_env_file("/nonexistent/.env").unwrap());
    }
}
