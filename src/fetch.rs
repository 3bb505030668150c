use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::StatusCode;
use std::path::PathBuf;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("excel-html/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where workbook bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(s.to_string())
        } else {
            Source::Path(PathBuf::from(s))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

// Blocking HTTP client
pub struct Fetcher {
    http: reqwest::blocking::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }

    /// GET `url`. Any status other than 200 yields `Ok(None)`.
    pub fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .with_context(|| format!("Request failed: {}", url))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("GET {} returned {}", url, status);
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .with_context(|| format!("Failed to read response body: {}", url))?;

        debug!("GET {} -> {} bytes", url, bytes.len());
        Ok(Some(bytes.to_vec()))
    }
}

// Non-blocking counterpart of `Fetcher`
pub struct AsyncFetcher {
    http: reqwest::Client,
}

impl AsyncFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }

    pub async fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        debug!("GET {} (async)", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed: {}", url))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("GET {} returned {}", url, status);
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body: {}", url))?;

        debug!("GET {} -> {} bytes", url, bytes.len());
        Ok(Some(bytes.to_vec()))
    }
}

pub fn read_source(fetcher: &Fetcher, source: &Source) -> Result<Option<Vec<u8>>> {
    match source {
        Source::Url(url) => fetcher.get(url),
        Source::Path(path) => std::fs::read(path)
            .map(Some)
            .with_context(|| format!("Failed to read file: {}", path.display())),
    }
}

pub async fn read_source_async(fetcher: &AsyncFetcher, source: &Source) -> Result<Option<Vec<u8>>> {
    match source {
        Source::Url(url) => fetcher.get(url).await,
        Source::Path(path) => tokio::fs::read(path)
            .await
            .map(Some)
            .with_context(|| format!("Failed to read file: {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.com/book.xls"),
            Source::Url("https://example.com/book.xls".to_string())
        );
        assert_eq!(
            Source::parse("HTTP://example.com/book.xls"),
            Source::Url("HTTP://example.com/book.xls".to_string())
        );
        assert_eq!(
            Source::parse("data/book.xlsx"),
            Source::Path(PathBuf::from("data/book.xlsx"))
        );
    }

    #[test]
    fn test_missing_file_is_error() {
        let fetcher = Fetcher::new().unwrap();
        let source = Source::Path(PathBuf::from("/nonexistent/book.xlsx"));
        assert!(read_source(&fetcher, &source).is_err());
    }
}
