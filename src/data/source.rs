use super::{DataError, Result};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_MAX_FETCH_BYTES: u64 = 64 * 1024 * 1024;

/// Limits applied to remote fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_bytes: DEFAULT_MAX_FETCH_BYTES,
        }
    }
}

/// Where the raw dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Remote(String),
}

impl DataSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Remote(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }

    pub fn read_bytes(&self, limits: &FetchLimits) -> Result<Vec<u8>> {
        match self {
            DataSource::File(path) => {
                info!(path = %path.display(), "reading dataset file");
                Ok(fs::read(path)?)
            }
            DataSource::Remote(url) => {
                info!(%url, "fetching remote dataset");
                let client = reqwest::blocking::Client::builder()
                    .timeout(limits.timeout)
                    .build()?;
                let response = client.get(url).send()?;
                let status = response.status();
                if !status.is_success() {
                    return Err(DataError::HttpStatus {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                if let Some(length) = response.content_length() {
                    if length > limits.max_bytes {
                        return Err(DataError::TooLarge {
                            url: url.clone(),
                            limit: limits.max_bytes,
                        });
                    }
                }
                read_capped(response, limits.max_bytes, url)
            }
        }
    }
}

/// Reads at most `limit` bytes; a body that runs past it is an error rather than truncated.
fn read_capped<R: Read>(reader: R, limit: u64, url: &str) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut body)?;
    if body.len() as u64 > limit {
        return Err(DataError::TooLarge {
            url: url.to_string(),
            limit,
        });
    }
    Ok(body)
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Remote(url) => f.write_str(url),
        }
    }
}
