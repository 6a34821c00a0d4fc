//! Configuration options for retrieval.
//!
//! The `Options` struct controls the fetch ceiling, transport timeouts and
//! repository addresses. Extraction itself is not configurable: rule tables
//! are process-wide constants.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::endpoints::Endpoints;
use crate::error::Result;

/// Hard ceiling on a fetched document, in bytes (2 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 2 * 1024 * 1024;

/// Configuration options for retrieval.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use pmc_extract::Options;
///
/// let options = Options {
///     read_timeout_secs: 5,
///     ..Options::default()
/// };
/// assert_eq!(options.max_document_bytes, 2 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Largest text document accepted before the download is aborted.
    ///
    /// Default: `2097152` (2 MiB)
    pub max_document_bytes: usize,

    /// Largest binary (PDF) download accepted before it is aborted.
    ///
    /// Default: `67108864` (64 MiB)
    pub max_pdf_bytes: usize,

    /// Connection timeout in seconds.
    ///
    /// Default: `10`
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds, applied to each request.
    ///
    /// Default: `30`
    pub read_timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    ///
    /// Default: `pmc-extract/<version>`
    pub user_agent: String,

    /// Repository addresses.
    pub endpoints: Endpoints,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            max_pdf_bytes: 64 * 1024 * 1024,
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            user_agent: concat!("pmc-extract/", env!("CARGO_PKG_VERSION")).to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Options {
    /// Load options from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse options from JSON; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Connect timeout as a `Duration`.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read timeout as a `Duration`.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}
