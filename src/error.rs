//! Error types for pmc-extract.
//!
//! Retrieval failures are kept apart from extraction failures: a
//! [`FetchError`] always has a fixed, display-ready sentinel message, while
//! [`Error::MalformedMarkup`] marks a single document as unusable.

/// Sentinel shown in place of a document that exceeded the size ceiling.
pub const OVERSIZE_SENTINEL: &str =
    "Document size exceeding the download limit! Click on the link above to see the document at PubMed Central.";

/// Sentinel shown when the document address could not be parsed.
pub const MALFORMED_ADDRESS_SENTINEL: &str =
    "Document not downloaded due to a malformed address.";

/// Sentinel shown when the connection or stream failed.
pub const IO_SENTINEL: &str = "Document not downloaded due to an I/O failure.";

/// Sentinel shown for any other download failure.
pub const OTHER_SENTINEL: &str = "Document not downloaded due to an unexpected failure.";

/// Category of a failed retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The locator is not a usable URL.
    MalformedAddress,
    /// Host unreachable, HTTP failure status, or stream broke mid-read.
    Io,
    /// The body grew past the configured ceiling and the download was aborted.
    Oversize,
    /// Anything else.
    Other,
}

impl FailureKind {
    /// Fixed human-readable message substituted for content.
    #[must_use]
    pub fn sentinel(self) -> &'static str {
        match self {
            Self::MalformedAddress => MALFORMED_ADDRESS_SENTINEL,
            Self::Io => IO_SENTINEL,
            Self::Oversize => OVERSIZE_SENTINEL,
            Self::Other => OTHER_SENTINEL,
        }
    }
}

/// Error raised by the bounded fetcher and the stream sources beneath it.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The locator could not be turned into a request.
    #[error("malformed address {url}: {reason}")]
    MalformedAddress { url: String, reason: String },

    /// Connection, HTTP status, or mid-stream read failure.
    #[error("I/O failure fetching {url}: {reason}")]
    Io { url: String, reason: String },

    /// More than `limit` bytes arrived; accumulated content was discarded.
    #[error("document at {url} exceeds the {limit} byte ceiling")]
    SizeLimitExceeded { url: String, limit: usize },

    /// Any other retrieval failure.
    #[error("failed to fetch {url}: {reason}")]
    Other { url: String, reason: String },
}

impl FetchError {
    /// Failure category, for display and diagnostics.
    #[must_use]
    pub fn category(&self) -> FailureKind {
        match self {
            Self::MalformedAddress { .. } => FailureKind::MalformedAddress,
            Self::Io { .. } => FailureKind::Io,
            Self::SizeLimitExceeded { .. } => FailureKind::Oversize,
            Self::Other { .. } => FailureKind::Other,
        }
    }

    /// Display-ready message to show instead of the document.
    #[must_use]
    pub fn sentinel(&self) -> &'static str {
        self.category().sentinel()
    }

    /// Locator of the document that failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::MalformedAddress { url, .. }
            | Self::Io { url, .. }
            | Self::SizeLimitExceeded { url, .. }
            | Self::Other { url, .. } => url,
        }
    }
}

/// Error type for extraction and repository operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Retrieval failed; see [`FetchError::sentinel`] for the display text.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A structural marker the scan depends on is missing or unbalanced.
    #[error("malformed markup: {0}")]
    MalformedMarkup(String),

    /// A rewrite rule could not be compiled.
    #[error("invalid rule `{name}`: {reason}")]
    InvalidRule { name: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The search service returned something unusable.
    #[error("search failed: {0}")]
    Search(String),

    /// Writing output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON input (rule tables, options, search replies) could not be read.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
