//! Fetched documents.

use crate::error::{FailureKind, FetchError};

/// Outcome flag of a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// The whole body was read.
    Complete,
    /// The body passed the size ceiling; content is the oversize sentinel.
    Oversize,
    /// The download failed; content is the sentinel for the failure kind.
    Failed(FailureKind),
}

/// An immutable fetched document and where it came from.
///
/// Transformations never mutate a `RawDocument`; they read
/// [`content`](Self::content) and produce new text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    content: String,
    locator: String,
    status: DocumentStatus,
}

impl RawDocument {
    /// A fully downloaded document.
    #[must_use]
    pub fn complete(locator: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            locator: locator.into(),
            status: DocumentStatus::Complete,
        }
    }

    /// The display stand-in for a failed retrieval.
    #[must_use]
    pub fn from_failure(err: &FetchError) -> Self {
        let kind = err.category();
        let status = match kind {
            FailureKind::Oversize => DocumentStatus::Oversize,
            other => DocumentStatus::Failed(other),
        };
        Self {
            content: kind.sentinel().to_string(),
            locator: err.url().to_string(),
            status,
        }
    }

    /// Fetched text, or the sentinel message on failure.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Address the document was requested from.
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// How the download ended.
    #[must_use]
    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    /// Whether the content is the real document rather than a sentinel.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == DocumentStatus::Complete
    }

    /// Consume the document, keeping only its content.
    #[must_use]
    pub fn into_content(self) -> String {
        self.content
    }
}
