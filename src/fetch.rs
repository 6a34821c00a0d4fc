//! Bounded document retrieval.
//!
//! A [`StreamSource`] opens a readable stream for a URL; [`BoundedFetcher`]
//! drains it in fixed-size chunks and aborts as soon as the accumulated body
//! would pass the ceiling. An aborted download never yields partial content.
//!
//! There are no retries: one failed or oversized attempt is terminal.

use std::collections::HashMap;
use std::io::{ErrorKind, Read};

use tracing::{debug, warn};
use url::Url;

use crate::document::RawDocument;
use crate::encoding::decode_document;
use crate::endpoints::parse_locator;
use crate::error::{FetchError, Result};
use crate::options::Options;

/// Bytes requested from the stream per read.
const READ_CHUNK: usize = 8 * 1024;

/// An open response body.
pub struct Stream {
    /// Body reader; dropping it closes the connection.
    pub reader: Box<dyn Read + Send>,
    /// `Content-Type` header, when the transport has one.
    pub content_type: Option<String>,
}

impl Stream {
    /// Stream with no declared content type.
    #[must_use]
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            content_type: None,
        }
    }

    /// Attach the `Content-Type` header value used for charset detection.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Something that can open a byte stream for a URL.
///
/// Implementations must not buffer the whole body up front; the fetcher
/// enforces its ceiling while reading.
pub trait StreamSource: Send + Sync {
    fn open(&self, url: &Url) -> std::result::Result<Stream, FetchError>;
}

/// Blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    /// Build a client with the configured user agent and timeouts.
    pub fn new(options: &Options) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(options.user_agent.clone())
            .connect_timeout(options.connect_timeout())
            .timeout(options.read_timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl StreamSource for HttpSource {
    fn open(&self, url: &Url) -> std::result::Result<Stream, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| classify_transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Io {
                url: url.to_string(),
                reason: format!("HTTP status {status}"),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Stream {
            reader: Box::new(response),
            content_type,
        })
    }
}

fn classify_transport_error(url: &Url, err: &reqwest::Error) -> FetchError {
    let url = url.to_string();
    let reason = err.to_string();
    if err.is_builder() {
        FetchError::MalformedAddress { url, reason }
    } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
        FetchError::Io { url, reason }
    } else {
        FetchError::Other { url, reason }
    }
}

/// Canned responses keyed by URL, for offline replay and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Empty source; every address fails with an I/O error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body for `url`.
    #[must_use]
    pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.insert(url, body);
        self
    }

    /// Register a body for `url`, replacing any earlier one.
    pub fn insert(&mut self, url: &str, body: impl Into<Vec<u8>>) {
        self.documents.insert(normalize_key(url), body.into());
    }
}

fn normalize_key(url: &str) -> String {
    Url::parse(url.trim()).map_or_else(|_| url.trim().to_string(), |u| u.to_string())
}

impl StreamSource for MemorySource {
    fn open(&self, url: &Url) -> std::result::Result<Stream, FetchError> {
        match self.documents.get(url.as_str()) {
            Some(body) => Ok(Stream::new(std::io::Cursor::new(body.clone()))),
            None => Err(FetchError::Io {
                url: url.to_string(),
                reason: "no such document".to_string(),
            }),
        }
    }
}

/// Fetcher that enforces a hard size ceiling on every download.
#[derive(Debug, Clone)]
pub struct BoundedFetcher<S> {
    source: S,
    max_bytes: usize,
}

impl BoundedFetcher<HttpSource> {
    /// HTTP fetcher configured from `options`.
    pub fn http(options: &Options) -> Result<Self> {
        Ok(Self::new(HttpSource::new(options)?, options.max_document_bytes))
    }
}

impl<S: StreamSource> BoundedFetcher<S> {
    /// Fetcher over `source` with a ceiling of `max_bytes`.
    #[must_use]
    pub fn new(source: S, max_bytes: usize) -> Self {
        Self { source, max_bytes }
    }

    /// Size ceiling in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Underlying stream source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Download and decode a document.
    ///
    /// Failures are logged with their underlying cause before being
    /// returned.
    pub fn fetch(&self, locator: &str) -> std::result::Result<RawDocument, FetchError> {
        self.fetch_text(locator).inspect_err(|err| {
            warn!(url = locator, error = %err, "document download failed");
        })
    }

    /// Download a document, substituting the sentinel message on failure.
    ///
    /// The returned document's [`status`](RawDocument::status) tells the
    /// caller whether the content is real.
    #[must_use]
    pub fn fetch_or_sentinel(&self, locator: &str) -> RawDocument {
        match self.fetch(locator) {
            Ok(doc) => doc,
            Err(err) => RawDocument::from_failure(&err),
        }
    }

    /// Download raw bytes under an explicit ceiling (binary renditions).
    pub fn fetch_bytes(
        &self,
        locator: &str,
        limit: usize,
    ) -> std::result::Result<Vec<u8>, FetchError> {
        self.read_binary(locator, limit).inspect_err(|err| {
            warn!(url = locator, error = %err, "binary download failed");
        })
    }

    fn read_binary(
        &self,
        locator: &str,
        limit: usize,
    ) -> std::result::Result<Vec<u8>, FetchError> {
        let url = to_url(locator)?;
        let mut stream = self.source.open(&url)?;
        read_bounded(&mut stream.reader, limit, locator)
    }

    fn fetch_text(&self, locator: &str) -> std::result::Result<RawDocument, FetchError> {
        let url = to_url(locator)?;
        let mut stream = self.source.open(&url)?;
        let bytes = read_bounded(&mut stream.reader, self.max_bytes, locator)?;
        let content = decode_document(&bytes, stream.content_type.as_deref());
        debug!(url = locator, bytes = bytes.len(), "fetched document");
        Ok(RawDocument::complete(locator, content))
    }
}

fn to_url(locator: &str) -> std::result::Result<Url, FetchError> {
    parse_locator(locator).map_err(|reason| FetchError::MalformedAddress {
        url: locator.to_string(),
        reason,
    })
}

/// Drain `reader` until end of stream, or fail once the body would pass
/// `limit` bytes. Accumulated bytes are dropped on failure.
fn read_bounded(
    reader: &mut dyn Read,
    limit: usize,
    url: &str,
) -> std::result::Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(body),
            Ok(n) => {
                if body.len() + n > limit {
                    warn!(url, limit, "document exceeds size ceiling, download aborted");
                    return Err(FetchError::SizeLimitExceeded {
                        url: url.to_string(),
                        limit,
                    });
                }
                body.extend_from_slice(&chunk[..n]);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                return Err(FetchError::Io {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
