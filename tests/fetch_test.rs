use std::io::Read;

use pmc_extract::{
    BoundedFetcher, DocumentStatus, FailureKind, FetchError, MemorySource, Options, Stream,
    StreamSource, DEFAULT_MAX_DOCUMENT_BYTES, IO_SENTINEL, MALFORMED_ADDRESS_SENTINEL,
    OVERSIZE_SENTINEL,
};
use url::Url;

/// Streams `len` bytes in small uneven reads, like a slow connection.
struct Trickle {
    remaining: usize,
    step: usize,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.remaining.min(self.step).min(buf.len());
        buf[..n].fill(b'a');
        self.remaining -= n;
        self.step = self.step % 7 + 1;
        Ok(n)
    }
}

struct TrickleSource(usize);

impl StreamSource for TrickleSource {
    fn open(&self, _url: &Url) -> Result<Stream, FetchError> {
        Ok(Stream::new(Trickle {
            remaining: self.0,
            step: 3,
        }))
    }
}

struct Unreachable;

impl StreamSource for Unreachable {
    fn open(&self, url: &Url) -> Result<Stream, FetchError> {
        Err(FetchError::Io {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

#[test]
fn default_ceiling_is_two_mebibytes() {
    assert_eq!(DEFAULT_MAX_DOCUMENT_BYTES, 2_097_152);
    assert_eq!(Options::default().max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
}

#[test]
fn body_at_ceiling_is_complete() {
    let fetcher = BoundedFetcher::new(TrickleSource(DEFAULT_MAX_DOCUMENT_BYTES), DEFAULT_MAX_DOCUMENT_BYTES);
    let doc = fetcher.fetch("http://example.org/at-limit").unwrap();
    assert!(doc.is_complete());
    assert_eq!(doc.content().len(), DEFAULT_MAX_DOCUMENT_BYTES);
}

#[test]
fn body_over_ceiling_yields_only_the_sentinel() {
    let fetcher = BoundedFetcher::new(
        TrickleSource(DEFAULT_MAX_DOCUMENT_BYTES + 1),
        DEFAULT_MAX_DOCUMENT_BYTES,
    );
    let doc = fetcher.fetch_or_sentinel("http://example.org/too-big");
    assert_eq!(doc.status(), DocumentStatus::Oversize);
    assert_eq!(doc.content(), OVERSIZE_SENTINEL);
    assert!(!doc.content().contains("aaaa"));
}

#[test]
fn typed_fetch_reports_size_limit() {
    let fetcher = BoundedFetcher::new(TrickleSource(5000), 4096);
    match fetcher.fetch("http://example.org/big") {
        Err(FetchError::SizeLimitExceeded { url, limit }) => {
            assert_eq!(url, "http://example.org/big");
            assert_eq!(limit, 4096);
        }
        other => panic!("expected size limit error, got {other:?}"),
    }
}

#[test]
fn unreachable_host_is_io_sentinel() {
    let fetcher = BoundedFetcher::new(Unreachable, 1024);
    let doc = fetcher.fetch_or_sentinel("http://unreachable.invalid/");
    assert_eq!(doc.status(), DocumentStatus::Failed(FailureKind::Io));
    assert_eq!(doc.content(), IO_SENTINEL);
    assert_eq!(doc.locator(), "http://unreachable.invalid/");
}

#[test]
fn malformed_addresses_are_categorized() {
    let fetcher = BoundedFetcher::new(MemorySource::new(), 1024);
    for locator in ["", "not a url", "ftp://example.org/file", "mailto:someone@example.org"] {
        let doc = fetcher.fetch_or_sentinel(locator);
        assert_eq!(
            doc.status(),
            DocumentStatus::Failed(FailureKind::MalformedAddress),
            "{locator:?}"
        );
        assert_eq!(doc.content(), MALFORMED_ADDRESS_SENTINEL);
    }
}

#[test]
fn sentinels_are_distinct_per_category() {
    let errors = [
        FetchError::MalformedAddress { url: "u".into(), reason: "r".into() },
        FetchError::Io { url: "u".into(), reason: "r".into() },
        FetchError::SizeLimitExceeded { url: "u".into(), limit: 1 },
        FetchError::Other { url: "u".into(), reason: "r".into() },
    ];
    let mut sentinels: Vec<&str> = errors.iter().map(FetchError::sentinel).collect();
    sentinels.sort_unstable();
    sentinels.dedup();
    assert_eq!(sentinels.len(), errors.len());
}

#[test]
fn binary_fetch_uses_its_own_limit() {
    let fetcher = BoundedFetcher::new(TrickleSource(10_000), 16);
    assert_eq!(fetcher.fetch_bytes("http://example.org/pdf", 10_000).unwrap().len(), 10_000);
    let err = fetcher.fetch_bytes("http://example.org/pdf", 9_999).unwrap_err();
    assert_eq!(err.category(), FailureKind::Oversize);
}

#[test]
fn binary_fetch_reports_address_and_connection_failures() {
    let fetcher = BoundedFetcher::new(Unreachable, 1024);
    let err = fetcher.fetch_bytes("not a url", 1024).unwrap_err();
    assert_eq!(err.category(), FailureKind::MalformedAddress);
    let err = fetcher.fetch_bytes("http://unreachable.invalid/pdf", 1024).unwrap_err();
    assert_eq!(err.category(), FailureKind::Io);
}

#[test]
fn oversize_sentinel_holds_for_any_configured_ceiling() {
    let fetcher = BoundedFetcher::new(TrickleSource(64), 32);
    let doc = fetcher.fetch_or_sentinel("http://example.org/big");
    assert_eq!(doc.content(), OVERSIZE_SENTINEL);
    assert!(!OVERSIZE_SENTINEL.contains("2MB"));
}

#[test]
fn latin1_page_declared_in_meta_is_decoded() {
    let body = b"<html><head><meta charset=\"iso-8859-1\"></head><body>Gen\xE8ve</body></html>".to_vec();
    let fetcher = BoundedFetcher::new(MemorySource::new().with("http://example.org/geneva", body), 1024);
    let doc = fetcher.fetch("http://example.org/geneva").unwrap();
    assert!(doc.content().contains("Genève"));
}

#[test]
fn fetcher_is_shareable_across_threads() {
    let source = (0..8).fold(MemorySource::new(), |source, i| {
        source.with(&format!("http://example.org/doc/{i}"), format!("document {i}"))
    });
    let fetcher = BoundedFetcher::new(source, 1024);

    let contents: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let fetcher = &fetcher;
                scope.spawn(move || {
                    fetcher
                        .fetch(&format!("http://example.org/doc/{i}"))
                        .unwrap()
                        .into_content()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, content) in contents.iter().enumerate() {
        assert_eq!(content, &format!("document {i}"));
    }
}
