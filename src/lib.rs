//! # pmc-extract
//!
//! Bounded retrieval and scan-based cleanup of PubMed / PubMed Central
//! article markup.
//!
//! The library never builds a DOM. It works directly on raw text, which is
//! often malformed or inconsistently nested:
//!
//! - **Bounded fetch**: downloads stream under a hard size ceiling and fail
//!   into fixed, display-ready sentinel messages ([`fetch`])
//! - **Anchor pairs**: fields bounded by literal start/end markers ([`anchor`])
//! - **Balanced regions**: depth-tracked section extraction and marker-based
//!   region deletion ([`region`])
//! - **Markup transducer**: ordered, declarative rewrite tables for full-text
//!   XML, abstracts and article pages ([`sanitize()`], [`rules`])
//!
//! ## Quick Start
//!
//! ```rust
//! use pmc_extract::{methods_section, sanitize, Ruleset};
//!
//! let xml = r#"<sec sec-type="methods"><title>Methods</title><p>Cells <italic>in vitro</italic>.</p></sec>"#;
//!
//! let methods = methods_section(xml)?;
//! let text = sanitize(&methods, Ruleset::StructuralStrip)?;
//! assert_eq!(text, "Methods. Cells in vitro.");
//! # Ok::<(), pmc_extract::Error>(())
//! ```
//!
//! Every operation is a pure function of its input and a constant rule
//! table, so documents can be processed on as many threads as the caller
//! likes.

mod error;
mod options;

/// Anchor-pair field extraction.
pub mod anchor;

/// Citation records and display-page parsers.
pub mod citation;

/// PubMed / PubMed Central client.
pub mod client;

/// Fetched documents and their retrieval status.
pub mod document;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Repository addresses and locator parsing.
pub mod endpoints;

/// Bounded fetcher and stream sources.
pub mod fetch;

/// Newline-terminated line output.
pub mod output;

/// Built-in rewrite tables.
pub mod patterns;

/// Balanced-region extraction and deletion.
pub mod region;

/// Declarative rewrite rules and tables.
pub mod rules;

/// Ruleset selection and the page cleanup pipeline.
pub mod sanitize;

// Public API - re-exports
pub use anchor::{extract_field, AnchorSpec, ExtractedField};
pub use citation::Citation;
pub use client::{search_to_file, EntrezClient, SearchService};
pub use document::{DocumentStatus, RawDocument};
pub use error::{
    Error, FailureKind, FetchError, Result, IO_SENTINEL, MALFORMED_ADDRESS_SENTINEL,
    OTHER_SENTINEL, OVERSIZE_SENTINEL,
};
pub use fetch::{BoundedFetcher, HttpSource, MemorySource, Stream, StreamSource};
pub use options::{Options, DEFAULT_MAX_DOCUMENT_BYTES};
pub use region::{delete_regions, delete_span, extract_sections, methods_section, SectionMatch};
pub use rules::{RewriteRule, RuleKind, RuleSpec, RuleTable};
pub use sanitize::{sanitize, sanitize_with, PageStage, Ruleset};
