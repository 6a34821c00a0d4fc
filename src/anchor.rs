//! Anchor-pair field extraction.
//!
//! A field is the text strictly between the first occurrence of a start
//! anchor and the first occurrence of an end anchor after it. A missing
//! anchor is a normal outcome and yields an empty, not-found field.

use tracing::{debug, warn};

/// A named pair of literal scan markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSpec<'a> {
    /// Label used in diagnostics and results.
    pub name: &'a str,
    /// Literal that precedes the field.
    pub start: &'a str,
    /// Literal that follows the field.
    pub end: &'a str,
}

impl<'a> AnchorSpec<'a> {
    /// Anchor pair from its three literals.
    #[must_use]
    pub const fn new(name: &'a str, start: &'a str, end: &'a str) -> Self {
        Self { name, start, end }
    }
}

/// Result of one anchor-pair extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedField {
    /// Name of the anchor pair that produced this field.
    pub name: String,
    /// Text between the markers, empty when not found.
    pub value: String,
    /// Whether both markers were present.
    pub found: bool,
}

impl ExtractedField {
    fn absent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
            found: false,
        }
    }

    /// The value when found, `None` otherwise.
    #[must_use]
    pub fn into_option(self) -> Option<String> {
        self.found.then_some(self.value)
    }
}

// === Repository anchors ===

/// Article title paragraph of a PubMed summary page.
pub const SUMMARY_TITLE: AnchorSpec<'static> =
    AnchorSpec::new("title", "<p class=\"title\">", "</p>");

/// Author list paragraph of a PubMed summary page.
pub const SUMMARY_AUTHORS: AnchorSpec<'static> =
    AnchorSpec::new("authors", "<p class=\"authors\">", "</p>");

/// Journal/source paragraph of a PubMed summary page.
pub const SUMMARY_SOURCE: AnchorSpec<'static> =
    AnchorSpec::new("source", "<p class=\"source\">", "</p>");

/// Article title inside the escaped record of a PubMed XML display page.
pub const XML_ARTICLE_TITLE: AnchorSpec<'static> = AnchorSpec::new(
    "article-title",
    "&lt;ArticleTitle&gt;<font class=\"val\">",
    "</font>&lt;/ArticleTitle&gt;",
);

/// Abstract text inside the escaped record of a PubMed XML display page.
pub const XML_ABSTRACT_TEXT: AnchorSpec<'static> = AnchorSpec::new(
    "abstract-text",
    "&lt;AbstractText&gt;<font class=\"val\">",
    "</font>&lt;/AbstractText&gt;",
);

/// PubMed id cross-reference inside an escaped PMC details record.
pub const DETAILS_PMID: AnchorSpec<'static> = AnchorSpec::new(
    "pmid",
    "&lt;article-id pub-id-type=&quot;pmid&quot;&gt;",
    "&lt;/article-id&gt;",
);

/// Extract the first field bounded by `spec`'s anchors.
///
/// When the start anchor is present but no end anchor follows it the field
/// is reported as not found, with a diagnostic.
///
/// # Example
///
/// ```rust
/// use pmc_extract::anchor::{extract_field, SUMMARY_TITLE};
///
/// let field = extract_field(r#"<p class="title">Foo</p>"#, &SUMMARY_TITLE);
/// assert!(field.found);
/// assert_eq!(field.value, "Foo");
/// ```
#[must_use]
pub fn extract_field(doc: &str, spec: &AnchorSpec<'_>) -> ExtractedField {
    if spec.start.is_empty() || spec.end.is_empty() {
        warn!(field = spec.name, "empty anchor, nothing to scan for");
        return ExtractedField::absent(spec.name);
    }

    let Some(start) = doc.find(spec.start) else {
        debug!(field = spec.name, "start anchor absent");
        return ExtractedField::absent(spec.name);
    };

    let value_from = start + spec.start.len();
    let Some(rel_end) = doc[value_from..].find(spec.end) else {
        warn!(
            field = spec.name,
            offset = start,
            "start anchor has no matching end anchor, treating field as absent"
        );
        return ExtractedField::absent(spec.name);
    };

    ExtractedField {
        name: spec.name.to_string(),
        value: doc[value_from..value_from + rel_end].to_string(),
        found: true,
    }
}

/// Extract several fields from the same document, in order.
#[must_use]
pub fn extract_fields(doc: &str, specs: &[AnchorSpec<'_>]) -> Vec<ExtractedField> {
    specs.iter().map(|spec| extract_field(doc, spec)).collect()
}
