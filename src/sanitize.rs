//! Markup transducer.
//!
//! [`sanitize`] turns raw markup into one of three output flavours. The XML
//! flavours are a single ordered rule table each. Page cleanup is a staged
//! pipeline: region deletions cut the page down, then three rule tables
//! rewrite what is left.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::patterns::{
    ABSTRACT_CLEANUP, ARTICLE_ID_QUERY, COMMENT_REGION, CONTENT_MARKER, FOOTER_SPANS, PAGE_LAYOUT,
    PAGE_LINKS, PAGE_WRAPPERS, PMC_SITE, SAME_PAGE_ANCHOR, SCRIPT_REGION, SIDEBAR_REGION,
    STRUCTURAL_STRIP, TABLE_REGION,
};
use crate::region::{delete_regions, delete_required_span};
use crate::rules::RuleTable;

/// Output flavour selected for [`sanitize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ruleset {
    /// Strip every full-text XML tag, keeping sentence breaks after titles.
    StructuralStrip,
    /// Reduce an abstract to minimal semantic HTML.
    AbstractCleanup,
    /// Reduce an article HTML page to its readable content.
    HtmlPageCleanup,
}

impl Ruleset {
    /// Stable name, accepted back by `FromStr`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::StructuralStrip => "structural-strip",
            Self::AbstractCleanup => "abstract-cleanup",
            Self::HtmlPageCleanup => "html-page-cleanup",
        }
    }
}

impl std::str::FromStr for Ruleset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "structural-strip" | "structural" | "xml" => Ok(Self::StructuralStrip),
            "abstract-cleanup" | "abstract" => Ok(Self::AbstractCleanup),
            "html-page-cleanup" | "page" | "html" => Ok(Self::HtmlPageCleanup),
            other => Err(format!("unknown ruleset `{other}`")),
        }
    }
}

/// Stages of page cleanup, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageStage {
    RawPage,
    ContentExtracted,
    SidebarStripped,
    CommentsStripped,
    ScriptsStripped,
    FooterStripped,
    TablesStripped,
    LinksNormalized,
    LineBreaksNormalized,
    WrappersStripped,
}

impl PageStage {
    /// Every stage, first to last.
    pub const ALL: [Self; 10] = [
        Self::RawPage,
        Self::ContentExtracted,
        Self::SidebarStripped,
        Self::CommentsStripped,
        Self::ScriptsStripped,
        Self::FooterStripped,
        Self::TablesStripped,
        Self::LinksNormalized,
        Self::LineBreaksNormalized,
        Self::WrappersStripped,
    ];

    /// The stage after this one, `None` once the page is final.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let at = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(at + 1).copied()
    }

    /// Perform the transition out of `self` on `page`.
    fn advance(self, page: &str) -> Result<String> {
        match self {
            Self::RawPage => content_region(page),
            Self::ContentExtracted => delete_regions(page, SIDEBAR_REGION.0, SIDEBAR_REGION.1),
            Self::SidebarStripped => delete_regions(page, COMMENT_REGION.0, COMMENT_REGION.1),
            Self::CommentsStripped => delete_regions(page, SCRIPT_REGION.0, SCRIPT_REGION.1),
            Self::ScriptsStripped => FOOTER_SPANS
                .iter()
                .try_fold(page.to_string(), |doc, (start, end)| {
                    delete_required_span(&doc, start, end)
                }),
            Self::FooterStripped => delete_regions(page, TABLE_REGION.0, TABLE_REGION.1),
            Self::TablesStripped => {
                let linked = PAGE_LINKS.apply(page);
                Ok(splice_article_id(&linked))
            }
            Self::LinksNormalized => Ok(PAGE_LAYOUT.apply(page)),
            Self::LineBreaksNormalized => Ok(PAGE_WRAPPERS.apply(page)),
            Self::WrappersStripped => Ok(page.to_string()),
        }
    }
}

/// Rewrite `doc` with the chosen ruleset.
///
/// The XML rulesets never fail. Page cleanup fails with
/// [`Error::MalformedMarkup`] when a marker it depends on is missing.
///
/// # Example
///
/// ```rust
/// use pmc_extract::{sanitize, Ruleset};
///
/// let text = sanitize("<italic>x</italic><title>T</title>", Ruleset::StructuralStrip)?;
/// assert_eq!(text, "xT. ");
/// # Ok::<(), pmc_extract::Error>(())
/// ```
pub fn sanitize(doc: &str, ruleset: Ruleset) -> Result<String> {
    match ruleset {
        Ruleset::StructuralStrip => Ok(sanitize_with(doc, &STRUCTURAL_STRIP)),
        Ruleset::AbstractCleanup => Ok(sanitize_with(doc, &ABSTRACT_CLEANUP)),
        Ruleset::HtmlPageCleanup => clean_page_until(doc, PageStage::WrappersStripped),
    }
}

/// Apply an arbitrary rule table, e.g. one loaded from JSON.
#[must_use]
pub fn sanitize_with(doc: &str, table: &RuleTable) -> String {
    table.apply(doc)
}

/// Run page cleanup up to and including `stage`.
///
/// Useful for inspecting intermediate output; `WrappersStripped` is the full
/// cleanup.
pub fn clean_page_until(doc: &str, stage: PageStage) -> Result<String> {
    let mut page = doc.to_string();
    let mut at = PageStage::RawPage;

    while at < stage {
        page = at.advance(&page).inspect_err(|err| {
            warn!(stage = ?at, error = %err, "page cleanup failed");
        })?;
        let Some(next) = at.next() else { break };
        debug!(stage = ?next, bytes = page.len(), "page cleanup stage reached");
        at = next;
    }
    Ok(page)
}

/// Cut the page down to the content container, starting at its tag.
fn content_region(page: &str) -> Result<String> {
    let Some(marker_at) = page.find(CONTENT_MARKER) else {
        return Err(Error::MalformedMarkup(format!(
            "content container `{CONTENT_MARKER}` not found"
        )));
    };
    let Some(tag_start) = page[..marker_at].rfind('<') else {
        return Err(Error::MalformedMarkup(format!(
            "content container at byte {marker_at} has no tag start"
        )));
    };
    Ok(page[tag_start..].to_string())
}

/// Numeric id from the first `articlerender.fcgi?artid=` link, if any.
#[must_use]
pub fn article_id(page: &str) -> Option<&str> {
    let from = page.find(ARTICLE_ID_QUERY)? + ARTICLE_ID_QUERY.len();
    let rest = &page[from..];
    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    (len > 0).then(|| &rest[..len])
}

/// Point same-page `#E…` anchors at the article they belong to.
///
/// Without an article id the anchors are left alone.
fn splice_article_id(page: &str) -> String {
    let Some(id) = article_id(page) else {
        debug!("no article id in page links, same-page anchors left as is");
        return page.to_string();
    };
    let target = format!("<a href=\"{PMC_SITE}{ARTICLE_ID_QUERY}{id}#E");
    page.replace(SAME_PAGE_ANCHOR, &target)
}
