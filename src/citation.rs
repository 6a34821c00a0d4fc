//! Citation records assembled from PubMed display pages.

use serde::Serialize;

use crate::anchor::{
    extract_field, DETAILS_PMID, SUMMARY_AUTHORS, SUMMARY_SOURCE, SUMMARY_TITLE,
    XML_ABSTRACT_TEXT, XML_ARTICLE_TITLE,
};
use crate::patterns::{SOURCE_SPANS, TITLE_LINKS};

/// Bibliographic record for one article.
///
/// Fields whose anchors were absent are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Citation {
    /// Identifier the citation was requested for (PubMed or PMC).
    pub id: String,
    /// Author list as printed on the summary page.
    pub authors: String,
    /// Article title.
    pub title: String,
    /// Journal, volume and pages line.
    pub source: String,
    /// Article title and abstract, separated by a blank line.
    pub abstract_text: String,
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.authors)?;
        write!(f, "{}", self.source)?;
        if !self.abstract_text.is_empty() {
            write!(f, "\n\n{}", self.abstract_text)?;
        }
        Ok(())
    }
}

/// Title, authors and source from a summary page.
///
/// Links are removed from the title and span tags from the source line.
/// The abstract is left empty; it lives on a different page.
#[must_use]
pub fn parse_summary_page(id: &str, page: &str) -> Citation {
    let title = extract_field(page, &SUMMARY_TITLE).value;
    let authors = extract_field(page, &SUMMARY_AUTHORS).value;
    let source = extract_field(page, &SUMMARY_SOURCE).value;

    Citation {
        id: id.to_string(),
        title: TITLE_LINKS.apply(&title),
        authors,
        source: SOURCE_SPANS.apply(&source),
        abstract_text: String::new(),
    }
}

/// Article title and abstract from an XML display page, joined by a blank
/// line. Missing parts are empty.
#[must_use]
pub fn parse_abstract_page(page: &str) -> String {
    let title = extract_field(page, &XML_ARTICLE_TITLE).value;
    let text = extract_field(page, &XML_ABSTRACT_TEXT).value;
    format!("{title}\n\n{text}")
}

/// PubMed id cross-referenced from a PMC details page.
#[must_use]
pub fn parse_pmid(page: &str) -> Option<String> {
    extract_field(page, &DETAILS_PMID)
        .into_option()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}
