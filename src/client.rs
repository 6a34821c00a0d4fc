//! Repository client.
//!
//! [`EntrezClient`] strings the fetcher, the anchor extractor, the region
//! matcher and the transducer together into the PubMed / PubMed Central
//! operations. Every operation makes a single attempt per request.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::citation::{parse_abstract_page, parse_pmid, parse_summary_page, Citation};
use crate::document::RawDocument;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::fetch::{BoundedFetcher, HttpSource, StreamSource};
use crate::options::Options;
use crate::output::write_lines_to_file;
use crate::region::{first_element, methods_section};
use crate::sanitize::{sanitize, Ruleset};

/// Something that turns a query into an ordered list of identifiers.
pub trait SearchService {
    fn search(&self, db: &str, query: &str, max_results: usize) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct ESearchReply {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
}

/// Identifiers from an `esearch` JSON reply, in reply order.
pub fn parse_esearch(json: &str) -> Result<Vec<String>> {
    let reply: ESearchReply = serde_json::from_str(json)?;
    if let Some(error) = reply.esearchresult.error {
        return Err(Error::Search(error));
    }
    Ok(reply.esearchresult.idlist)
}

/// Run `service` and write one identifier per line to `path`.
///
/// Returns the number of identifiers written.
pub fn search_to_file(
    service: &impl SearchService,
    db: &str,
    query: &str,
    max_results: usize,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let ids = service.search(db, query, max_results)?;
    let written = write_lines_to_file(path.as_ref(), &ids)?;
    info!(db, query, written, path = %path.as_ref().display(), "search results saved");
    Ok(written)
}

/// PubMed / PubMed Central client over a stream source.
#[derive(Debug, Clone)]
pub struct EntrezClient<S> {
    fetcher: BoundedFetcher<S>,
    endpoints: Endpoints,
    max_pdf_bytes: usize,
}

impl EntrezClient<HttpSource> {
    /// Client speaking HTTP, configured from `options`.
    pub fn http(options: &Options) -> Result<Self> {
        Ok(Self::new(HttpSource::new(options)?, options))
    }
}

impl<S: StreamSource> EntrezClient<S> {
    /// Client over an arbitrary stream source.
    #[must_use]
    pub fn new(source: S, options: &Options) -> Self {
        Self {
            fetcher: BoundedFetcher::new(source, options.max_document_bytes),
            endpoints: options.endpoints.clone(),
            max_pdf_bytes: options.max_pdf_bytes,
        }
    }

    /// Repository addresses in use.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Underlying bounded fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &BoundedFetcher<S> {
        &self.fetcher
    }

    /// Number of identifiers a search returns.
    pub fn count(&self, db: &str, query: &str, max_results: usize) -> Result<usize> {
        Ok(self.search(db, query, max_results)?.len())
    }

    /// PubMed id of a PMC article, `None` when the details page has none.
    pub fn pmid_for(&self, pmcid: &str) -> Result<Option<String>> {
        let page = self.fetcher.fetch(&self.endpoints.details_page(pmcid))?;
        let pmid = parse_pmid(page.content());
        debug!(pmcid, ?pmid, "mapped PMC id");
        Ok(pmid)
    }

    /// Citation for an article in `db` (`pubmed` or `pmc`).
    ///
    /// A PMC id is first mapped to its PubMed id. When no mapping exists the
    /// citation has only its id.
    pub fn citation(&self, db: &str, id: &str) -> Result<Citation> {
        let pmid = if db.eq_ignore_ascii_case("pmc") {
            match self.pmid_for(id)? {
                Some(pmid) => pmid,
                None => {
                    warn!(pmcid = id, "no PubMed id for PMC article, citation left empty");
                    return Ok(Citation {
                        id: id.to_string(),
                        ..Citation::default()
                    });
                }
            }
        } else {
            id.trim().to_string()
        };

        let summary = self.fetcher.fetch(&self.endpoints.summary_page(&pmid))?;
        let mut citation = parse_summary_page(id, summary.content());
        citation.abstract_text = self.abstract_text(&pmid)?;
        Ok(citation)
    }

    /// Article title and abstract, separated by a blank line.
    pub fn abstract_text(&self, pmid: &str) -> Result<String> {
        let page = self.fetcher.fetch(&self.endpoints.xml_display_page(pmid))?;
        Ok(parse_abstract_page(page.content()))
    }

    /// Full-text XML of a PMC article; `None` when the reply is empty.
    pub fn paper(&self, pmcid: &str) -> Result<Option<String>> {
        let doc = self.fetcher.fetch(&self.endpoints.efetch("pmc", pmcid))?;
        let text = doc.into_content();
        if text.trim().is_empty() {
            debug!(pmcid, "efetch returned an empty body");
            return Ok(None);
        }
        Ok(Some(text))
    }

    /// Write the full-text XML to `path`. Returns `false` when there was
    /// nothing to write.
    pub fn save_paper(&self, pmcid: &str, path: impl AsRef<Path>) -> Result<bool> {
        let Some(text) = self.paper(pmcid)? else {
            return Ok(false);
        };
        let lines = write_lines_to_file(path.as_ref(), text.lines())?;
        info!(pmcid, lines, path = %path.as_ref().display(), "paper saved");
        Ok(true)
    }

    /// Download the PDF rendition to `path`. Returns its size in bytes.
    pub fn save_pdf(&self, pmcid: &str, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self
            .fetcher
            .fetch_bytes(&self.endpoints.pdf(pmcid), self.max_pdf_bytes)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(pmcid, bytes = bytes.len(), path = %path.as_ref().display(), "PDF saved");
        Ok(bytes.len())
    }

    /// HTML rendition, or the sentinel document when it could not be fetched.
    #[must_use]
    pub fn page(&self, pmcid: &str) -> RawDocument {
        self.fetcher.fetch_or_sentinel(&self.endpoints.pmc_link(pmcid))
    }

    /// Readable content of the HTML rendition.
    ///
    /// A sentinel page is returned unchanged; it is already display-ready.
    pub fn clean_page(&self, pmcid: &str) -> Result<String> {
        let page = self.page(pmcid);
        if !page.is_complete() {
            return Ok(page.into_content());
        }
        sanitize(page.content(), Ruleset::HtmlPageCleanup)
    }

    /// Raw markup of every methods section of the article, in order.
    pub fn methods_section(&self, pmcid: &str) -> Result<String> {
        match self.paper(pmcid)? {
            Some(xml) => methods_section(&xml),
            None => Ok(String::new()),
        }
    }

    /// The article's `<abstract>` reduced to minimal HTML.
    pub fn pmc_abstract(&self, pmcid: &str) -> Result<Option<String>> {
        let Some(xml) = self.paper(pmcid)? else {
            return Ok(None);
        };
        let Some(found) = first_element(&xml, "abstract")? else {
            debug!(pmcid, "no abstract element");
            return Ok(None);
        };
        sanitize(&found.raw_markup, Ruleset::AbstractCleanup).map(Some)
    }
}

impl<S: StreamSource> SearchService for EntrezClient<S> {
    fn search(&self, db: &str, query: &str, max_results: usize) -> Result<Vec<String>> {
        let reply = self
            .fetcher
            .fetch(&self.endpoints.esearch(db, query, max_results))?;
        let ids = parse_esearch(reply.content())?;
        debug!(db, query, found = ids.len(), "search complete");
        Ok(ids)
    }
}
