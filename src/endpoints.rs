//! Repository endpoints and locator parsing.
//!
//! Builds the PubMed / PubMed Central addresses every repository operation
//! fetches from. The bases are configurable through [`Endpoints`] so the
//! crate can be pointed at a mirror or a test server.

use serde::Deserialize;
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Base addresses of the repository services.
///
/// The defaults are the classic NCBI addresses the scan anchors were written
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// PubMed article pages, `{pubmed}{pmid}?dopt=...`.
    ///
    /// Default: `http://www.ncbi.nlm.nih.gov/pubmed/`
    pub pubmed: String,

    /// Legacy Entrez query CGI used for the public abstract link.
    ///
    /// Default: `http://www.ncbi.nlm.nih.gov/entrez/query.fcgi`
    pub pubmed_query: String,

    /// Entrez details search, used to map PMC ids to PubMed ids.
    ///
    /// Default: `http://www.ncbi.nlm.nih.gov/sites/entrez`
    pub entrez_details: String,

    /// E-utilities root (`efetch.fcgi`, `esearch.fcgi`).
    ///
    /// Default: `http://www.ncbi.nlm.nih.gov/entrez/eutils/`
    pub eutils: String,

    /// PubMed Central site root (`articlerender.fcgi`, `picrender.fcgi`).
    ///
    /// Default: `http://www.pubmedcentral.nih.gov/`
    pub pmc: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            pubmed: "http://www.ncbi.nlm.nih.gov/pubmed/".to_string(),
            pubmed_query: "http://www.ncbi.nlm.nih.gov/entrez/query.fcgi".to_string(),
            entrez_details: "http://www.ncbi.nlm.nih.gov/sites/entrez".to_string(),
            eutils: "http://www.ncbi.nlm.nih.gov/entrez/eutils/".to_string(),
            pmc: "http://www.pubmedcentral.nih.gov/".to_string(),
        }
    }
}

impl Endpoints {
    /// Public PubMed abstract link for an article.
    #[must_use]
    pub fn pubmed_link(&self, pmid: &str) -> String {
        format!(
            "{}?cmd=Retrieve&db=pubmed&dopt=Abstract&list_uids={}",
            self.pubmed_query,
            encode(pmid)
        )
    }

    /// Public PubMed Central link for an article (also its HTML rendition).
    #[must_use]
    pub fn pmc_link(&self, pmcid: &str) -> String {
        format!(
            "{}articlerender.fcgi?tool=pmcentrez&artid={}",
            self.pmc,
            encode(pmcid)
        )
    }

    /// PubMed summary page carrying the title/authors/source paragraphs.
    #[must_use]
    pub fn summary_page(&self, pmid: &str) -> String {
        format!("{}{}?dopt=Summary", self.pubmed, encode(pmid))
    }

    /// PubMed XML display page carrying the escaped article record.
    #[must_use]
    pub fn xml_display_page(&self, pmid: &str) -> String {
        format!("{}{}?dopt=XML", self.pubmed, encode(pmid))
    }

    /// Entrez details page for a PMC record, in XML display.
    #[must_use]
    pub fn details_page(&self, pmcid: &str) -> String {
        format!(
            "{}?db=pmc&cmd=DetailsSearch&term={}[uid]&dopt=XML",
            self.entrez_details,
            encode(pmcid)
        )
    }

    /// Full-text XML of a record.
    #[must_use]
    pub fn efetch(&self, db: &str, id: &str) -> String {
        format!("{}efetch.fcgi?db={}&id={}", self.eutils, encode(db), encode(id))
    }

    /// Search reply in JSON mode.
    #[must_use]
    pub fn esearch(&self, db: &str, term: &str, max_results: usize) -> String {
        format!(
            "{}esearch.fcgi?db={}&term={}&retmax={max_results}&retmode=json",
            self.eutils,
            encode(db),
            encode(term)
        )
    }

    /// PDF rendition of a PMC article.
    #[must_use]
    pub fn pdf(&self, pmcid: &str) -> String {
        format!(
            "{}picrender.fcgi?tool=pmcentrez&artid={}&blobtype=pdf",
            self.pmc,
            encode(pmcid)
        )
    }
}

/// Percent-encode a query value.
fn encode(value: &str) -> String {
    byte_serialize(value.trim().as_bytes()).collect()
}

/// Parse a locator into an absolute `http`/`https` URL.
///
/// # Returns
/// * The parsed URL, or the reason it is unusable
pub fn parse_locator(s: &str) -> Result<Url, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("empty address".to_string());
    }

    let url = Url::parse(s).map_err(|e| e.to_string())?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host().is_none() {
        return Err("missing host".to_string());
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pmc_link_matches_classic_layout() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.pmc_link("1234567"),
            "http://www.pubmedcentral.nih.gov/articlerender.fcgi?tool=pmcentrez&artid=1234567"
        );
    }

    #[test]
    fn pubmed_link_matches_classic_layout() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.pubmed_link("17284678"),
            "http://www.ncbi.nlm.nih.gov/entrez/query.fcgi?cmd=Retrieve&db=pubmed&dopt=Abstract&list_uids=17284678"
        );
    }

    #[test]
    fn esearch_term_is_percent_encoded() {
        let endpoints = Endpoints::default();
        let url = endpoints.esearch("pmc", "gene expression[title]", 20);
        assert!(url.contains("term=gene+expression%5Btitle%5D"));
        assert!(url.ends_with("retmax=20&retmode=json"));
    }

    #[test]
    fn details_page_keeps_uid_qualifier() {
        let endpoints = Endpoints::default();
        assert!(endpoints
            .details_page("2000000")
            .ends_with("term=2000000[uid]&dopt=XML"));
    }

    #[test]
    fn parse_locator_accepts_http_and_https() {
        assert!(parse_locator("http://example.org/a").is_ok());
        assert!(parse_locator("  https://example.org/a  ").is_ok());
    }

    #[test]
    fn parse_locator_rejects_garbage() {
        assert!(parse_locator("").is_err());
        assert!(parse_locator("not a url").is_err());
        assert!(parse_locator("ftp://example.org/file").is_err());
        assert!(parse_locator("mailto:someone@example.org").is_err());
    }
}
