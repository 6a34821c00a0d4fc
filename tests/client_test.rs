use std::path::PathBuf;

use pmc_extract::endpoints::Endpoints;
use pmc_extract::{
    search_to_file, DocumentStatus, EntrezClient, Error, FailureKind, MemorySource, Options,
    SearchService, IO_SENTINEL, OVERSIZE_SENTINEL,
};

const SUMMARY_PAGE: &str = r#"<html><body><div class="rprt">
<p class="title"><a href="/pubmed/17284678">Regulation of yeast growth.</a></p>
<p class="authors">Smith J, Doe A.</p>
<p class="source"><span class="jrnl">Mol Cell</span>. 2007 Feb;25(3):1-9.</p>
</div></body></html>"#;

const XML_PAGE: &str = "<pre>&lt;ArticleTitle&gt;<font class=\"val\">Regulation of yeast growth.</font>&lt;/ArticleTitle&gt;\n\
&lt;AbstractText&gt;<font class=\"val\">Growth is regulated.</font>&lt;/AbstractText&gt;</pre>";

const DETAILS_PAGE: &str = "&lt;article-id pub-id-type=&quot;pmc&quot;&gt;1790863&lt;/article-id&gt;\n\
&lt;article-id pub-id-type=&quot;pmid&quot;&gt;17284678&lt;/article-id&gt;";

const FULL_TEXT: &str = concat!(
    "<article><front><abstract><p>Growth is <italic>regulated</italic>.</p></abstract></front>\n",
    "<body><sec sec-type=\"intro\"><p>intro</p></sec>\n",
    "<sec sec-type=\"materials|methods\"><title>Methods</title><sec><p>strains</p></sec></sec>\n",
    "</body></article>"
);

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pmc-extract-{}-{name}", std::process::id()))
}

fn repository() -> MemorySource {
    let urls = Endpoints::default();
    MemorySource::new()
        .with(&urls.summary_page("17284678"), SUMMARY_PAGE)
        .with(&urls.xml_display_page("17284678"), XML_PAGE)
        .with(&urls.details_page("1790863"), DETAILS_PAGE)
        .with(&urls.details_page("999"), "<html>no record</html>")
        .with(&urls.efetch("pmc", "1790863"), FULL_TEXT)
        .with(&urls.efetch("pmc", "555"), "  \n")
        .with(
            &urls.esearch("pmc", "yeast growth", 3),
            r#"{"esearchresult":{"count":"2","retmax":"2","idlist":["1790863","1790864"]}}"#,
        )
        .with(&urls.pdf("1790863"), b"%PDF-1.4 fake".to_vec())
        .with(
            &urls.pmc_link("1790863"),
            "<td class=\"content-cell\"><p>Readable.</p><div class=\"footer-section\">foot</td></tr></table></body></html>",
        )
}

fn client() -> EntrezClient<MemorySource> {
    EntrezClient::new(repository(), &Options::default())
}

#[test]
fn pubmed_citation() {
    let citation = client().citation("pubmed", "17284678").unwrap();
    assert_eq!(citation.id, "17284678");
    assert_eq!(citation.title, "Regulation of yeast growth.");
    assert_eq!(citation.authors, "Smith J, Doe A.");
    assert_eq!(citation.source, "Mol Cell. 2007 Feb;25(3):1-9.");
    assert_eq!(
        citation.abstract_text,
        "Regulation of yeast growth.\n\nGrowth is regulated."
    );
}

#[test]
fn pmc_citation_maps_id_first() {
    let citation = client().citation("PMC", "1790863").unwrap();
    assert_eq!(citation.id, "1790863");
    assert_eq!(citation.authors, "Smith J, Doe A.");
}

#[test]
fn pmc_citation_without_mapping_is_empty() {
    let citation = client().citation("pmc", "999").unwrap();
    assert_eq!(citation.id, "999");
    assert!(citation.title.is_empty());
    assert!(citation.abstract_text.is_empty());
}

#[test]
fn citation_fetch_failure_is_an_error() {
    let err = client().citation("pubmed", "1").unwrap_err();
    match err {
        Error::Fetch(fetch) => assert_eq!(fetch.category(), FailureKind::Io),
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[test]
fn pmid_mapping() {
    let client = client();
    assert_eq!(client.pmid_for("1790863").unwrap().as_deref(), Some("17284678"));
    assert_eq!(client.pmid_for("999").unwrap(), None);
}

#[test]
fn search_and_count() {
    let client = client();
    assert_eq!(
        client.search("pmc", "yeast growth", 3).unwrap(),
        ["1790863", "1790864"]
    );
    assert_eq!(client.count("pmc", "yeast growth", 3).unwrap(), 2);
}

#[test]
fn search_results_saved_one_per_line() {
    let path = temp_path("search.txt");
    let written = search_to_file(&client(), "pmc", "yeast growth", 3, &path).unwrap();
    let saved = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(written, 2);
    assert_eq!(saved, "1790863\n1790864\n");
}

struct FixedSearch(Vec<&'static str>);

impl SearchService for FixedSearch {
    fn search(&self, _db: &str, _query: &str, max_results: usize) -> pmc_extract::Result<Vec<String>> {
        Ok(self.0.iter().take(max_results).map(ToString::to_string).collect())
    }
}

#[test]
fn any_search_service_can_feed_the_file_writer() {
    let path = temp_path("fixed-search.txt");
    let written = search_to_file(&FixedSearch(vec!["1", "2", "3"]), "pubmed", "q", 2, &path).unwrap();
    let saved = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(written, 2);
    assert_eq!(saved, "1\n2\n");
}

#[test]
fn paper_and_empty_paper() {
    let client = client();
    assert!(client.paper("1790863").unwrap().unwrap().starts_with("<article>"));
    assert_eq!(client.paper("555").unwrap(), None);
}

#[test]
fn saved_paper_lines_are_terminated() {
    let path = temp_path("paper.xml");
    assert!(client().save_paper("1790863", &path).unwrap());
    let saved = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(saved, format!("{FULL_TEXT}\n"));
    assert!(!client().save_paper("555", temp_path("empty.xml")).unwrap());
}

#[test]
fn methods_section_from_full_text() {
    assert_eq!(
        client().methods_section("1790863").unwrap(),
        "<sec sec-type=\"materials|methods\"><title>Methods</title><sec><p>strains</p></sec></sec>"
    );
    assert_eq!(client().methods_section("555").unwrap(), "");
}

#[test]
fn pmc_abstract_is_cleaned() {
    assert_eq!(
        client().pmc_abstract("1790863").unwrap().as_deref(),
        Some("Growth is <em>regulated</em>.")
    );
}

#[test]
fn clean_page_of_missing_article_is_sentinel() {
    let client = client();
    let page = client.page("404");
    assert_eq!(page.status(), DocumentStatus::Failed(FailureKind::Io));
    assert_eq!(client.clean_page("404").unwrap(), IO_SENTINEL);
}

#[test]
fn clean_page_of_available_article() {
    let out = client().clean_page("1790863").unwrap();
    assert!(out.contains("Readable."));
    assert!(!out.contains("<td"));
}

#[test]
fn oversize_page_is_sentinel() {
    let options = Options {
        max_document_bytes: 16,
        ..Options::default()
    };
    let client = EntrezClient::new(repository(), &options);
    let page = client.page("1790863");
    assert_eq!(page.status(), DocumentStatus::Oversize);
    assert_eq!(client.clean_page("1790863").unwrap(), OVERSIZE_SENTINEL);
}

#[test]
fn pdf_download_respects_its_ceiling() {
    let path = temp_path("paper.pdf");
    assert_eq!(client().save_pdf("1790863", &path).unwrap(), 13);
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 fake");
    std::fs::remove_file(&path).ok();

    let options = Options {
        max_pdf_bytes: 4,
        ..Options::default()
    };
    let small = EntrezClient::new(repository(), &options);
    assert!(small.save_pdf("1790863", temp_path("small.pdf")).is_err());
}

#[test]
fn articles_processed_in_parallel() {
    let client = client();
    let results: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| client.methods_section("1790863").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert!(results[0].contains("strains"));
}
