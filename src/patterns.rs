//! Built-in rewrite tables.
//!
//! Every table is declared as data (a list of [`RuleSpec`]s) and compiled
//! once on first use with `LazyLock`. The `*_specs` functions expose the
//! declarations so a table can be dumped to JSON, edited and reloaded.

use std::sync::LazyLock;

use crate::rules::{RuleSpec, RuleTable};

/// Absolute root that relative PubMed Central endpoints are rewritten to.
pub const PMC_SITE: &str = "http://www.pubmedcentral.nih.gov/";

/// Regex for an opening tag of exactly `name`, with any attributes.
///
/// `<sec` must be followed by whitespace, `/` or `>`, so the pattern for
/// `sec` never touches `<section>` or `<self-uri>`.
#[must_use]
pub fn open_tag(name: &str) -> String {
    format!(r"<{}(?:[\s/][^>]*)?>", regex::escape(name))
}

/// Regex for a whole element `name`, content included (non-nesting).
#[must_use]
pub fn whole_element(name: &str) -> String {
    let name = regex::escape(name);
    format!(r"(?s)<{name}(?:[\s/][^>]*)?>.*?</{name}>")
}

#[allow(clippy::expect_used)]
fn compile(name: &str, specs: Vec<RuleSpec>) -> RuleTable {
    RuleTable::from_specs(name, specs).expect("built-in rule table compiles")
}

// =============================================================================
// Structural strip (full-text XML)
// =============================================================================

/// Element vocabulary of full-text records, in rule order.
pub const STRUCTURAL_ELEMENTS: &[&str] = &[
    "abstract",
    "ack",
    "addr-line",
    "aff",
    "alt-title",
    "article",
    "article-categories",
    "article-id",
    "article-meta",
    "article-title",
    "author-notes",
    "back",
    "body",
    "bold",
    "break",
    "caption",
    "citation",
    "col",
    "colgroup",
    "collab",
    "contract-num",
    "contract-sponsor",
    "contrib",
    "contrib-group",
    "copyright-holder",
    "copyright-statement",
    "copyright-year",
    "corresp",
    "counts",
    "custom-meta",
    "custom-meta-wrap",
    "date",
    "day",
    "dc:author",
    "dc:date",
    "dc:identifier",
    "dcterms:bibliographicCitation",
    "dcterms:isPartOf",
    "dc:title",
    "dc:type",
    "degrees",
    "disp-quote",
    "edition",
    "element-citation",
    "email",
    "etal",
    "ext-link",
    "fig",
    "fig-count",
    "fn",
    "fn-group",
    "fpage",
    "front",
    "given-names",
    "graphic",
    "history",
    "inline-graphic",
    "issn",
    "issue",
    "italic",
    "journal-id",
    "journal-meta",
    "journal-title",
    "kwd",
    "kwd-group",
    "label",
    "license",
    "License",
    "list",
    "list-item",
    "lpage",
    "media",
    "meta-name",
    "meta-value",
    "mixed-citation",
    "monospace",
    "month",
    "name",
    "notes",
    "p",
    "page-count",
    "permissions",
    "permits",
    "person-group",
    "pmc-articleset",
    "pub-date",
    "pub-id",
    "publisher",
    "publisher-loc",
    "publisher-name",
    "ref",
    "ref-count",
    "ref-list",
    "requires",
    "role",
    "sc",
    "sec",
    "self-uri",
    "series-title",
    "source",
    "sub",
    "subject",
    "subj-group",
    "suffix",
    "sup",
    "supplementary-material",
    "surname",
    "table",
    "table-count",
    "table-wrap",
    "table-wrap-foot",
    "tbody",
    "td",
    "th",
    "thead",
    "title",
    "title-group",
    "tr",
    "underline",
    "uri",
    "volume",
    "Work",
    "xref",
    "year",
];

/// Name of the rule that turns a title closer into a sentence break.
pub const TITLE_BREAK_RULE: &str = "close:title";

/// Two rules per element (closer, then opener), then numeric references.
///
/// The title closer becomes `". "` so inlined headings still end a sentence.
#[must_use]
pub fn structural_strip_specs() -> Vec<RuleSpec> {
    let mut specs = Vec::with_capacity(STRUCTURAL_ELEMENTS.len() * 2 + 1);
    for &element in STRUCTURAL_ELEMENTS {
        let replacement = if element == "title" { ". " } else { "" };
        specs.push(RuleSpec::literal(
            &format!("close:{element}"),
            &format!("</{element}>"),
            replacement,
        ));
        specs.push(RuleSpec::pattern(
            &format!("open:{element}"),
            &open_tag(element),
            "",
        ));
    }
    specs.push(RuleSpec::pattern(
        "numeric-char-ref",
        r"&#(?:[xX][0-9A-Fa-f]+|[0-9]+);",
        "",
    ));
    specs
}

/// Full-text XML tag strip.
pub static STRUCTURAL_STRIP: LazyLock<RuleTable> =
    LazyLock::new(|| compile("structural-strip", structural_strip_specs()));

// =============================================================================
// Abstract cleanup
// =============================================================================

/// Strip wrappers, drop figures and labels whole, translate emphasis.
#[must_use]
pub fn abstract_cleanup_specs() -> Vec<RuleSpec> {
    vec![
        // wrappers
        RuleSpec::literal("close:abstract", "</abstract>", ""),
        RuleSpec::pattern("open:abstract", &open_tag("abstract"), ""),
        RuleSpec::literal("close:p", "</p>", ""),
        RuleSpec::literal("open:p", "<p>", ""),
        RuleSpec::literal("close:sec", "</sec>", ""),
        RuleSpec::pattern("open:sec", &open_tag("sec"), ""),
        RuleSpec::literal("close:ext-link", "</ext-link>", ""),
        RuleSpec::pattern("open:ext-link", &open_tag("ext-link"), ""),
        // whole elements
        RuleSpec::pattern("element:fig", &whole_element("fig"), ""),
        RuleSpec::pattern("element:label", &whole_element("label"), ""),
        RuleSpec::pattern("open:graphic", &open_tag("graphic"), ""),
        RuleSpec::literal("images-heading", "<title>Images</title>", ""),
        // translations
        RuleSpec::literal("italic-to-em", "<italic>", "<em>"),
        RuleSpec::literal("italic-to-em-close", "</italic>", "</em>"),
        RuleSpec::literal("bold-to-strong", "<bold>", "<strong>"),
        RuleSpec::literal("bold-to-strong-close", "</bold>", "</strong>"),
        RuleSpec::literal("title-to-strong", "<title>", " <strong>"),
        RuleSpec::literal("title-to-strong-close", "</title>", "</strong>. "),
    ]
}

/// Abstract cleanup to minimal semantic HTML.
pub static ABSTRACT_CLEANUP: LazyLock<RuleTable> =
    LazyLock::new(|| compile("abstract-cleanup", abstract_cleanup_specs()));

// =============================================================================
// HTML page cleanup
// =============================================================================

/// Content container that the page is cut down to.
pub const CONTENT_MARKER: &str = "class=\"content-cell\"";

/// Regions removed before any rewriting, as (marker, closer) pairs.
pub const SIDEBAR_REGION: (&str, &str) = ("class=\"sidebar-cell\"", "</td>");
/// HTML comments.
pub const COMMENT_REGION: (&str, &str) = ("<!--", "-->");
/// Inline and external scripts.
pub const SCRIPT_REGION: (&str, &str) = ("<script", "</script>");
/// Data tables.
pub const TABLE_REGION: (&str, &str) = ("<table", "</table>");

/// Footer spans, as (start, end) pairs; the end marker is kept.
pub const FOOTER_SPANS: [(&str, &str); 2] = [
    (
        "<div class=\"footer-section\">",
        "</td></tr></table></body></html>",
    ),
    ("</table></body></html>", "</body></html>"),
];

/// Query prefix that carries the numeric article id in rewritten links.
pub const ARTICLE_ID_QUERY: &str = "articlerender.fcgi?artid=";

/// Same-page anchor prefix rewritten to a cross-document link.
pub const SAME_PAGE_ANCHOR: &str = "<a href=\"#E";

/// Relative endpoints made absolute against [`PMC_SITE`].
pub const RELATIVE_ENDPOINTS: [&str; 5] = [
    "articlerender.fcgi",
    "pagerender.fcgi",
    "picrender.fcgi",
    "tocrender.fcgi",
    "about/copyright.html",
];

/// Residual cell/row/span tags, reference markup and absolute endpoints.
#[must_use]
pub fn page_link_specs() -> Vec<RuleSpec> {
    let mut specs = vec![
        RuleSpec::literal("nbsp", "\u{a0}", ""),
        RuleSpec::literal(
            "arrow-image",
            "<img src=\"corehtml/pmc/pmcgifs/rt-arrow.gif\" alt=\"Small right arrow pointing to:\" style=\"vertical-align: middle;\">",
            "",
        ),
        RuleSpec::pattern("image-link", r"<a(?:\s[^>]*)?><img[^>]*></a>", ""),
        RuleSpec::literal("close:td", "</td>", ""),
        RuleSpec::pattern("open:td", &open_tag("td"), ""),
        RuleSpec::literal("close:tr", "</tr>", ""),
        RuleSpec::pattern("open:tr", &open_tag("tr"), ""),
        RuleSpec::literal("bare-br", "<br>", ""),
        RuleSpec::literal("cite-reflink-class", " class=\"cite-reflink\"", ""),
        RuleSpec::pattern("open:span", &open_tag("span"), ""),
        RuleSpec::literal("close:span", "</span>", ""),
        RuleSpec::pattern("plain-ul", &open_tag("ul"), "<ul>"),
        RuleSpec::literal("back-matter", "<div class=\"back-matter-section\">", ""),
        RuleSpec::literal("ref-block-to-anchor", "<div class=\"ref-cit-blk\"", "<a"),
        RuleSpec::literal("ref-label-closes-anchor", "<div class=\"ref-label\">", "</a>"),
        RuleSpec::literal("ref-citation-join", "</div><div class=\"ref-cit\">", " "),
    ];

    let site = regex::escape(PMC_SITE.trim_start_matches("http://"));
    for endpoint in RELATIVE_ENDPOINTS {
        // An already absolute link is matched whole so it is not prefixed twice.
        specs.push(RuleSpec::pattern(
            &format!("absolute:{endpoint}"),
            &format!(r"(?:https?://{site})?{}", regex::escape(endpoint)),
            &format!("{PMC_SITE}{endpoint}"),
        ));
    }
    specs
}

/// Anchor-id residue, layout divs and paragraphs to line-break markers.
#[must_use]
pub fn page_layout_specs() -> Vec<RuleSpec> {
    vec![
        RuleSpec::pattern("figure-anchor", r#"<a id="F[^>]*></a>"#, ""),
        RuleSpec::pattern("table-anchor", r#"<a id="T[^>]*></a>"#, ""),
        RuleSpec::pattern("fig-table-link", r#"class="fig-table-link" [^>]*>"#, ">"),
        RuleSpec::literal("clear-div", "<div style=\"clear:both;\"></div>", ""),
        RuleSpec::literal("section-content-div", "<div class=\"section-content\">", ""),
        RuleSpec::pattern("head-div", r#"<div class="head[^>]*>"#, ""),
        RuleSpec::pattern("margin-div", r#"<div style="margin[^>]*>"#, ""),
        RuleSpec::pattern("border-div", r#"<div style="border[^>]*>"#, ""),
        RuleSpec::pattern(
            "pubmed-extlink",
            r#"\[<a class="ref-extlink"[^>]*>PubMed</a>\]"#,
            "",
        ),
        RuleSpec::pattern("open:div", &open_tag("div"), "\n\n"),
        RuleSpec::literal("double-div-close", "</div></div>", "</div>"),
        RuleSpec::literal("close:div", "</div>", "\n<br></br>\n"),
        RuleSpec::literal("open:p", "<p>", "\n<br></br>\n"),
        RuleSpec::literal("close:p", "</p>", "\n<br></br>\n"),
    ]
}

/// Name of the break-collapse rule that must run twice.
pub const COLLAPSE_BREAKS_RULE: &str = "collapse-breaks";

/// Document wrappers, then the two-pass break collapse and final touch-ups.
///
/// The collapse is listed twice: removing one `</br> <br>` pair can join
/// its neighbours into a new pair that only a second pass sees.
#[must_use]
pub fn page_wrapper_specs() -> Vec<RuleSpec> {
    let collapse = r"</br>\s*<br>";
    let page_link = format!("<a href=\"{PMC_SITE}pagerender.fcgi");
    vec![
        RuleSpec::pattern("open:body", &open_tag("body"), ""),
        RuleSpec::literal("close:body", "</body>", ""),
        RuleSpec::pattern("doctype", r"<!DOCTYPE[^>]*>", ""),
        RuleSpec::literal("close:html", "</html>", ""),
        RuleSpec::literal("open:html", "<html>", ""),
        RuleSpec::pattern(COLLAPSE_BREAKS_RULE, collapse, ""),
        RuleSpec::pattern(&format!("{COLLAPSE_BREAKS_RULE}:second-pass"), collapse, ""),
        RuleSpec::pattern(
            "page-browser-link",
            &format!(r"<br></br>\s*{}", regex::escape(&page_link)),
            &format!("\n{page_link}"),
        ),
        RuleSpec::literal(
            "page-browser-hint",
            "or click on a page below to browse page by page.",
            "or click on a page below to browse page by page.<br></br>",
        ),
    ]
}

/// Page cleanup, first pass: cell wrappers, references and links.
pub static PAGE_LINKS: LazyLock<RuleTable> =
    LazyLock::new(|| compile("page-links", page_link_specs()));

/// Page cleanup, second pass: line breaks around block elements.
pub static PAGE_LAYOUT: LazyLock<RuleTable> =
    LazyLock::new(|| compile("page-layout", page_layout_specs()));

/// Page cleanup, last pass: remaining wrappers and break pairs.
pub static PAGE_WRAPPERS: LazyLock<RuleTable> =
    LazyLock::new(|| compile("page-wrappers", page_wrapper_specs()));

// =============================================================================
// Citation field cleanup
// =============================================================================

/// Link tags around a summary-page title.
pub static TITLE_LINKS: LazyLock<RuleTable> = LazyLock::new(|| {
    compile(
        "title-links",
        vec![
            RuleSpec::pattern("open:a", &open_tag("a"), ""),
            RuleSpec::literal("close:a", "</a>", ""),
        ],
    )
});

/// Span tags inside a summary-page source line.
pub static SOURCE_SPANS: LazyLock<RuleTable> = LazyLock::new(|| {
    compile(
        "source-spans",
        vec![
            RuleSpec::pattern("open:span", &open_tag("span"), ""),
            RuleSpec::literal("close:span", "</span>", ""),
        ],
    )
});
