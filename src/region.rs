//! Balanced-region scanning over raw markup.
//!
//! Two modes share one cursor model. Extraction finds regions of one tag
//! family and follows nesting depth to each region's true closer. Deletion
//! removes every region introduced by a marker, backing up from the marker
//! to the start of the tag that carries it, and treats regions as
//! non-nesting (first closer wins).
//!
//! Scanning works on byte offsets returned by `str::find`, so every slice
//! lands on a character boundary.

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Section types that make up a "Materials and Methods" section.
pub const METHODS_SECTION_TYPES: [&str; 4] = [
    "methods",
    "materials",
    "materials|methods",
    "methods|materials",
];

/// One balanced region found by extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMatch {
    /// Value of the type attribute (or the tag name for untyped lookups).
    pub type_label: String,
    /// Byte offset of the opening `<`.
    pub start: usize,
    /// Byte offset just past the matching closer.
    pub end: usize,
    /// `doc[start..end]`.
    pub raw_markup: String,
}

/// An opening tag of the scanned family.
#[derive(Debug, Clone, Copy)]
struct Opener {
    start: usize,
    /// Just past the closing `>`.
    end: usize,
    self_closing: bool,
}

/// Find the next `<tag` opener starting in `doc[from..until]`.
///
/// `<tag` must be followed by whitespace, `>` or `/` so that `<sec` does not
/// match `<section`.
fn find_opener(doc: &str, tag: &str, from: usize, until: usize) -> Result<Option<Opener>> {
    let needle = format!("<{tag}");
    let mut cursor = from;

    while cursor < until {
        let Some(rel) = doc[cursor..].find(&needle) else {
            return Ok(None);
        };
        let start = cursor + rel;
        if start >= until {
            return Ok(None);
        }
        let after = start + needle.len();

        match doc[after..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => {
                let Some(rel_gt) = doc[after..].find('>') else {
                    return Err(Error::MalformedMarkup(format!(
                        "<{tag}> tag at byte {start} is never terminated"
                    )));
                };
                let end = after + rel_gt + 1;
                let self_closing = doc[start..end - 1].ends_with('/');
                return Ok(Some(Opener {
                    start,
                    end,
                    self_closing,
                }));
            }
            Some(_) => cursor = after,
            None => {
                return Err(Error::MalformedMarkup(format!(
                    "<{tag}> tag at byte {start} is cut off by the end of the document"
                )))
            }
        }
    }

    Ok(None)
}

/// Value of attribute `name` inside one opening tag's markup.
///
/// Accepts double-quoted, single-quoted and bare values.
#[must_use]
pub fn attribute_value<'a>(tag_markup: &'a str, name: &str) -> Option<&'a str> {
    if name.is_empty() {
        return None;
    }

    let mut search = 0;
    while let Some(rel) = tag_markup[search..].find(name) {
        let at = search + rel;
        search = at + name.len();

        let preceded_by_space = tag_markup[..at]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        if !preceded_by_space {
            continue;
        }

        let Some(rest) = tag_markup[search..].trim_start().strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();

        return match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                body.find(quote).map(|close| &body[..close])
            }
            Some(_) => {
                let close = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                Some(rest[..close].trim_end_matches('/'))
            }
            None => None,
        };
    }

    None
}

/// Offset just past the closer that balances `opener`.
fn region_end(doc: &str, tag: &str, opener: Opener) -> Result<usize> {
    if opener.self_closing {
        return Ok(opener.end);
    }

    let closer = format!("</{tag}>");
    let mut depth = 1usize;
    let mut cursor = opener.end;

    loop {
        let Some(rel_close) = doc[cursor..].find(&closer) else {
            warn!(tag, offset = opener.start, depth, "balanced region never closes");
            return Err(Error::MalformedMarkup(format!(
                "<{tag}> opened at byte {} has no matching {closer}",
                opener.start
            )));
        };
        let close_at = cursor + rel_close;

        match find_opener(doc, tag, cursor, close_at)? {
            Some(nested) => {
                if !nested.self_closing {
                    depth += 1;
                }
                cursor = nested.end;
            }
            None => {
                depth -= 1;
                cursor = close_at + closer.len();
                if depth == 0 {
                    return Ok(cursor);
                }
            }
        }
    }
}

/// Extract every `tag` region whose `type_attr` is in `accepted`.
///
/// Matching is case-sensitive and exact. Qualifying regions are returned
/// whole, nested regions included, in document order; scanning resumes after
/// each one. For a non-qualifying opener only the opener is skipped, so a
/// qualifying region nested inside it is still found.
pub fn extract_sections(
    doc: &str,
    tag: &str,
    type_attr: &str,
    accepted: &[&str],
) -> Result<Vec<SectionMatch>> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(opener) = find_opener(doc, tag, cursor, doc.len())? {
        let label = attribute_value(&doc[opener.start..opener.end], type_attr);

        match label {
            Some(label) if accepted.contains(&label) => {
                let end = region_end(doc, tag, opener)?;
                debug!(tag, label, start = opener.start, end, "qualifying region");
                found.push(SectionMatch {
                    type_label: label.to_string(),
                    start: opener.start,
                    end,
                    raw_markup: doc[opener.start..end].to_string(),
                });
                cursor = end;
            }
            _ => cursor = opener.end,
        }
    }

    Ok(found)
}

/// All "Materials and Methods" sections of a full-text record.
pub fn methods_sections(doc: &str) -> Result<Vec<SectionMatch>> {
    extract_sections(doc, "sec", "sec-type", &METHODS_SECTION_TYPES)
}

/// The "Materials and Methods" sections concatenated in document order.
///
/// Empty when the record has none.
///
/// # Example
///
/// ```rust
/// use pmc_extract::region::methods_section;
///
/// let paper = r#"<sec sec-type="intro">I</sec><sec sec-type="methods">A<sec>B</sec>C</sec>"#;
/// assert_eq!(
///     methods_section(paper)?,
///     r#"<sec sec-type="methods">A<sec>B</sec>C</sec>"#
/// );
/// # Ok::<(), pmc_extract::Error>(())
/// ```
pub fn methods_section(doc: &str) -> Result<String> {
    Ok(methods_sections(doc)?
        .into_iter()
        .map(|m| m.raw_markup)
        .collect())
}

/// The first complete `tag` element, nesting respected.
pub fn first_element(doc: &str, tag: &str) -> Result<Option<SectionMatch>> {
    let Some(opener) = find_opener(doc, tag, 0, doc.len())? else {
        return Ok(None);
    };
    let end = region_end(doc, tag, opener)?;
    Ok(Some(SectionMatch {
        type_label: tag.to_string(),
        start: opener.start,
        end,
        raw_markup: doc[opener.start..end].to_string(),
    }))
}

/// Delete every region introduced by `marker` and ended by `closer`.
///
/// The marker may sit anywhere inside its tag (e.g. an attribute); deletion
/// starts at the nearest `<` before it. The first `closer` after the marker
/// ends the region. A region that never closes runs to the end of the
/// document. A marker with no `<` before it in the retained text is
/// malformed input.
pub fn delete_regions(doc: &str, marker: &str, closer: &str) -> Result<String> {
    if marker.is_empty() || closer.is_empty() {
        return Ok(doc.to_string());
    }

    let mut kept = String::with_capacity(doc.len());
    let mut copy_from = 0;

    while let Some(rel) = doc[copy_from..].find(marker) {
        let marker_at = copy_from + rel;

        let tag_start = if marker.starts_with('<') {
            marker_at
        } else {
            let Some(lt) = doc[copy_from..marker_at].rfind('<') else {
                warn!(marker, offset = marker_at, "marker outside any tag");
                return Err(Error::MalformedMarkup(format!(
                    "`{marker}` at byte {marker_at} has no enclosing tag start"
                )));
            };
            copy_from + lt
        };
        kept.push_str(&doc[copy_from..tag_start]);

        let search_from = marker_at + marker.len();
        if let Some(rel_close) = doc[search_from..].find(closer) {
            copy_from = search_from + rel_close + closer.len();
        } else {
            debug!(marker, closer, "region runs to end of document");
            copy_from = doc.len();
            break;
        }
    }

    kept.push_str(&doc[copy_from..]);
    Ok(kept)
}

/// Delete from the first `start` marker up to (not including) the first
/// `end` marker after it.
///
/// No `start` marker means nothing to delete. A `start` without a following
/// `end` is malformed.
pub fn delete_span(doc: &str, start: &str, end: &str) -> Result<String> {
    let Some(from) = doc.find(start) else {
        debug!(start, "span start absent, nothing deleted");
        return Ok(doc.to_string());
    };
    let Some(rel) = doc[from..].find(end) else {
        return Err(Error::MalformedMarkup(format!(
            "`{start}` at byte {from} is not followed by `{end}`"
        )));
    };
    let to = from + rel;

    let mut kept = String::with_capacity(doc.len() - (to - from));
    kept.push_str(&doc[..from]);
    kept.push_str(&doc[to..]);
    Ok(kept)
}

/// Like [`delete_span`], but a missing `start` marker is malformed too.
pub fn delete_required_span(doc: &str, start: &str, end: &str) -> Result<String> {
    if !doc.contains(start) {
        warn!(start, "expected span start not found");
        return Err(Error::MalformedMarkup(format!("`{start}` not found")));
    }
    delete_span(doc, start, end)
}
