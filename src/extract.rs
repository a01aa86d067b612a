//! PDF text extraction using the `pdf-extract` crate.
//!
//! `pdf-extract` returns the whole document as a single string with form-feed
//! characters (`\x0C`) between pages, so page boundaries are recovered by
//! splitting on those. Extracted page text is whitespace-normalized: runs of
//! whitespace collapse to single spaces and the result is trimmed.

use crate::error::ExtractError;

/// One page of extracted, whitespace-normalized text.
///
/// Only pages with non-empty text are produced; page numbers count all
/// physical pages, so dropping an empty page never renumbers later pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based physical page number.
    pub number: u32,
    /// Normalized page text, non-empty.
    pub text: String,
}

/// Extract ordered pages from raw PDF bytes.
///
/// Returns `Ok(vec![])` for a parseable PDF with no text layer (e.g. a scan
/// of images); rejecting that case is the orchestrator's call, not ours.
pub fn extract_pages(data: &[u8]) -> Result<Vec<Page>, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(data).map_err(|e| {
        ExtractError::MalformedDocument {
            message: e.to_string(),
        }
    })?;
    Ok(pages_from_text(&text))
}

/// Split raw extracted text into normalized pages.
///
/// Factored out of [`extract_pages`] so the splitting and normalization
/// logic is testable without assembling PDF bytes.
pub(crate) fn pages_from_text(text: &str) -> Vec<Page> {
    let mut pages = Vec::new();
    for (idx, raw) in text.split('\x0C').enumerate() {
        let number = (idx + 1) as u32;
        let cleaned = normalize_whitespace(raw);
        if cleaned.is_empty() {
            // Image-only or blank pages are invisible rather than an error.
            tracing::debug!(page = number, "dropping page with no extractable text");
            continue;
        }
        pages.push(Page {
            number,
            text: cleaned,
        });
    }
    pages
}

/// Collapse whitespace runs to single spaces and trim.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_runs() {
        assert_eq!(normalize_whitespace("  a \n\n b\t c  "), "a b c");
        assert_eq!(normalize_whitespace("\n \t "), "");
    }

    #[test]
    fn pages_split_on_form_feed() {
        let pages = pages_from_text("first  page\x0Csecond\npage");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], Page { number: 1, text: "first page".into() });
        assert_eq!(pages[1], Page { number: 2, text: "second page".into() });
    }

    #[test]
    fn empty_pages_dropped_without_renumbering() {
        let pages = pages_from_text("one\x0C \n \x0Cthree");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[1].number, 3);
    }

    #[test]
    fn all_empty_yields_no_pages() {
        assert!(pages_from_text("").is_empty());
        assert!(pages_from_text(" \x0C\t\x0C\n").is_empty());
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        let err = extract_pages(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedDocument { .. }));
    }
}
