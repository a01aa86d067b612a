//! Sliding-window chunking: fixed-size, overlapping character windows per page.
//!
//! Windows of `chunk_size` characters advance by `chunk_size - overlap`
//! (minimum 1, so a pathological overlap can never stall the window). The
//! final window may be shorter so trailing content is never lost. Windows are
//! measured in Unicode characters, never bytes, so a window boundary cannot
//! split a UTF-8 sequence.

use crate::error::ChunkError;
use crate::extract::Page;

/// One overlapping window of a page's text, the unit of embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based page number this window came from.
    pub page: u32,
    /// Ordinal within the page, starting at 0.
    pub index: u32,
    /// Window text, non-empty after trimming.
    pub text: String,
}

/// Windowing parameters.
#[derive(Debug, Clone, Copy)]
pub struct ChunkParams {
    /// Window size in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive windows.
    pub overlap: usize,
}

impl ChunkParams {
    /// Check the windowing invariants: `chunk_size > 0` and `overlap < chunk_size`.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.chunk_size == 0 {
            return Err(ChunkError::InvalidChunkSize {
                chunk_size: self.chunk_size,
            });
        }
        if self.overlap >= self.chunk_size {
            return Err(ChunkError::InvalidOverlap {
                chunk_size: self.chunk_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }

    /// Window start advance: `chunk_size - overlap`, at least 1.
    fn step(&self) -> usize {
        (self.chunk_size - self.overlap).max(1)
    }
}

/// Chunk every page, carrying page and ordinal metadata along.
///
/// Ordering is insertion order: all chunks of page N precede those of page
/// N+1, and within a page the ordinal is strictly increasing. Deterministic
/// for identical input and parameters.
pub fn build_chunks(pages: &[Page], params: &ChunkParams) -> Result<Vec<Chunk>, ChunkError> {
    params.validate()?;

    let mut chunks = Vec::new();
    for page in pages {
        chunk_page(page, params, &mut chunks);
    }
    Ok(chunks)
}

/// Emit the windows of a single page. Assumes `params` already validated.
fn chunk_page(page: &Page, params: &ChunkParams, out: &mut Vec<Chunk>) {
    let chars: Vec<char> = page.text.chars().collect();
    let len = chars.len();
    let step = params.step();

    let mut start = 0usize;
    let mut index = 0u32;
    while start < len {
        let end = (start + params.chunk_size).min(len);
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            out.push(Chunk {
                page: page.number,
                index,
                text: trimmed.to_string(),
            });
            index += 1;
        }
        if end >= len {
            break;
        }
        start += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, text: &str) -> Page {
        Page {
            number,
            text: text.into(),
        }
    }

    fn params(chunk_size: usize, overlap: usize) -> ChunkParams {
        ChunkParams {
            chunk_size,
            overlap,
        }
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let err = build_chunks(&[], &params(0, 0)).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidChunkSize { .. }));
    }

    #[test]
    fn overlap_at_chunk_size_rejected() {
        let err = build_chunks(&[page(1, "abc")], &params(10, 9)).err();
        assert!(err.is_none(), "overlap 9 of 10 is legal");
        let err = build_chunks(&[page(1, "abc")], &params(10, 10)).unwrap_err();
        assert!(matches!(
            err,
            ChunkError::InvalidOverlap {
                chunk_size: 10,
                overlap: 10
            }
        ));
    }

    #[test]
    fn short_page_yields_single_chunk() {
        let chunks = build_chunks(&[page(3, "short text")], &params(1200, 200)).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].page, 3);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "short text");
    }

    #[test]
    fn window_starts_advance_by_step_and_final_end_hits_length() {
        // 26 chars, windows of 10 with overlap 4: starts 0, 6, 12, 18; the
        // window at 18 reaches the end of the text, so windowing stops there.
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = build_chunks(&[page(1, text)], &params(10, 4)).unwrap();
        let expected: Vec<String> = [0usize, 6, 12, 18]
            .iter()
            .map(|&s| text.chars().skip(s).take(10).collect())
            .collect();
        let got: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(got, expected);
        // Final window reaches the end of the page.
        assert!(text.ends_with(chunks.last().unwrap().text.as_str()));
    }

    #[test]
    fn windows_cover_every_character() {
        let text: String = ('a'..='z').cycle().take(137).collect();
        let p = params(20, 5);
        let chunks = build_chunks(&[page(1, &text)], &p).unwrap();
        // Each window start advances by step=15; concatenating the
        // non-overlapping leading portions must reproduce the full text.
        let step = 15;
        let mut covered = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let take = if i + 1 == chunks.len() {
                chunk.text.chars().count()
            } else {
                step
            };
            covered.extend(chunk.text.chars().take(take));
        }
        assert_eq!(covered, text);
    }

    #[test]
    fn chunking_is_deterministic() {
        let pages = [page(1, "the quick brown fox jumps over the lazy dog")];
        let p = params(12, 3);
        let a = build_chunks(&pages, &p).unwrap();
        let b = build_chunks(&pages, &p).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn indices_restart_per_page() {
        let pages = [
            page(1, "aaaaaaaaaaaaaaaaaaaa"),
            page(2, "bbbbbbbbbbbbbbbbbbbb"),
        ];
        let chunks = build_chunks(&pages, &params(8, 2)).unwrap();
        let firsts: Vec<(u32, u32)> = chunks.iter().map(|c| (c.page, c.index)).collect();
        assert!(firsts.contains(&(1, 0)));
        assert!(firsts.contains(&(2, 0)));
        // Page 1 chunks all precede page 2 chunks.
        let split = chunks.iter().position(|c| c.page == 2).unwrap();
        assert!(chunks[..split].iter().all(|c| c.page == 1));
        assert!(chunks[split..].iter().all(|c| c.page == 2));
    }

    #[test]
    fn whitespace_only_window_skipped() {
        // Window 2 lands entirely inside the run of spaces.
        let text = "abcd        xyz";
        let chunks = build_chunks(&[page(1, text)], &params(4, 0)).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "xyz"]);
        // Ordinals stay strictly increasing over emitted chunks.
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn multibyte_text_windows_on_char_boundaries() {
        let text = "αβγδεζηθικλμνξ";
        let chunks = build_chunks(&[page(1, text)], &params(5, 1)).unwrap();
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 5));
        assert_eq!(chunks[0].text, "αβγδε");
    }
}
