use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_OVERLAP: usize = 200;

/// How far (in characters) on either side of the raw boundary we look for a
/// sentence terminator. Fixed, independent of the chunk size.
const SENTENCE_WINDOW: usize = 100;

/// Sizing for [`chunk_text`]. Offsets and sizes are counted in characters.
///
/// `chunk_size` must be positive. `overlap >= chunk_size` is accepted but
/// degenerate: every step falls back to the forward-progress guard and
/// consecutive chunks stop overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkOptions {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkOptions {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }
}

/// A trimmed slice of the source text and the half-open `[start_index,
/// end_index)` character range it was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub content: String,
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageChunk {
    #[serde(flatten)]
    pub chunk: TextChunk,
    /// 1-based position of the page in the input.
    pub page_number: usize,
}

/// Splits `text` into overlapping chunks of at most roughly
/// `options.chunk_size` characters, preferring to cut right after a sentence
/// terminator (`.`, `!` or `?` followed by whitespace).
///
/// Whitespace-only windows produce no chunk, so an empty or blank input
/// yields an empty vector.
pub fn chunk_text(text: &str, options: &ChunkOptions) -> Vec<TextChunk> {
    // A zero size could never advance.
    let chunk_size = options.chunk_size.max(1);

    // Byte offset of every char, plus the end of the string, so character
    // ranges can be sliced without splitting a code point.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let len = bounds.len() - 1;
    let slice = |start: usize, end: usize| &text[bounds[start]..bounds[end]];

    if len <= chunk_size {
        let content = text.trim();
        if content.is_empty() {
            return Vec::new();
        }
        return vec![TextChunk {
            content: content.to_string(),
            start_index: 0,
            end_index: len,
        }];
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let mut end = (start + chunk_size).min(len);

        if end < len {
            if let Some(boundary) = sentence_boundary(&chars, end) {
                // Only accept the boundary if the chunk stays above half size.
                if 2 * boundary.saturating_sub(start) > chunk_size {
                    end = boundary;
                }
            }
        }

        let content = slice(start, end).trim();
        if !content.is_empty() {
            chunks.push(TextChunk {
                content: content.to_string(),
                start_index: start,
                end_index: end,
            });
        }

        if end >= len {
            break;
        }

        let next = end.saturating_sub(options.overlap);
        // Stalled: the overlap would put us back at or before this window.
        start = if next <= start { end } else { next };
    }

    chunks
}

/// Chunks every non-blank page independently and tags each chunk with its
/// 1-based page number. Blank pages are skipped without renumbering.
pub fn chunk_text_by_pages<S: AsRef<str>>(pages: &[S], options: &ChunkOptions) -> Vec<PageChunk> {
    pages
        .iter()
        .enumerate()
        .filter(|(_, page)| !page.as_ref().trim().is_empty())
        .flat_map(|(index, page)| {
            chunk_text(page.as_ref(), options)
                .into_iter()
                .map(move |chunk| PageChunk {
                    chunk,
                    page_number: index + 1,
                })
        })
        .collect()
}

/// Finds the first sentence terminator followed by whitespace within
/// `SENTENCE_WINDOW` chars of `end` and returns the index just past it.
fn sentence_boundary(chars: &[char], end: usize) -> Option<usize> {
    let lo = end.saturating_sub(SENTENCE_WINDOW);
    let hi = (end + SENTENCE_WINDOW).min(chars.len());

    (lo..hi.saturating_sub(1))
        .find(|&i| matches!(chars[i], '.' | '!' | '?') && chars[i + 1].is_whitespace())
        .map(|i| i + 1)
}
