//! Locating the page an assistant answer refers to.
//!
//! Answers are expected to end with a `Page number: N` line (optionally
//! `Page number: page N`). The first sentence of the `Answer:` section is
//! kept as the text to look for on that page.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)page number:\s*(?:page\s*)?(\d+)").expect("valid page regex")
});
static ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)answer:\s*(.*?)(?:page number:|$)").expect("valid answer regex")
});
static CAMEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid camel-case regex"));

/// Share of significant search words that must appear for a fuzzy match.
const WORD_MATCH_RATIO: f64 = 0.7;
const FALLBACK_SOURCE_CHARS: usize = 100;
const QUERY_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    /// 1-based page number as written in the answer.
    pub page_number: usize,
    pub source_text: String,
    pub search_text: String,
}

/// Extracts the cited page and a short quote from an assistant answer.
/// Returns `None` when the answer names no page.
pub fn parse_citation(answer: &str) -> Option<Citation> {
    let page_number = PAGE_RE
        .captures(answer)
        .and_then(|c| c[1].parse::<usize>().ok())?;

    let mut source_text = ANSWER_RE
        .captures(answer)
        .map(|c| first_sentence(c[1].trim()).to_string())
        .unwrap_or_default();

    if source_text.is_empty() {
        source_text = answer.chars().take(FALLBACK_SOURCE_CHARS).collect();
    }

    let search_text = normalize(&source_text);

    Some(Citation {
        page_number,
        source_text,
        search_text,
    })
}

impl Citation {
    /// Whether `text` (e.g. a line of the cited page) contains the quote,
    /// either verbatim after normalization or by most of its longer words.
    pub fn matches(&self, text: &str) -> bool {
        let haystack = normalize(text).to_lowercase();
        let needle = self.search_text.to_lowercase();

        if haystack.contains(&needle) {
            return true;
        }

        let search_words: Vec<&str> = needle.split(' ').filter(|w| w.chars().count() > 2).collect();
        if search_words.is_empty() {
            return false;
        }
        let text_words: Vec<&str> = haystack.split(' ').filter(|w| !w.is_empty()).collect();

        let found = search_words
            .iter()
            .filter(|word| {
                text_words
                    .iter()
                    .any(|tw| tw.contains(**word) || word.contains(*tw))
            })
            .count();

        found >= (search_words.len() as f64 * WORD_MATCH_RATIO).ceil() as usize
    }

    /// A short query for a viewer's text search: the first few distinctive
    /// words of the quote, with punctuation stripped and joined camel-case
    /// words split apart.
    pub fn viewer_query(&self) -> String {
        let spaced = CAMEL_RE.replace_all(&self.source_text, "$1 $2");
        let cleaned: String = first_sentence(&spaced)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c.is_whitespace() { c } else { ' ' })
            .collect();

        cleaned
            .split_whitespace()
            .filter(|w| w.len() > 2)
            .take(QUERY_WORDS)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Zero-based page index, as PDF viewers count pages.
    pub fn page_index(&self) -> usize {
        self.page_number.saturating_sub(1)
    }
}

fn first_sentence(text: &str) -> &str {
    text.split(['.', '!', '?', '\n']).next().unwrap_or("").trim()
}

/// Collapses whitespace runs and straightens curly quotes.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'], "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer_and_page() {
        let answer = "Answer: The warranty lasts two years. It covers parts.\nPage number: page 4";
        let citation = parse_citation(answer).unwrap();

        assert_eq!(citation.page_number, 4);
        assert_eq!(citation.page_index(), 3);
        assert_eq!(citation.source_text, "The warranty lasts two years");
        assert_eq!(citation.search_text, "The warranty lasts two years");
    }

    #[test]
    fn test_parse_plain_page_number_case_insensitive() {
        let citation = parse_citation("- answer: Yes\n- PAGE NUMBER: 12").unwrap();
        assert_eq!(citation.page_number, 12);
        assert_eq!(citation.source_text, "Yes");
    }

    #[test]
    fn test_no_page_number_means_no_citation() {
        assert!(parse_citation("Answer: I could not find that in the document.").is_none());
        assert!(parse_citation("Page number: unknown").is_none());
    }

    #[test]
    fn test_missing_answer_falls_back_to_prefix() {
        let body = "x".repeat(150);
        let response = format!("{body}\nPage number: 2");
        let citation = parse_citation(&response).unwrap();

        assert_eq!(citation.source_text, "x".repeat(100));
    }

    #[test]
    fn test_search_text_is_normalized() {
        let citation =
            parse_citation("Answer: The \u{201C}fast\u{201D}   mode\tworks\nPage number: 1").unwrap();
        assert_eq!(citation.search_text, "The \"fast\" mode works");
    }

    #[test]
    fn test_matches_exact_and_fuzzy() {
        let citation = parse_citation("Answer: Battery charging takes three hours\nPage number: 7")
            .unwrap();

        assert!(citation.matches("Note:  battery CHARGING takes three hours when cold."));
        // 4 of 5 significant words present, threshold is ceil(3.5) = 4.
        assert!(citation.matches("charging the battery takes about three days"));
        assert!(!citation.matches("the quick brown fox"));
    }

    #[test]
    fn test_matches_requires_significant_words() {
        let citation = Citation {
            page_number: 1,
            source_text: "a b".to_string(),
            search_text: "a b".to_string(),
        };
        assert!(!citation.matches("nothing relevant here"));
    }

    #[test]
    fn test_viewer_query() {
        let citation =
            parse_citation("Answer: Top SpeedWith turbo is 240 km/h. Other text.\nPage number: 9")
                .unwrap();
        assert_eq!(citation.viewer_query(), "Top Speed With");
    }
}
