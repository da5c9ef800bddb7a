//! Extractive summarization by word-frequency sentence scoring.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Sentences kept when no count is given.
pub const DEFAULT_SENTENCES: usize = 3;

/// Column at which summary lines are wrapped.
const WRAP_WIDTH: usize = 80;

/// A paragraph is closed once it has two sentences and exceeds this length.
const PARAGRAPH_CHARS: usize = 150;

const STOP_WORDS: &[&str] = &[
    "the", "and", "is", "in", "it", "to", "of", "for", "with", "as", "that", "on", "at", "by",
    "an", "be", "this", "are",
];

static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+\](?:\[.*?\])?").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// Remove citation markers such as `[10]` or `[12][dead link]`.
pub fn clean_citations(text: &str) -> String {
    CITATION.replace_all(text, "").into_owned()
}

/// Interpret the optional sentence-count argument.
///
/// Returns the rejected text when the argument is not a non-negative integer.
pub fn sentence_count(arg: Option<&str>) -> Result<usize, String> {
    match arg {
        None => Ok(DEFAULT_SENTENCES),
        Some(raw) => raw.trim().parse().map_err(|_| raw.to_string()),
    }
}

/// Summarize `text` down to at most `count` sentences.
///
/// Sentences are scored by the sum of their words' normalized frequencies
/// (stop words excluded) and the best ones are kept in their original order,
/// grouped into paragraphs, and wrapped at 80 columns. Text that already has
/// `count` sentences or fewer is returned one sentence per paragraph.
pub fn summarize_text(text: &str, count: usize) -> String {
    let text = clean_citations(text);
    let text = WHITESPACE.replace_all(&text, " ");
    let sentences = split_sentences(text.trim());

    if sentences.len() <= count {
        return sentences.join("\n\n");
    }

    let mut frequency: HashMap<String, f64> = HashMap::new();
    for word in words(&text) {
        if !STOP_WORDS.contains(&word.as_str()) {
            *frequency.entry(word).or_default() += 1.0;
        }
    }
    let max = frequency.values().copied().fold(0.0_f64, f64::max).max(1.0);

    let scores: Vec<f64> = sentences
        .iter()
        .map(|s| {
            words(s)
                .iter()
                .map(|w| frequency.get(w).map_or(0.0, |f| f / max))
                .sum()
        })
        .collect();

    // Stable sort keeps the earlier sentence first on ties.
    let mut ranked: Vec<usize> = (0..sentences.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
    ranked.truncate(count);
    ranked.sort_unstable();

    let top: Vec<&str> = ranked.iter().map(|&i| sentences[i].as_str()).collect();
    paragraphs(&top)
        .iter()
        .map(|p| wrap(p, WRAP_WIDTH))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split whitespace-normalized text after `.`, `?` or `!`, leaving
/// abbreviations such as `e.g.` and `Mr.` intact.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for i in 0..chars.len() {
        if chars[i].is_whitespace() && is_sentence_end(&chars[..i]) {
            sentences.push(chars[start..i].iter().collect::<String>());
            start = i + 1;
        }
    }
    sentences.push(chars[start..].iter().collect());

    sentences
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_sentence_end(before: &[char]) -> bool {
    let n = before.len();
    match before.last() {
        Some('.' | '?' | '!') => {}
        _ => return false,
    }
    // "e.g." / "i.e."
    if n >= 4 && is_word(before[n - 4]) && before[n - 3] == '.' && is_word(before[n - 2]) {
        return false;
    }
    // "Mr." / "Dr."
    if n >= 3
        && before[n - 3].is_ascii_uppercase()
        && before[n - 2].is_ascii_lowercase()
        && before[n - 1] == '.'
    {
        return false;
    }
    true
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn words(text: &str) -> Vec<String> {
    PUNCTUATION
        .replace_all(&text.to_lowercase(), "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn paragraphs(sentences: &[&str]) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for &sentence in sentences {
        current.push(sentence);
        if current.len() >= 2 && current.join(" ").chars().count() > PARAGRAPH_CHARS {
            paragraphs.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

fn wrap(paragraph: &str, width: usize) -> String {
    if paragraph.chars().count() <= width {
        return paragraph.to_string();
    }

    let mut lines = Vec::new();
    let mut line: Vec<&str> = Vec::new();
    let mut used = 0;

    for word in paragraph.split_whitespace() {
        let len = word.chars().count();
        if !line.is_empty() && used + len > width {
            lines.push(line.join(" "));
            line.clear();
            used = 0;
        }
        line.push(word);
        used += len + 1;
    }
    if !line.is_empty() {
        lines.push(line.join(" "));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "Rust is a systems programming language. \
        Rust guarantees memory safety without a garbage collector. \
        Many developers enjoy the weather. \
        The borrow checker enforces memory safety rules in Rust programs. \
        Cats sleep a lot.";

    #[test]
    fn citations_are_removed() {
        assert_eq!(
            clean_citations("Fact[12] and more[3][dead link]."),
            "Fact and more."
        );
    }

    #[test]
    fn splits_on_terminators_but_not_abbreviations() {
        let s = split_sentences("Hello there. Is it e.g. fine? Ask Mr. Smith! Done");
        assert_eq!(s, ["Hello there.", "Is it e.g. fine?", "Ask Mr. Smith!", "Done"]);
    }

    #[test]
    fn short_text_is_one_sentence_per_paragraph() {
        let out = summarize_text("First one. Second one.", 3);
        assert_eq!(out, "First one.\n\nSecond one.");
    }

    #[test]
    fn keeps_top_sentences_in_original_order() {
        let out = summarize_text(ARTICLE, 2);
        assert_eq!(
            out,
            "Rust guarantees memory safety without a garbage collector. The borrow checker\n\
             enforces memory safety rules in Rust programs."
        );
    }

    #[test]
    fn zero_sentences_is_empty() {
        assert_eq!(summarize_text(ARTICLE, 0), "");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(summarize_text("", 3), "");
        assert_eq!(summarize_text("   \n ", 3), "");
    }

    #[test]
    fn long_paragraph_wraps_at_80_columns() {
        let paragraph = "word ".repeat(40);
        let wrapped = wrap(paragraph.trim(), 80);
        assert!(wrapped.lines().count() > 1);
        assert!(wrapped.lines().all(|l| l.chars().count() <= 80));
    }

    #[test]
    fn sentence_count_argument() {
        assert_eq!(sentence_count(None), Ok(3));
        assert_eq!(sentence_count(Some("5")), Ok(5));
        assert_eq!(sentence_count(Some("many")), Err("many".to_string()));
    }
}
