//! Text normalization.

use std::sync::LazyLock;

use regex::Regex;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Replace punctuation and symbols with spaces, collapse runs of whitespace,
/// trim, and lowercase.
pub fn clean_text(text: &str) -> String {
    let spaced = NON_WORD.replace_all(text, " ");
    WHITESPACE.replace_all(&spaced, " ").trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        let out = clean_text("This is SOME TEXT!! With punctuation, and CAPITALS.");
        assert_eq!(out, "this is some text with punctuation and capitals");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_text("  a\t\tb\n\nc  "), "a b c");
    }

    #[test]
    fn keeps_unicode_word_characters() {
        assert_eq!(clean_text("Café — Ürün_42!"), "café ürün_42");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("?!."), "");
    }
}
