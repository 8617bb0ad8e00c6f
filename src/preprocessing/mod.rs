//! Text normalization shared by the training pipeline and the serving path.
//!
//! Both sides call [`tokenize`]; there is deliberately no second
//! implementation anywhere else. The functions here are pure: the same input
//! always produces the same token sequence, and no input panics.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+").expect("static url pattern"));

// Negation words ("not", "no", "never", "nor") are deliberately absent from
// this list: they invert sentiment and must survive into the feature space.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
        "be", "because", "been", "before", "being", "between", "both", "but", "by", "can", "could",
        "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further",
        "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i",
        "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my",
        "myself", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out", "over",
        "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
        "theirs", "them", "then", "there", "these", "they", "this", "those", "through", "to",
        "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
        "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
        "yourself",
    ]
    .into_iter()
    .collect()
});

/// Lowercase the text, strip URLs, and collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = URL_RE.replace_all(&lowered, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn raw comment text into the token sequence the vectorizer consumes.
///
/// Tokens are unicode word chunks from the normalized text, minus stopwords,
/// single characters, and purely numeric chunks. Order is preserved so the
/// vectorizer can form n-grams. Empty or noise-only input yields an empty
/// vector.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 1)
        .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
        .filter(|token| !STOPWORDS.contains(token))
        .map(|token| token.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_drops_stopwords() {
        let tokens = tokenize("This Video IS Amazing!");
        assert_eq!(tokens, vec!["video", "amazing"]);
    }

    #[test]
    fn test_tokenize_strips_urls() {
        let tokens = tokenize("watch this https://youtu.be/xyz now or www.example.com later");
        assert!(!tokens.iter().any(|t| t.contains("youtu")));
        assert!(!tokens.iter().any(|t| t.contains("example")));
        assert!(tokens.contains(&"watch".to_string()));
    }

    #[test]
    fn test_tokenize_keeps_negations() {
        let tokens = tokenize("I do not like this, never again");
        assert!(tokens.contains(&"not".to_string()));
        assert!(tokens.contains(&"never".to_string()));
        assert!(tokens.contains(&"like".to_string()));
    }

    #[test]
    fn test_tokenize_drops_numbers_and_single_chars() {
        let tokens = tokenize("top 10 crashes at 3 x wow");
        assert!(!tokens.contains(&"10".to_string()));
        assert!(!tokens.contains(&"x".to_string()));
        assert!(tokens.contains(&"wow".to_string()));
    }

    #[test]
    fn test_tokenize_empty_and_noise_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
        assert!(tokenize("!!! ??? ...").is_empty());
        assert!(tokenize("👍👍👍").is_empty());
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let text = "Some comments LOOK the same, https://a.b/c but tokenize once!";
        let first = tokenize(text);
        for _ in 0..5 {
            assert_eq!(tokenize(text), first);
        }
    }

    #[test]
    fn test_tokenize_preserves_order() {
        let tokens = tokenize("terrible editing great music");
        assert_eq!(tokens, vec!["terrible", "editing", "great", "music"]);
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  So   MUCH\t\tspace \n"), "so much space");
    }
}
