// Text analyzer: the sentence and word tokenization used by matching.
//
// The matcher only needs two operations from an analyzer, so they live behind
// a trait. Normalization policy (stemming, lemmatization) is up to the
// implementation; the default just lowercases.

use regex_lite::Regex;

/// Trait for splitting text into sentences and sentences into words.
///
/// Implementations must be `Sync` because the training pipeline shares a
/// single analyzer across all worker threads.
pub trait Analyzer: Send + Sync {
    /// Split text into an ordered sequence of sentences.
    fn tokenize_sentences(&self, text: &str) -> Vec<String>;

    /// Split a sentence (or a vocabulary label) into normalized word tokens.
    fn tokenize_words(&self, text: &str) -> Vec<String>;

    /// Shortest word (in characters) `tokenize_words` keeps. Stored with a
    /// trained model so matching uses the same word filter later.
    fn token_min_length(&self) -> usize;
}

/// Minimal analyzer: punctuation/newline sentence boundaries, lowercased
/// alphanumeric words, short tokens dropped.
pub struct SimpleAnalyzer {
    /// Words shorter than this (in characters) are discarded
    pub token_min_length: usize,
    sentence_boundary: Regex,
}

impl SimpleAnalyzer {
    pub fn new(token_min_length: usize) -> Self {
        Self {
            token_min_length,
            // Terminal punctuation followed by whitespace, or a line break
            sentence_boundary: Regex::new(r"[.!?]+\s+|[\r\n]+").expect("static regex"),
        }
    }

    fn is_valid_token(&self, word: &str) -> bool {
        !word.is_empty() && word.chars().count() >= self.token_min_length
    }
}

impl Default for SimpleAnalyzer {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Analyzer for SimpleAnalyzer {
    fn tokenize_sentences(&self, text: &str) -> Vec<String> {
        self.sentence_boundary
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn tokenize_words(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| self.is_valid_token(w))
            .map(str::to_lowercase)
            .collect()
    }

    fn token_min_length(&self) -> usize {
        self.token_min_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentences_split_on_punctuation_and_newlines() {
        let analyzer = SimpleAnalyzer::default();
        let sentences =
            analyzer.tokenize_sentences("Cats purr. Dogs bark!\nBirds sing? Fish swim");
        assert_eq!(
            sentences,
            vec!["Cats purr", "Dogs bark", "Birds sing", "Fish swim"]
        );
    }

    #[test]
    fn test_empty_text_has_no_sentences() {
        let analyzer = SimpleAnalyzer::default();
        assert!(analyzer.tokenize_sentences("").is_empty());
        assert!(analyzer.tokenize_sentences("  \n\n ").is_empty());
    }

    #[test]
    fn test_words_are_lowercased_and_short_tokens_dropped() {
        let analyzer = SimpleAnalyzer::default();
        let words = analyzer.tokenize_words("An Old-Growth forest in Finland");
        assert_eq!(words, vec!["old", "growth", "forest", "finland"]);
    }

    #[test]
    fn test_min_length_is_configurable() {
        let analyzer = SimpleAnalyzer::new(1);
        assert_eq!(analyzer.tokenize_words("a b"), vec!["a", "b"]);
        assert_eq!(analyzer.token_min_length(), 1);
    }

    #[test]
    fn test_zero_min_length_drops_empty_pieces() {
        let analyzer = SimpleAnalyzer::new(0);
        assert_eq!(analyzer.tokenize_words("a--b, c"), vec!["a", "b", "c"]);
        assert!(analyzer.tokenize_words(" ... ").is_empty());
    }
}
