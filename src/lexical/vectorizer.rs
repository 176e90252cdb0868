// Binary bag-of-words vectorizer over the vocabulary's label tokens.
//
// Fitted once on all label strings. Token indices follow the alphabetical
// order of the token vocabulary, so a given set of labels always yields the
// same indices. Words outside the vocabulary are ignored at transform time:
// they can never take part in a label match.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::analyzer::Analyzer;
use super::tokenset::TokenSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelVectorizer {
    vocabulary: HashMap<String, u32>,
}

impl LabelVectorizer {
    /// Build the token vocabulary from label strings and return the token set
    /// of each label, in input order.
    pub fn fit_transform<'a, I>(labels: I, analyzer: &dyn Analyzer) -> (Self, Vec<TokenSet>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let tokenized: Vec<Vec<String>> = labels
            .into_iter()
            .map(|label| analyzer.tokenize_words(label))
            .collect();

        let sorted: BTreeSet<&str> = tokenized
            .iter()
            .flat_map(|words| words.iter().map(String::as_str))
            .collect();
        let vocabulary = sorted
            .into_iter()
            .enumerate()
            .map(|(idx, token)| (token.to_string(), idx as u32))
            .collect();

        let vectorizer = Self { vocabulary };
        let token_sets = tokenized
            .iter()
            .map(|words| vectorizer.lookup(words))
            .collect();
        (vectorizer, token_sets)
    }

    /// Token set of a sentence over the fitted vocabulary.
    pub fn transform(&self, sentence: &str, analyzer: &dyn Analyzer) -> TokenSet {
        self.lookup(&analyzer.tokenize_words(sentence))
    }

    /// Number of distinct tokens in the vocabulary.
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    fn lookup(&self, words: &[String]) -> TokenSet {
        TokenSet::new(words.iter().filter_map(|w| self.vocabulary.get(w).copied()))
    }
}
