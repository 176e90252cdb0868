// Token sets and the token-set index used for lexical matching.
//
// A token set is the set of vocabulary-token indices present in a piece of
// text. Matching is set containment rather than string comparison: a label
// matches a sentence when every token of the label occurs in the sentence,
// in any order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::vocab::SubjectId;

/// Sorted, deduplicated set of token indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSet {
    tokens: Vec<u32>,
}

impl TokenSet {
    pub fn new(tokens: impl IntoIterator<Item = u32>) -> Self {
        let mut tokens: Vec<u32> = tokens.into_iter().collect();
        tokens.sort_unstable();
        tokens.dedup();
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    /// True if every token of `other` is also in `self`.
    pub fn contains(&self, other: &TokenSet) -> bool {
        // Both sides are sorted, so a single merge pass suffices
        let mut mine = self.tokens.iter();
        'outer: for token in &other.tokens {
            for candidate in mine.by_ref() {
                if candidate == token {
                    continue 'outer;
                }
                if candidate > token {
                    return false;
                }
            }
            return false;
        }
        true
    }

    /// The token a label is filed under in the index.
    fn key(&self) -> Option<u32> {
        self.tokens.first().copied()
    }
}

/// A vocabulary label as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedLabel {
    pub tokens: TokenSet,
    pub subject_id: SubjectId,
    pub is_pref: bool,
}

/// Index of label token sets, bucketed by one of their tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenSetIndex {
    buckets: HashMap<u32, Vec<IndexedLabel>>,
    len: usize,
}

impl TokenSetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of labels in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a label. Labels without any known token can never match and are
    /// not stored.
    pub fn add(&mut self, label: IndexedLabel) {
        if let Some(key) = label.tokens.key() {
            self.buckets.entry(key).or_default().push(label);
            self.len += 1;
        }
    }

    /// Find every indexed label whose tokens all occur in `query`.
    ///
    /// At most one label is returned per subject, preferring the preferred
    /// label. Each result carries its ambiguity: how many of the other
    /// returned labels contain its token set.
    pub fn search(&self, query: &TokenSet) -> Vec<(&IndexedLabel, usize)> {
        let found = self.find_subject_labels(query);
        found
            .iter()
            .map(|label| {
                let ambiguity = found
                    .iter()
                    .filter(|other| !std::ptr::eq(**other, *label))
                    .filter(|other| other.tokens.contains(&label.tokens))
                    .count();
                (*label, ambiguity)
            })
            .collect()
    }

    fn find_subject_labels(&self, query: &TokenSet) -> Vec<&IndexedLabel> {
        let mut found: Vec<&IndexedLabel> = Vec::new();
        let mut position: HashMap<SubjectId, usize> = HashMap::new();

        for token in query.tokens() {
            let Some(bucket) = self.buckets.get(token) else {
                continue;
            };
            for label in bucket.iter().filter(|l| query.contains(&l.tokens)) {
                match position.get(&label.subject_id) {
                    None => {
                        position.insert(label.subject_id, found.len());
                        found.push(label);
                    }
                    Some(&idx) if !found[idx].is_pref => found[idx] = label,
                    Some(_) => {}
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(tokens: &[u32], subject_id: SubjectId, is_pref: bool) -> IndexedLabel {
        IndexedLabel {
            tokens: TokenSet::new(tokens.iter().copied()),
            subject_id,
            is_pref,
        }
    }

    #[test]
    fn test_contains() {
        let big = TokenSet::new([1, 3, 5, 7]);
        assert!(big.contains(&TokenSet::new([3, 7])));
        assert!(big.contains(&TokenSet::new([])));
        assert!(!big.contains(&TokenSet::new([2])));
        assert!(!big.contains(&TokenSet::new([7, 8])));
        assert!(!TokenSet::new([]).contains(&TokenSet::new([1])));
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        assert_eq!(TokenSet::new([3, 1, 3, 2]).tokens(), &[1, 2, 3]);
    }

    #[test]
    fn test_empty_label_not_indexed() {
        let mut index = TokenSetIndex::new();
        index.add(label(&[], 0, true));
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_requires_all_label_tokens() {
        let mut index = TokenSetIndex::new();
        index.add(label(&[1, 2], 0, true));
        index.add(label(&[3], 1, true));

        let hits = index.search(&TokenSet::new([1, 3]));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.subject_id, 1);
    }

    #[test]
    fn test_search_prefers_preferred_label() {
        let mut index = TokenSetIndex::new();
        index.add(label(&[1], 0, false));
        index.add(label(&[2], 0, true));

        let hits = index.search(&TokenSet::new([1, 2]));
        assert_eq!(hits.len(), 1);
        assert!(hits[0].0.is_pref);
    }

    #[test]
    fn test_ambiguity_counts_containing_labels() {
        let mut index = TokenSetIndex::new();
        // "forest" is contained in "forest fire" and "forest management"
        index.add(label(&[1], 0, true));
        index.add(label(&[1, 2], 1, true));
        index.add(label(&[1, 3], 2, true));

        let hits = index.search(&TokenSet::new([1, 2, 3]));
        let ambiguity: HashMap<SubjectId, usize> =
            hits.iter().map(|(l, a)| (l.subject_id, *a)).collect();
        assert_eq!(ambiguity[&0], 2);
        assert_eq!(ambiguity[&1], 0);
        assert_eq!(ambiguity[&2], 0);
    }

    #[test]
    fn test_identical_labels_are_mutually_ambiguous() {
        let mut index = TokenSetIndex::new();
        index.add(label(&[4, 5], 0, true));
        index.add(label(&[4, 5], 1, true));

        let hits = index.search(&TokenSet::new([4, 5]));
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|(_, a)| *a == 1));
    }
}
