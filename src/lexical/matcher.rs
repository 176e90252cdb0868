// Lexical candidate generation: sentence-level label matching, then one
// statistical summary per matched subject.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::analyzer::Analyzer;
use super::tokenset::TokenSetIndex;
use super::vectorizer::LabelVectorizer;
use crate::vocab::SubjectId;

/// One label hit within one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub subject_id: SubjectId,
    pub is_pref: bool,
    /// Number of tokens in the matched label
    pub n_tokens: usize,
    /// 0-based sentence position
    pub pos: usize,
    /// How many other matched labels contain this label's tokens
    pub ambiguity: usize,
}

/// Per-document summary of all matches for one subject.
///
/// Occurrence fields are normalized by the document length in sentences and
/// therefore lie in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Document length in sentences
    pub doc_length: usize,
    pub subject_id: SubjectId,
    pub freq: f64,
    /// Mean of the matches' preferred-label flags
    pub is_pref: f64,
    pub n_tokens: f64,
    pub ambiguity: f64,
    pub first_occ: f64,
    pub last_occ: f64,
    pub spread: f64,
}

/// Match every sentence of `text` against the label index and conflate the
/// hits into candidates.
pub fn generate_candidates(
    text: &str,
    analyzer: &dyn Analyzer,
    vectorizer: &LabelVectorizer,
    index: &TokenSetIndex,
) -> Vec<Candidate> {
    let sentences = analyzer.tokenize_sentences(text);
    let mut matches = Vec::new();

    for (pos, sentence) in sentences.iter().enumerate() {
        let tokens = vectorizer.transform(sentence, analyzer);
        if tokens.is_empty() {
            continue;
        }
        for (label, ambiguity) in index.search(&tokens) {
            matches.push(Match {
                subject_id: label.subject_id,
                is_pref: label.is_pref,
                n_tokens: label.tokens.len(),
                pos,
                ambiguity,
            });
        }
    }

    conflate_matches(&matches, sentences.len())
}

/// Group matches by subject and summarize each group.
///
/// Candidates come out in order of each subject's first match. A zero
/// document length yields no candidates.
pub fn conflate_matches(matches: &[Match], doc_length: usize) -> Vec<Candidate> {
    if doc_length == 0 {
        return Vec::new();
    }

    let mut groups: Vec<Vec<&Match>> = Vec::new();
    let mut group_of: HashMap<SubjectId, usize> = HashMap::new();
    for m in matches {
        let idx = *group_of.entry(m.subject_id).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(m);
    }

    let length = doc_length as f64;
    groups
        .into_iter()
        .filter_map(|group| {
            let first = *group.first()?;
            // Matches arrive in sentence order; min/max keeps unordered input sane
            let first_pos = group.iter().map(|m| m.pos).min()?;
            let last_pos = group.iter().map(|m| m.pos).max()?;
            let k = group.len() as f64;
            Some(Candidate {
                doc_length,
                subject_id: first.subject_id,
                freq: k / length,
                is_pref: group.iter().map(|m| f64::from(u8::from(m.is_pref))).sum::<f64>() / k,
                n_tokens: group.iter().map(|m| m.n_tokens as f64).sum::<f64>() / k,
                ambiguity: group.iter().map(|m| m.ambiguity as f64).sum::<f64>() / k,
                first_occ: first_pos as f64 / length,
                last_occ: last_pos as f64 / length,
                spread: (last_pos - first_pos) as f64 / length,
            })
        })
        .collect()
}
