// Candidate -> feature matrix conversion.
//
// Every row is one candidate, every column one Feature slot. The column order
// is part of the trained model: a classifier fitted on one layout must be
// queried with exactly the same layout.

use ndarray::Array2;

use super::stats::CorpusStats;
use crate::lexical::matcher::Candidate;
use crate::vocab::RelationMatrices;

/// Feature slots, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Feature {
    Freq = 0,
    DocFreq = 1,
    SubjFreq = 2,
    Tfidf = 3,
    IsPref = 4,
    NTokens = 5,
    Ambiguity = 6,
    FirstOcc = 7,
    LastOcc = 8,
    Spread = 9,
    DocLength = 10,
    Broader = 11,
    Narrower = 12,
    Related = 13,
    Collection = 14,
}

impl Feature {
    pub const COUNT: usize = 15;

    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Freq,
        Feature::DocFreq,
        Feature::SubjFreq,
        Feature::Tfidf,
        Feature::IsPref,
        Feature::NTokens,
        Feature::Ambiguity,
        Feature::FirstOcc,
        Feature::LastOcc,
        Feature::Spread,
        Feature::DocLength,
        Feature::Broader,
        Feature::Narrower,
        Feature::Related,
        Feature::Collection,
    ];

    /// Column index of this slot.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Freq => "freq",
            Feature::DocFreq => "doc_freq",
            Feature::SubjFreq => "subj_freq",
            Feature::Tfidf => "tfidf",
            Feature::IsPref => "is_pref",
            Feature::NTokens => "n_tokens",
            Feature::Ambiguity => "ambiguity",
            Feature::FirstOcc => "first_occ",
            Feature::LastOcc => "last_occ",
            Feature::Spread => "spread",
            Feature::DocLength => "doc_length",
            Feature::Broader => "broader",
            Feature::Narrower => "narrower",
            Feature::Related => "related",
            Feature::Collection => "collection",
        }
    }
}

/// Convert one document's candidates into a feature matrix, one row per
/// candidate in input order.
///
/// The graph features count, for each candidate, how many of the document's
/// candidates it is linked to (broader/narrower/related) or shares
/// collections with, divided by the number of candidates.
pub fn candidates_to_features(
    candidates: &[Candidate],
    relations: &RelationMatrices,
    stats: &CorpusStats,
) -> Array2<f32> {
    let mut matrix = Array2::<f32>::zeros((candidates.len(), Feature::COUNT));
    if candidates.is_empty() {
        return matrix;
    }

    let mut indicator = vec![false; relations.n_subjects()];
    for c in candidates {
        if let Some(flag) = indicator.get_mut(c.subject_id) {
            *flag = true;
        }
    }

    // Candidates per collection
    let mut collection_hits = vec![0usize; relations.collection.shape().0];
    for (subject_id, _) in indicator.iter().enumerate().filter(|&(_, flag)| *flag) {
        for &collection_id in relations.member_of.row(subject_id) {
            collection_hits[collection_id] += 1;
        }
    }

    let n = candidates.len() as f64;
    for (idx, c) in candidates.iter().enumerate() {
        let subj = c.subject_id;
        let co_collection: usize = relations
            .member_of
            .row(subj)
            .iter()
            .map(|&collection_id| collection_hits[collection_id])
            .sum();

        let values: [(Feature, f64); Feature::COUNT] = [
            (Feature::Freq, c.freq),
            (Feature::DocFreq, f64::from(stats.doc_freq(subj))),
            (Feature::SubjFreq, f64::from(stats.subj_freq(subj))),
            (Feature::Tfidf, c.freq * stats.idf(subj)),
            (Feature::IsPref, c.is_pref),
            (Feature::NTokens, c.n_tokens),
            (Feature::Ambiguity, c.ambiguity),
            (Feature::FirstOcc, c.first_occ),
            (Feature::LastOcc, c.last_occ),
            (Feature::Spread, c.spread),
            (Feature::DocLength, c.doc_length as f64),
            (
                Feature::Broader,
                relations.broader.count_flagged(subj, &indicator) as f64 / n,
            ),
            (
                Feature::Narrower,
                relations.narrower.count_flagged(subj, &indicator) as f64 / n,
            ),
            (
                Feature::Related,
                relations.related.count_flagged(subj, &indicator) as f64 / n,
            ),
            (Feature::Collection, co_collection as f64 / n),
        ];
        for (feature, value) in values {
            matrix[[idx, feature.index()]] = value as f32;
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_contiguous_and_ordered() {
        for (position, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), position, "{}", feature.name());
        }
        assert_eq!(Feature::ALL[0].name(), "freq");
        assert_eq!(Feature::ALL[Feature::COUNT - 1].name(), "collection");
    }

    #[test]
    fn test_empty_candidates_yield_empty_matrix() {
        let matrix =
            candidates_to_features(&[], &RelationMatrices::default(), &CorpusStats::default());
        assert_eq!(matrix.shape(), &[0, Feature::COUNT]);
    }
}
