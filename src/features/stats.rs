// Corpus-wide statistics gathered during the first training pass.
//
// doc_freq counts documents in which a subject was a lexical candidate,
// whether or not it was a correct subject for that document. idf is derived
// from doc_freq once the whole corpus has been seen.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::lexical::matcher::Candidate;
use crate::vocab::SubjectId;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    doc_freq: HashMap<SubjectId, u32>,
    /// Frequency of manually assigned subjects ("domain keyphraseness").
    /// Only populated when subject frequency tracking is enabled.
    subj_freq: HashMap<SubjectId, u32>,
    idf: HashMap<SubjectId, f64>,
    doc_count: u32,
    track_subject_frequency: bool,
}

impl CorpusStats {
    pub fn new(track_subject_frequency: bool) -> Self {
        Self {
            track_subject_frequency,
            ..Default::default()
        }
    }

    /// Fold one training document into the counts.
    pub fn observe(&mut self, candidates: &[Candidate], true_subjects: &[SubjectId]) {
        let distinct: HashSet<SubjectId> = candidates.iter().map(|c| c.subject_id).collect();
        for subject_id in distinct {
            *self.doc_freq.entry(subject_id).or_insert(0) += 1;
        }
        if self.track_subject_frequency {
            let assigned: HashSet<SubjectId> = true_subjects.iter().copied().collect();
            for subject_id in assigned {
                *self.subj_freq.entry(subject_id).or_insert(0) += 1;
            }
        }
        self.doc_count += 1;
    }

    /// Compute smoothed idf for every given subject:
    /// `ln((doc_count + 1) / (doc_freq + 1)) + 1`.
    pub fn finalize_idf(&mut self, subject_ids: &[SubjectId]) {
        let n = f64::from(self.doc_count) + 1.0;
        self.idf = subject_ids
            .iter()
            .map(|&s| (s, (n / (f64::from(self.doc_freq(s)) + 1.0)).ln() + 1.0))
            .collect();
    }

    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    /// Documents in which the subject was a candidate; 0 if never seen.
    pub fn doc_freq(&self, subject_id: SubjectId) -> u32 {
        self.doc_freq.get(&subject_id).copied().unwrap_or(0)
    }

    /// Subject frequency as used in features: the count minus one, so a
    /// missing entry yields 0.
    pub fn subj_freq(&self, subject_id: SubjectId) -> u32 {
        self.subj_freq
            .get(&subject_id)
            .copied()
            .unwrap_or(1)
            .saturating_sub(1)
    }

    /// idf weight; 0 for subjects outside the vocabulary.
    pub fn idf(&self, subject_id: SubjectId) -> f64 {
        self.idf.get(&subject_id).copied().unwrap_or(0.0)
    }

    /// Number of subjects with at least one candidate occurrence.
    pub fn candidate_subjects(&self) -> usize {
        self.doc_freq.len()
    }
}
