// Subject vocabulary: subjects with multilingual labels and graph relations.
//
// The vocabulary is read from a JSON file pre-extracted from the source
// ontology. Subject ids are positions in the file's subject list, deprecated
// subjects included, so ids stay stable across loads of the same file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Index of a subject in the vocabulary.
pub type SubjectId = usize;

/// A subject as stored in the vocabulary file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub uri: String,
    /// Preferred label per language code
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub alt_labels: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub hidden_labels: HashMap<String, Vec<String>>,
    /// URIs of broader subjects
    #[serde(default)]
    pub broader: Vec<String>,
    #[serde(default)]
    pub narrower: Vec<String>,
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
}

/// A named group of subjects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub uri: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// One matchable label of a subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub subject_id: SubjectId,
    pub label: String,
    pub is_pref: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    pub subjects: Vec<SubjectRecord>,
    #[serde(default)]
    pub collections: Vec<CollectionRecord>,
    #[serde(skip)]
    by_uri: HashMap<String, SubjectId>,
}

impl Vocabulary {
    pub fn new(subjects: Vec<SubjectRecord>, collections: Vec<CollectionRecord>) -> Self {
        let by_uri = subjects
            .iter()
            .enumerate()
            .map(|(id, s)| (s.uri.clone(), id))
            .collect();
        Self {
            subjects,
            collections,
            by_uri,
        }
    }

    /// Load a vocabulary from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary {}", path.display()))?;
        let vocab = Self::from_json(&json)
            .with_context(|| format!("Invalid vocabulary file {}", path.display()))?;
        debug!(
            subjects = vocab.len(),
            collections = vocab.collections.len(),
            "Loaded vocabulary"
        );
        Ok(vocab)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Vocabulary = serde_json::from_str(json)?;
        Ok(Self::new(parsed.subjects, parsed.collections))
    }

    /// Total number of subjects, deprecated ones included.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn by_uri(&self, uri: &str) -> Option<SubjectId> {
        self.by_uri.get(uri).copied()
    }

    pub fn get(&self, subject_id: SubjectId) -> Option<&SubjectRecord> {
        self.subjects.get(subject_id)
    }

    /// Preferred label of a subject in `language`, if it has one.
    pub fn pref_label(&self, subject_id: SubjectId, language: &str) -> Option<&str> {
        self.get(subject_id)?.labels.get(language).map(String::as_str)
    }

    /// Non-deprecated subjects that have a preferred label in `language`,
    /// as (id, uri, preferred label).
    pub fn active<'a>(
        &'a self,
        language: &'a str,
    ) -> impl Iterator<Item = (SubjectId, &'a str, &'a str)> + 'a {
        self.subjects
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.deprecated)
            .filter_map(move |(id, s)| {
                s.labels
                    .get(language)
                    .map(|pref| (id, s.uri.as_str(), pref.as_str()))
            })
    }

    /// Resolve URIs to subject ids, skipping (and logging) unknown ones.
    pub fn resolve_uris<'a, I>(&self, uris: I) -> Vec<SubjectId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        uris.into_iter()
            .filter_map(|uri| {
                let id = self.by_uri(uri);
                if id.is_none() {
                    warn!(uri, "Unknown subject URI, skipping");
                }
                id
            })
            .collect()
    }

    /// Build the matchable terms of all active subjects: each preferred label,
    /// plus alternate labels and optionally hidden labels.
    ///
    /// Returns the terms together with the ids of the active subjects.
    pub fn prepare_terms(
        &self,
        language: &str,
        use_hidden_labels: bool,
    ) -> (Vec<Term>, Vec<SubjectId>) {
        let mut terms = Vec::new();
        let mut subject_ids = Vec::new();

        for (subject_id, _uri, pref) in self.active(language) {
            subject_ids.push(subject_id);
            terms.push(Term {
                subject_id,
                label: pref.to_string(),
                is_pref: true,
            });

            let record = &self.subjects[subject_id];
            let mut other_labels: Vec<&String> = record
                .alt_labels
                .get(language)
                .into_iter()
                .flatten()
                .collect();
            if use_hidden_labels {
                other_labels.extend(record.hidden_labels.get(language).into_iter().flatten());
            }
            terms.extend(other_labels.into_iter().map(|label| Term {
                subject_id,
                label: label.clone(),
                is_pref: false,
            }));
        }

        (terms, subject_ids)
    }
}
