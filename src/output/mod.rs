// Output formatting: suggestion records and terminal display.

pub mod terminal;

use serde::Serialize;

use crate::vocab::{SubjectId, Vocabulary};

/// A ranked subject with its vocabulary URI and label, ready for display or
/// JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub subject_id: SubjectId,
    pub uri: String,
    pub label: String,
    pub score: f32,
}

/// Attach URIs and labels to ranked (score, subject id) pairs. Subjects
/// missing from the vocabulary are dropped.
pub fn to_suggestions(
    ranked: &[(f32, SubjectId)],
    vocab: &Vocabulary,
    language: &str,
) -> Vec<Suggestion> {
    ranked
        .iter()
        .filter_map(|&(score, subject_id)| {
            let record = vocab.get(subject_id)?;
            Some(Suggestion {
                subject_id,
                uri: record.uri.clone(),
                label: vocab
                    .pref_label(subject_id, language)
                    .unwrap_or(&record.uri)
                    .to_string(),
                score,
            })
        })
        .collect()
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries, so labels with accented letters or
/// other multi-byte characters never cause a panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
