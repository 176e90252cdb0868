// Training documents: text plus the subject URIs assigned to it.
//
// The on-disk format is TSV, one document per line:
//
//   text<TAB><http://example.org/s1> <http://example.org/s2>
//
// Angle brackets around URIs are optional.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    pub uris: Vec<String>,
}

impl Document {
    pub fn new(text: impl Into<String>, uris: &[&str]) -> Self {
        Self {
            text: text.into(),
            uris: uris.iter().map(|u| u.to_string()).collect(),
        }
    }
}

/// Parse TSV corpus content. Blank lines are skipped; lines without a tab
/// are kept as documents with no subjects.
pub fn parse_tsv(content: &str) -> Vec<Document> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (text, subjects) = line.split_once('\t').unwrap_or((line, ""));
            let uris = subjects
                .split_whitespace()
                .map(|uri| {
                    uri.strip_prefix('<')
                        .and_then(|u| u.strip_suffix('>'))
                        .unwrap_or(uri)
                        .to_string()
                })
                .collect();
            Document {
                text: text.to_string(),
                uris,
            }
        })
        .collect()
}

/// Read a TSV corpus file.
pub fn load_tsv(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus {}", path.display()))?;
    let documents = parse_tsv(&content);
    let unlabeled = documents.iter().filter(|d| d.uris.is_empty()).count();
    if unlabeled > 0 {
        warn!(unlabeled, "Corpus contains documents without subjects");
    }
    info!(documents = documents.len(), path = %path.display(), "Loaded corpus");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tsv() {
        let content = "Forests of Finland\t<http://ex.org/a> <http://ex.org/b>\n\n\
                       Lakes\thttp://ex.org/c\n\
                       No subjects here\n";
        let docs = parse_tsv(content);
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].text, "Forests of Finland");
        assert_eq!(docs[0].uris, vec!["http://ex.org/a", "http://ex.org/b"]);
        assert_eq!(docs[1].uris, vec!["http://ex.org/c"]);
        assert!(docs[2].uris.is_empty());
    }
}
