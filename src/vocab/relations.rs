// Sparse boolean relation matrices over subject ids.
//
// Rows are stored as sorted column lists. The vocabulary graph is sparse
// (a subject has a handful of broader/related links), so row-adjacency
// storage keeps lookups and the per-document feature sums cheap.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::vocabulary::{SubjectId, Vocabulary};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationMatrix {
    n_cols: usize,
    rows: Vec<Vec<usize>>,
}

impl RelationMatrix {
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_cols,
            rows: vec![Vec::new(); n_rows],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.n_cols)
    }

    /// Set entry (row, col). Out-of-range positions are ignored.
    pub fn insert(&mut self, row: usize, col: usize) {
        if col >= self.n_cols {
            return;
        }
        if let Some(cols) = self.rows.get_mut(row) {
            if let Err(pos) = cols.binary_search(&col) {
                cols.insert(pos, col);
            }
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.row(row).binary_search(&col).is_ok()
    }

    /// Columns set in `row`; empty for rows outside the matrix.
    pub fn row(&self, row: usize) -> &[usize] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of set entries in `row` whose column is flagged in `indicator`.
    pub fn count_flagged(&self, row: usize, indicator: &[bool]) -> usize {
        self.row(row)
            .iter()
            .filter(|&&col| indicator.get(col).copied().unwrap_or(false))
            .count()
    }

    /// Number of set entries.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::new(self.n_cols, self.rows.len());
        for (row, cols) in self.rows.iter().enumerate() {
            for &col in cols {
                // Rows are visited in ascending order, so pushes stay sorted
                t.rows[col].push(row);
            }
        }
        t
    }
}

/// The four vocabulary-graph matrices used as features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationMatrices {
    pub broader: RelationMatrix,
    pub narrower: RelationMatrix,
    pub related: RelationMatrix,
    /// Collection x subject membership
    pub collection: RelationMatrix,
    /// Subject x collection, the transpose of `collection`
    pub member_of: RelationMatrix,
}

impl RelationMatrices {
    /// Build all matrices from the vocabulary. Links to unknown URIs are
    /// dropped, as are collections with no known member.
    pub fn from_vocabulary(vocab: &Vocabulary) -> Self {
        let n = vocab.len();
        let mut broader = RelationMatrix::new(n, n);
        let mut narrower = RelationMatrix::new(n, n);
        let mut related = RelationMatrix::new(n, n);

        for (subject_id, record) in vocab.subjects.iter().enumerate() {
            if record.deprecated {
                continue;
            }
            let links = [
                (&mut broader, &record.broader),
                (&mut narrower, &record.narrower),
                (&mut related, &record.related),
            ];
            for (matrix, uris) in links {
                for other in uris.iter().filter_map(|uri| vocab.by_uri(uri)) {
                    matrix.insert(subject_id, other);
                }
            }
        }

        let member_lists: Vec<Vec<SubjectId>> = vocab
            .collections
            .iter()
            .map(|c| c.members.iter().filter_map(|uri| vocab.by_uri(uri)).collect())
            .filter(|members: &Vec<SubjectId>| !members.is_empty())
            .collect();
        let mut collection = RelationMatrix::new(member_lists.len(), n);
        for (collection_id, members) in member_lists.iter().enumerate() {
            for &member in members {
                collection.insert(collection_id, member);
            }
        }
        let member_of = collection.transpose();

        debug!(
            broader = broader.nnz(),
            narrower = narrower.nnz(),
            related = related.nnz(),
            collections = collection.shape().0,
            "Built relation matrices"
        );

        Self {
            broader,
            narrower,
            related,
            collection,
            member_of,
        }
    }

    /// Number of subjects the matrices cover.
    pub fn n_subjects(&self) -> usize {
        self.broader.shape().0
    }
}
