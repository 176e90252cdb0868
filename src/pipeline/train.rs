// Two-phase training pipeline: candidates, then features.
//
// Phase 1 matches every training document against the label index in
// parallel, then folds the results into corpus statistics one document at a
// time. idf depends on the whole corpus, so phase 2 (feature conversion)
// only starts once phase 1 has been fully reduced.
//
// Each phase task returns the data needed to pair its output with its
// document (the document's own subject ids travel with its candidates), so
// label alignment never depends on pool scheduling.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use tracing::info;

use super::pool::WorkerPool;
use crate::corpus::Document;
use crate::features::{candidates_to_features, CorpusStats, Feature};
use crate::lexical::analyzer::Analyzer;
use crate::lexical::matcher::{generate_candidates, Candidate};
use crate::lexical::tokenset::TokenSetIndex;
use crate::lexical::vectorizer::LabelVectorizer;
use crate::vocab::{RelationMatrices, SubjectId, Vocabulary};

/// Parallelism and statistics options for a training run.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// Worker threads per phase (default 4)
    pub jobs: usize,
    /// Minimum number of documents handed to a worker at once (default 20)
    pub chunk_size: usize,
    /// Count true subject assignments into subj_freq (default off)
    pub track_subject_frequency: bool,
    /// Draw progress bars on stderr
    pub show_progress: bool,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            jobs: 4,
            chunk_size: 20,
            track_subject_frequency: false,
            show_progress: false,
        }
    }
}

/// Read-only state for phase 1 workers.
pub struct CandidateContext<'a> {
    pub vocab: &'a Vocabulary,
    pub analyzer: &'a dyn Analyzer,
    pub vectorizer: &'a LabelVectorizer,
    pub index: &'a TokenSetIndex,
}

/// Read-only state for phase 2 workers.
pub struct FeatureContext<'a> {
    pub relations: &'a RelationMatrices,
    pub stats: &'a CorpusStats,
}

/// The assembled classifier input: one row and one label per candidate.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub x: Array2<f32>,
    pub y: Vec<bool>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.y.iter().filter(|&&label| label).count()
    }
}

/// Output of phase 1 after reduction.
pub struct CandidatePass {
    pub candidates: Vec<Vec<Candidate>>,
    pub labels: Vec<bool>,
    pub stats: CorpusStats,
}

pub struct TrainingOrchestrator {
    options: TrainingOptions,
}

impl TrainingOrchestrator {
    pub fn new(options: TrainingOptions) -> Self {
        Self { options }
    }

    /// Run both phases and return the finalized statistics with the
    /// training set. `subject_ids` are the active vocabulary subjects that
    /// receive an idf weight.
    pub fn run(
        &self,
        documents: &[Document],
        subject_ids: &[SubjectId],
        candidate_context: CandidateContext<'_>,
        relations: &RelationMatrices,
    ) -> Result<(CorpusStats, TrainingSet)> {
        let CandidatePass {
            candidates,
            labels,
            mut stats,
        } = self.generate_candidates(documents, candidate_context)?;

        // Barrier: idf needs every document's candidates
        stats.finalize_idf(subject_ids);
        info!(
            documents = stats.doc_count(),
            candidate_subjects = stats.candidate_subjects(),
            "Corpus statistics finalized"
        );

        let x = self.build_features(&candidates, FeatureContext {
            relations,
            stats: &stats,
        })?;
        Ok((stats, TrainingSet { x, y: labels }))
    }

    /// Phase 1: match documents in parallel, reduce sequentially.
    pub fn generate_candidates(
        &self,
        documents: &[Document],
        context: CandidateContext<'_>,
    ) -> Result<CandidatePass> {
        let progress = self.progress_bar("Candidates", documents.len())?;
        let pool = WorkerPool::new(self.options.jobs, self.options.chunk_size, context)?;

        let results = pool.map(documents, &progress, |ctx, doc| {
            let subject_ids = ctx.vocab.resolve_uris(doc.uris.iter().map(String::as_str));
            let candidates = generate_candidates(&doc.text, ctx.analyzer, ctx.vectorizer, ctx.index);
            Ok((subject_ids, candidates))
        })?;
        drop(pool);
        progress.finish_and_clear();

        let mut stats = CorpusStats::new(self.options.track_subject_frequency);
        let mut labels = Vec::new();
        let mut candidates = Vec::with_capacity(results.len());
        for (doc_subject_ids, doc_candidates) in results {
            stats.observe(&doc_candidates, &doc_subject_ids);
            labels.extend(
                doc_candidates
                    .iter()
                    .map(|c| doc_subject_ids.contains(&c.subject_id)),
            );
            candidates.push(doc_candidates);
        }

        info!(
            documents = candidates.len(),
            candidates = labels.len(),
            positives = labels.iter().filter(|&&l| l).count(),
            "Candidate generation complete"
        );
        Ok(CandidatePass {
            candidates,
            labels,
            stats,
        })
    }

    /// Phase 2: convert each document's candidates to features and stack
    /// them in document order.
    pub fn build_features(
        &self,
        candidates: &[Vec<Candidate>],
        context: FeatureContext<'_>,
    ) -> Result<Array2<f32>> {
        let progress = self.progress_bar("Features", candidates.len())?;
        let pool = WorkerPool::new(self.options.jobs, self.options.chunk_size, context)?;

        let matrices = pool.map(candidates, &progress, |ctx, doc_candidates| {
            Ok(candidates_to_features(doc_candidates, ctx.relations, ctx.stats))
        })?;
        drop(pool);
        progress.finish_and_clear();

        stack_rows(&matrices)
    }

    fn progress_bar(&self, label: &str, len: usize) -> Result<ProgressBar> {
        if !self.options.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!("  {label} [{{bar:30}}] {{pos}}/{{len}} ({{eta}})"))?,
        );
        Ok(pb)
    }
}

/// Vertically stack per-document feature matrices.
fn stack_rows(matrices: &[Array2<f32>]) -> Result<Array2<f32>> {
    if matrices.is_empty() {
        return Ok(Array2::zeros((0, Feature::COUNT)));
    }
    let views: Vec<ArrayView2<'_, f32>> = matrices.iter().map(|m| m.view()).collect();
    Ok(concatenate(Axis(0), &views)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_rows_keeps_document_order() {
        let a = Array2::from_elem((2, Feature::COUNT), 1.0f32);
        let b = Array2::from_elem((0, Feature::COUNT), 0.0f32);
        let c = Array2::from_elem((1, Feature::COUNT), 3.0f32);
        let stacked = stack_rows(&[a, b, c]).unwrap();
        assert_eq!(stacked.shape(), &[3, Feature::COUNT]);
        assert_eq!(stacked[[0, 0]], 1.0);
        assert_eq!(stacked[[2, 0]], 3.0);
    }

    #[test]
    fn test_stack_rows_empty() {
        let stacked = stack_rows(&[]).unwrap();
        assert_eq!(stacked.shape(), &[0, Feature::COUNT]);
    }
}
