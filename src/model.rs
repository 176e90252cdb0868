// The MLLM model: lexical index, vocabulary graph, corpus statistics and the
// fitted ranking classifier, kept and persisted together as one unit.
//
// Lifecycle: `MllmModel::prepare_train` builds everything except the
// classifier and returns the training set; `PreparedModel::train` fits the
// classifier and produces the finished model. A finished model is immutable.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{BaggedTrees, Classifier};
use crate::corpus::Document;
use crate::features::{candidates_to_features, CorpusStats};
use crate::lexical::analyzer::{Analyzer, SimpleAnalyzer};
use crate::lexical::matcher::{self, Candidate};
use crate::lexical::tokenset::{IndexedLabel, TokenSetIndex};
use crate::lexical::vectorizer::LabelVectorizer;
use crate::pipeline::train::{CandidateContext, TrainingOptions, TrainingOrchestrator, TrainingSet};
use crate::vocab::{RelationMatrices, SubjectId, Vocabulary};

/// Vocabulary options that shape the label index.
#[derive(Debug, Clone)]
pub struct VocabularyOptions {
    /// Language of the labels to match (default "en")
    pub language: String,
    /// Also index hidden labels (default false)
    pub use_hidden_labels: bool,
}

impl Default for VocabularyOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            use_hidden_labels: false,
        }
    }
}

/// Descriptive metadata stored with a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub language: String,
    /// Word filter of the analyzer the label index was built with
    pub token_min_length: usize,
    /// Subject count of the training vocabulary, deprecated ones included
    pub vocabulary_subjects: usize,
    pub trained_at: DateTime<Utc>,
    pub documents: u32,
    pub training_rows: usize,
    pub positive_rows: usize,
    pub indexed_labels: usize,
    pub active_subjects: usize,
}

/// Everything a model needs except the fitted classifier.
#[derive(Debug, Clone)]
pub struct PreparedModel {
    language: String,
    token_min_length: usize,
    vocabulary_subjects: usize,
    active_subjects: usize,
    vectorizer: LabelVectorizer,
    index: TokenSetIndex,
    relations: RelationMatrices,
    stats: CorpusStats,
}

impl PreparedModel {
    pub fn stats(&self) -> &CorpusStats {
        &self.stats
    }

    /// Fit `classifier` on the training set and assemble the final model.
    pub fn train<C: Classifier>(
        self,
        mut classifier: C,
        training: &TrainingSet,
    ) -> Result<MllmModel<C>> {
        classifier
            .fit(training.x.view(), &training.y)
            .context("Failed to fit ranking classifier")?;

        let info = ModelInfo {
            language: self.language,
            token_min_length: self.token_min_length,
            vocabulary_subjects: self.vocabulary_subjects,
            trained_at: Utc::now(),
            documents: self.stats.doc_count(),
            training_rows: training.len(),
            positive_rows: training.positives(),
            indexed_labels: self.index.len(),
            active_subjects: self.active_subjects,
        };
        info!(
            rows = info.training_rows,
            positives = info.positive_rows,
            "Model trained"
        );

        Ok(MllmModel {
            info,
            vectorizer: self.vectorizer,
            index: self.index,
            relations: self.relations,
            stats: self.stats,
            classifier,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "C: Serialize", deserialize = "C: DeserializeOwned"))]
pub struct MllmModel<C = BaggedTrees> {
    info: ModelInfo,
    vectorizer: LabelVectorizer,
    index: TokenSetIndex,
    relations: RelationMatrices,
    stats: CorpusStats,
    classifier: C,
}

impl MllmModel {
    /// Build the label index and vocabulary matrices, then run both training
    /// phases over `documents`.
    pub fn prepare_train(
        documents: &[Document],
        vocab: &Vocabulary,
        analyzer: &dyn Analyzer,
        vocab_options: &VocabularyOptions,
        training_options: TrainingOptions,
    ) -> Result<(PreparedModel, TrainingSet)> {
        let (terms, subject_ids) =
            vocab.prepare_terms(&vocab_options.language, vocab_options.use_hidden_labels);
        if subject_ids.is_empty() {
            anyhow::bail!(
                "Vocabulary has no active subjects with labels in language {:?}",
                vocab_options.language
            );
        }

        let (vectorizer, label_tokens) =
            LabelVectorizer::fit_transform(terms.iter().map(|t| t.label.as_str()), analyzer);
        let mut index = TokenSetIndex::new();
        for (term, tokens) in terms.iter().zip(label_tokens) {
            index.add(IndexedLabel {
                tokens,
                subject_id: term.subject_id,
                is_pref: term.is_pref,
            });
        }
        info!(
            terms = terms.len(),
            indexed = index.len(),
            tokens = vectorizer.len(),
            "Built label index"
        );

        let relations = RelationMatrices::from_vocabulary(vocab);

        let orchestrator = TrainingOrchestrator::new(training_options);
        let context = CandidateContext {
            vocab,
            analyzer,
            vectorizer: &vectorizer,
            index: &index,
        };
        let (stats, training) = orchestrator.run(documents, &subject_ids, context, &relations)?;

        let prepared = PreparedModel {
            language: vocab_options.language.clone(),
            token_min_length: analyzer.token_min_length(),
            vocabulary_subjects: vocab.len(),
            active_subjects: subject_ids.len(),
            vectorizer,
            index,
            relations,
            stats,
        };
        Ok((prepared, training))
    }
}

impl<C: Classifier> MllmModel<C> {
    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// An analyzer with the word filter the model was trained with. Labels
    /// were tokenized with it, so matching must use it too.
    pub fn analyzer(&self) -> SimpleAnalyzer {
        SimpleAnalyzer::new(self.info.token_min_length)
    }

    /// Fail unless `vocab` has the shape of the training vocabulary. Subject
    /// ids are positions in the vocabulary, so another file would attach
    /// the wrong URIs to them.
    pub fn check_vocabulary(&self, vocab: &Vocabulary) -> Result<()> {
        if vocab.len() != self.info.vocabulary_subjects {
            anyhow::bail!(
                "Vocabulary has {} subjects but the model was trained on {}",
                vocab.len(),
                self.info.vocabulary_subjects
            );
        }
        Ok(())
    }

    /// Lexical candidates for a text.
    pub fn generate_candidates(&self, text: &str, analyzer: &dyn Analyzer) -> Vec<Candidate> {
        matcher::generate_candidates(text, analyzer, &self.vectorizer, &self.index)
    }

    pub fn candidates_to_features(&self, candidates: &[Candidate]) -> Array2<f32> {
        candidates_to_features(candidates, &self.relations, &self.stats)
    }

    /// Score candidates and rank them by descending (score, subject id).
    pub fn predict(&self, candidates: &[Candidate]) -> Result<Vec<(f32, SubjectId)>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let features = self.candidates_to_features(candidates);
        let scores = self.classifier.predict_proba(features.view())?;
        if scores.len() != candidates.len() {
            anyhow::bail!(
                "Classifier returned {} scores for {} candidates",
                scores.len(),
                candidates.len()
            );
        }
        let scored = scores
            .into_iter()
            .zip(candidates)
            .map(|(score, c)| (score, c.subject_id))
            .collect();
        Ok(rank_descending(scored))
    }

    /// Top `limit` subjects for a text.
    pub fn suggest(
        &self,
        text: &str,
        analyzer: &dyn Analyzer,
        limit: usize,
    ) -> Result<Vec<(f32, SubjectId)>> {
        let candidates = self.generate_candidates(text, analyzer);
        debug!(candidates = candidates.len(), "Generated candidates");
        let mut ranked = self.predict(&candidates)?;
        ranked.truncate(limit);
        Ok(ranked)
    }
}

impl<C: Serialize> MllmModel<C> {
    /// Write the whole model to `path`.
    ///
    /// The artifact is written next to the destination first and renamed
    /// into place, so readers never see a partially written model.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let tmp_path = temp_path(path);

        let write = || -> Result<()> {
            let file = File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            bincode::serialize_into(&mut writer, self).context("Failed to serialize model")?;
            writer.flush()?;
            Ok(())
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move model into place at {}", path.display()))?;
        info!(path = %path.display(), "Saved model");
        Ok(())
    }
}

impl<C: DeserializeOwned> MllmModel<C> {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open model {}", path.display()))?;
        let model: Self = bincode::deserialize_from(BufReader::new(file))
            .with_context(|| format!("Failed to deserialize model {}", path.display()))?;
        debug!(path = %path.display(), "Loaded model");
        Ok(model)
    }
}

/// Sort by score, highest first. Equal scores put the larger subject id
/// first.
pub fn rank_descending(mut scored: Vec<(f32, SubjectId)>) -> Vec<(f32, SubjectId)> {
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    scored
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
