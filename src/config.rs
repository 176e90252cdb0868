use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::classifier::ClassifierParams;
use crate::lexical::analyzer::SimpleAnalyzer;
use crate::model::VocabularyOptions;
use crate::pipeline::train::TrainingOptions;

/// Central configuration loaded from environment variables.
///
/// A .env file is loaded automatically at startup via dotenvy. Every value
/// has a default; CLI flags override the model path and limit.
#[derive(Debug, Clone)]
pub struct Config {
    /// Label language (MLLM_LANGUAGE, default "en")
    pub language: String,
    /// Index hidden labels too (MLLM_USE_HIDDEN_LABELS)
    pub use_hidden_labels: bool,
    // Classifier parameters stay raw strings until the classifier is built,
    // where they are validated.
    pub min_samples_leaf: String,
    pub max_leaf_nodes: String,
    pub max_samples: String,
    /// Worker threads per training phase (MLLM_JOBS)
    pub jobs: usize,
    /// Documents per worker dispatch (MLLM_CHUNK_SIZE)
    pub chunk_size: usize,
    /// Maximum number of suggestions (MLLM_LIMIT)
    pub limit: usize,
    /// Shortest word the analyzer keeps (MLLM_TOKEN_MIN_LENGTH)
    pub token_min_length: usize,
    /// Populate the subj_freq statistic from true assignments
    /// (MLLM_TRACK_SUBJECT_FREQUENCY)
    pub track_subject_frequency: bool,
    /// Where the trained model lives (MLLM_MODEL_PATH)
    pub model_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            language: get("MLLM_LANGUAGE", "en"),
            use_hidden_labels: parse_bool("MLLM_USE_HIDDEN_LABELS", &get("MLLM_USE_HIDDEN_LABELS", "false"))?,
            min_samples_leaf: get("MLLM_MIN_SAMPLES_LEAF", "20"),
            max_leaf_nodes: get("MLLM_MAX_LEAF_NODES", "1000"),
            max_samples: get("MLLM_MAX_SAMPLES", "0.9"),
            jobs: parse_count("MLLM_JOBS", &get("MLLM_JOBS", "4"))?,
            chunk_size: parse_count("MLLM_CHUNK_SIZE", &get("MLLM_CHUNK_SIZE", "20"))?,
            limit: parse_count("MLLM_LIMIT", &get("MLLM_LIMIT", "100"))?,
            token_min_length: parse_count("MLLM_TOKEN_MIN_LENGTH", &get("MLLM_TOKEN_MIN_LENGTH", "3"))?,
            track_subject_frequency: parse_bool(
                "MLLM_TRACK_SUBJECT_FREQUENCY",
                &get("MLLM_TRACK_SUBJECT_FREQUENCY", "false"),
            )?,
            model_path: lookup("MLLM_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_model_path),
        })
    }

    /// Validated classifier parameters. Fails on non-numeric values.
    pub fn classifier_params(&self) -> Result<ClassifierParams> {
        ClassifierParams::parse(&self.min_samples_leaf, &self.max_leaf_nodes, &self.max_samples)
    }

    pub fn analyzer(&self) -> SimpleAnalyzer {
        SimpleAnalyzer::new(self.token_min_length)
    }

    pub fn vocabulary_options(&self) -> VocabularyOptions {
        VocabularyOptions {
            language: self.language.clone(),
            use_hidden_labels: self.use_hidden_labels,
        }
    }

    pub fn training_options(&self, show_progress: bool) -> TrainingOptions {
        TrainingOptions {
            jobs: self.jobs,
            chunk_size: self.chunk_size,
            track_subject_frequency: self.track_subject_frequency,
            show_progress,
        }
    }
}

/// Default model location in the platform's local data directory.
pub fn default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mllm")
        .join("model.bin")
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{key} must be a boolean, got {other:?}"),
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    let count: usize = value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a positive integer, got {value:?}"))?;
    if count == 0 {
        anyhow::bail!("{key} must be at least 1");
    }
    Ok(count)
}
