use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use mllm::classifier::BaggedTrees;
use mllm::config::Config;
use mllm::model::MllmModel;
use mllm::pipeline::suggest::suggest_subjects;
use mllm::vocab::Vocabulary;

/// MLLM: subject indexing with lexical matching and a learned ranker.
///
/// Matches text against the labels of a controlled vocabulary and ranks the
/// matched subjects with a classifier trained on manually indexed documents.
#[derive(Parser)]
#[command(name = "mllm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a vocabulary and a TSV corpus
    Train {
        /// Vocabulary JSON file
        #[arg(long)]
        vocab: PathBuf,

        /// Training corpus (TSV: text<TAB><uri> <uri>...)
        #[arg(long)]
        corpus: PathBuf,

        /// Where to write the model (default: MLLM_MODEL_PATH or the data dir)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Worker threads per training phase (default: MLLM_JOBS or 4)
        #[arg(long)]
        jobs: Option<usize>,
    },

    /// Suggest subjects for a text (read from stdin when no text is given)
    Suggest {
        /// Vocabulary JSON file the model was trained with
        #[arg(long)]
        vocab: PathBuf,

        #[arg(long)]
        model: Option<PathBuf>,

        /// Maximum number of subjects (default: MLLM_LIMIT or 100)
        #[arg(long)]
        limit: Option<usize>,

        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,

        text: Option<String>,
    },

    /// Show metadata of a trained model
    Info {
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mllm=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Train {
            vocab,
            corpus,
            model,
            jobs,
        } => {
            if let Some(jobs) = jobs {
                config.jobs = jobs.max(1);
            }
            let model_path = model.unwrap_or_else(|| config.model_path.clone());

            // Reject bad classifier settings before any expensive work
            let classifier = BaggedTrees::new(config.classifier_params()?)?;

            let vocabulary = Vocabulary::load(&vocab)?;
            let documents = mllm::corpus::load_tsv(&corpus)?;
            if documents.is_empty() {
                anyhow::bail!("Corpus {} contains no documents", corpus.display());
            }

            println!(
                "Training on {} documents with {} workers...",
                documents.len(),
                config.jobs
            );
            let analyzer = config.analyzer();
            let (prepared, training) = MllmModel::prepare_train(
                &documents,
                &vocabulary,
                &analyzer,
                &config.vocabulary_options(),
                config.training_options(true),
            )?;

            println!(
                "  {} candidate rows ({} correct subjects)",
                training.len(),
                training.positives()
            );
            let trained = prepared.train(classifier, &training)?;
            trained.save(&model_path)?;

            println!("\n{}", "Model trained.".bold());
            println!("  Saved to: {}", model_path.display());
        }

        Commands::Suggest {
            vocab,
            model,
            limit,
            json,
            text,
        } => {
            let model_path = model.unwrap_or_else(|| config.model_path.clone());
            let limit = limit.unwrap_or(config.limit);
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };

            let vocabulary = Vocabulary::load(&vocab)?;
            let trained = load_model(&model_path)?;
            let suggestions =
                suggest_subjects(&trained, &vocabulary, &config, &text, limit)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else {
                mllm::output::terminal::display_suggestions(&suggestions);
            }
        }

        Commands::Info { model } => {
            let model_path = model.unwrap_or_else(|| config.model_path.clone());
            let trained = load_model(&model_path)?;
            mllm::output::terminal::display_model_info(
                trained.info(),
                &model_path.display().to_string(),
            );
        }
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<MllmModel> {
    if !path.exists() {
        anyhow::bail!(
            "No model found at {}\n\
             Run `mllm train` first, or point MLLM_MODEL_PATH / --model at a trained model.",
            path.display()
        );
    }
    MllmModel::load(path)
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read text from stdin")?;
    Ok(text)
}
