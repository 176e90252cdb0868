// Suggestion pipeline: the path `mllm suggest` takes from text to labeled
// subjects.
//
// Matching always uses the word filter stored in the model. A configured
// MLLM_TOKEN_MIN_LENGTH that differs from it is reported and ignored, since
// the label index can only be searched with the tokens it was built from.

use anyhow::Result;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::config::Config;
use crate::model::MllmModel;
use crate::output::{to_suggestions, Suggestion};
use crate::vocab::Vocabulary;

/// Rank subjects for `text` and attach the vocabulary's URIs and labels.
pub fn suggest_subjects<C: Classifier>(
    model: &MllmModel<C>,
    vocab: &Vocabulary,
    config: &Config,
    text: &str,
    limit: usize,
) -> Result<Vec<Suggestion>> {
    model.check_vocabulary(vocab)?;

    let analyzer = model.analyzer();
    if config.token_min_length != analyzer.token_min_length {
        warn!(
            configured = config.token_min_length,
            trained = analyzer.token_min_length,
            "Ignoring MLLM_TOKEN_MIN_LENGTH, using the value the model was trained with"
        );
    }

    let ranked = model.suggest(text, &analyzer, limit)?;
    info!(suggestions = ranked.len(), "Suggestion complete");
    Ok(to_suggestions(&ranked, vocab, &model.info().language))
}
