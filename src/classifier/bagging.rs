// Bootstrap-aggregated decision trees: the default ranking classifier.
//
// Each tree is fitted on a bootstrap sample (drawn with replacement) of
// `max_samples * n_rows` rows; the ensemble probability is the mean of the
// trees' leaf probabilities. Trees are fitted in parallel, each from its own
// seeded generator, so a given seed always produces the same ensemble.

use anyhow::{Context, Result};
use ndarray::ArrayView2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::traits::Classifier;
use super::tree::DecisionTree;

/// Validated ensemble hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Minimum number of samples in each leaf (default 20)
    pub min_samples_leaf: usize,
    /// Maximum number of leaves per tree (default 1000)
    pub max_leaf_nodes: usize,
    /// Fraction of rows drawn for each tree, in (0, 1] (default 0.9)
    pub max_samples: f64,
    /// Number of trees (default 10)
    pub n_estimators: usize,
    pub seed: u64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            min_samples_leaf: 20,
            max_leaf_nodes: 1000,
            max_samples: 0.9,
            n_estimators: 10,
            seed: 0,
        }
    }
}

impl ClassifierParams {
    /// Parse the three tunable parameters from their configuration strings.
    ///
    /// Non-numeric or out-of-range values are rejected here, before any
    /// training work starts.
    pub fn parse(min_samples_leaf: &str, max_leaf_nodes: &str, max_samples: &str) -> Result<Self> {
        let min_samples_leaf: usize = min_samples_leaf
            .trim()
            .parse()
            .with_context(|| format!("min_samples_leaf must be an integer, got {min_samples_leaf:?}"))?;
        let max_leaf_nodes: usize = max_leaf_nodes
            .trim()
            .parse()
            .with_context(|| format!("max_leaf_nodes must be an integer, got {max_leaf_nodes:?}"))?;
        let max_samples: f64 = max_samples
            .trim()
            .parse()
            .with_context(|| format!("max_samples must be a number, got {max_samples:?}"))?;

        let params = Self {
            min_samples_leaf,
            max_leaf_nodes,
            max_samples,
            ..Default::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_samples_leaf == 0 {
            anyhow::bail!("min_samples_leaf must be at least 1");
        }
        if self.max_leaf_nodes < 2 {
            anyhow::bail!(
                "max_leaf_nodes must be at least 2, got {}",
                self.max_leaf_nodes
            );
        }
        if !(self.max_samples > 0.0 && self.max_samples <= 1.0) {
            anyhow::bail!(
                "max_samples must be in (0, 1], got {}",
                self.max_samples
            );
        }
        if self.n_estimators == 0 {
            anyhow::bail!("n_estimators must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaggedTrees {
    params: ClassifierParams,
    trees: Vec<DecisionTree>,
}

impl BaggedTrees {
    pub fn new(params: ClassifierParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            trees: Vec::new(),
        })
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

impl Classifier for BaggedTrees {
    fn fit(&mut self, x: ArrayView2<'_, f32>, y: &[bool]) -> Result<()> {
        let n_rows = x.nrows();
        if n_rows == 0 {
            anyhow::bail!("Cannot fit classifier: training matrix has no rows");
        }
        if y.len() != n_rows {
            anyhow::bail!(
                "Label count {} does not match training matrix rows {}",
                y.len(),
                n_rows
            );
        }

        let n_draw = ((self.params.max_samples * n_rows as f64) as usize).max(1);
        let params = &self.params;
        info!(
            rows = n_rows,
            positives = y.iter().filter(|&&l| l).count(),
            estimators = params.n_estimators,
            "Fitting bagged tree ensemble"
        );

        self.trees = (0..params.n_estimators)
            .into_par_iter()
            .map(|estimator| {
                let mut rng = ChaCha8Rng::seed_from_u64(params.seed.wrapping_add(estimator as u64));
                let samples: Vec<usize> =
                    (0..n_draw).map(|_| rng.random_range(0..n_rows)).collect();
                DecisionTree::fit(
                    x,
                    y,
                    &samples,
                    params.min_samples_leaf,
                    params.max_leaf_nodes,
                )
            })
            .collect();

        debug!(
            leaves = self.trees.iter().map(DecisionTree::n_leaves).sum::<usize>(),
            "Ensemble fitted"
        );
        Ok(())
    }

    fn predict_proba(&self, x: ArrayView2<'_, f32>) -> Result<Vec<f32>> {
        if !self.is_fitted() {
            anyhow::bail!("Classifier has not been fitted");
        }
        let n_trees = self.trees.len() as f32;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let row = row.to_vec();
                self.trees.iter().map(|t| t.predict_row(&row)).sum::<f32>() / n_trees
            })
            .collect())
    }
}
