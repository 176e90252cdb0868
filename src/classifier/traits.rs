// Classifier trait: the swap-ready abstraction for the ranking model.
//
// The MLLM model only needs to fit a binary classifier on a feature matrix
// and to read back positive-class probabilities. Anything that can do that
// (and be serialized with the rest of the model) can stand in for the
// default bagged tree ensemble.

use anyhow::Result;
use ndarray::ArrayView2;

pub trait Classifier: Send + Sync {
    /// Fit on a feature matrix and one boolean label per row.
    fn fit(&mut self, x: ArrayView2<'_, f32>, y: &[bool]) -> Result<()>;

    /// Probability of the positive class for each row, in row order.
    fn predict_proba(&self, x: ArrayView2<'_, f32>) -> Result<Vec<f32>>;
}
