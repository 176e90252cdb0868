// Ranking classifier: the trait seam and the default bagged tree ensemble.

pub mod bagging;
pub mod traits;
pub mod tree;

pub use bagging::{BaggedTrees, ClassifierParams};
pub use traits::Classifier;
