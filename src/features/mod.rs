// Feature engineering: corpus statistics and the candidate feature matrix.

pub mod builder;
pub mod stats;

pub use builder::{candidates_to_features, Feature};
pub use stats::CorpusStats;
