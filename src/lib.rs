// MLLM: subject indexing by lexical matching and learned ranking.
//
// This is the library root. Each module corresponds to a stage of the
// pipeline: text -> lexical candidates -> features -> ranked subjects.

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod features;
pub mod lexical;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod vocab;
