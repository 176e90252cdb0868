// Lexical matching: tokenization, label vectorization, the token-set index,
// and candidate generation.

pub mod analyzer;
pub mod matcher;
pub mod tokenset;
pub mod vectorizer;
