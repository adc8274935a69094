//! Statistical n-gram language model used to re-rank correction candidates.
//!
//! Models are read from the ARPA text format or from a compact binary file
//! produced by [`NgramModel::save_binary`]. Scores are log10 probabilities,
//! compatible with KenLM's `score` and `full_scores`.

pub mod arpa;
pub mod ngram;

pub use ngram::{NgramModel, WordScore};
