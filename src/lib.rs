pub mod candidates;
pub mod config;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod geometry;
pub mod lexicon;
pub mod predictor;
pub mod simulate;
pub mod touch;
pub mod trie;
// cmd and reports belong to the binary (main.rs).

pub use decoder::{Decoder, InputMethod};
pub use error::{TfResult, TypeForgeError};
