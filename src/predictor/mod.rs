//! Candidate ranking: elastic tap decoding over the prefix trie, and
//! two-level DTW gesture decoding.

pub mod brute;
pub mod dtw;
pub mod gesture;
pub mod resample;
pub mod tap;
pub mod touch_model;

pub use self::brute::BruteForceTapPredictor;
pub use self::gesture::GesturePredictor;
pub use self::tap::TapPredictor;
pub use self::touch_model::{ElasticModel, TouchModel};
