//! Per-finger state machines that turn raw touch samples into touch life-cycle events.

pub mod gesture;
pub mod tap;

pub use self::gesture::{GestureExtractor, GestureState};
pub use self::tap::{TapExtractor, TapState};
