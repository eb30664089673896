//! Candlestick pattern detectors
//!
//! Every detector is a predicate over a fixed-size window of consecutive
//! [`DayRecord`](crate::DayRecord)s, ordered oldest first.
//!
//! # Pattern Categories
//!
//! - **Single-bar**: Hammer
//! - **Three-bar**: Three White Soldiers, Evening Star

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod single_bar;
pub mod three_bar;

// Re-export all detectors for convenience
pub use helpers::*;
pub use single_bar::*;
pub use three_bar::*;
