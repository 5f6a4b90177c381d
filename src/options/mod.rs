//! Option Variants Module
//!
//! Closed, tagged-union families of mutually exclusive sub-configurations.
//! Each variant knows its own token count and its own token emission, the
//! same dual bookkeeping the top-level builders use, checked at
//! sub-command granularity.

mod combine;
mod scorer;
mod vector;

pub use combine::{Combiner, DEFAULT_RRF_WINDOW};
pub use scorer::{Scorer, DEFAULT_TANH_FACTOR};
pub use vector::{encode_dense, VectorInput, VectorMethod, DEFAULT_KNN_K};
