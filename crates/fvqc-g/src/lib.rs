#![deny(missing_docs)]
#![doc = "Matrix evaluator for finite-volume three-body G kernels. Given a built index space, `G` assembles the full kernel matrix at any energy and box length inside its envelope, flagging singular cells instead of returning infinities."]

/// The `G` evaluator.
pub mod evaluator;
/// Matrix results with singular-cell bookkeeping.
pub mod matrix;

pub use evaluator::{G, ENVELOPE_TOLERANCE};
pub use matrix::{GMatrix, SingularCell};
