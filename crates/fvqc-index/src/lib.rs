#![deny(missing_docs)]
#![doc = "Index-space builder for finite-volume three-body kernels: enumerates the (channel, spectator, momentum, ℓ, m) basis that fixes the row and column order of every G matrix, plus an explicit single-flight cache of built spaces."]

/// Caller-owned index-space cache.
pub mod cache;
/// Basis enumeration and lookup.
pub mod space;

pub use cache::{CacheStats, IndexSpaceCache};
pub use space::{BasisElement, QCIndexSpace, MAX_LATTICE_RADIUS};
