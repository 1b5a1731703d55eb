#![deny(missing_docs)]
#![doc = "Configuration objects and the error taxonomy shared by the finite-volume three-body kernel crates."]

/// Index-space configuration bundle and loaders.
pub mod config;
/// Structured error types.
pub mod errors;
/// Flavor channels, spectator slices and template weights.
pub mod flavor;
/// Stable hashing helpers.
pub mod hash;
/// Interaction-scheme selectors.
pub mod scheme;
/// Canonical JSON and YAML serde helpers.
pub mod serde;
/// Finite-volume setup.
pub mod setup;

pub use config::{validate_ceiling, QcSetup};
pub use errors::{ErrorInfo, QcError};
pub use flavor::{FlavorChannel, FlavorChannelSpace, GTemplate, SpectatorSlice, THREE_BODY};
pub use hash::stable_hash_string;
pub use scheme::{CrossChannelPolicy, HarmonicConvention, PoleStyle, ThreeBodyInteractionScheme};
pub use serde::{from_json_slice, from_yaml_str, to_canonical_json_bytes};
pub use setup::{CutoffStyle, FiniteVolumeSetup};
