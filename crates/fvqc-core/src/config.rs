use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ErrorInfo, QcError};
use crate::flavor::FlavorChannelSpace;
use crate::hash::stable_hash_string;
use crate::scheme::ThreeBodyInteractionScheme;
use crate::serde::{from_json_slice, from_yaml_str};
use crate::setup::FiniteVolumeSetup;

/// Validates an energy or length ceiling used to build an index space.
pub fn validate_ceiling(name: &str, value: f64) -> Result<(), QcError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(QcError::Config(
            ErrorInfo::new("invalid-ceiling", format!("{name} must be positive and finite"))
                .with_context(name, value),
        ));
    }
    Ok(())
}

/// Complete configuration of an index space: channels, volume, scheme and ceilings.
///
/// ```yaml
/// channels:
///   - n_particles: 3
///     masses: [1.0, 1.0, 1.0]
///     ell_max: 1
/// volume:
///   n_p: [0, 0, 1]
/// scheme:
///   pole: relativistic pole
/// e_max: 5.0
/// l_max: 7.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcSetup {
    /// Flavor channels in block order.
    pub channels: FlavorChannelSpace,
    /// Total momentum and cutoff selection.
    #[serde(default)]
    pub volume: FiniteVolumeSetup,
    /// Pole, harmonic and cutoff-shape choices.
    #[serde(default)]
    pub scheme: ThreeBodyInteractionScheme,
    /// Energy ceiling of the index space.
    pub e_max: f64,
    /// Box-length ceiling of the index space.
    pub l_max: f64,
}

impl QcSetup {
    /// Assembles and validates a setup.
    pub fn new(
        channels: FlavorChannelSpace,
        volume: FiniteVolumeSetup,
        scheme: ThreeBodyInteractionScheme,
        e_max: f64,
        l_max: f64,
    ) -> Result<Self, QcError> {
        let setup = Self {
            channels,
            volume,
            scheme,
            e_max,
            l_max,
        };
        setup.validate()?;
        Ok(setup)
    }

    /// Checks the ceilings; component objects are validated on construction.
    pub fn validate(&self) -> Result<(), QcError> {
        validate_ceiling("e_max", self.e_max)?;
        validate_ceiling("l_max", self.l_max)
    }

    /// Parses a setup from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, QcError> {
        let setup: Self = from_yaml_str(text)?;
        setup.validate()?;
        Ok(setup)
    }

    /// Parses a setup from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, QcError> {
        let setup: Self = from_json_slice(bytes)?;
        setup.validate()?;
        Ok(setup)
    }

    /// Loads a setup from disk; `.json` files are read as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, QcError> {
        let bytes = fs::read(path).map_err(|err| {
            QcError::Serde(
                ErrorInfo::new("setup-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        debug!(path = %path.display(), "loading qc setup");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&bytes),
            _ => {
                let text = String::from_utf8(bytes).map_err(|err| {
                    QcError::Serde(ErrorInfo::new("setup-utf8", err.to_string()))
                })?;
                Self::from_yaml(&text)
            }
        }
    }

    /// Stable hash identifying this configuration; used as the cache key.
    pub fn cache_key(&self) -> Result<String, QcError> {
        stable_hash_string(self)
    }
}
