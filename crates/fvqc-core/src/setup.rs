use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, QcError};

/// Shape of the cutoff applied to each spectator leg.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CutoffStyle {
    /// Smooth `J`-function interpolation between zero and one.
    #[default]
    Smooth,
    /// Heaviside step at the lower edge of the smooth region.
    Hard,
}

impl fmt::Display for CutoffStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutoffStyle::Smooth => write!(f, "smooth"),
            CutoffStyle::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for CutoffStyle {
    type Err = QcError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "smooth" => Ok(CutoffStyle::Smooth),
            "hard" => Ok(CutoffStyle::Hard),
            other => Err(QcError::Config(
                ErrorInfo::new("unknown-cutoff-style", "unrecognised cutoff style")
                    .with_context("value", other)
                    .with_hint("expected one of: smooth, hard"),
            )),
        }
    }
}

/// Finite-volume setup: total lattice momentum and cutoff selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct FiniteVolumeSetup {
    /// Total momentum in units of 2π/L.
    #[serde(default)]
    pub n_p: [i64; 3],
    /// Cutoff function applied to each leg.
    #[serde(default)]
    pub cutoff: CutoffStyle,
}

impl FiniteVolumeSetup {
    /// Setup with the given total momentum and the default smooth cutoff.
    pub fn new(n_p: [i64; 3]) -> Self {
        Self {
            n_p,
            cutoff: CutoffStyle::Smooth,
        }
    }

    /// Builds a setup from floating-point components, rejecting non-integers.
    pub fn from_components(components: [f64; 3]) -> Result<Self, QcError> {
        let mut n_p = [0i64; 3];
        for (slot, value) in n_p.iter_mut().zip(components) {
            if !value.is_finite() || value.fract() != 0.0 || value.abs() > i32::MAX as f64 {
                return Err(QcError::Config(
                    ErrorInfo::new(
                        "non-integer-momentum",
                        "total momentum components must be integers",
                    )
                    .with_context("component", value),
                ));
            }
            *slot = value as i64;
        }
        Ok(Self::new(n_p))
    }

    /// Returns a copy of the setup with a different cutoff style.
    pub fn with_cutoff(mut self, cutoff: CutoffStyle) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Squared magnitude of the total momentum in lattice units.
    pub fn n_p_sq(&self) -> i64 {
        self.n_p.iter().map(|c| c * c).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_must_be_integers() {
        let fvs = FiniteVolumeSetup::from_components([0.0, 0.0, 1.0]).unwrap();
        assert_eq!(fvs.n_p, [0, 0, 1]);
        assert_eq!(fvs.n_p_sq(), 1);
        let err = FiniteVolumeSetup::from_components([0.5, 0.0, 0.0]).unwrap_err();
        assert_eq!(err.info().code, "non-integer-momentum");
    }

    #[test]
    fn cutoff_parses_strictly() {
        assert_eq!("hard".parse::<CutoffStyle>().unwrap(), CutoffStyle::Hard);
        assert!("soft".parse::<CutoffStyle>().is_err());
    }
}
