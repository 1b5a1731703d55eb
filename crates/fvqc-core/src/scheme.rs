use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, QcError};

fn unknown(code: &str, value: &str, expected: &str) -> QcError {
    QcError::Config(
        ErrorInfo::new(code, "unrecognised style selector")
            .with_context("value", value)
            .with_hint(format!("expected one of: {expected}")),
    )
}

/// Energy denominator used for the exchanged particle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PoleStyle {
    /// Covariant pole `1 / ((E - ω1 - ω2)² - ω3²)`.
    #[default]
    #[serde(rename = "relativistic-pole", alias = "relativistic pole")]
    Relativistic,
    /// Time-ordered pole `1 / (2 ω3 (E - ω1 - ω2 - ω3))`.
    #[serde(rename = "original-pole", alias = "original pole")]
    Original,
}

impl fmt::Display for PoleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoleStyle::Relativistic => write!(f, "relativistic pole"),
            PoleStyle::Original => write!(f, "original pole"),
        }
    }
}

impl FromStr for PoleStyle {
    type Err = QcError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "relativistic pole" | "relativistic-pole" => Ok(PoleStyle::Relativistic),
            "original pole" | "original-pole" => Ok(PoleStyle::Original),
            other => Err(unknown(
                "unknown-pole-style",
                other,
                "relativistic pole, original pole",
            )),
        }
    }
}

/// Spherical-harmonic convention of the angular factors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum HarmonicConvention {
    /// Real harmonics, symmetric normalisation. Produces real matrices.
    #[default]
    #[serde(
        rename = "hermitian-real-harmonics",
        alias = "hermitian, real harmonics"
    )]
    HermitianReal,
    /// Complex harmonics, symmetric normalisation. Produces hermitian matrices.
    #[serde(
        rename = "hermitian-complex-harmonics",
        alias = "hermitian, complex harmonics"
    )]
    HermitianComplex,
}

impl HarmonicConvention {
    /// True when the convention yields complex matrix elements.
    pub fn is_complex(&self) -> bool {
        matches!(self, HarmonicConvention::HermitianComplex)
    }
}

impl fmt::Display for HarmonicConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarmonicConvention::HermitianReal => write!(f, "hermitian, real harmonics"),
            HarmonicConvention::HermitianComplex => write!(f, "hermitian, complex harmonics"),
        }
    }
}

impl FromStr for HarmonicConvention {
    type Err = QcError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "hermitian, real harmonics" | "hermitian-real-harmonics" => {
                Ok(HarmonicConvention::HermitianReal)
            }
            "hermitian, complex harmonics" | "hermitian-complex-harmonics" => {
                Ok(HarmonicConvention::HermitianComplex)
            }
            other => Err(unknown(
                "unknown-harmonic-convention",
                other,
                "hermitian, real harmonics, hermitian, complex harmonics",
            )),
        }
    }
}

/// How blocks between different channels are populated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CrossChannelPolicy {
    /// Off-diagonal channel blocks are exactly zero.
    #[default]
    Decoupled,
    /// Channels with identical particle content exchange through G.
    SharedContent,
}

impl CrossChannelPolicy {
    /// Factor applied to the template weight of a channel block.
    pub fn block_factor(&self, row_channel: usize, col_channel: usize) -> f64 {
        match self {
            _ if row_channel == col_channel => 1.0,
            CrossChannelPolicy::Decoupled => 0.0,
            CrossChannelPolicy::SharedContent => 1.0,
        }
    }
}

impl FromStr for CrossChannelPolicy {
    type Err = QcError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "decoupled" => Ok(CrossChannelPolicy::Decoupled),
            "shared-content" => Ok(CrossChannelPolicy::SharedContent),
            other => Err(unknown(
                "unknown-cross-channel-policy",
                other,
                "decoupled, shared-content",
            )),
        }
    }
}

fn default_alpha() -> f64 {
    -1.0
}

/// Raw serialised form of a [`ThreeBodyInteractionScheme`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreeBodyInteractionSchemeDoc {
    /// Pole style selector.
    #[serde(default)]
    pub pole: PoleStyle,
    /// Harmonic convention selector.
    #[serde(default)]
    pub harmonics: HarmonicConvention,
    /// Lower-edge shift of the cutoff function.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Additive shift of the cutoff argument.
    #[serde(default)]
    pub beta: f64,
    /// Cross-channel block policy.
    #[serde(default)]
    pub cross_channel: CrossChannelPolicy,
}

/// Interaction-scheme choices consumed by the kernel and the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "ThreeBodyInteractionSchemeDoc",
    into = "ThreeBodyInteractionSchemeDoc"
)]
pub struct ThreeBodyInteractionScheme {
    pole: PoleStyle,
    harmonics: HarmonicConvention,
    alpha: f64,
    beta: f64,
    cross_channel: CrossChannelPolicy,
}

impl Default for ThreeBodyInteractionScheme {
    fn default() -> Self {
        Self {
            pole: PoleStyle::Relativistic,
            harmonics: HarmonicConvention::HermitianReal,
            alpha: default_alpha(),
            beta: 0.0,
            cross_channel: CrossChannelPolicy::Decoupled,
        }
    }
}

impl ThreeBodyInteractionScheme {
    /// Builds a validated scheme.
    pub fn new(
        pole: PoleStyle,
        harmonics: HarmonicConvention,
        alpha: f64,
        beta: f64,
    ) -> Result<Self, QcError> {
        Self::try_from(ThreeBodyInteractionSchemeDoc {
            pole,
            harmonics,
            alpha,
            beta,
            cross_channel: CrossChannelPolicy::Decoupled,
        })
    }

    /// Returns a copy with a different pole style.
    pub fn with_pole(mut self, pole: PoleStyle) -> Self {
        self.pole = pole;
        self
    }

    /// Returns a copy with a different harmonic convention.
    pub fn with_harmonics(mut self, harmonics: HarmonicConvention) -> Self {
        self.harmonics = harmonics;
        self
    }

    /// Returns a copy with a different cross-channel policy.
    pub fn with_cross_channel(mut self, policy: CrossChannelPolicy) -> Self {
        self.cross_channel = policy;
        self
    }

    /// Pole style.
    pub fn pole(&self) -> PoleStyle {
        self.pole
    }

    /// Harmonic convention.
    pub fn harmonics(&self) -> HarmonicConvention {
        self.harmonics
    }

    /// Cutoff lower-edge parameter.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Cutoff argument shift.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Cross-channel block policy.
    pub fn cross_channel(&self) -> CrossChannelPolicy {
        self.cross_channel
    }
}

impl TryFrom<ThreeBodyInteractionSchemeDoc> for ThreeBodyInteractionScheme {
    type Error = QcError;

    fn try_from(doc: ThreeBodyInteractionSchemeDoc) -> Result<Self, Self::Error> {
        if !doc.alpha.is_finite() || !(-1.0..3.0).contains(&doc.alpha) {
            return Err(QcError::Config(
                ErrorInfo::new("invalid-alpha", "alpha must lie in [-1, 3)")
                    .with_context("alpha", doc.alpha),
            ));
        }
        if !doc.beta.is_finite() {
            return Err(QcError::Config(
                ErrorInfo::new("invalid-beta", "beta must be finite")
                    .with_context("beta", doc.beta),
            ));
        }
        Ok(Self {
            pole: doc.pole,
            harmonics: doc.harmonics,
            alpha: doc.alpha,
            beta: doc.beta,
            cross_channel: doc.cross_channel,
        })
    }
}

impl From<ThreeBodyInteractionScheme> for ThreeBodyInteractionSchemeDoc {
    fn from(scheme: ThreeBodyInteractionScheme) -> Self {
        Self {
            pole: scheme.pole,
            harmonics: scheme.harmonics,
            alpha: scheme.alpha,
            beta: scheme.beta,
            cross_channel: scheme.cross_channel,
        }
    }
}
