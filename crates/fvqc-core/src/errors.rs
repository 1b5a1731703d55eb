//! Error taxonomy of the finite-volume kernel crates.
//!
//! Configuration, envelope and index errors abort the call that raised them.
//! Singularities are per matrix cell: the evaluator records them and keeps
//! going unless fail-fast was requested.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic carried by every [`QcError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case code, stable across releases.
    pub code: String,
    /// One-line description.
    pub message: String,
    /// Offending quantities (energies, lattice vectors, basis indices).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested remedy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Diagnostic with an empty context.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records an offending quantity under `key`.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Attaches a remedy.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " ({key}={value}")?;
            for (key, value) in entries {
                write!(f, ", {key}={value}")?;
            }
            write!(f, ")")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Every failure a kernel, index-space or evaluator call can report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum QcError {
    /// Invalid channel, volume or scheme input; raised at construction.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// A pole or barrier denominator is zero to within rounding.
    #[error("numeric singularity: {0}")]
    Singularity(ErrorInfo),
    /// (E, L) outside the ceilings the index space was built for.
    #[error("envelope error: {0}")]
    Envelope(ErrorInfo),
    /// Channel, slice or basis lookup out of range.
    #[error("index error: {0}")]
    Index(ErrorInfo),
    /// Setup files and canonical JSON.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl QcError {
    /// The diagnostic, whatever the family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            QcError::Config(info)
            | QcError::Singularity(info)
            | QcError::Envelope(info)
            | QcError::Index(info)
            | QcError::Serde(info) => info,
        }
    }

    /// Family tag as serialised.
    pub fn family(&self) -> &'static str {
        match self {
            QcError::Config(_) => "Config",
            QcError::Singularity(_) => "Singularity",
            QcError::Envelope(_) => "Envelope",
            QcError::Index(_) => "Index",
            QcError::Serde(_) => "Serde",
        }
    }

    /// True for per-cell singularities.
    pub fn is_singularity(&self) -> bool {
        matches!(self, QcError::Singularity(_))
    }
}

pub(crate) fn config_error(code: &str, message: impl Into<String>) -> QcError {
    QcError::Config(ErrorInfo::new(code, message))
}
