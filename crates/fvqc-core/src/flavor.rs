use std::collections::BTreeMap;
use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::errors::{config_error, QcError};

/// Number of particles supported per channel.
pub const THREE_BODY: usize = 3;

fn default_flavor() -> String {
    "pi".to_string()
}

/// Raw serialised form of a [`FlavorChannel`], validated on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorChannelDoc {
    /// Declared particle count.
    pub n_particles: usize,
    /// Particle masses in lattice-independent units.
    #[serde(default)]
    pub masses: Vec<f64>,
    /// Species labels; equal labels mark identical particles.
    #[serde(default)]
    pub flavors: Vec<String>,
    /// Orbital truncation of the two-particle pair.
    #[serde(default)]
    pub ell_max: u32,
}

/// Spectator choice within a channel: one per distinct species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectatorSlice {
    /// Species label of the spectator.
    pub flavor: String,
    /// Spectator mass.
    pub spectator_mass: f64,
    /// Masses of the two particles forming the pair, in channel order.
    pub pair_masses: [f64; 2],
    /// Number of particles of the spectator species in the channel.
    pub multiplicity: usize,
}

impl SpectatorSlice {
    /// Two-particle threshold of the pair recoiling against the spectator.
    pub fn pair_threshold(&self) -> f64 {
        self.pair_masses[0] + self.pair_masses[1]
    }
}

/// An ordered three-particle channel with mass and identity metadata.
///
/// Particles sharing a flavor label are identical and must carry equal
/// masses. The channel is immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlavorChannelDoc", into = "FlavorChannelDoc")]
pub struct FlavorChannel {
    masses: Vec<f64>,
    flavors: Vec<String>,
    ell_max: u32,
    slices: Vec<SpectatorSlice>,
}

impl FlavorChannel {
    /// Creates a channel of `n_particles` identical particles of unit mass.
    pub fn new(n_particles: usize) -> Result<Self, QcError> {
        Self::from_doc(FlavorChannelDoc {
            n_particles,
            masses: Vec::new(),
            flavors: Vec::new(),
            ell_max: 0,
        })
    }

    /// Creates a channel from explicit masses and species labels.
    pub fn with_particles(masses: Vec<f64>, flavors: Vec<String>) -> Result<Self, QcError> {
        Self::from_doc(FlavorChannelDoc {
            n_particles: masses.len(),
            masses,
            flavors,
            ell_max: 0,
        })
    }

    /// Returns a copy of the channel with a different pair orbital truncation.
    pub fn with_ell_max(mut self, ell_max: u32) -> Self {
        self.ell_max = ell_max;
        self
    }

    fn from_doc(doc: FlavorChannelDoc) -> Result<Self, QcError> {
        if doc.n_particles != THREE_BODY {
            return Err(QcError::Config(
                crate::ErrorInfo::new(
                    "unsupported-particle-count",
                    "only three-particle channels are supported",
                )
                .with_context("n_particles", doc.n_particles),
            ));
        }
        let masses = if doc.masses.is_empty() {
            vec![1.0; doc.n_particles]
        } else {
            doc.masses
        };
        let flavors = if doc.flavors.is_empty() {
            vec![default_flavor(); doc.n_particles]
        } else {
            doc.flavors
        };
        if masses.len() != doc.n_particles || flavors.len() != doc.n_particles {
            return Err(config_error(
                "inconsistent-particle-count",
                format!(
                    "channel declares {} particles but lists {} masses and {} flavors",
                    doc.n_particles,
                    masses.len(),
                    flavors.len()
                ),
            ));
        }
        for &mass in &masses {
            if !mass.is_finite() || mass <= 0.0 {
                return Err(QcError::Config(
                    crate::ErrorInfo::new("invalid-mass", "masses must be positive and finite")
                        .with_context("mass", mass),
                ));
            }
        }
        let mut species_mass: BTreeMap<&str, f64> = BTreeMap::new();
        for (flavor, &mass) in flavors.iter().zip(&masses) {
            if let Some(&seen) = species_mass.get(flavor.as_str()) {
                if seen != mass {
                    return Err(QcError::Config(
                        crate::ErrorInfo::new(
                            "identical-mass-mismatch",
                            "identical particles must share a mass",
                        )
                        .with_context("flavor", flavor),
                    ));
                }
            } else {
                species_mass.insert(flavor.as_str(), mass);
            }
        }
        let slices = build_slices(&masses, &flavors);
        Ok(Self {
            masses,
            flavors,
            ell_max: doc.ell_max,
            slices,
        })
    }

    /// Number of particles in the channel.
    pub fn n_particles(&self) -> usize {
        self.masses.len()
    }

    /// Particle masses in channel order.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Species labels in channel order.
    pub fn flavors(&self) -> &[String] {
        &self.flavors
    }

    /// Orbital truncation of the two-particle pair.
    pub fn ell_max(&self) -> u32 {
        self.ell_max
    }

    /// Spectator slices in first-appearance order.
    pub fn slices(&self) -> &[SpectatorSlice] {
        &self.slices
    }

    /// True when all particles are identical.
    pub fn is_identical(&self) -> bool {
        self.slices.len() == 1
    }

    /// Multiplicity of the given species within the channel.
    pub fn multiplicity(&self, flavor: &str) -> usize {
        self.flavors.iter().filter(|f| f.as_str() == flavor).count()
    }

    /// Sorted species content, used to decide whether two channels share particles.
    pub fn content(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.flavors.iter().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Mass of the particle left over once `row` and `col` species are removed.
    pub fn exchanged_mass(&self, row: &str, col: &str) -> Option<f64> {
        let mut remaining: Vec<(&str, f64)> = self
            .flavors
            .iter()
            .map(String::as_str)
            .zip(self.masses.iter().copied())
            .collect();
        for target in [row, col] {
            let pos = remaining.iter().position(|(flavor, _)| *flavor == target)?;
            remaining.remove(pos);
        }
        remaining.first().map(|(_, mass)| *mass)
    }
}

fn build_slices(masses: &[f64], flavors: &[String]) -> Vec<SpectatorSlice> {
    let mut slices: Vec<SpectatorSlice> = Vec::new();
    for (idx, flavor) in flavors.iter().enumerate() {
        if slices.iter().any(|slice| &slice.flavor == flavor) {
            continue;
        }
        let pair: Vec<f64> = (0..masses.len())
            .filter(|&other| other != idx)
            .map(|other| masses[other])
            .collect();
        slices.push(SpectatorSlice {
            flavor: flavor.clone(),
            spectator_mass: masses[idx],
            pair_masses: [pair[0], pair[1]],
            multiplicity: flavors.iter().filter(|f| *f == flavor).count(),
        });
    }
    slices
}

impl TryFrom<FlavorChannelDoc> for FlavorChannel {
    type Error = QcError;

    fn try_from(doc: FlavorChannelDoc) -> Result<Self, Self::Error> {
        Self::from_doc(doc)
    }
}

impl From<FlavorChannel> for FlavorChannelDoc {
    fn from(channel: FlavorChannel) -> Self {
        Self {
            n_particles: channel.masses.len(),
            masses: channel.masses,
            flavors: channel.flavors,
            ell_max: channel.ell_max,
        }
    }
}

/// Template weights coupling the spectator slices of two channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GTemplate {
    rows: usize,
    cols: usize,
    weights: Vec<f64>,
}

impl GTemplate {
    /// Weight for row slice `a` and column slice `b`.
    pub fn weight(&self, a: usize, b: usize) -> f64 {
        if a >= self.rows || b >= self.cols {
            return 0.0;
        }
        self.weights[a * self.cols + b]
    }

    /// Number of row slices.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of column slices.
    pub fn cols(&self) -> usize {
        self.cols
    }
}

fn template_weight(
    row_channel: &FlavorChannel,
    row: &SpectatorSlice,
    col_channel: &FlavorChannel,
    col: &SpectatorSlice,
) -> f64 {
    if row_channel.content() != col_channel.content() {
        return 0.0;
    }
    let n_a = row_channel.multiplicity(&row.flavor);
    let n_b_in_row = row_channel.multiplicity(&col.flavor);
    let n_b = col_channel.multiplicity(&col.flavor);
    let same = usize::from(row.flavor == col.flavor);
    let count = n_a * n_b_in_row.saturating_sub(same);
    if count == 0 {
        return 0.0;
    }
    count as f64 / (2.0 * ((n_a * n_b) as f64).sqrt())
}

/// Ordered set of flavor channels; insertion order fixes matrix block order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FlavorChannel>", into = "Vec<FlavorChannel>")]
pub struct FlavorChannelSpace {
    channels: Vec<FlavorChannel>,
    g_templates: Vec<Vec<GTemplate>>,
}

impl FlavorChannelSpace {
    /// Builds a channel space and derives its template weights.
    pub fn new(fc_list: Vec<FlavorChannel>) -> Result<Self, QcError> {
        if fc_list.is_empty() {
            return Err(config_error(
                "empty-channel-space",
                "at least one flavor channel is required",
            ));
        }
        let n_particles = fc_list[0].n_particles();
        if fc_list.iter().any(|fc| fc.n_particles() != n_particles) {
            return Err(config_error(
                "inconsistent-particle-count",
                "every channel in a space must have the same particle count",
            ));
        }
        let g_templates = fc_list
            .iter()
            .map(|row_channel| {
                fc_list
                    .iter()
                    .map(|col_channel| {
                        let rows = row_channel.slices().len();
                        let cols = col_channel.slices().len();
                        let mut weights = Vec::with_capacity(rows * cols);
                        for row in row_channel.slices() {
                            for col in col_channel.slices() {
                                weights.push(template_weight(row_channel, row, col_channel, col));
                            }
                        }
                        GTemplate {
                            rows,
                            cols,
                            weights,
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(Self {
            channels: fc_list,
            g_templates,
        })
    }

    /// Channels in insertion order.
    pub fn channels(&self) -> &[FlavorChannel] {
        &self.channels
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True when the space holds no channels (never the case after validation).
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Template block coupling channel `row` to channel `col`.
    pub fn g_template(&self, row: usize, col: usize) -> Option<&GTemplate> {
        self.g_templates.get(row).and_then(|line| line.get(col))
    }

    /// Scalar template weight for (row channel, row slice) × (col channel, col slice).
    pub fn g_weight(&self, row: usize, col: usize, row_slice: usize, col_slice: usize) -> f64 {
        self.g_template(row, col)
            .map(|template| template.weight(row_slice, col_slice))
            .unwrap_or(0.0)
    }
}

impl TryFrom<Vec<FlavorChannel>> for FlavorChannelSpace {
    type Error = QcError;

    fn try_from(channels: Vec<FlavorChannel>) -> Result<Self, Self::Error> {
        Self::new(channels)
    }
}

impl From<FlavorChannelSpace> for Vec<FlavorChannel> {
    fn from(space: FlavorChannelSpace) -> Self {
        space.channels
    }
}
