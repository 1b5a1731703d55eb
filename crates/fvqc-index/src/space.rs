use std::ops::Range;

use fvqc_core::{
    stable_hash_string, ErrorInfo, FiniteVolumeSetup, FlavorChannelSpace, QcError, QcSetup,
    SpectatorSlice, ThreeBodyInteractionScheme,
};
use fvqc_kernels::{
    cutoff_argument, lattice_norm_sq, lattice_sub, pair_invariant_mass_sq, relativistic_energy,
    KernelOptions, TWO_PI,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Largest per-axis momentum scanned when enumerating a spectator slice.
pub const MAX_LATTICE_RADIUS: i64 = 96;

fn index_error(code: &str, message: impl Into<String>) -> QcError {
    QcError::Index(ErrorInfo::new(code, message))
}

/// One row (and column) of every G matrix built on an index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasisElement {
    /// Channel position in the channel space.
    pub channel: usize,
    /// Spectator slice within the channel.
    pub slice: usize,
    /// Spectator momentum in lattice units.
    pub n: [i64; 3],
    /// Pair orbital angular momentum.
    pub ell: u32,
    /// Pair magnetic quantum number.
    pub mazi: i32,
}

impl BasisElement {
    fn sort_key(&self) -> (i64, [i64; 3], u32, i32) {
        (lattice_norm_sq(self.n), self.n, self.ell, self.mazi)
    }
}

/// Enumerated kellm basis for a channel space below an (Emax, Lmax) ceiling.
///
/// Elements are stored flat in matrix order: channel, then spectator slice,
/// then momentum by `(|n|², n)`, then `ℓ`, then `m`. The space is immutable
/// once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QCIndexSpace {
    setup: QcSetup,
    key: String,
    elements: Vec<BasisElement>,
    channel_offsets: Vec<usize>,
    slice_offsets: Vec<Vec<usize>>,
}

impl QCIndexSpace {
    /// Builds the basis for the given configuration and ceilings.
    pub fn build(
        channels: &FlavorChannelSpace,
        volume: &FiniteVolumeSetup,
        scheme: &ThreeBodyInteractionScheme,
        e_max: f64,
        l_max: f64,
    ) -> Result<Self, QcError> {
        let setup = QcSetup::new(channels.clone(), *volume, *scheme, e_max, l_max)?;
        Self::from_setup(setup)
    }

    /// Builds the basis described by a bundled setup.
    pub fn from_setup(setup: QcSetup) -> Result<Self, QcError> {
        setup.validate()?;
        let key = setup.cache_key()?;
        let mut elements = Vec::new();
        let mut channel_offsets = Vec::with_capacity(setup.channels.len() + 1);
        let mut slice_offsets = Vec::with_capacity(setup.channels.len());

        for (channel_idx, channel) in setup.channels.channels().iter().enumerate() {
            channel_offsets.push(elements.len());
            let mut offsets = Vec::with_capacity(channel.slices().len() + 1);
            for (slice_idx, slice) in channel.slices().iter().enumerate() {
                offsets.push(elements.len());
                let momenta = enumerate_momenta(&setup, slice)?;
                debug!(
                    channel = channel_idx,
                    spectator = %slice.flavor,
                    momenta = momenta.len(),
                    "enumerated spectator momenta"
                );
                for n in momenta {
                    for ell in 0..=channel.ell_max() {
                        let ell_signed = ell as i32;
                        for mazi in -ell_signed..=ell_signed {
                            elements.push(BasisElement {
                                channel: channel_idx,
                                slice: slice_idx,
                                n,
                                ell,
                                mazi,
                            });
                        }
                    }
                }
            }
            offsets.push(elements.len());
            slice_offsets.push(offsets);
        }
        channel_offsets.push(elements.len());

        info!(key = %key, dimension = elements.len(), "built index space");
        Ok(Self {
            setup,
            key,
            elements,
            channel_offsets,
            slice_offsets,
        })
    }

    /// Configuration the space was built from.
    pub fn setup(&self) -> &QcSetup {
        &self.setup
    }

    /// Stable hash of the configuration; the cache key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Kernel options implied by the interaction scheme and volume.
    pub fn kernel_options(&self) -> KernelOptions {
        KernelOptions::from_scheme(&self.setup.scheme, &self.setup.volume)
    }

    /// Total basis dimension.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when no basis element survived the envelope.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All basis elements in matrix order.
    pub fn elements(&self) -> &[BasisElement] {
        &self.elements
    }

    /// Basis element at a matrix index.
    pub fn element(&self, index: usize) -> Result<&BasisElement, QcError> {
        self.elements.get(index).ok_or_else(|| {
            QcError::Index(
                ErrorInfo::new("basis-index-out-of-range", "no basis element at index")
                    .with_context("index", index)
                    .with_context("len", self.elements.len()),
            )
        })
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.slice_offsets.len()
    }

    /// Number of spectator slices in a channel.
    pub fn slice_count(&self, channel: usize) -> Result<usize, QcError> {
        self.slice_offsets
            .get(channel)
            .map(|offsets| offsets.len() - 1)
            .ok_or_else(|| unknown_channel(channel))
    }

    /// Matrix rows belonging to a channel.
    pub fn channel_range(&self, channel: usize) -> Result<Range<usize>, QcError> {
        if channel >= self.channel_count() {
            return Err(unknown_channel(channel));
        }
        Ok(self.channel_offsets[channel]..self.channel_offsets[channel + 1])
    }

    /// Matrix rows belonging to one spectator slice of a channel.
    pub fn slice_range(&self, channel: usize, slice: usize) -> Result<Range<usize>, QcError> {
        let offsets = self
            .slice_offsets
            .get(channel)
            .ok_or_else(|| unknown_channel(channel))?;
        if slice + 1 >= offsets.len() {
            return Err(QcError::Index(
                ErrorInfo::new("unknown-slice", "spectator slice out of range")
                    .with_context("channel", channel)
                    .with_context("slice", slice),
            ));
        }
        Ok(offsets[slice]..offsets[slice + 1])
    }

    /// The kellm space of one spectator slice.
    pub fn kellm_space(&self, channel: usize, slice: usize) -> Result<&[BasisElement], QcError> {
        let range = self.slice_range(channel, slice)?;
        Ok(&self.elements[range])
    }

    /// Distinct spectator momenta of a slice, in basis order.
    pub fn momenta(&self, channel: usize, slice: usize) -> Result<Vec<[i64; 3]>, QcError> {
        let mut momenta: Vec<[i64; 3]> = Vec::new();
        for element in self.kellm_space(channel, slice)? {
            if momenta.last() != Some(&element.n) {
                momenta.push(element.n);
            }
        }
        Ok(momenta)
    }

    /// Matrix index of a basis element.
    pub fn index_of(
        &self,
        channel: usize,
        slice: usize,
        n: [i64; 3],
        ell: u32,
        mazi: i32,
    ) -> Result<usize, QcError> {
        let range = self.slice_range(channel, slice)?;
        let needle = BasisElement {
            channel,
            slice,
            n,
            ell,
            mazi,
        };
        let target = needle.sort_key();
        self.elements[range.clone()]
            .binary_search_by_key(&target, BasisElement::sort_key)
            .map(|pos| range.start + pos)
            .map_err(|_| {
                QcError::Index(
                    ErrorInfo::new("basis-element-missing", "element is not part of the basis")
                        .with_context("channel", channel)
                        .with_context("slice", slice)
                        .with_context("n", format!("{n:?}"))
                        .with_context("ell", ell)
                        .with_context("mazi", mazi),
                )
            })
    }

    /// Stable hash of the enumerated elements, independent of the configuration hash.
    pub fn basis_hash(&self) -> Result<String, QcError> {
        stable_hash_string(&self.elements)
    }
}

fn unknown_channel(channel: usize) -> QcError {
    index_error("unknown-channel", format!("channel {channel} out of range"))
}

/// Spectator momenta whose pair can reach a non-zero cutoff somewhere
/// inside `E <= Emax`, `L <= Lmax`, sorted by `(|n|², n)`.
fn enumerate_momenta(setup: &QcSetup, slice: &SpectatorSlice) -> Result<Vec<[i64; 3]>, QcError> {
    let (e_max, l_max) = (setup.e_max, setup.l_max);
    let m_s = slice.spectator_mass;
    if e_max <= m_s {
        return Ok(Vec::new());
    }
    let reach = (l_max * (e_max * e_max - m_s * m_s).sqrt() / TWO_PI).ceil();
    if reach > MAX_LATTICE_RADIUS as f64 {
        return Err(QcError::Config(
            ErrorInfo::new("lattice-radius-too-large", "momentum scan exceeds the lattice limit")
                .with_context("radius", reach)
                .with_context("limit", MAX_LATTICE_RADIUS)
                .with_context("e_max", e_max)
                .with_context("l_max", l_max)
                .with_hint("lower e_max or l_max"),
        ));
    }
    let radius = reach as i64;
    let threshold = slice.pair_threshold();
    let n_p = setup.volume.n_p;
    let (alpha, beta) = (setup.scheme.alpha(), setup.scheme.beta());

    let mut momenta = Vec::new();
    for nx in -radius..=radius {
        for ny in -radius..=radius {
            for nz in -radius..=radius {
                let n = [nx, ny, nz];
                let omega = relativistic_energy(m_s, n, l_max);
                // no pair energy left at the ceiling
                if omega >= e_max {
                    continue;
                }
                let sigma = pair_invariant_mass_sq(e_max, omega, lattice_sub(n_p, n), l_max);
                if cutoff_argument(sigma, threshold, alpha, beta) > 0.0 {
                    momenta.push(n);
                }
            }
        }
    }
    momenta.sort_by_key(|n| (lattice_norm_sq(*n), *n));
    Ok(momenta)
}
