use std::ops::Range;

use fvqc_core::{ErrorInfo, QcError};
use fvqc_index::{BasisElement, QCIndexSpace};
use fvqc_kernels::{g_entry, Complex64, GEntryInput, KernelOptions, KernelScalar};
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::matrix::{GMatrix, SingularCell};

/// Relative slack allowed when comparing a query against the build ceilings.
pub const ENVELOPE_TOLERANCE: f64 = 1.0e-12;

fn envelope_info(code: &str, message: &str, energy: f64, length: f64) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("energy", energy)
        .with_context("length", length)
}

/// Kernel-matrix evaluator over a built index space.
///
/// Row and column order is exactly [`QCIndexSpace::elements`]. Every cell is
/// the single-entry kernel of its (row, column) basis pair scaled by the
/// channel template weight and the cross-channel block factor; cells with a
/// zero weight are not evaluated and hold zero.
#[derive(Debug, Clone, Copy)]
pub struct G<'a> {
    space: &'a QCIndexSpace,
    opts: KernelOptions,
    fail_fast: bool,
}

struct RowOutput<T> {
    values: Vec<T>,
    singular: Vec<SingularCell>,
}

impl<'a> G<'a> {
    /// Evaluator borrowing `space`; singular cells are flagged, not fatal.
    pub fn new(space: &'a QCIndexSpace) -> Self {
        Self {
            space,
            opts: space.kernel_options(),
            fail_fast: false,
        }
    }

    /// Abort on the first singular cell instead of flagging it.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Index space the evaluator reads from.
    pub fn index_space(&self) -> &'a QCIndexSpace {
        self.space
    }

    /// Full real matrix. Requires a real harmonic convention.
    pub fn get_value(&self, energy: f64, length: f64) -> Result<GMatrix<f64>, QcError> {
        self.require_real()?;
        let full = 0..self.space.len();
        self.assemble(energy, length, full.clone(), full)
    }

    /// Full complex matrix; valid for either harmonic convention.
    pub fn get_value_complex(
        &self,
        energy: f64,
        length: f64,
    ) -> Result<GMatrix<Complex64>, QcError> {
        let full = 0..self.space.len();
        self.assemble(energy, length, full.clone(), full)
    }

    /// Real block coupling channel `row_channel` to channel `col_channel`.
    pub fn get_block(
        &self,
        energy: f64,
        length: f64,
        row_channel: usize,
        col_channel: usize,
    ) -> Result<GMatrix<f64>, QcError> {
        self.require_real()?;
        let rows = self.space.channel_range(row_channel)?;
        let cols = self.space.channel_range(col_channel)?;
        self.assemble(energy, length, rows, cols)
    }

    /// Complex block coupling channel `row_channel` to channel `col_channel`.
    pub fn get_block_complex(
        &self,
        energy: f64,
        length: f64,
        row_channel: usize,
        col_channel: usize,
    ) -> Result<GMatrix<Complex64>, QcError> {
        let rows = self.space.channel_range(row_channel)?;
        let cols = self.space.channel_range(col_channel)?;
        self.assemble(energy, length, rows, cols)
    }

    /// Template weight times cross-channel factor for a basis pair.
    pub fn weight(&self, row: &BasisElement, col: &BasisElement) -> f64 {
        let setup = self.space.setup();
        let factor = setup
            .scheme
            .cross_channel()
            .block_factor(row.channel, col.channel);
        if factor == 0.0 {
            return 0.0;
        }
        factor
            * setup
                .channels
                .g_weight(row.channel, col.channel, row.slice, col.slice)
    }

    /// Kernel arguments for a basis pair at `(energy, length)`.
    pub fn entry_input(
        &self,
        energy: f64,
        length: f64,
        row: &BasisElement,
        col: &BasisElement,
    ) -> Result<GEntryInput, QcError> {
        let channels = self.space.setup().channels.channels();
        let missing = || {
            QcError::Index(
                ErrorInfo::new("basis-channel-missing", "basis refers to an unknown channel")
                    .with_context("row_channel", row.channel)
                    .with_context("col_channel", col.channel),
            )
        };
        let row_slice = channels
            .get(row.channel)
            .and_then(|channel| channel.slices().get(row.slice))
            .ok_or_else(missing)?;
        let col_slice = channels
            .get(col.channel)
            .and_then(|channel| channel.slices().get(col.slice))
            .ok_or_else(missing)?;
        let exchanged = channels[row.channel]
            .exchanged_mass(&row_slice.flavor, &col_slice.flavor)
            .ok_or_else(|| {
                QcError::Config(
                    ErrorInfo::new(
                        "no-exchanged-particle",
                        "spectator pair leaves no particle to exchange",
                    )
                    .with_context("row_flavor", &row_slice.flavor)
                    .with_context("col_flavor", &col_slice.flavor),
                )
            })?;
        Ok(GEntryInput {
            energy,
            n_p: self.space.setup().volume.n_p,
            length,
            k_row: row.n,
            k_col: col.n,
            ell_row: row.ell,
            mazi_row: row.mazi,
            ell_col: col.ell,
            mazi_col: col.mazi,
            masses: [row_slice.spectator_mass, col_slice.spectator_mass, exchanged],
        })
    }

    fn require_real(&self) -> Result<(), QcError> {
        if self.opts.harmonics.is_complex() {
            return Err(QcError::Config(
                ErrorInfo::new(
                    "complex-convention-real-kernel",
                    "complex harmonics cannot be evaluated into a real matrix",
                )
                .with_hint("use get_value_complex"),
            ));
        }
        Ok(())
    }

    fn check_envelope(&self, energy: f64, length: f64) -> Result<(), QcError> {
        if !energy.is_finite() || energy <= 0.0 || !length.is_finite() || length <= 0.0 {
            return Err(QcError::Envelope(envelope_info(
                "non-positive-query",
                "energy and length must be positive and finite",
                energy,
                length,
            )));
        }
        let setup = self.space.setup();
        if energy > setup.e_max * (1.0 + ENVELOPE_TOLERANCE)
            || length > setup.l_max * (1.0 + ENVELOPE_TOLERANCE)
        {
            return Err(QcError::Envelope(
                envelope_info(
                    "outside-envelope",
                    "query exceeds the ceilings the index space was built for",
                    energy,
                    length,
                )
                .with_context("e_max", setup.e_max)
                .with_context("l_max", setup.l_max)
                .with_hint("rebuild the index space with larger ceilings"),
            ));
        }
        Ok(())
    }

    fn assemble<T: KernelScalar>(
        &self,
        energy: f64,
        length: f64,
        rows: Range<usize>,
        cols: Range<usize>,
    ) -> Result<GMatrix<T>, QcError> {
        self.check_envelope(energy, length)?;
        let elements = self.space.elements();
        let (nrows, ncols) = (rows.len(), cols.len());
        let row_start = rows.start;
        debug!(energy, length, nrows, ncols, "evaluating G");

        let outputs: Vec<RowOutput<T>> = rows
            .into_par_iter()
            .map(|row_idx| -> Result<RowOutput<T>, QcError> {
                let row = &elements[row_idx];
                let mut out = RowOutput {
                    values: Vec::with_capacity(ncols),
                    singular: Vec::new(),
                };
                for (col_offset, col) in elements[cols.clone()].iter().enumerate() {
                    let weight = self.weight(row, col);
                    if weight == 0.0 {
                        out.values.push(T::from_real(0.0));
                        continue;
                    }
                    let input = self.entry_input(energy, length, row, col)?;
                    match g_entry::<T>(&input, &self.opts) {
                        Ok(value) => out.values.push(value.scaled(weight)),
                        Err(QcError::Singularity(info)) if !self.fail_fast => {
                            out.values.push(T::flagged());
                            out.singular.push(SingularCell {
                                row: row_idx - row_start,
                                col: col_offset,
                                info,
                            });
                        }
                        Err(err) => return Err(err),
                    }
                }
                Ok(out)
            })
            .collect::<Result<_, _>>()?;

        let mut values = DMatrix::from_element(nrows, ncols, T::from_real(0.0));
        let mut singular = Vec::new();
        for (local_row, out) in outputs.into_iter().enumerate() {
            for (col, value) in out.values.into_iter().enumerate() {
                values[(local_row, col)] = value;
            }
            singular.extend(out.singular);
        }
        if !singular.is_empty() {
            warn!(
                energy,
                length,
                flagged = singular.len(),
                "G evaluation produced singular cells"
            );
        }
        Ok(GMatrix::new(values, singular))
    }
}
