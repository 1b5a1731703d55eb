use fvqc_core::{ErrorInfo, QcError};
use fvqc_kernels::KernelScalar;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// A matrix cell whose kernel denominator vanished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingularCell {
    /// Row index, relative to the evaluated block.
    pub row: usize,
    /// Column index, relative to the evaluated block.
    pub col: usize,
    /// Diagnostic from the kernel.
    pub info: ErrorInfo,
}

/// Evaluated G matrix. Singular cells hold NaN and are listed in
/// [`GMatrix::singular_cells`] in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct GMatrix<T: KernelScalar> {
    values: DMatrix<T>,
    singular: Vec<SingularCell>,
}

impl<T: KernelScalar> GMatrix<T> {
    pub(crate) fn new(values: DMatrix<T>, singular: Vec<SingularCell>) -> Self {
        Self { values, singular }
    }

    /// Matrix values.
    pub fn values(&self) -> &DMatrix<T> {
        &self.values
    }

    /// Consumes the wrapper, keeping flagged cells as NaN.
    pub fn into_values(self) -> DMatrix<T> {
        self.values
    }

    /// Cells flagged during evaluation.
    pub fn singular_cells(&self) -> &[SingularCell] {
        &self.singular
    }

    /// True when any cell was flagged.
    pub fn has_singularities(&self) -> bool {
        !self.singular.is_empty()
    }

    /// Returns the values, or the first flagged cell as a `Singularity` error.
    pub fn into_result(self) -> Result<DMatrix<T>, QcError> {
        match self.singular.into_iter().next() {
            Some(cell) => Err(QcError::Singularity(
                cell.info
                    .with_context("row", cell.row)
                    .with_context("col", cell.col),
            )),
            None => Ok(self.values),
        }
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Value of one cell, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.values.get((row, col)).copied()
    }
}
