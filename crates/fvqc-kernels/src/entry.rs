use fvqc_core::{
    CutoffStyle, ErrorInfo, FiniteVolumeSetup, HarmonicConvention, PoleStyle, QcError,
    ThreeBodyInteractionScheme,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::cutoff::cutoff_h;
use crate::energy::{
    boost_to_pair_frame, lattice_momentum, lattice_sub, pair_invariant_mass_sq, q_star_sq,
    relativistic_energy,
};
use crate::harmonics::{Complex64, KernelScalar};

/// Relative tolerance below which a denominator counts as zero.
pub const SINGULAR_TOLERANCE: f64 = 8.0 * f64::EPSILON;

/// Arguments of a single G matrix element.
///
/// `masses` are ordered (row spectator, column spectator, exchanged particle).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GEntryInput {
    /// Total energy in the moving frame.
    pub energy: f64,
    /// Total momentum in lattice units.
    pub n_p: [i64; 3],
    /// Box length.
    pub length: f64,
    /// Row spectator momentum in lattice units.
    pub k_row: [i64; 3],
    /// Column spectator momentum in lattice units.
    pub k_col: [i64; 3],
    /// Row pair orbital angular momentum.
    pub ell_row: u32,
    /// Row pair magnetic quantum number.
    pub mazi_row: i32,
    /// Column pair orbital angular momentum.
    pub ell_col: u32,
    /// Column pair magnetic quantum number.
    pub mazi_col: i32,
    /// (row spectator, column spectator, exchanged) masses.
    pub masses: [f64; 3],
}

/// Style selectors and cutoff-shape parameters applied to every entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelOptions {
    /// Energy denominator style.
    pub pole: PoleStyle,
    /// Harmonic convention.
    pub harmonics: HarmonicConvention,
    /// Cutoff function shape.
    pub cutoff: CutoffStyle,
    /// Cutoff lower-edge parameter.
    pub alpha: f64,
    /// Cutoff argument shift.
    pub beta: f64,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self::from_scheme(
            &ThreeBodyInteractionScheme::default(),
            &FiniteVolumeSetup::default(),
        )
    }
}

impl KernelOptions {
    /// Collects the kernel-relevant choices from the configuration objects.
    pub fn from_scheme(scheme: &ThreeBodyInteractionScheme, volume: &FiniteVolumeSetup) -> Self {
        Self {
            pole: scheme.pole(),
            harmonics: scheme.harmonics(),
            cutoff: volume.cutoff,
            alpha: scheme.alpha(),
            beta: scheme.beta(),
        }
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
}

fn singular(code: &str, message: &str, input: &GEntryInput, denominator: f64) -> QcError {
    QcError::Singularity(
        ErrorInfo::new(code, message)
            .with_context("energy", input.energy)
            .with_context("length", input.length)
            .with_context("k_row", format!("{:?}", input.k_row))
            .with_context("k_col", format!("{:?}", input.k_col))
            .with_context("denominator", denominator)
            .with_hint("shift the energy or box length off the on-shell point"),
    )
}

fn is_negligible(value: f64, scale: f64) -> bool {
    value.is_nan() || value.abs() <= SINGULAR_TOLERANCE * scale
}

/// Cutoff factor of one leg; zero unless the pair carries positive energy.
fn leg_cutoff(pair_energy: f64, sigma: f64, threshold: f64, opts: &KernelOptions) -> f64 {
    if pair_energy <= 0.0 {
        return 0.0;
    }
    cutoff_h(sigma, threshold, opts.alpha, opts.beta, opts.cutoff)
}

/// Pair rest frame data needed for the angular factor of one leg.
struct PairFrame {
    pair_energy: f64,
    pair_momentum: Vector3<f64>,
    sigma: f64,
    pair_masses: [f64; 2],
}

fn angular_factor<T: KernelScalar>(
    convention: HarmonicConvention,
    ell: u32,
    mazi: i32,
    frame: &PairFrame,
    partner: &Vector3<f64>,
    partner_omega: f64,
    input: &GEntryInput,
) -> Result<T, QcError> {
    if ell == 0 {
        return T::solid_harmonic(convention, 0, mazi, partner);
    }
    let boosted = boost_to_pair_frame(
        partner,
        partner_omega,
        frame.pair_energy,
        &frame.pair_momentum,
    )?;
    let qsq = q_star_sq(frame.sigma, frame.pair_masses[0], frame.pair_masses[1]);
    let scale = frame.sigma.abs() + frame.pair_masses[0].powi(2) + frame.pair_masses[1].powi(2);
    if is_negligible(qsq, scale) {
        return Err(singular(
            "barrier-denominator",
            "pair relative momentum vanishes for a nonzero orbital wave",
            input,
            qsq,
        ));
    }
    let barrier = qsq.abs().powf(ell as f64 / 2.0);
    let harmonic = T::solid_harmonic(convention, ell, mazi, &boosted)?;
    Ok(harmonic.scaled(1.0 / barrier))
}

/// Evaluates one G matrix element in the scalar type `T`.
pub fn g_entry<T: KernelScalar>(input: &GEntryInput, opts: &KernelOptions) -> Result<T, QcError> {
    let GEntryInput {
        energy,
        n_p,
        length,
        k_row,
        k_col,
        ..
    } = *input;
    let [m_row, m_col, m_ex] = input.masses;
    if !T::supports(opts.harmonics) {
        return Err(QcError::Config(
            ErrorInfo::new(
                "complex-convention-real-kernel",
                "complex harmonics cannot be evaluated into a real kernel",
            )
            .with_context("harmonics", opts.harmonics),
        ));
    }
    if input.mazi_row.unsigned_abs() > input.ell_row || input.mazi_col.unsigned_abs() > input.ell_col
    {
        return Err(QcError::Config(
            ErrorInfo::new("invalid-quantum-numbers", "require |m| <= ell")
                .with_context("ell_row", input.ell_row)
                .with_context("mazi_row", input.mazi_row)
                .with_context("ell_col", input.ell_col)
                .with_context("mazi_col", input.mazi_col),
        ));
    }

    let omega_row = relativistic_energy(m_row, k_row, length);
    let omega_col = relativistic_energy(m_col, k_col, length);
    let n_ex = lattice_sub(lattice_sub(n_p, k_row), k_col);
    let omega_ex = relativistic_energy(m_ex, n_ex, length);

    let pair_row_n = lattice_sub(n_p, k_row);
    let pair_col_n = lattice_sub(n_p, k_col);
    let sigma_row = pair_invariant_mass_sq(energy, omega_row, pair_row_n, length);
    let sigma_col = pair_invariant_mass_sq(energy, omega_col, pair_col_n, length);
    let h_row = leg_cutoff(energy - omega_row, sigma_row, m_col + m_ex, opts);
    let h_col = leg_cutoff(energy - omega_col, sigma_col, m_row + m_ex, opts);
    let hh = h_row * h_col;
    if hh == 0.0 {
        return Ok(T::from_real(0.0));
    }

    let pole = match opts.pole {
        PoleStyle::Relativistic => {
            let remainder = energy - omega_row - omega_col;
            let denominator = remainder * remainder - omega_ex * omega_ex;
            let scale = remainder * remainder + omega_ex * omega_ex;
            if is_negligible(denominator, scale) {
                return Err(singular(
                    "pole-denominator",
                    "covariant pole denominator vanishes",
                    input,
                    denominator,
                ));
            }
            1.0 / denominator
        }
        PoleStyle::Original => {
            let denominator = energy - omega_row - omega_col - omega_ex;
            let scale = energy.abs() + omega_row + omega_col + omega_ex;
            if is_negligible(denominator, scale) {
                return Err(singular(
                    "pole-denominator",
                    "time-ordered pole denominator vanishes",
                    input,
                    denominator,
                ));
            }
            1.0 / denominator * (1.0 / (2.0 * omega_ex))
        }
    };

    let volume = length * length * length;
    let norm_row = 1.0 / (2.0 * omega_row * volume);
    let norm_col = 1.0 / (2.0 * omega_col * volume);

    let k_vec = lattice_momentum(k_row, length);
    let p_vec = lattice_momentum(k_col, length);
    let row_frame = PairFrame {
        pair_energy: energy - omega_row,
        pair_momentum: lattice_momentum(pair_row_n, length),
        sigma: sigma_row,
        pair_masses: [m_col, m_ex],
    };
    let col_frame = PairFrame {
        pair_energy: energy - omega_col,
        pair_momentum: lattice_momentum(pair_col_n, length),
        sigma: sigma_col,
        pair_masses: [m_row, m_ex],
    };
    let row_harmonic: T = angular_factor(
        opts.harmonics,
        input.ell_row,
        input.mazi_row,
        &row_frame,
        &p_vec,
        omega_col,
        input,
    )?;
    let col_harmonic: T = angular_factor(
        opts.harmonics,
        input.ell_col,
        input.mazi_col,
        &col_frame,
        &k_vec,
        omega_row,
        input,
    )?;

    Ok((row_harmonic * col_harmonic.conjugate()).scaled(norm_row * norm_col * pole * hh))
}

/// Real-valued G matrix element; requires the real harmonic convention.
pub fn g_single_entry(input: &GEntryInput, opts: &KernelOptions) -> Result<f64, QcError> {
    g_entry::<f64>(input, opts)
}

/// Complex-valued G matrix element; accepts either harmonic convention.
pub fn g_single_entry_complex(
    input: &GEntryInput,
    opts: &KernelOptions,
) -> Result<Complex64, QcError> {
    g_entry::<Complex64>(input, opts)
}
