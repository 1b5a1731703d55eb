use fvqc_core::{ErrorInfo, QcError};
use nalgebra::Vector3;

/// 2π, the lattice momentum quantum in units of 1/L.
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Converts an integer lattice vector to a physical momentum `2π n / L`.
#[inline]
pub fn lattice_momentum(n: [i64; 3], length: f64) -> Vector3<f64> {
    let kappa = TWO_PI / length;
    Vector3::new(n[0] as f64, n[1] as f64, n[2] as f64) * kappa
}

/// Squared norm of an integer lattice vector.
#[inline]
pub fn lattice_norm_sq(n: [i64; 3]) -> i64 {
    n[0] * n[0] + n[1] * n[1] + n[2] * n[2]
}

/// Component-wise difference of two lattice vectors.
#[inline]
pub fn lattice_sub(a: [i64; 3], b: [i64; 3]) -> [i64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// On-shell energy `sqrt(m² + (2π/L)² |n|²)` of a lattice momentum mode.
#[inline]
pub fn relativistic_energy(mass: f64, n: [i64; 3], length: f64) -> f64 {
    let kappa = TWO_PI / length;
    (mass * mass + kappa * kappa * lattice_norm_sq(n) as f64).sqrt()
}

/// Invariant mass squared of the pair recoiling against a spectator.
///
/// `pair_n` is the pair's total lattice momentum, `nP - k`.
#[inline]
pub fn pair_invariant_mass_sq(energy: f64, omega_spectator: f64, pair_n: [i64; 3], length: f64) -> f64 {
    let kappa = TWO_PI / length;
    let pair_energy = energy - omega_spectator;
    pair_energy * pair_energy - kappa * kappa * lattice_norm_sq(pair_n) as f64
}

/// Källén triangle function λ(a, b, c).
#[inline]
pub fn kallen(a: f64, b: f64, c: f64) -> f64 {
    a * a + b * b + c * c - 2.0 * (a * b + b * c + c * a)
}

/// Squared relative momentum of a pair with invariant mass squared `sigma`.
///
/// Negative below threshold. Returns NaN for `sigma == 0`.
#[inline]
pub fn q_star_sq(sigma: f64, m1: f64, m2: f64) -> f64 {
    let sum = m1 + m2;
    let diff = m1 - m2;
    (sigma - sum * sum) * (sigma - diff * diff) / (4.0 * sigma)
}

/// Boosts `momentum` (energy `omega`) into the rest frame of a pair with
/// four-momentum `(pair_energy, pair_momentum)`.
pub fn boost_to_pair_frame(
    momentum: &Vector3<f64>,
    omega: f64,
    pair_energy: f64,
    pair_momentum: &Vector3<f64>,
) -> Result<Vector3<f64>, QcError> {
    let pair_sq = pair_momentum.norm_squared();
    let sigma = pair_energy * pair_energy - pair_sq;
    if sigma.is_nan() || sigma <= 0.0 || pair_energy <= 0.0 {
        return Err(QcError::Singularity(
            ErrorInfo::new(
                "pair-frame-undefined",
                "pair four-momentum is not timelike and future-directed",
            )
            .with_context("pair_energy", pair_energy)
            .with_context("sigma", sigma),
        ));
    }
    if pair_sq == 0.0 {
        return Ok(*momentum);
    }
    let root = sigma.sqrt();
    let gamma = pair_energy / root;
    let along = momentum.dot(pair_momentum) / pair_sq;
    Ok(momentum + pair_momentum * ((gamma - 1.0) * along - omega / root))
}
