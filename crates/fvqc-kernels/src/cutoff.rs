use fvqc_core::CutoffStyle;

/// Smooth cutoff `J(z)`: 0 for z ≤ 0, 1 for z ≥ 1, and
/// `exp(-(1/z) exp(-1/(1-z)))` in between.
///
/// Every derivative vanishes at both edges, so the function is C∞.
#[allow(non_snake_case)]
pub fn J_slow(z: f64) -> f64 {
    if z <= 0.0 {
        0.0
    } else if z >= 1.0 {
        1.0
    } else {
        (-(1.0 / z) * (-1.0 / (1.0 - z)).exp()).exp()
    }
}

/// Snake-case alias of [`J_slow`].
#[inline]
pub fn j_slow(z: f64) -> f64 {
    J_slow(z)
}

/// Batch form of [`J_slow`].
pub fn j_values(z: &[f64]) -> Vec<f64> {
    z.iter().copied().map(J_slow).collect()
}

/// Normalised cutoff argument for a pair of invariant mass squared `sigma`
/// and threshold `threshold`.
///
/// With `x = sigma / threshold²`, returns `(x - (1+α)/4) / ((3-α)/4) - β`.
/// For α = -1 and β = 0 this is exactly `x`.
#[inline]
pub fn cutoff_argument(sigma: f64, threshold: f64, alpha: f64, beta: f64) -> f64 {
    let x = sigma / (threshold * threshold);
    (x - (1.0 + alpha) / 4.0) / ((3.0 - alpha) / 4.0) - beta
}

/// Cutoff factor `H` of one spectator leg.
pub fn cutoff_h(sigma: f64, threshold: f64, alpha: f64, beta: f64, style: CutoffStyle) -> f64 {
    let z = cutoff_argument(sigma, threshold, alpha, beta);
    match style {
        CutoffStyle::Smooth => J_slow(z),
        CutoffStyle::Hard => {
            if z > 0.0 {
                1.0
            } else {
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_exact() {
        assert_eq!(J_slow(-0.3), 0.0);
        assert_eq!(J_slow(0.0), 0.0);
        assert_eq!(J_slow(1.0), 1.0);
        assert_eq!(J_slow(4.2), 1.0);
        assert!(J_slow(1e-3) < 1e-100);
        assert!(1.0 - J_slow(1.0 - 1e-3) < 1e-100);
    }

    #[test]
    fn midpoint_matches_closed_form() {
        let expected = (-2.0 * (-2.0f64).exp()).exp();
        assert!((J_slow(0.5) - expected).abs() < 1e-15);
    }

    #[test]
    fn argument_reduces_for_default_shape() {
        assert_eq!(cutoff_argument(2.5, 2.0, -1.0, 0.0), 2.5 / 4.0);
        assert_eq!(cutoff_h(0.5, 1.0, -1.0, 0.0, CutoffStyle::Hard), 1.0);
        assert_eq!(cutoff_h(-0.5, 1.0, -1.0, 0.0, CutoffStyle::Hard), 0.0);
    }
}
