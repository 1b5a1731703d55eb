use std::f64::consts::PI;

use fvqc_core::{ErrorInfo, HarmonicConvention, QcError};
use nalgebra::{Complex, Vector3};

/// Complex scalar used for hermitian complex-harmonic kernels.
pub type Complex64 = Complex<f64>;

fn invalid_quantum_numbers(ell: u32, mazi: i32) -> QcError {
    QcError::Config(
        ErrorInfo::new("invalid-quantum-numbers", "require |m| <= ell")
            .with_context("ell", ell)
            .with_context("mazi", mazi),
    )
}

/// Associated Legendre function `P_ℓ^m(x)` for `m >= 0`, with Condon-Shortley phase.
pub fn assoc_legendre(ell: u32, m: u32, x: f64) -> f64 {
    if m > ell {
        return 0.0;
    }
    let mut pmm = 1.0;
    if m > 0 {
        let somx2 = ((1.0 - x) * (1.0 + x)).max(0.0).sqrt();
        let mut fact = 1.0;
        for _ in 0..m {
            pmm *= -fact * somx2;
            fact += 2.0;
        }
    }
    if ell == m {
        return pmm;
    }
    let mut pmmp1 = x * (2 * m + 1) as f64 * pmm;
    if ell == m + 1 {
        return pmmp1;
    }
    let mut pll = 0.0;
    for l in (m + 2)..=ell {
        pll = ((2 * l - 1) as f64 * x * pmmp1 - (l + m - 1) as f64 * pmm) / (l - m) as f64;
        pmm = pmmp1;
        pmmp1 = pll;
    }
    pll
}

/// `sqrt((ℓ-m)!/(ℓ+m)!)` computed without overflowing factorials.
fn factorial_ratio_sqrt(ell: u32, m: u32) -> f64 {
    let mut ratio = 1.0;
    for k in (ell - m + 1)..=(ell + m) {
        ratio /= k as f64;
    }
    ratio.sqrt()
}

/// `sqrt(4π) |v|^ℓ Y_ℓ^m(v̂)` for `m >= 0`.
fn solid_harmonic_nonneg(ell: u32, m: u32, v: &Vector3<f64>) -> Complex64 {
    let r = v.norm();
    if r == 0.0 {
        return if ell == 0 {
            Complex64::new(1.0, 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        };
    }
    let cos_theta = (v.z / r).clamp(-1.0, 1.0);
    let phi = v.y.atan2(v.x);
    let norm = ((2 * ell + 1) as f64).sqrt() * factorial_ratio_sqrt(ell, m);
    let radial = r.powi(ell as i32) * norm * assoc_legendre(ell, m, cos_theta);
    let angle = m as f64 * phi;
    Complex64::new(radial * angle.cos(), radial * angle.sin())
}

/// Complex solid harmonic `𝒴_ℓm(v) = sqrt(4π) |v|^ℓ Y_ℓm(v̂)`, so that `𝒴_00 = 1`.
pub fn complex_solid_harmonic(ell: u32, mazi: i32, v: &Vector3<f64>) -> Result<Complex64, QcError> {
    if mazi.unsigned_abs() > ell {
        return Err(invalid_quantum_numbers(ell, mazi));
    }
    let m = mazi.unsigned_abs();
    let value = solid_harmonic_nonneg(ell, m, v);
    if mazi >= 0 {
        Ok(value)
    } else if m % 2 == 0 {
        Ok(value.conj())
    } else {
        Ok(-value.conj())
    }
}

/// Real solid harmonic with the same normalisation; `𝒴_1,(1,-1,0)` are
/// `sqrt(3) (x, y, z)`.
pub fn real_solid_harmonic(ell: u32, mazi: i32, v: &Vector3<f64>) -> Result<f64, QcError> {
    if mazi.unsigned_abs() > ell {
        return Err(invalid_quantum_numbers(ell, mazi));
    }
    let m = mazi.unsigned_abs();
    let value = solid_harmonic_nonneg(ell, m, v);
    let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
    Ok(match mazi {
        0 => value.re,
        mazi if mazi > 0 => std::f64::consts::SQRT_2 * sign * value.re,
        _ => std::f64::consts::SQRT_2 * sign * value.im,
    })
}

/// Standard (unit-sphere normalised) spherical harmonic `Y_ℓm(v̂)`.
pub fn spherical_harmonic(ell: u32, mazi: i32, v: &Vector3<f64>) -> Result<Complex64, QcError> {
    let r = v.norm();
    let unit = if r == 0.0 { *v } else { v / r };
    Ok(complex_solid_harmonic(ell, mazi, &unit)? / (4.0 * PI).sqrt())
}

/// Scalar type a G matrix can be assembled in.
pub trait KernelScalar:
    nalgebra::Scalar + Copy + Send + Sync + std::ops::Mul<Output = Self>
{
    /// Lifts a real number.
    fn from_real(value: f64) -> Self;

    /// Multiplies by a real factor.
    fn scaled(self, factor: f64) -> Self;

    /// Complex conjugate; identity for reals.
    fn conjugate(self) -> Self;

    /// Value stored in cells flagged as singular.
    fn flagged() -> Self;

    /// Whether kernels in this scalar type can use the given convention.
    fn supports(convention: HarmonicConvention) -> bool;

    /// Solid harmonic in the given convention.
    fn solid_harmonic(
        convention: HarmonicConvention,
        ell: u32,
        mazi: i32,
        v: &Vector3<f64>,
    ) -> Result<Self, QcError>;
}

impl KernelScalar for f64 {
    fn from_real(value: f64) -> Self {
        value
    }

    fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    fn conjugate(self) -> Self {
        self
    }

    fn flagged() -> Self {
        f64::NAN
    }

    fn supports(convention: HarmonicConvention) -> bool {
        !convention.is_complex()
    }

    fn solid_harmonic(
        convention: HarmonicConvention,
        ell: u32,
        mazi: i32,
        v: &Vector3<f64>,
    ) -> Result<Self, QcError> {
        match convention {
            HarmonicConvention::HermitianReal => real_solid_harmonic(ell, mazi, v),
            HarmonicConvention::HermitianComplex => Err(QcError::Config(
                ErrorInfo::new(
                    "complex-convention-real-kernel",
                    "complex harmonics cannot be evaluated into a real kernel",
                )
                .with_hint("use the complex evaluation entry points"),
            )),
        }
    }
}

impl KernelScalar for Complex64 {
    fn from_real(value: f64) -> Self {
        Complex64::new(value, 0.0)
    }

    fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    fn conjugate(self) -> Self {
        self.conj()
    }

    fn flagged() -> Self {
        Complex64::new(f64::NAN, f64::NAN)
    }

    fn supports(_convention: HarmonicConvention) -> bool {
        true
    }

    fn solid_harmonic(
        convention: HarmonicConvention,
        ell: u32,
        mazi: i32,
        v: &Vector3<f64>,
    ) -> Result<Self, QcError> {
        match convention {
            HarmonicConvention::HermitianReal => {
                real_solid_harmonic(ell, mazi, v).map(|re| Complex64::new(re, 0.0))
            }
            HarmonicConvention::HermitianComplex => complex_solid_harmonic(ell, mazi, v),
        }
    }
}
