#![deny(missing_docs)]
#![doc = "Pure analytic kernel functions for finite-volume three-body G matrices: on-shell energies, cutoff functions, solid harmonics and single matrix elements. Every function here is reentrant and free of shared state."]

/// Cutoff (`J`, `H`) functions.
pub mod cutoff;
/// On-shell energies, pair invariants and boosts.
pub mod energy;
/// Single G matrix elements.
pub mod entry;
/// Real and complex solid harmonics.
pub mod harmonics;

pub use cutoff::{cutoff_argument, cutoff_h, j_slow, j_values, J_slow};
pub use energy::{
    boost_to_pair_frame, kallen, lattice_momentum, lattice_norm_sq, lattice_sub,
    pair_invariant_mass_sq, q_star_sq, relativistic_energy, TWO_PI,
};
pub use entry::{
    g_entry, g_single_entry, g_single_entry_complex, GEntryInput, KernelOptions,
    SINGULAR_TOLERANCE,
};
pub use harmonics::{
    assoc_legendre, complex_solid_harmonic, real_solid_harmonic, spherical_harmonic, Complex64,
    KernelScalar,
};
