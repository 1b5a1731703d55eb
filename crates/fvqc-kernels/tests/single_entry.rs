use fvqc_core::{CutoffStyle, HarmonicConvention, PoleStyle};
use fvqc_kernels::{
    g_single_entry, g_single_entry_complex, lattice_norm_sq, lattice_sub, relativistic_energy,
    Complex64, GEntryInput, J_slow, KernelOptions, TWO_PI,
};

const EPSILON: f64 = 1.0e-15;

fn modulus(z: Complex64) -> f64 {
    z.re.hypot(z.im)
}

fn entry(energy: f64, n_p: [i64; 3], length: f64, k_row: [i64; 3], k_col: [i64; 3], m: f64) -> GEntryInput {
    GEntryInput {
        energy,
        n_p,
        length,
        k_row,
        k_col,
        ell_row: 0,
        mazi_row: 0,
        ell_col: 0,
        mazi_col: 0,
        masses: [m; 3],
    }
}

#[test]
fn relativistic_pole_at_rest() {
    let (energy, length, m) = (4.0, 5.0, 1.0);
    let input = entry(energy, [0, 0, 0], length, [0, 0, 0], [0, 0, 0], m);
    let g = g_single_entry(&input, &KernelOptions::default()).unwrap();
    let smpl = 1.0 / (2.0 * m * length.powi(3));
    let covpole = 1.0 / ((energy - 2.0 * m).powi(2) - m * m);
    assert!((g - smpl * smpl * covpole).abs() < EPSILON);
}

#[test]
fn original_pole_at_rest() {
    let (energy, length, m) = (4.0, 5.0, 1.0);
    let input = entry(energy, [0, 0, 0], length, [0, 0, 0], [0, 0, 0], m);
    let opts = KernelOptions::default().with_pole(PoleStyle::Original);
    let g = g_single_entry(&input, &opts).unwrap();
    let smpl = 1.0 / (2.0 * m * length.powi(3));
    let smpl_nv = 1.0 / (2.0 * m);
    let pole = 1.0 / (energy - 3.0 * m);
    assert!((g - smpl * smpl * pole * smpl_nv).abs() < EPSILON);
}

struct MovingFrame {
    input: GEntryInput,
    smpl_a: f64,
    smpl_b: f64,
    covpole: f64,
    e2_row_sq: f64,
    e2_col_sq: f64,
}

fn moving_frame(energy: f64, m: f64) -> MovingFrame {
    let n_p = [0, 0, 1];
    let length = 10.0;
    let k_row = [0, 1, 1];
    let k_col = [1, 0, 0];
    let input = entry(energy, n_p, length, k_row, k_col, m);
    let om_1 = relativistic_energy(m, k_row, length);
    let om_2 = relativistic_energy(m, k_col, length);
    let om_3 = relativistic_energy(m, lattice_sub(lattice_sub(n_p, k_row), k_col), length);
    let smpl_a = 1.0 / (2.0 * om_1 * length.powi(3));
    let smpl_b = 1.0 / (2.0 * om_2 * length.powi(3));
    let covpole = 1.0 / ((energy - om_1 - om_2).powi(2) - om_3 * om_3);
    let kappa_sq = (TWO_PI / length).powi(2);
    let e2_row_sq = (energy - om_1).powi(2) - kappa_sq * lattice_norm_sq(lattice_sub(n_p, k_row)) as f64;
    let e2_col_sq = (energy - om_2).powi(2) - kappa_sq * lattice_norm_sq(lattice_sub(n_p, k_col)) as f64;
    MovingFrame {
        input,
        smpl_a,
        smpl_b,
        covpole,
        e2_row_sq,
        e2_col_sq,
    }
}

fn moving_frame_parts(energy: f64, m: f64) -> (GEntryInput, f64, f64, f64, f64) {
    let frame = moving_frame(energy, m);
    let threshold_sq = (2.0 * m).powi(2);
    let hh = J_slow(frame.e2_row_sq / threshold_sq) * J_slow(frame.e2_col_sq / threshold_sq);
    (frame.input, frame.smpl_a, frame.smpl_b, frame.covpole, hh)
}

#[test]
fn moving_frame_above_threshold() {
    let (input, smpl_a, smpl_b, covpole, hh) = moving_frame_parts(6.0, 1.5);
    assert_eq!(hh, 1.0);
    let g = g_single_entry(&input, &KernelOptions::default()).unwrap();
    assert!((g - smpl_a * smpl_b * covpole).abs() < EPSILON);
}

#[test]
fn moving_frame_below_threshold_engages_cutoff() {
    let (input, smpl_a, smpl_b, covpole, hh) = moving_frame_parts(3.0, 1.0);
    assert!(hh > 0.0 && hh < 1.0);
    let g = g_single_entry(&input, &KernelOptions::default()).unwrap();
    assert!((g - smpl_a * smpl_b * covpole * hh).abs() < EPSILON);
}

#[test]
fn complex_entry_is_hermitian_under_exchange() {
    let mut forward = entry(5.3, [0, 1, 1], 6.5, [1, 0, 0], [0, 0, 1], 1.0);
    forward.ell_row = 1;
    forward.mazi_row = 1;
    forward.ell_col = 2;
    forward.mazi_col = -1;
    let backward = GEntryInput {
        k_row: forward.k_col,
        k_col: forward.k_row,
        ell_row: forward.ell_col,
        mazi_row: forward.mazi_col,
        ell_col: forward.ell_row,
        mazi_col: forward.mazi_row,
        ..forward
    };
    let opts = KernelOptions::default().with_harmonics(HarmonicConvention::HermitianComplex);
    let a = g_single_entry_complex(&forward, &opts).unwrap();
    let b = g_single_entry_complex(&backward, &opts).unwrap();
    assert!(modulus(a - b.conj()) <= 1e-12 * modulus(a).max(1e-30));
}

#[test]
fn real_entry_is_symmetric_under_exchange() {
    let mut forward = entry(5.3, [0, 1, 1], 6.5, [1, 0, 0], [0, 0, 1], 1.0);
    forward.ell_row = 1;
    forward.mazi_row = -1;
    let backward = GEntryInput {
        k_row: forward.k_col,
        k_col: forward.k_row,
        ell_row: forward.ell_col,
        mazi_row: forward.mazi_col,
        ell_col: forward.ell_row,
        mazi_col: forward.mazi_row,
        ..forward
    };
    let opts = KernelOptions::default();
    let a = g_single_entry(&forward, &opts).unwrap();
    let b = g_single_entry(&backward, &opts).unwrap();
    assert!((a - b).abs() <= 1e-12 * a.abs().max(1e-30));
}

#[test]
fn hard_cutoff_drops_the_smooth_suppression() {
    let frame = moving_frame(3.0, 1.0);
    assert!(frame.e2_row_sq > 0.0 && frame.e2_col_sq > 0.0);
    let opts = KernelOptions {
        cutoff: CutoffStyle::Hard,
        ..KernelOptions::default()
    };
    let g = g_single_entry(&frame.input, &opts).expect("hard cutoff entry");
    let expected = frame.smpl_a * frame.smpl_b * frame.covpole;
    assert!((g - expected).abs() <= EPSILON * expected.abs().max(1.0));
}

#[test]
fn shifted_cutoff_shape_rescales_both_legs() {
    let m = 1.0;
    let frame = moving_frame(3.0, m);
    let (alpha, beta) = (0.5, 0.1);
    let opts = KernelOptions {
        alpha,
        beta,
        ..KernelOptions::default()
    };
    let threshold_sq = (2.0 * m).powi(2);
    let z = |e2_sq: f64| (e2_sq / threshold_sq - (1.0 + alpha) / 4.0) / ((3.0 - alpha) / 4.0) - beta;
    let hh = J_slow(z(frame.e2_row_sq)) * J_slow(z(frame.e2_col_sq));
    let g = g_single_entry(&frame.input, &opts).expect("shifted cutoff entry");
    let expected = frame.smpl_a * frame.smpl_b * frame.covpole * hh;
    assert!((g - expected).abs() <= EPSILON * expected.abs().max(1e-300) + EPSILON);
    let default = g_single_entry(&frame.input, &KernelOptions::default()).expect("default entry");
    assert_ne!(g, default);
}
