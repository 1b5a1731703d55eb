use fvqc_core::{
    CrossChannelPolicy, FiniteVolumeSetup, FlavorChannel, FlavorChannelSpace, HarmonicConvention,
    QcError, ThreeBodyInteractionScheme,
};
use fvqc_g::G;
use fvqc_index::QCIndexSpace;
use fvqc_kernels::Complex64;

fn modulus(z: Complex64) -> f64 {
    z.re.hypot(z.im)
}

fn space_with(
    channel_count: usize,
    ell_max: u32,
    n_p: [i64; 3],
    scheme: ThreeBodyInteractionScheme,
) -> QCIndexSpace {
    let channels = (0..channel_count)
        .map(|_| FlavorChannel::new(3).expect("channel").with_ell_max(ell_max))
        .collect();
    QCIndexSpace::build(
        &FlavorChannelSpace::new(channels).expect("channels"),
        &FiniteVolumeSetup::new(n_p),
        &scheme,
        5.0,
        7.0,
    )
    .expect("build")
}

#[test]
fn repeated_queries_are_bitwise_identical() {
    let space = space_with(1, 1, [0, 0, 1], ThreeBodyInteractionScheme::default());
    let g = G::new(&space);
    let first = g.get_value(4.4, 6.1).expect("first");
    let second = g.get_value(4.4, 6.1).expect("second");
    let bits = |m: &fvqc_g::GMatrix<f64>| m.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));
    assert_eq!(first.singular_cells(), second.singular_cells());
}

#[test]
fn on_shell_cell_is_flagged_not_infinite() {
    // n = 0 for every leg: (E - 2m)^2 - m^2 vanishes at E = 3m.
    let space = space_with(1, 0, [0, 0, 0], ThreeBodyInteractionScheme::default());
    let g = G::new(&space).get_value(3.0, 6.0).expect("evaluate");
    assert!(g.has_singularities());
    let cell = g
        .singular_cells()
        .iter()
        .find(|cell| cell.row == 0 && cell.col == 0)
        .expect("origin cell flagged");
    assert_eq!(cell.info.code, "pole-denominator");
    assert!(g.get(0, 0).expect("cell").is_nan());
    for (idx, value) in g.values().iter().enumerate() {
        let (row, col) = (idx % g.nrows(), idx / g.nrows());
        let listed = g.singular_cells().iter().any(|c| c.row == row && c.col == col);
        assert_eq!(value.is_nan(), listed);
        assert!(!value.is_infinite());
    }
    assert!(matches!(g.into_result(), Err(QcError::Singularity(_))));

    let strict = G::new(&space).with_fail_fast(true).get_value(3.0, 6.0);
    assert!(matches!(strict, Err(QcError::Singularity(_))));
}

#[test]
fn queries_outside_the_envelope_are_rejected() {
    let space = space_with(1, 0, [0, 0, 0], ThreeBodyInteractionScheme::default());
    let g = G::new(&space);
    for (energy, length) in [(5.1, 6.0), (4.0, 7.5), (-1.0, 6.0), (4.0, 0.0), (f64::NAN, 6.0)] {
        let err = g.get_value(energy, length).unwrap_err();
        assert!(matches!(err, QcError::Envelope(_)), "({energy}, {length})");
    }
    assert!(g.get_value(5.0 * (1.0 + 1e-13), 7.0).is_ok());
}

#[test]
fn complex_convention_yields_hermitian_matrix() {
    let scheme =
        ThreeBodyInteractionScheme::default().with_harmonics(HarmonicConvention::HermitianComplex);
    let space = space_with(1, 1, [0, 0, 1], scheme);
    let g = G::new(&space);
    assert!(matches!(g.get_value(4.6, 6.3), Err(QcError::Config(_))));
    let matrix = g.get_value_complex(4.6, 6.3).expect("evaluate");
    let values = matrix.values();
    for i in 0..values.nrows() {
        for j in 0..values.ncols() {
            let (a, b) = (values[(i, j)], values[(j, i)].conj());
            if a.re.is_nan() {
                assert!(b.re.is_nan());
                continue;
            }
            assert!(modulus(a - b) <= 1e-12 * modulus(a).max(1e-300), "({i}, {j})");
        }
    }
}

#[test]
fn real_convention_yields_symmetric_matrix() {
    let space = space_with(1, 1, [0, 1, 1], ThreeBodyInteractionScheme::default());
    let values = G::new(&space).get_value(4.8, 6.6).expect("evaluate").into_values();
    for i in 0..values.nrows() {
        for j in 0..i {
            let (a, b) = (values[(i, j)], values[(j, i)]);
            if a.is_nan() {
                assert!(b.is_nan());
                continue;
            }
            assert!((a - b).abs() <= 1e-12 * a.abs().max(1e-300), "({i}, {j})");
        }
    }
}

#[test]
fn cross_channel_blocks_follow_the_policy() {
    let decoupled = space_with(2, 0, [0, 0, 0], ThreeBodyInteractionScheme::default());
    let g = G::new(&decoupled);
    let off = g.get_block(4.5, 6.5, 0, 1).expect("block");
    assert!(off.values().iter().all(|v| *v == 0.0));
    let full = g.get_value(4.5, 6.5).expect("full");
    assert_eq!(full.nrows(), decoupled.len());

    let shared = space_with(
        2,
        0,
        [0, 0, 0],
        ThreeBodyInteractionScheme::default().with_cross_channel(CrossChannelPolicy::SharedContent),
    );
    let g = G::new(&shared);
    let diagonal = g.get_block(4.5, 6.5, 0, 0).expect("diagonal");
    let coupled = g.get_block(4.5, 6.5, 0, 1).expect("coupled");
    assert_eq!(
        diagonal.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
        coupled.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    );
    assert!(matches!(g.get_block(4.5, 6.5, 0, 2), Err(QcError::Index(_))));
}
