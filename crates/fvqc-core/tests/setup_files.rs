use std::fs;

use fvqc_core::{
    CutoffStyle, FlavorChannel, FlavorChannelSpace, FiniteVolumeSetup, HarmonicConvention,
    PoleStyle, QcSetup, ThreeBodyInteractionScheme,
};
use tempfile::tempdir;

fn sample_setup() -> QcSetup {
    let fc = FlavorChannel::with_particles(
        vec![1.0, 1.0, 3.5],
        vec!["pi".into(), "pi".into(), "K".into()],
    )
    .expect("channel")
    .with_ell_max(1);
    let fcs = FlavorChannelSpace::new(vec![fc]).expect("space");
    let fvs = FiniteVolumeSetup::new([0, 1, 1]).with_cutoff(CutoffStyle::Hard);
    let tbis = ThreeBodyInteractionScheme::default()
        .with_pole(PoleStyle::Original)
        .with_harmonics(HarmonicConvention::HermitianComplex);
    QcSetup::new(fcs, fvs, tbis, 6.0, 8.0).expect("setup")
}

#[test]
fn setup_round_trips_through_json_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("setup.json");
    let setup = sample_setup();
    fs::write(&path, serde_json::to_vec_pretty(&setup).expect("encode")).expect("write");
    let restored = QcSetup::from_path(&path).expect("load");
    assert_eq!(restored, setup);
    assert_eq!(restored.cache_key().unwrap(), setup.cache_key().unwrap());
}

#[test]
fn setup_round_trips_through_yaml_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("setup.yaml");
    let setup = sample_setup();
    fs::write(&path, serde_yaml::to_string(&setup).expect("encode")).expect("write");
    let restored = QcSetup::from_path(&path).expect("load");
    assert_eq!(restored, setup);
}

#[test]
fn invalid_ceiling_is_config_error() {
    let setup = sample_setup();
    let err = QcSetup::new(
        setup.channels.clone(),
        setup.volume,
        setup.scheme,
        -1.0,
        7.0,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "invalid-ceiling");
}

#[test]
fn missing_file_is_serde_error() {
    let dir = tempdir().expect("tempdir");
    let err = QcSetup::from_path(&dir.path().join("absent.yaml")).unwrap_err();
    assert_eq!(err.info().code, "setup-read");
}
