use fvqc_core::errors::{ErrorInfo, QcError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("row", 3)
        .with_context("reason", "example")
}

#[test]
fn singularity_error_surface() {
    let err = QcError::Singularity(sample_info("pole-denominator", "on-shell pole"));
    assert_eq!(err.info().code, "pole-denominator");
    assert!(err.is_singularity());
    assert_eq!(err.info().context.get("row").map(String::as_str), Some("3"));
}

#[test]
fn envelope_error_surface() {
    let err = QcError::Envelope(sample_info("energy-above-envelope", "E > Emax"));
    assert!(!err.is_singularity());
    assert!(err.to_string().starts_with("envelope error"));
    assert_eq!(err.to_string(), "envelope error: [energy-above-envelope] E > Emax (reason=example, row=3)");
    assert_eq!(err.family(), "Envelope");
}

#[test]
fn error_display_includes_hint() {
    let err = QcError::Config(ErrorInfo::new("invalid-alpha", "alpha out of range").with_hint("use -1"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("config error: [invalid-alpha] alpha out of range"));
    assert!(rendered.contains("hint: use -1"));
}

#[test]
fn errors_round_trip_json() {
    let err = QcError::Index(sample_info("unknown-element", "missing"));
    let json = serde_json::to_string(&err).expect("serialize");
    let decoded: QcError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
    let tagged: serde_json::Value = serde_json::from_str(&json).expect("value");
    assert_eq!(tagged["family"], err.family());
}
