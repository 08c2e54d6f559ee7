use mapnik_capi::logger::{Severity, allows, set_severity};
use mapnik_capi::telemetry::init_default_tracing;
use tracing::Level;

#[test]
fn default_subscriber_installs_only_with_telemetry_feature() {
    assert_eq!(init_default_tracing(), cfg!(feature = "telemetry"));
    // A second install never succeeds.
    assert!(!init_default_tracing());

    set_severity(Severity::Error);
    assert!(allows(&Level::ERROR));
    assert!(!allows(&Level::WARN));
    tracing::warn!("filtered out by severity");
    set_severity(Severity::Warn);
}
