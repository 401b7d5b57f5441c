use rock_test_harness::logging::{Logging, LoggingError};
use tracing::metadata::LevelFilter;

#[test]
fn global_subscriber_is_installed_once() {
    Logging::try_init(LevelFilter::INFO).unwrap();

    let err = Logging::try_init(LevelFilter::DEBUG).unwrap_err();
    assert!(matches!(err, LoggingError::TryInitError(_)));
}
