//! Loading the process-wide formatter configuration from the environment
//!
//! Kept in its own test binary so the environment is read exactly once,
//! before any other test builds an error.

use verror::{verror, ConfigError, FormatterConfig};

#[test]
fn test_global_reads_environment_on_first_use() {
    std::env::set_var(verror::config::ENV_MAX_WIDTH, "5");
    std::env::set_var(verror::config::ENV_WARN_ON_FAULT, "off");

    let err = verror!("%6d|%5d", 1, 2);
    assert_eq!(err.to_string(), "%!(BADWIDTH)1|    2");

    let config = FormatterConfig::global();
    assert_eq!(config.max_width, 5);
    assert!(!config.warn_on_fault);

    assert!(matches!(
        FormatterConfig::new().install(),
        Err(ConfigError::AlreadyInstalled)
    ));
}
