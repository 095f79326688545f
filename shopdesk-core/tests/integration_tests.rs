//! Integration tests for shopdesk-core infrastructure

use shopdesk_core::{
    config_error, init_logging, performance, validation_error, AdminConfig, ErrorContext,
    LogFormat, LoggingConfig, ShopdeskError,
};

#[test]
fn test_error_handling() {
    let error = validation_error!("Bad cookie name", "session.token_cookie", "test_component");

    match &error {
        ShopdeskError::Validation {
            message,
            field,
            context,
        } => {
            assert_eq!(message, "Bad cookie name");
            assert_eq!(field.as_deref(), Some("session.token_cookie"));
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Validation error"),
    }

    // Logging an error must not panic without a subscriber
    error.log();

    let timeout = ShopdeskError::Timeout {
        operation: "fetch_permissions".to_string(),
        duration_ms: 10_000,
        context: ErrorContext::new("test").with_metadata("username", "alice"),
    };
    assert!(timeout.is_recoverable());
    assert_eq!(
        timeout.context().metadata.get("username").map(String::as_str),
        Some("alice")
    );

    assert!(!config_error!("Invalid config", "test").is_recoverable());
}

#[test]
fn test_logging_initialization_is_idempotent() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        filter_directives: vec!["shopdesk_core=debug".to_string()],
        ..LoggingConfig::default()
    };

    // The global subscriber can be installed once per process; the second
    // attempt reports an error instead of panicking.
    let _ = init_logging(&config);
    assert!(init_logging(&config).is_err());
}

#[test]
fn test_config_roundtrips_through_toml() {
    let mut config = AdminConfig::default();
    config.backend.permissions_field = "permissionNames".to_string();

    let text = toml::to_string(&config).unwrap();
    let parsed: AdminConfig = toml::from_str(&text).unwrap();

    assert_eq!(parsed.backend.permissions_field, "permissionNames");
    assert!(parsed.validate().is_ok());
}

#[test]
fn test_measure_async_returns_inner_value() {
    let value = tokio_test::block_on(performance::measure_async("noop", async { 41 + 1 }));
    assert_eq!(value, 42);
}
