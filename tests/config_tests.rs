use bindlab::config::{MAX_COMMAND_BUFFER, StudioConfig};
use bindlab::error::ConfigError;
use bindlab::locale::Locale;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

// Tests that read or modify environment variables must not run concurrently
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ENV_KEYS: [&str; 10] = [
    "BINDLAB_HTTP_BIND_ADDR",
    "BINDLAB_LOCALE",
    "BINDLAB_COMMAND_BUFFER",
    "BINDLAB_API_KEY",
    "GEMINI_API_KEY",
    "API_KEY",
    "BINDLAB_GATEWAY_URL",
    "BINDLAB_MODEL",
    "BINDLAB_GATEWAY_TIMEOUT",
    "BINDLAB_VALIDATION_TEMPERATURE",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe {
            std::env::remove_var(key);
        }
    }
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_without_file_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let config = StudioConfig::load(None).unwrap();
    assert_eq!(config, StudioConfig::default());
    assert!(config.gateway.api_key.is_none());
}

#[test]
fn test_load_from_toml_file() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let file = write_config(
        r#"
http_bind_addr = "0.0.0.0:9000"
locale = "ru"
command_buffer = 16

[gateway]
api_key = "file-key"
model = "gemini-2.5-pro"
timeout_secs = 30
validation_temperature = 0.3
"#,
    );

    let config = StudioConfig::load(Some(file.path())).unwrap();
    assert_eq!(
        config.http_bind_addr,
        "0.0.0.0:9000".parse::<SocketAddr>().unwrap()
    );
    assert_eq!(config.default_locale, Locale::Ru);
    assert_eq!(config.command_buffer, 16);
    assert_eq!(config.gateway.api_key.as_deref(), Some("file-key"));
    assert_eq!(config.gateway.model, "gemini-2.5-pro");
    assert_eq!(config.gateway.request_timeout, Duration::from_secs(30));
    assert!((config.gateway.validation_temperature - 0.3).abs() < 1e-6);
    // Keys missing from the file keep their defaults
    assert_eq!(
        config.gateway.base_url,
        StudioConfig::default().gateway.base_url
    );
}

#[test]
fn test_environment_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let file = write_config("locale = \"ru\"\n[gateway]\nmodel = \"from-file\"\n");
    unsafe {
        std::env::set_var("BINDLAB_LOCALE", "es");
        std::env::set_var("BINDLAB_MODEL", "from-env");
        std::env::set_var("GEMINI_API_KEY", "gemini-key");
        std::env::set_var("API_KEY", "generic-key");
    }

    let result = StudioConfig::load(Some(file.path()));
    clear_env();

    let config = result.unwrap();
    assert_eq!(config.default_locale, Locale::Es);
    assert_eq!(config.gateway.model, "from-env");
    assert_eq!(config.gateway.api_key.as_deref(), Some("gemini-key"));
}

#[test]
fn test_invalid_environment_values_are_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let cases = [
        ("BINDLAB_HTTP_BIND_ADDR", "not-an-address"),
        ("BINDLAB_LOCALE", "fr"),
        ("BINDLAB_GATEWAY_TIMEOUT", "soon"),
        ("BINDLAB_GATEWAY_TIMEOUT", "0"),
        ("BINDLAB_VALIDATION_TEMPERATURE", "5.0"),
        ("BINDLAB_GATEWAY_URL", "ftp://example.com"),
        ("BINDLAB_COMMAND_BUFFER", "0"),
        ("BINDLAB_COMMAND_BUFFER", "4611686018427387904"),
    ];

    for (key, value) in cases {
        unsafe {
            std::env::set_var(key, value);
        }
        let result = StudioConfig::from_env();
        clear_env();
        assert!(result.is_err(), "{}={} should be rejected", key, value);
    }
}

#[test]
fn test_invalid_file_is_reported() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let file = write_config("locale = [unterminated");
    assert!(matches!(
        StudioConfig::load(Some(file.path())),
        Err(ConfigError::ParseError(_))
    ));

    let file = write_config("locale = \"klingon\"");
    assert_eq!(
        StudioConfig::load(Some(file.path())).unwrap_err(),
        ConfigError::InvalidLocale("klingon".to_string())
    );

    let missing = std::env::temp_dir().join("bindlab-does-not-exist.toml");
    assert!(matches!(
        StudioConfig::load(Some(&missing)),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_partial_toml_update_keeps_other_fields() {
    let mut config = StudioConfig::default();
    config.apply_toml_str("[gateway]\ntimeout_secs = 5").unwrap();
    assert_eq!(config.gateway.request_timeout, Duration::from_secs(5));
    assert_eq!(config.default_locale, Locale::En);

    assert!(config.apply_toml_str("command_buffer = -1").is_err());
    assert!(config.apply_toml_str("http_bind_addr = 8053").is_err());
}

#[test]
fn test_oversized_command_buffer_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let file = write_config("command_buffer = 4611686018427387904");
    assert!(matches!(
        StudioConfig::load(Some(file.path())),
        Err(ConfigError::ParseError(_))
    ));

    let file = write_config(&format!("command_buffer = {}", MAX_COMMAND_BUFFER));
    assert_eq!(
        StudioConfig::load(Some(file.path())).unwrap().command_buffer,
        MAX_COMMAND_BUFFER
    );
}
