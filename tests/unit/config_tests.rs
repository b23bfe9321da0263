// Configuration loading and validation

use std::io::Write;

use kasasagi::cache::CacheBackend;
use kasasagi::config::{Config, ConfigError, PolicyKind};
use kasasagi::constants::{DEFAULT_HEALTH_PATH, DEFAULT_PORT, ONE_YEAR_SECS};
use kasasagi::logging::LogFormat;

#[test]
fn test_minimal_config_fills_defaults() {
    let config = Config::from_yaml_with_env("origin:\n  cloud_name: slovyagin\n").unwrap();

    assert_eq!(config.server.port, DEFAULT_PORT);
    assert_eq!(config.server.health_path.as_deref(), Some(DEFAULT_HEALTH_PATH));
    assert_eq!(config.transform.policy, PolicyKind::Size);
    assert_eq!(config.transform.allowed_sizes, vec!["700", "900", "1400"]);
    assert!(!config.referer_policy_enabled());
    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert_eq!(config.cache.max_age_seconds, ONE_YEAR_SECS);
    assert!(config.cache.store_error_responses);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_dimension_policy_with_redis_cache() {
    let yaml = r#"
origin:
  cloud_name: slovyagin
  namespace: portfolio
  format: webp
transform:
  policy: dimensions
  width_param: width
  height_param: height
cache:
  backend: redis
  redis:
    url: "redis://127.0.0.1:6379"
logging:
  format: pretty
  level: debug
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();

    assert_eq!(config.transform.policy, PolicyKind::Dimensions);
    assert_eq!(config.transform.width_param, "width");
    assert_eq!(config.origin.format, "webp");
    assert_eq!(config.cache.backend, CacheBackend::Redis);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.validate().is_ok());
}

#[test]
fn test_redis_backend_without_url_is_invalid() {
    let config =
        Config::from_yaml_with_env("origin:\n  cloud_name: demo\ncache:\n  backend: redis\n")
            .unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn test_size_policy_needs_allowed_sizes() {
    let yaml = "origin:\n  cloud_name: demo\ntransform:\n  allowed_sizes: []\n";
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn test_unknown_policy_fails_to_parse() {
    let yaml = "origin:\n  cloud_name: demo\ntransform:\n  policy: crop\n";
    assert!(matches!(
        Config::from_yaml_with_env(yaml),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_zero_threads_is_invalid() {
    let mut config = Config::for_cloud("demo");
    config.server.threads = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_from_file_loads_valid_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "server:\n  port: 9100\norigin:\n  cloud_name: slovyagin\naccess:\n  referer:\n    enabled: true\n    allowed_origins: [\"https://slovyagin.com\"]\n"
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.server.listen_addr(), "0.0.0.0:9100");
    assert!(config.referer_policy_enabled());
}
