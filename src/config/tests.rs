use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const ALL_VARS: &[&str] = &[
    "RISKGATE_POLICY_PATH",
    "RISKGATE_DETECTOR_URL",
    "RISKGATE_DETECTOR_TIMEOUT_MS",
    "RISKGATE_REVIEWER_URL",
    "RISKGATE_REVIEWER_API_KEY",
    "DASHSCOPE_API_KEY",
    "RISKGATE_REVIEWER_MODEL",
    "RISKGATE_REVIEWER_ENABLED",
    "RISKGATE_REVIEWER_TIMEOUT_MS",
    "RISKGATE_CACHE_TTL_SECS",
    "RISKGATE_CACHE_COOLDOWN_SECS",
    "RISKGATE_CACHE_CAPACITY",
    "RISKGATE_RATE_LIMIT_PER_MINUTE",
    "RISKGATE_SKIN_RATIO_TRIGGER",
    "RISKGATE_TEXT_ESCALATION_FLOOR",
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, serialized with #[serial].
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, serialized with #[serial].
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_riskgate_env() {
    // SAFETY: Test code only, serialized with #[serial].
    for name in ALL_VARS {
        unsafe { env::remove_var(name) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.policy_path, PathBuf::from("./configs/rules.yaml"));
    assert!(config.detector_url.is_none());
    assert_eq!(config.detector_timeout_ms, 5_000);
    assert_eq!(
        config.reviewer_url,
        "https://dashscope.aliyuncs.com/compatible-mode/v1"
    );
    assert_eq!(config.reviewer_model, "qwen-vl-plus");
    assert!(config.reviewer_enabled);
    assert_eq!(config.cache_ttl_secs, 300);
    assert_eq!(config.cache_cooldown_secs, 15);
    assert_eq!(config.rate_limit_per_minute, 20);
    assert!((config.skin_ratio_trigger - 0.18).abs() < f32::EPSILON);
    assert_eq!(config.text_escalation_floor, 0);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_riskgate_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.cache_capacity, 10_000);
    assert!(config.reviewer_api_key.is_none());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_riskgate_env();

    with_env_vars(
        &[
            ("RISKGATE_POLICY_PATH", "/etc/riskgate/rules.yaml"),
            ("RISKGATE_DETECTOR_URL", "http://127.0.0.1:9000/detect"),
            ("RISKGATE_CACHE_TTL_SECS", "600"),
            ("RISKGATE_CACHE_COOLDOWN_SECS", "30"),
            ("RISKGATE_RATE_LIMIT_PER_MINUTE", "5"),
            ("RISKGATE_SKIN_RATIO_TRIGGER", "0.25"),
            ("RISKGATE_REVIEWER_ENABLED", "off"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.policy_path, PathBuf::from("/etc/riskgate/rules.yaml"));
            assert_eq!(
                config.require_detector_url().expect("detector url"),
                "http://127.0.0.1:9000/detect"
            );
            assert_eq!(config.cache_ttl_secs, 600);
            assert_eq!(config.rate_limit_per_minute, 5);
            assert!(!config.reviewer_enabled);

            let gateway = config.gateway_config();
            assert!(!gateway.enabled);
            assert_eq!(gateway.cooldown, Duration::from_secs(30));
            assert!((config.engine_config().skin_ratio_trigger - 0.25).abs() < f32::EPSILON);
        },
    );
}

#[test]
#[serial]
fn test_api_key_falls_back_to_dashscope() {
    clear_riskgate_env();

    with_env_vars(&[("DASHSCOPE_API_KEY", "sk-dash")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.reviewer_api_key.as_deref(), Some("sk-dash"));
        assert_eq!(config.backend_config().api_key.as_deref(), Some("sk-dash"));
    });

    with_env_vars(
        &[
            ("DASHSCOPE_API_KEY", "sk-dash"),
            ("RISKGATE_REVIEWER_API_KEY", "sk-own"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.reviewer_api_key.as_deref(), Some("sk-own"));
        },
    );
}

#[test]
#[serial]
fn test_invalid_number_rejected() {
    clear_riskgate_env();

    with_env_vars(&[("RISKGATE_CACHE_TTL_SECS", "five minutes")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "RISKGATE_CACHE_TTL_SECS",
                ..
            }
        ));
        assert!(err.to_string().contains("five minutes"));
    });
}

#[test]
#[serial]
fn test_invalid_bool_rejected() {
    clear_riskgate_env();

    with_env_vars(&[("RISKGATE_REVIEWER_ENABLED", "maybe")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));
    });
}

#[test]
fn test_missing_detector_url() {
    let config = Config::default();
    let err = config.require_detector_url().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar { .. }));
    assert!(err.to_string().contains("RISKGATE_DETECTOR_URL"));
}

#[test]
fn test_validate_cooldown_exceeds_ttl() {
    let config = Config {
        cache_ttl_secs: 10,
        cache_cooldown_secs: 20,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange { .. })
    ));
}

#[test]
fn test_validate_rejects_zero_limits() {
    let zero_rate = Config {
        rate_limit_per_minute: 0,
        ..Default::default()
    };
    assert!(zero_rate.validate().is_err());

    let zero_capacity = Config {
        cache_capacity: 0,
        ..Default::default()
    };
    assert!(zero_capacity.validate().is_err());
}

#[test]
#[serial]
fn test_validate_rejects_oversized_rate_limit() {
    clear_riskgate_env();
    let config = with_env_vars(
        &[("RISKGATE_RATE_LIMIT_PER_MINUTE", "18446744073709551615")],
        Config::from_env,
    )
    .expect("parses as usize");

    assert_eq!(config.rate_limit_per_minute, usize::MAX);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange {
            name: "RISKGATE_RATE_LIMIT_PER_MINUTE",
            ..
        })
    ));
}

#[test]
fn test_validate_skin_trigger_range() {
    let config = Config {
        skin_ratio_trigger: 1.5,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_policy_path_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config {
        policy_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotAFile { .. })
    ));
}
