use super::*;
use serial_test::serial;
use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_lostfound_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("LOSTFOUND_PORT");
        env::remove_var("LOSTFOUND_BIND_ADDR");
        env::remove_var("LOSTFOUND_STORAGE_PATH");
        env::remove_var("LOSTFOUND_UPLOAD_DIR");
        env::remove_var("LOSTFOUND_MODEL_PATH");
        env::remove_var("LOSTFOUND_EMBEDDING_DIM");
        env::remove_var("LOSTFOUND_MATCH_THRESHOLD");
        env::remove_var("LOSTFOUND_IMAGE_WEIGHT");
        env::remove_var("LOSTFOUND_TEXT_WEIGHT");
        env::remove_var("LOSTFOUND_REWARD_COINS");
        env::remove_var("LOSTFOUND_DEDUPE_MATCHES");
        env::remove_var("LOSTFOUND_ADMIN_USERNAME");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(config.bind_addr, IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));
    assert_eq!(config.storage_path, PathBuf::from("./.data"));
    assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
    assert!(config.model_path.is_none());
    assert_eq!(config.embedding_dim, 512);
    assert!((config.match_threshold - 0.70).abs() < f32::EPSILON);
    assert_eq!(config.reward_coins, 100);
    assert!(config.dedupe_matches);
    assert!(config.admin_username.is_none());
}

#[test]
fn test_socket_addr() {
    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
fn test_snapshot_path_is_inside_storage_path() {
    let config = Config {
        storage_path: PathBuf::from("/var/lib/lostfound"),
        ..Default::default()
    };
    assert_eq!(
        config.snapshot_path(),
        PathBuf::from("/var/lib/lostfound/lostfound.json")
    );
}

#[test]
fn test_default_config_validates() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = Config {
        storage_path: temp.path().join("data"),
        upload_dir: temp.path().join("uploads"),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_lostfound_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert_eq!(config.reward_coins, 100);
    assert!(config.dedupe_matches);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_lostfound_env();

    with_env_vars(
        &[
            ("LOSTFOUND_PORT", "3000"),
            ("LOSTFOUND_BIND_ADDR", "::1"),
            ("LOSTFOUND_MATCH_THRESHOLD", "0.6"),
            ("LOSTFOUND_IMAGE_WEIGHT", "0.5"),
            ("LOSTFOUND_TEXT_WEIGHT", "0.5"),
            ("LOSTFOUND_REWARD_COINS", "250"),
            ("LOSTFOUND_DEDUPE_MATCHES", "false"),
            ("LOSTFOUND_UPLOAD_DIR", "/srv/uploads"),
            ("LOSTFOUND_ADMIN_USERNAME", " admin "),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.port, 3000);
            assert_eq!(
                config.bind_addr,
                IpAddr::V6(std::net::Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
            );
            assert!((config.match_threshold - 0.6).abs() < f32::EPSILON);
            assert!((config.image_weight - 0.5).abs() < f32::EPSILON);
            assert_eq!(config.reward_coins, 250);
            assert!(!config.dedupe_matches);
            assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
            assert_eq!(config.admin_username.as_deref(), Some("admin"));
        },
    );
}

#[test]
#[serial]
fn test_from_env_port_zero_rejected() {
    clear_lostfound_env();

    with_env_vars(&[("LOSTFOUND_PORT", "0")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
    });
}

#[test]
#[serial]
fn test_from_env_port_not_a_number() {
    clear_lostfound_env();

    with_env_vars(&[("LOSTFOUND_PORT", "eighty")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::PortParseError { .. })));
    });
}

#[test]
#[serial]
fn test_from_env_malformed_threshold_is_error() {
    clear_lostfound_env();

    with_env_vars(&[("LOSTFOUND_MATCH_THRESHOLD", "high")], || {
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidNumber {
                name: "LOSTFOUND_MATCH_THRESHOLD",
                ..
            })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_malformed_bool_is_error() {
    clear_lostfound_env();

    with_env_vars(&[("LOSTFOUND_DEDUPE_MATCHES", "maybe")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidBool { .. })));
    });
}

#[test]
#[serial]
fn test_from_env_blank_model_path_is_none() {
    clear_lostfound_env();

    with_env_vars(&[("LOSTFOUND_MODEL_PATH", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.model_path.is_none());
    });
}

#[test]
fn test_validate_threshold_out_of_range() {
    let config = Config {
        match_threshold: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ThresholdOutOfRange { .. })
    ));
}

#[test]
fn test_validate_weights_must_sum_to_one() {
    let config = Config {
        image_weight: 0.7,
        text_weight: 0.7,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidWeights { .. })
    ));
}

#[test]
fn test_validate_zero_embedding_dim() {
    let config = Config {
        embedding_dim: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidEmbeddingDim(_))
    ));
}

#[test]
fn test_validate_missing_model_path() {
    let config = Config {
        model_path: Some(PathBuf::from("/nonexistent/clip")),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn test_validate_model_path_must_be_directory() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = Config {
        model_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_validate_storage_path_is_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = Config {
        storage_path: file.path().to_path_buf(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::ThresholdOutOfRange { value: 2.0 };
    assert!(err.to_string().contains("[-1, 1]"));

    let err = ConfigError::InvalidWeights {
        image: 0.7,
        text: 0.7,
        reason: "weights must sum to 1",
    };
    assert!(err.to_string().contains("image=0.7"));
}
