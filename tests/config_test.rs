use rtctoken::{
    get_default_config, set_default_config, ConfigError, Role, TokenConfig, TokenIssuer, Version,
};
use std::env;
use std::fs;

const APP_ID: &str = "970ca35de60c44645bbae8a215061b33";
const CERTIFICATE: &str = "5cfd2fd1755d40ecb72977518be15d3b";

#[test]
fn test_config_new() {
    let config = TokenConfig::new(APP_ID, CERTIFICATE);

    assert_eq!(config.app_id, APP_ID);
    assert_eq!(config.app_certificate, CERTIFICATE);
    assert_eq!(config.profile, Version::V007);
    assert_eq!(config.expire_after, 3600);
    assert_eq!(config.default_role, Role::Audience);
}

#[test]
fn test_config_validation() {
    assert!(TokenConfig::new(APP_ID, CERTIFICATE).validate().is_ok());

    match TokenConfig::new("", CERTIFICATE).validate() {
        Err(ConfigError::MissingAppId) => {}
        _ => panic!("Expected MissingAppId error"),
    }

    // 31 characters
    match TokenConfig::new(&APP_ID[1..], CERTIFICATE).validate() {
        Err(ConfigError::InvalidAppId(_)) => {}
        _ => panic!("Expected InvalidAppId error"),
    }

    match TokenConfig::new(APP_ID, "").validate() {
        Err(ConfigError::MissingCertificate) => {}
        _ => panic!("Expected MissingCertificate error"),
    }

    match TokenConfig::new(APP_ID, "this is not hex").validate() {
        Err(ConfigError::InvalidCertificate(_)) => {}
        _ => panic!("Expected InvalidCertificate error"),
    }
}

#[test]
fn test_config_from_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("config.json");

    fs::write(
        &config_path,
        format!(
            r#"{{
                "app_id": "{}",
                "app_certificate": "{}",
                "profile": "006",
                "expire_after": 600,
                "default_role": "host"
            }}"#,
            APP_ID, CERTIFICATE
        ),
    )
    .unwrap();

    let config = TokenConfig::from_file(&config_path).unwrap();
    assert_eq!(config.app_id, APP_ID);
    assert_eq!(config.profile, Version::V006);
    assert_eq!(config.expire_after, 600);
    assert_eq!(config.default_role, Role::Host);
}

#[test]
fn test_config_from_file_rejects_bad_profile() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(
        &config_path,
        format!(
            r#"{{"app_id": "{}", "app_certificate": "{}", "profile": "005"}}"#,
            APP_ID, CERTIFICATE
        ),
    )
    .unwrap();

    match TokenConfig::from_file(&config_path) {
        Err(ConfigError::ParseError(_)) => {}
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_config_from_missing_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    match TokenConfig::from_file(temp_dir.path().join("absent.json")) {
        Err(ConfigError::IOError(_)) => {}
        other => panic!("Expected IOError, got {:?}", other),
    }
}

#[cfg(feature = "toml")]
#[test]
fn test_config_from_toml() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    fs::write(
        &config_path,
        format!(
            "app_id = \"{}\"\napp_certificate = \"{}\"\nexpire_after = 86400\n",
            APP_ID, CERTIFICATE
        ),
    )
    .unwrap();

    let config = TokenConfig::from_toml(&config_path).unwrap();
    assert_eq!(config.expire_after, 86400);
    assert_eq!(config.profile, Version::V007);
}

#[test]
fn test_config_from_env() {
    env::set_var("TEST_APP_ID", APP_ID);
    env::set_var("TEST_APP_CERTIFICATE", CERTIFICATE);
    env::set_var("TEST_PROFILE", "006");
    env::set_var("TEST_EXPIRE_AFTER", "900");
    env::set_var("TEST_DEFAULT_ROLE", "host");

    let config = TokenConfig::from_env("TEST").unwrap();

    assert_eq!(config.app_id, APP_ID);
    assert_eq!(config.app_certificate, CERTIFICATE);
    assert_eq!(config.profile, Version::V006);
    assert_eq!(config.expire_after, 900);
    assert_eq!(config.default_role, Role::Host);

    // Clean up
    env::remove_var("TEST_APP_ID");
    env::remove_var("TEST_APP_CERTIFICATE");
    env::remove_var("TEST_PROFILE");
    env::remove_var("TEST_EXPIRE_AFTER");
    env::remove_var("TEST_DEFAULT_ROLE");
}

#[test]
fn test_config_from_env_invalid_expiry() {
    env::set_var("BAD_EXPIRY_APP_ID", APP_ID);
    env::set_var("BAD_EXPIRY_APP_CERTIFICATE", CERTIFICATE);
    env::set_var("BAD_EXPIRY_EXPIRE_AFTER", "soon");

    match TokenConfig::from_env("BAD_EXPIRY") {
        Err(ConfigError::InvalidExpiry(value)) => assert_eq!(value, "soon"),
        other => panic!("Expected InvalidExpiry error, got {:?}", other),
    }

    env::remove_var("BAD_EXPIRY_APP_ID");
    env::remove_var("BAD_EXPIRY_APP_CERTIFICATE");
    env::remove_var("BAD_EXPIRY_EXPIRE_AFTER");
}

#[test]
fn test_config_from_env_missing() {
    match TokenConfig::from_env("DEFINITELY_UNSET_PREFIX") {
        Err(ConfigError::EnvVarError(_)) => {}
        other => panic!("Expected EnvVarError, got {:?}", other),
    }
}

#[test]
fn test_config_from_env_or_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cert_path = temp_dir.path().join("app.cert");
    fs::write(&cert_path, format!("{}\n", CERTIFICATE)).unwrap();

    env::set_var("FILE_TEST_APP_ID", APP_ID);
    env::set_var("FILE_TEST_APP_CERTIFICATE_FILE", cert_path.to_str().unwrap());

    let config = TokenConfig::from_env_or_file("FILE_TEST").unwrap();
    assert_eq!(config.app_certificate, CERTIFICATE);
    assert_eq!(config.profile, Version::V007);

    env::remove_var("FILE_TEST_APP_ID");
    env::remove_var("FILE_TEST_APP_CERTIFICATE_FILE");
}

#[test]
fn test_default_config() {
    let config = TokenConfig::builder()
        .app_id(APP_ID)
        .app_certificate(CERTIFICATE)
        .default_role(Role::Host)
        .build()
        .unwrap();

    // No default config should be set yet
    assert!(get_default_config().is_none());

    set_default_config(config).unwrap();

    let default_config = get_default_config().unwrap();
    assert_eq!(default_config.app_id, APP_ID);
    assert_eq!(default_config.default_role, Role::Host);

    // The issuer picks the default up
    let issuer = TokenIssuer::from_default().unwrap();
    let token = issuer.issue_default_role("lobby", 9u32).unwrap();
    assert!(issuer.verify(&token, "lobby", 9u32).is_ok());

    // Trying to set the default configuration again should fail
    match set_default_config(TokenConfig::new(APP_ID, CERTIFICATE)) {
        Err(ConfigError::AlreadyInitialized) => {}
        _ => panic!("Expected AlreadyInitialized error"),
    }
}
