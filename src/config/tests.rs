//! Configuration tests
//!
//! Guard the TOML template against drift: every field written by `to_toml`
//! must parse back through `FileConfig` and land in the same place.

use super::*;
use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_config_roundtrip_preserves_values() {
    let mut config = Config::default();
    config.state_path = PathBuf::from("/tmp/chat/state.json");
    config.api_url = "https://llm.internal".to_string();
    config.api_model = "qwen2.5".to_string();
    config.registration_url = Some("https://accounts.internal/api".to_string());
    config.color_scheme = Some("light".to_string());
    config.logging.level = "debug".to_string();
    config.logging.file_enabled = true;
    config.logging.file_rotation = LogRotation::Hourly;
    config.logging.file_dir = Some(PathBuf::from("/tmp/chat/logs"));

    let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let restored = Config::resolve(file, no_env);

    assert_eq!(restored.state_path, config.state_path);
    assert_eq!(restored.api_url, config.api_url);
    assert_eq!(restored.api_model, config.api_model);
    assert_eq!(restored.registration_url, config.registration_url);
    assert_eq!(restored.color_scheme, config.color_scheme);
    assert_eq!(restored.logging, config.logging);
}

#[test]
fn test_api_key_never_serialized() {
    let mut config = Config::default();
    config.api_key = Some("sk-secret".to_string());
    assert!(!config.to_toml().contains("sk-secret"));
}

#[test]
fn test_unset_optionals_are_commented_out() {
    let toml_str = Config::default().to_toml();
    assert!(toml_str.contains("# registration_url ="));
    assert!(toml_str.contains("# color_scheme ="));
    assert!(toml_str.contains("# file_dir ="));

    let file: FileConfig = toml::from_str(&toml_str).unwrap();
    assert!(file.registration_url.is_none());
    assert!(file.color_scheme.is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
api_url = "http://from-file"
api_model = "file-model"
"#,
    )
    .unwrap();
    let config = Config::resolve(
        file,
        env_from(&[
            (env::API_URL, "http://from-env"),
            (env::API_KEY, "sk-env"),
        ]),
    );

    assert_eq!(config.api_url, "http://from-env");
    assert_eq!(config.api_model, "file-model");
    assert_eq!(config.api_key.as_deref(), Some("sk-env"));
}

#[test]
fn test_empty_env_values_are_ignored() {
    let config = Config::resolve(
        FileConfig::default(),
        env_from(&[(env::API_URL, "  "), (env::API_KEY, "")]),
    );
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert!(config.api_key.is_none());
}

#[test]
fn test_no_tui_flag() {
    let config = Config::resolve(FileConfig::default(), env_from(&[(env::NO_TUI, "true")]));
    assert!(!config.enable_tui);
    let config = Config::resolve(FileConfig::default(), env_from(&[(env::NO_TUI, "0")]));
    assert!(config.enable_tui);
    assert!(Config::resolve(FileConfig::default(), no_env).enable_tui);
}

#[test]
fn test_logging_section_partial() {
    let file: FileConfig = toml::from_str(
        r#"
[logging]
level = "warn"
file_rotation = "weekly"
"#,
    )
    .unwrap();
    let config = Config::resolve(file, no_env);
    assert_eq!(config.logging.level, "warn");
    // Unknown rotation falls back to daily
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
    assert_eq!(config.logging.file_prefix, "chat-shell");
}

#[test]
fn test_log_dir_follows_state_path() {
    let config = Config::resolve(
        FileConfig::default(),
        env_from(&[(env::STATE_PATH, "/srv/chat/state.json")]),
    );
    assert_eq!(config.log_dir(), PathBuf::from("/srv/chat/logs"));

    let file: FileConfig = toml::from_str(
        r#"
state_path = "/srv/chat/state.json"

[logging]
file_dir = "debug-logs"
"#,
    )
    .unwrap();
    let config = Config::resolve(file, no_env);
    assert_eq!(config.log_dir(), PathBuf::from("/srv/chat/debug-logs"));
}

#[test]
fn test_invalid_toml_is_rejected() {
    let parsed: Result<FileConfig, _> = toml::from_str("api_url = http://unquoted");
    assert!(parsed.is_err());
}
