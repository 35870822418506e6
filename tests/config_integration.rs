//! Configuration layering tests.

use std::env;
use std::fs;

use serial_test::serial;

use formrelay::config::AppConfig;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("RELAY_SERVER__PORT");
        env::remove_var("RELAY_WEBHOOK__URL");
        env::remove_var("RELAY_SESSIONS__TTL_SECS");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("BASE_URL");
        env::remove_var("AGENT_WEBHOOK_URL");
        env::remove_var("PUBLIC_DIR");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["formrelay"]).expect("failed to load defaults");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.public_dir, "public");
    assert_eq!(config.sessions.ttl_secs, 3600);
    assert_eq!(config.sessions.sweep_interval_secs, 300);
    assert!(config.webhook.url.is_none());
    assert_eq!(config.base_url(), "http://localhost:3000");
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("RELAY_SERVER__PORT", "9090");
        env::set_var("RELAY_SESSIONS__TTL_SECS", "120");
    }

    let config = AppConfig::load_from_args(["formrelay"]).expect("failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.sessions.ttl_secs, 120);

    clear_env_vars();
}

#[test]
#[serial]
fn test_legacy_env_names() {
    clear_env_vars();
    unsafe {
        env::set_var("PORT", "8080");
        env::set_var("BASE_URL", "https://relay.example.com");
        env::set_var("AGENT_WEBHOOK_URL", "https://agent.example.com/hook");
    }

    let config = AppConfig::load_from_args(["formrelay"]).expect("failed to load config");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.base_url(), "https://relay.example.com");
    assert_eq!(
        config.webhook.url.as_deref(),
        Some("https://agent.example.com/hook")
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_flags_win_over_env() {
    clear_env_vars();
    unsafe {
        env::set_var("RELAY_SERVER__PORT", "9090");
    }

    let config = AppConfig::load_from_args(["formrelay", "--port", "7070"])
        .expect("failed to load config");
    assert_eq!(config.server.port, 7070);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let config_content = r"
server:
  port: 7071
sessions:
  ttl_secs: 900
";

    let file_path = "test_config.yaml";
    fs::write(file_path, config_content).expect("Failed to write temp config");

    unsafe {
        env::set_var("CONFIG_FILE", file_path);
    }

    let config = AppConfig::load_from_args(["formrelay"]).expect("failed to load config from file");

    fs::remove_file(file_path).unwrap();
    clear_env_vars();

    assert_eq!(config.server.port, 7071);
    assert_eq!(config.sessions.ttl_secs, 900);
}
