use std::io::Write;

use secretlinks::config::{StaticConfig, init_config};
use tempfile::NamedTempFile;

fn toml_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// 环境变量是进程级的：只覆盖其他测试不检查的字段
#[test]
fn test_file_and_env_layering() {
    let file = toml_file(
        r#"
[server]
port = 9090
public_base_url = "https://s.example.com"

[links]
key_length = 10
default_max_views = 3

[events]
group_id = "custom-group"
"#,
    );
    let path = file.path().to_str().unwrap();

    let config = StaticConfig::try_load(path).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(
        config.server.public_base_url.as_deref(),
        Some("https://s.example.com")
    );
    assert_eq!(config.links.key_length, 10);
    assert_eq!(config.links.default_max_views, 3);
    assert_eq!(config.links.default_ttl_minutes, 60);
    assert_eq!(config.events.group_id, "custom-group");
    assert_eq!(config.events.new_links_topic, "new-links");

    unsafe {
        std::env::set_var("SL__SERVER__PORT", "7777");
        std::env::set_var("SL__EVENTS__ENABLED", "false");
    }
    let config = StaticConfig::try_load(path).unwrap();
    unsafe {
        std::env::remove_var("SL__SERVER__PORT");
        std::env::remove_var("SL__EVENTS__ENABLED");
    }

    assert_eq!(config.server.port, 7777);
    assert!(!config.events.enabled);
    assert_eq!(config.links.key_length, 10);
}

#[test]
fn test_missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let config = StaticConfig::try_load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.links.key_length, 8);
    assert_eq!(config.crypto.key.len(), 32);
}

#[test]
fn test_invalid_file_is_an_error() {
    let file = toml_file("[links]\nkey_length = \"eight\"\n");
    let err = StaticConfig::try_load(file.path().to_str().unwrap()).unwrap_err();
    assert_eq!(err.code(), "E008");
}

#[test]
fn test_bad_field_does_not_drop_the_rest_of_the_file() {
    let file = toml_file(
        r#"
[server]
port = "not-a-port"

[crypto]
key = "operator_supplied_32_byte_key!!!"
"#,
    );
    let path = file.path().to_str().unwrap();

    // 整个文件报错，而不是以默认密钥继续启动
    let err = StaticConfig::try_load(path).unwrap_err();
    assert_eq!(err.code(), "E008");
    assert!(init_config(path).is_err());
}

#[test]
fn test_generated_sample_is_loadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    StaticConfig::default().save_to_file(&path).unwrap();
    let loaded = StaticConfig::try_load(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded.links.max_key_attempts, 1000);
    assert_eq!(loaded.events.poll_timeout_ms, 500);
}
