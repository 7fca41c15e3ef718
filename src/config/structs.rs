use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量
/// - links: 短码长度、默认有效期与最大查看次数
/// - crypto: 对称加密密钥
/// - events: 使用事件总线与聚合器配置
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub crypto: CryptoConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SL，分隔符：__
    /// 示例：SL__SERVER__PORT=9999
    ///
    /// A missing file is fine, a file that fails to parse or deserialize is
    /// an error. Nothing falls back to defaults silently.
    pub fn try_load(path: &str) -> crate::errors::Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize::<StaticConfig>()?)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// Base used when rendering created links. Falls back to the request Host.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

/// 链接生命周期配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_key_length")]
    pub key_length: usize,
    #[serde(default = "default_ttl_minutes")]
    pub default_ttl_minutes: i64,
    #[serde(default = "default_max_views")]
    pub default_max_views: u32,
    /// Consecutive key collisions tolerated before creation fails.
    #[serde(default = "default_max_key_attempts")]
    pub max_key_attempts: usize,
}

/// 加密配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// 32 bytes of key material, either base64 encoded or a raw 32-char string.
    #[serde(default = "default_crypto_key")]
    pub key: String,
}

impl CryptoConfig {
    /// The key shipped in the defaults is public, so secrets encrypted with
    /// it are not protected at rest.
    pub fn uses_builtin_key(&self) -> bool {
        self.key == DEFAULT_CRYPTO_KEY
    }
}

/// 使用事件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_events_enabled")]
    pub enabled: bool,
    #[serde(default = "default_new_links_topic")]
    pub new_links_topic: String,
    #[serde(default = "default_link_visits_topic")]
    pub link_visits_topic: String,
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_key_length() -> usize {
    8
}

fn default_ttl_minutes() -> i64 {
    60
}

fn default_max_views() -> u32 {
    1
}

fn default_max_key_attempts() -> usize {
    1000
}

const DEFAULT_CRYPTO_KEY: &str = "hello_this_is_32_symbols_string!";

fn default_crypto_key() -> String {
    DEFAULT_CRYPTO_KEY.to_string()
}

fn default_events_enabled() -> bool {
    true
}

fn default_new_links_topic() -> String {
    "new-links".to_string()
}

fn default_link_visits_topic() -> String {
    "link-visits".to_string()
}

fn default_group_id() -> String {
    "links-group".to_string()
}

fn default_poll_timeout_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            public_base_url: None,
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            key_length: default_key_length(),
            default_ttl_minutes: default_ttl_minutes(),
            default_max_views: default_max_views(),
            max_key_attempts: default_max_key_attempts(),
        }
    }
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            key: default_crypto_key(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: default_events_enabled(),
            new_links_topic: default_new_links_topic(),
            link_visits_topic: default_link_visits_topic(),
            group_id: default_group_id(),
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_link_contract() {
        let config = StaticConfig::default();
        assert_eq!(config.links.key_length, 8);
        assert_eq!(config.links.default_ttl_minutes, 60);
        assert_eq!(config.links.default_max_views, 1);
        assert_eq!(config.events.new_links_topic, "new-links");
        assert_eq!(config.events.link_visits_topic, "link-visits");
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[links]"));
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.server.port, 8080);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str("[links]\nkey_length = 12\n").unwrap();
        assert_eq!(parsed.links.key_length, 12);
        assert_eq!(parsed.links.default_max_views, 1);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_builtin_key_detection() {
        assert!(StaticConfig::default().crypto.uses_builtin_key());

        let parsed: StaticConfig =
            toml::from_str("[crypto]\nkey = \"operator_supplied_32_byte_key!!!\"\n").unwrap();
        assert!(!parsed.crypto.uses_builtin_key());
    }
}
