use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;
use crate::errors::Result;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults when
/// [`init_config`] was never called (tests, benches).
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from `path`, layered under `SL__*` environment
/// variables. A missing file means defaults; an invalid one is returned as
/// an error and leaves the global untouched. Only the first successful call
/// has any effect.
///
/// # Examples
/// ```no_run
/// use secretlinks::config::init_config;
/// let config = init_config("config.toml").expect("valid configuration");
/// ```
pub fn init_config(path: &str) -> Result<Arc<StaticConfig>> {
    let config = StaticConfig::try_load(path)?;
    if std::path::Path::new(path).exists() {
        eprintln!("[INFO] Configuration loaded from: {}", path);
    }
    CONFIG.get_or_init(|| ArcSwap::from_pointee(config));
    Ok(get_config())
}
