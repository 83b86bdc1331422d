use std::env;
use std::path::PathBuf;

/// Path of an additional log file, logs always go to stderr
pub const LOG_FILE_ENV: &str = "SCALER_PLUGIN_LOG_FILE";
/// Filter directive used instead of `RUST_LOG`, e.g. `scaler_plugin=debug`
pub const LOG_FILTER_ENV: &str = "SCALER_PLUGIN_LOG";

/// Plugin settings read from the host process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    pub log_file: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl PluginConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        Self {
            log_file: non_empty(LOG_FILE_ENV).map(PathBuf::from),
            log_filter: non_empty(LOG_FILTER_ENV),
        }
    }
}
