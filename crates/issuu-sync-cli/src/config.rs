use std::path::PathBuf;

/// Environment variable that overrides the default config location.
pub const CONFIG_ENV: &str = "ISSUU_SYNC_CONFIG";

/// Default config file path: `~/.config/issuu-sync/issuu.yml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("issuu-sync").join("issuu.yml"))
}

/// Pick the config file: the `--config` flag, then `$ISSUU_SYNC_CONFIG`,
/// then the default location.
pub fn resolve_config_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .or_else(default_config_path)
}
