pub mod ask;
pub mod doctor;
pub mod onboard;
pub mod sql;

use sahayak_config::AppConfig;
use std::path::{Path, PathBuf};

/// The config file in use: `--config`, else the default location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load config with environment overrides applied.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_path(explicit);
    AppConfig::load_with_env(&path)
        .map_err(|e| format!("Failed to load config from {}: {e}", path.display()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = config_path(Some(Path::new("/tmp/plant.toml")));
        assert_eq!(path, PathBuf::from("/tmp/plant.toml"));
    }

    #[test]
    fn default_path_is_under_config_dir() {
        let path = config_path(None);
        assert!(path.ends_with(".sahayak/config.toml"));
    }
}
