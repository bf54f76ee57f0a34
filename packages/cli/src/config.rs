use anyhow::{Context, Result};
use arbor_reconciler::config::DEFAULT_CONFIG_NAME;
use arbor_reconciler::RendererConfig;
use std::path::{Path, PathBuf};

/// Load the renderer config: an explicit path must exist, otherwise
/// `arbor.config.json` in `cwd` is used when present.
pub fn load_config(cwd: &str, explicit: Option<&Path>) -> Result<RendererConfig> {
    let config_path = match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            path.to_path_buf()
        }
        None => PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME),
    };

    RendererConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        let config = load_config(&cwd, None).unwrap();
        assert_eq!(config, RendererConfig::default());
    }

    #[test]
    fn test_picks_up_config_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "useVirtualDOM": true, "maxBatchSize": 8 }"#,
        )
        .unwrap();

        let config = load_config(&dir.path().display().to_string(), None).unwrap();
        assert!(config.use_virtual_dom);
        assert_eq!(config.max_batch_size, 8);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");

        assert!(load_config(".", Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "maxBatchSize": 0 }"#).unwrap();

        assert!(load_config(".", Some(&path)).is_err());
    }
}
