//! Saved device configuration
//!
//! The stored form is a JSON list of the core's device descriptors. A
//! missing or unreadable file means "nothing to restore", never a hard
//! failure.

use std::fs;
use std::path::Path;

use anyhow::Context;
use rigsim_core::StoredDeviceConfig;
use tracing::warn;

/// Load stored device configs, treating absence or corruption as empty
pub fn load(path: &Path) -> Vec<StoredDeviceConfig> {
    let Ok(contents) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str(&contents) {
        Ok(configs) => configs,
        Err(e) => {
            warn!("ignoring invalid config file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Write stored device configs as pretty JSON
pub fn save(path: &Path, configs: &[StoredDeviceConfig]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(configs)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Remove the stored configuration entirely
pub fn clear(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("removing {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("rigsim-settings-{}-{}.json", std::process::id(), name))
    }

    #[test]
    fn test_roundtrip() {
        let path = temp_path("roundtrip");
        let configs = vec![StoredDeviceConfig {
            type_name: "yaesu".to_string(),
            uart_index: 1,
            option_bytes: vec![3, 0],
        }];

        save(&path, &configs).unwrap();
        assert_eq!(load(&path), configs);

        clear(&path).unwrap();
        assert!(load(&path).is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        assert!(load(Path::new("/nonexistent/rigsim.json")).is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json at all").unwrap();
        assert!(load(&path).is_empty());
        let _ = fs::remove_file(&path);
    }
}
