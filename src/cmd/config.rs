//! `config` - inspect or update the persisted store

use crate::config::{StoredConfig, DEFAULT_HOST};
use crate::Result;
use std::path::Path;

/// Apply mutations (persisted immediately) and/or report stored values.
/// With no mutation the command behaves as `--show`.
pub fn run(path: &Path, host: Option<String>, secret: Option<String>, show: bool) -> Result<()> {
    let mut stored = StoredConfig::load(path);
    let changed = host.is_some() || secret.is_some();

    if let Some(host) = host {
        stored.host = Some(host);
    }
    if let Some(secret) = secret {
        stored.secret = Some(secret);
    }
    if changed {
        stored.save(path)?;
        println!("saved configuration to {}", path.display());
    }

    if show || !changed {
        // Stored tier or built-in default only; this invocation's flags
        // and environment are deliberately not consulted.
        println!("host: {}", stored.host.as_deref().unwrap_or(DEFAULT_HOST));
        println!(
            "secret: {}",
            stored
                .secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("(empty)")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mihomo-ctl").join("config.json");

        run(&path, Some("10.0.0.2:9090".to_string()), Some("tok".to_string()), false).unwrap();

        let stored = StoredConfig::load(&path);
        assert_eq!(stored.host.as_deref(), Some("10.0.0.2:9090"));
        assert_eq!(stored.secret.as_deref(), Some("tok"));
    }

    #[test]
    fn test_partial_update_keeps_other_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        run(&path, Some("10.0.0.2:9090".to_string()), None, false).unwrap();
        run(&path, None, Some("tok".to_string()), false).unwrap();

        let stored = StoredConfig::load(&path);
        assert_eq!(stored.host.as_deref(), Some("10.0.0.2:9090"));
        assert_eq!(stored.secret.as_deref(), Some("tok"));
    }

    #[test]
    fn test_show_without_store_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        run(&path, None, None, true).unwrap();
        assert!(!path.exists());
    }
}
