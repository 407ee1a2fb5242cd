//! Optional TOML configuration
//!
//! ```toml
//! device = "/dev/dri/card1"
//! show_objects = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Card node to open when none is given on the command line
    pub device: Option<PathBuf>,
    /// Also list every CRTC, plane and framebuffer after the mode report
    pub show_objects: bool,
}

impl Config {
    pub fn from_toml(path: &Path, contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from an explicit path; the file must exist
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &contents)
    }

    /// Load from the default location, falling back to defaults if absent
    pub fn load_default() -> Result<Self> {
        let Some(path) = default_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file");
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "Loading config");
        Self::load(&path)
    }
}

/// `$XDG_CONFIG_HOME/kmsprint/config.toml`, or `~/.config/kmsprint/config.toml`
pub fn default_path() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()
        .map(|dir| dir.join("kmsprint").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = Config::from_toml(Path::new("config.toml"), "").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            Path::new("config.toml"),
            "device = \"/dev/dri/card1\"\nshow_objects = true\n",
        )
        .unwrap();
        assert_eq!(config.device, Some(PathBuf::from("/dev/dri/card1")));
        assert!(config.show_objects);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Config::from_toml(Path::new("config.toml"), "devcie = \"x\"").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_missing_explicit_file() {
        assert!(Config::load(Path::new("/nonexistent/kmsprint.toml")).is_err());
    }
}
