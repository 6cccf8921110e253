//! Config module - Manages Voider configuration (voider.toml).
//!
//! Configuration file contains:
//! - Void directory and active file name
//! - Overlay appearance (opacity, ring, font)

use crate::error::{Result, VoidError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured void directory.
pub const VOID_DIR_ENV: &str = "VOIDER_DIR";

/// Overlay appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Window opacity between 0.0 and 1.0
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Ring stroke width in pixels
    #[serde(default = "default_ring_thickness")]
    pub ring_thickness: u32,
    /// Gap between the ring and the screen edge
    #[serde(default = "default_ring_margin")]
    pub ring_margin: u32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Horizontal padding subtracted from the ring diameter for the entry field
    #[serde(default = "default_entry_padding")]
    pub entry_padding: u32,
}

fn default_opacity() -> f64 {
    0.5
}

fn default_ring_thickness() -> u32 {
    10
}

fn default_ring_margin() -> u32 {
    25
}

fn default_font_family() -> String {
    "Consolas".to_string()
}

fn default_font_size() -> u32 {
    11
}

fn default_entry_padding() -> u32 {
    20
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            opacity: default_opacity(),
            ring_thickness: default_ring_thickness(),
            ring_margin: default_ring_margin(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            entry_padding: default_entry_padding(),
        }
    }
}

/// Main Voider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Config version (for future migrations)
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding the void's .txt files
    #[serde(default = "default_void_dir")]
    pub void_dir: PathBuf,

    /// File that receives new fragments
    #[serde(default = "default_active_file")]
    pub active_file: String,

    #[serde(default)]
    pub overlay: OverlayConfig,
}

fn default_version() -> u32 {
    1
}

fn default_active_file() -> String {
    "0.txt".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            void_dir: default_void_dir(),
            active_file: default_active_file(),
            overlay: OverlayConfig::default(),
        }
    }
}

/// Get default void path.
pub fn default_void_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("voider").join("void"))
        .unwrap_or_else(|| PathBuf::from("./void"))
}

/// Get default config directory (~/.config/voider/).
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("voider"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get default config file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("voider.toml")
}

impl Config {
    /// Create new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config with specific void directory.
    pub fn with_void_dir(void_dir: PathBuf) -> Self {
        Self {
            void_dir,
            ..Self::default()
        }
    }

    /// Load config from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| VoidError::io(path, e))?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            VoidError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load config from `path`, or defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from default path.
    pub fn load_default() -> Result<Self> {
        Self::load_or_default(&default_config_path())
    }

    /// Load the default config and apply the `VOIDER_DIR` override.
    pub fn resolve() -> Result<Self> {
        Self::resolve_from(&default_config_path())
    }

    /// Load the config at `path` and apply the `VOIDER_DIR` override.
    pub fn resolve_from(path: &Path) -> Result<Self> {
        let mut config = Self::load_or_default(path)?;
        if let Some(dir) = std::env::var_os(VOID_DIR_ENV) {
            config.void_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Save config to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| VoidError::io(parent, e))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| VoidError::Config(format!("cannot serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| VoidError::io(path, e))?;

        // Restrict file permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| VoidError::io(path, e))?;
        }

        Ok(())
    }

    /// Save config to default path.
    pub fn save_default(&self) -> Result<PathBuf> {
        let path = default_config_path();
        self.save(&path)?;
        Ok(path)
    }

    /// Reject values the void cannot work with.
    pub fn validate(&self) -> Result<()> {
        let name = self.active_file.as_str();
        let bare = Path::new(name)
            .file_name()
            .is_some_and(|f| f == std::ffi::OsStr::new(name));
        if !bare || !name.ends_with(".txt") || name == ".txt" {
            return Err(VoidError::InvalidConfig(format!(
                "active_file must be a bare .txt file name, got {:?}",
                name
            )));
        }

        if !(0.0..=1.0).contains(&self.overlay.opacity) {
            return Err(VoidError::InvalidConfig(format!(
                "overlay.opacity must be within 0.0..=1.0, got {}",
                self.overlay.opacity
            )));
        }

        Ok(())
    }
}
