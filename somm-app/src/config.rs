//! Simple configuration persistence for somm
//!
//! Stores crossfade tuning and the default recommendation size.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use somm_engine::TransitionMode;

/// Application configuration
#[derive(Debug)]
pub struct Config {
    /// Crossfader position that commits a manual transition
    pub manual_threshold: f64,
    /// Seconds of track remaining that arms the auto-mix trigger
    pub auto_trigger_seconds: f64,
    /// Default recommendation batch size
    pub target_count: usize,
    /// Transition style applied at startup
    pub mode: TransitionMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manual_threshold: 0.85,
            auto_trigger_seconds: 10.0,
            target_count: 12,
            mode: TransitionMode::Smooth,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("somm")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                match key {
                    "manual_threshold" => {
                        if let Ok(v) = value.parse::<f64>() {
                            if (0.5..=1.0).contains(&v) {
                                config.manual_threshold = v;
                            }
                        }
                    }
                    "auto_trigger_seconds" => {
                        if let Ok(v) = value.parse::<f64>() {
                            if v > 0.0 {
                                config.auto_trigger_seconds = v;
                            }
                        }
                    }
                    "target_count" => {
                        if let Ok(v) = value.parse::<usize>() {
                            config.target_count = v;
                        }
                    }
                    "mode" => {
                        config.mode = match value {
                            "instant" => TransitionMode::Instant,
                            "smooth" => TransitionMode::Smooth,
                            "automix" => TransitionMode::AutoMix,
                            _ => config.mode,
                        };
                    }
                    _ => {} // Ignore unknown keys
                }
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let mode = match self.mode {
            TransitionMode::Instant => "instant",
            TransitionMode::Smooth => "smooth",
            TransitionMode::AutoMix => "automix",
        };
        [
            "# somm configuration".to_string(),
            format!("manual_threshold={}", self.manual_threshold),
            format!("auto_trigger_seconds={}", self.auto_trigger_seconds),
            format!("target_count={}", self.target_count),
            format!("mode={mode}"),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_gives_defaults() {
        let config = Config::parse("");
        assert_eq!(config.manual_threshold, 0.85);
        assert_eq!(config.auto_trigger_seconds, 10.0);
        assert_eq!(config.mode, TransitionMode::Smooth);
    }

    #[test]
    fn test_parse_with_values() {
        let content = "# tuned\nmanual_threshold=0.9\nauto_trigger_seconds=15\nmode=automix";
        let config = Config::parse(content);
        assert_eq!(config.manual_threshold, 0.9);
        assert_eq!(config.auto_trigger_seconds, 15.0);
        assert_eq!(config.mode, TransitionMode::AutoMix);
    }

    #[test]
    fn test_parse_rejects_out_of_range_threshold() {
        let config = Config::parse("manual_threshold=1.4");
        assert_eq!(config.manual_threshold, 0.85);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config {
            manual_threshold: 0.9,
            auto_trigger_seconds: 8.0,
            target_count: 20,
            mode: TransitionMode::Instant,
        };

        let serialized = config.serialize();
        let parsed = Config::parse(&serialized);

        assert_eq!(parsed.manual_threshold, config.manual_threshold);
        assert_eq!(parsed.auto_trigger_seconds, config.auto_trigger_seconds);
        assert_eq!(parsed.target_count, config.target_count);
        assert_eq!(parsed.mode, config.mode);
    }
}
