use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5005;
const DEFAULT_MIN_RED_RATIO: f64 = 0.005;
const DEFAULT_DISPLAY_DIR: &str = "visiond-debug";

#[derive(Debug, Deserialize, Default)]
struct VisiondConfigFile {
    host: Option<String>,
    port: Option<u16>,
    min_red_ratio: Option<f64>,
    display: Option<bool>,
    display_dir: Option<PathBuf>,
}

/// Process configuration. Built once at startup, never mutated afterwards;
/// passed explicitly into the listener.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface the listener binds to.
    pub host: String,
    /// TCP port the listener binds to. Port 0 binds an ephemeral port.
    pub port: u16,
    /// Minimum red-area ratio that triggers movement, in [0, 1].
    pub min_red_ratio: f64,
    /// Enables the debug visualization sink.
    pub display: bool,
    /// Directory the debug sink writes blended frames into.
    pub display_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            min_red_ratio: DEFAULT_MIN_RED_RATIO,
            display: false,
            display_dir: PathBuf::from(DEFAULT_DISPLAY_DIR),
        }
    }
}

impl Config {
    /// Load configuration: optional JSON file named by `VISIOND_CONFIG`,
    /// then `VISIOND_*` environment overrides, then validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("VISIOND_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => read_config_file(Path::new(path))?,
            None => VisiondConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: VisiondConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            host: file.host.unwrap_or(defaults.host),
            port: file.port.unwrap_or(defaults.port),
            min_red_ratio: file.min_red_ratio.unwrap_or(defaults.min_red_ratio),
            display: file.display.unwrap_or(defaults.display),
            display_dir: file.display_dir.unwrap_or(defaults.display_dir),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("VISIOND_HOST") {
            if !host.trim().is_empty() {
                self.host = host;
            }
        }
        if let Ok(port) = std::env::var("VISIOND_PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow!("VISIOND_PORT must be a TCP port number"))?;
        }
        if let Ok(ratio) = std::env::var("VISIOND_MIN_RED_RATIO") {
            self.min_red_ratio = ratio
                .parse()
                .map_err(|_| anyhow!("VISIOND_MIN_RED_RATIO must be a number"))?;
        }
        if let Ok(display) = std::env::var("VISIOND_DISPLAY") {
            self.display = parse_bool(&display)
                .ok_or_else(|| anyhow!("VISIOND_DISPLAY must be true/false or 1/0"))?;
        }
        if let Ok(dir) = std::env::var("VISIOND_DISPLAY_DIR") {
            if !dir.trim().is_empty() {
                self.display_dir = PathBuf::from(dir);
            }
        }
        Ok(())
    }

    /// Reject configurations the server cannot run with. Called by `load`;
    /// call again after any override applied on top of a loaded config.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(anyhow!("bind host must not be empty"));
        }
        if !self.min_red_ratio.is_finite() || !(0.0..=1.0).contains(&self.min_red_ratio) {
            return Err(anyhow!(
                "min_red_ratio must be a fraction in [0, 1], got {}",
                self.min_red_ratio
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<VisiondConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
