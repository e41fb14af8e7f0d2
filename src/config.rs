use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{lastfm::API_BASE, stats::forgotten::DEFAULT_ROOT};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub lastfm: LastFm,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub fetch: Fetch,
    #[serde(default)]
    pub report: Report,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| "Failed to parse config TOML")?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.report.forgotten_root >= 1,
            "report.forgotten_root must be at least 1, got {}",
            self.report.forgotten_root
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LastFm {
    pub username: String,
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    API_BASE.to_string()
}

/// Locations of the two JSON cache files. Relative paths are resolved
/// against the directory of the config file.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Cache {
    pub charts: PathBuf,
    pub track_info: PathBuf,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            charts: PathBuf::from("weekly_charts.json"),
            track_info: PathBuf::from("track_info.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Fetch {
    /// How many of the most recent weeks to download.
    pub weeks: usize,
}

impl Default for Fetch {
    fn default() -> Self {
        // two and a half years
        Self { weeks: 52 + 52 + 26 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Report {
    pub top: usize,
    pub forgotten_top: usize,
    pub forgotten_root: u32,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            top: 25,
            forgotten_top: 20,
            forgotten_root: DEFAULT_ROOT,
        }
    }
}
