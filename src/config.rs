// src/config.rs
//! Service configuration: TOML file, then environment overrides, then sanity clamps.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::analyze::matcher::DEFAULT_MATCH_THRESHOLD;
use crate::ingest::normalize::DEFAULT_SUMMARY_MAX_CHARS;
use crate::ingest::types::FeedOutlet;
use crate::timeline::aggregate::DEFAULT_MAX_TIMELINE_SIZE;
use crate::timeline::artists::default_artists;
use crate::timeline::cache::DEFAULT_FRESHNESS_DAYS;
use crate::timeline::scheduler::{DEFAULT_STALENESS_SECS, DEFAULT_TICK_SECS};

// --- env defaults & names ---
pub const DEFAULT_TIMELINE_CONFIG_PATH: &str = "config/timeline.toml";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_STATE_DIR: &str = "state";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

pub const ENV_TIMELINE_CONFIG_PATH: &str = "TIMELINE_CONFIG_PATH";
pub const ENV_BIND_ADDR: &str = "TIMELINE_BIND_ADDR";
pub const ENV_STATE_DIR: &str = "TIMELINE_STATE_DIR";
pub const ENV_CONCERTS_API_KEY: &str = "CONCERTS_API_KEY";
pub const ENV_REFRESH_INTERVAL_SECS: &str = "TIMELINE_REFRESH_INTERVAL_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub bind_addr: String,
    pub state_dir: PathBuf,
    pub refresh: RefreshConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub concerts: ConcertsConfig,
    pub artists: ArtistsConfig,
    pub news: NewsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// A successful refresh stays good this long.
    pub staleness_secs: u64,
    /// Scheduler tick.
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub freshness_days: i64,
    pub max_timeline_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcertsConfig {
    pub name: String,
    /// Search endpoint. Unset means concerts are unavailable.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub limit: u32,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistsConfig {
    /// Followed-artists endpoint (GET, JSON array).
    pub endpoint: Option<String>,
    pub defaults: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub outlets: Vec<FeedOutlet>,
    pub summary_max_chars: usize,
    pub match_threshold: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            refresh: RefreshConfig::default(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
            concerts: ConcertsConfig::default(),
            artists: ArtistsConfig::default(),
            news: NewsConfig::default(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            staleness_secs: DEFAULT_STALENESS_SECS,
            interval_secs: DEFAULT_TICK_SECS,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_days: DEFAULT_FRESHNESS_DAYS,
            max_timeline_size: DEFAULT_MAX_TIMELINE_SIZE,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Default for ConcertsConfig {
    fn default() -> Self {
        Self {
            name: "Concerts".to_string(),
            endpoint: None,
            api_key: None,
            limit: 50,
            location: None,
        }
    }
}

impl Default for ArtistsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            defaults: default_artists(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            outlets: default_outlets(),
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

pub fn default_outlets() -> Vec<FeedOutlet> {
    [
        ("Soompi", "https://www.soompi.com/feed"),
        ("Allkpop", "https://www.allkpop.com/feed"),
        ("Koreaboo", "https://www.koreaboo.com/feed/"),
    ]
    .into_iter()
    .map(|(name, url)| FeedOutlet {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}

impl TimelineConfig {
    /// Loads `$TIMELINE_CONFIG_PATH` (or `config/timeline.toml`), then applies env overrides.
    /// A missing file means defaults; an unreadable or invalid one is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_TIMELINE_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TIMELINE_CONFIG_PATH));

        let mut cfg = Self::from_path(&path)?;
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .with_context(|| format!("parsing timeline config at {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no timeline config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e)
                .with_context(|| format!("reading timeline config at {}", path.display())),
        }
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Env wins over the file. `lookup` is injectable for tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(addr) = set(ENV_BIND_ADDR) {
            self.bind_addr = addr;
        }
        if let Some(dir) = set(ENV_STATE_DIR) {
            self.state_dir = PathBuf::from(dir);
        }
        if let Some(key) = set(ENV_CONCERTS_API_KEY) {
            self.concerts.api_key = Some(key);
        }
        if let Some(secs) = parse_secs_env(set(ENV_REFRESH_INTERVAL_SECS)) {
            self.refresh.interval_secs = secs;
        }
    }

    fn sanitize(&mut self) {
        self.refresh.interval_secs = self.refresh.interval_secs.max(1);
        self.http.timeout_secs = self.http.timeout_secs.max(1);
        self.cache.max_timeline_size = self.cache.max_timeline_size.max(1);
        if !(0.0..=1.0).contains(&self.news.match_threshold) {
            self.news.match_threshold = DEFAULT_MATCH_THRESHOLD;
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

fn parse_secs_env(raw: Option<String>) -> Option<u64> {
    raw?.parse::<u64>().ok().filter(|s| *s > 0)
}
