use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

const MAX_STALE_AFTER_SECS: u64 = 86_400;

/// Runtime settings, read from the environment (a `.env` file is loaded by the binary).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    pub feed: FeedConfig,
    /// JSON file with `alerts`, `cameras` and `map_points` to load at startup.
    pub seed_file: Option<PathBuf>,
    /// Load the built-in sample site when no seed file is given.
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub channel_capacity: usize,
    /// Silence on the feed longer than this marks the connection stale.
    pub stale_after: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 100,
            stale_after: Duration::from_secs(60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            cors_origin: "http://localhost:3003".to_string(),
            feed: FeedConfig::default(),
            seed_file: None,
            seed_demo_data: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let bind_addr = parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?;
        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin);
        let channel_capacity = parse_or(&lookup, "FEED_CHANNEL_CAPACITY", defaults.feed.channel_capacity)?;
        if channel_capacity == 0 {
            return Err(Error::Config("FEED_CHANNEL_CAPACITY must be at least 1".into()));
        }
        let stale_secs = parse_or(&lookup, "FEED_STALE_AFTER_SECS", defaults.feed.stale_after.as_secs())?;
        if stale_secs == 0 || stale_secs > MAX_STALE_AFTER_SECS {
            return Err(Error::Config(format!(
                "FEED_STALE_AFTER_SECS must be between 1 and {}",
                MAX_STALE_AFTER_SECS
            )));
        }
        let seed_file = lookup("SEED_FILE").filter(|s| !s.is_empty()).map(PathBuf::from);
        let seed_demo_data = parse_or(&lookup, "SEED_DEMO_DATA", defaults.seed_demo_data)?;

        Ok(Self {
            bind_addr,
            cors_origin,
            feed: FeedConfig {
                channel_capacity,
                stale_after: Duration::from_secs(stale_secs),
            },
            seed_file,
            seed_demo_data,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| Error::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}
