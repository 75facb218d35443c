//! Environment variable helpers. A missing or malformed value falls back to
//! the caller-supplied default without surfacing an error.

use std::env;
use std::time::Duration;

pub fn get_env_var_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Debug,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub fn get_env_var_duration(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| parse_duration(&v))
        .unwrap_or(default)
}

/// Parse a duration written as a non-negative integer with a unit suffix:
/// "250ms", "30s", "10m", "2h". Anything else yields `None`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(v) = s.strip_suffix("ms") {
        return v.parse::<u64>().ok().map(Duration::from_millis);
    }
    if let Some(v) = s.strip_suffix('s') {
        return v.parse::<u64>().ok().map(Duration::from_secs);
    }
    if let Some(v) = s.strip_suffix('m') {
        return v.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60));
    }
    if let Some(v) = s.strip_suffix('h') {
        return v.parse::<u64>().ok().map(|h| Duration::from_secs(h * 3600));
    }
    None
}
