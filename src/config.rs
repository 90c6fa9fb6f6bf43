use std::env;
use std::time::Duration;
use std::num::NonZeroU32;
use std::str::FromStr;
use governor::Quota;

pub const DEFAULT_EXEC_URL: &str = "http://127.0.0.1:8001/api/exec/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportConfig {
    /// Source RCON straight to the game server.
    Rcon { address: String, password: String },
    /// HTTP exec tunnel taking `{"cmd": ...}` posts.
    ExecUrl(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,

    pub transport: TransportConfig,
    pub remote_timeout_secs: u64,

    // Rate limiting of the status endpoint
    pub status_period_secs: u64,
    pub status_burst_limit: u32,

    pub status_cache_max_age: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            transport: TransportConfig::ExecUrl(DEFAULT_EXEC_URL.to_string()),
            remote_timeout_secs: 10,
            status_period_secs: 1,
            status_burst_limit: 10,
            status_cache_max_age: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let transport = match lookup("CSGO_RCON_ADDRESS").filter(|v| !v.is_empty()) {
            Some(address) => TransportConfig::Rcon {
                address,
                password: lookup("CSGO_RCON_PASSWORD").unwrap_or_default(),
            },
            None => TransportConfig::ExecUrl(
                lookup("CSGO_EXEC_URL")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_EXEC_URL.to_string()),
            ),
        };

        Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),

            transport,
            remote_timeout_secs: parsed::<u64, _>(&lookup, "REMOTE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.remote_timeout_secs),

            status_period_secs: parsed(&lookup, "STATUS_PERIOD_SECS")
                .unwrap_or(defaults.status_period_secs),

            status_burst_limit: parsed(&lookup, "STATUS_BURST_LIMIT")
                .unwrap_or(defaults.status_burst_limit),

            status_cache_max_age: parsed(&lookup, "STATUS_CACHE_MAX_AGE")
                .unwrap_or(defaults.status_cache_max_age),
        }
    }

    pub fn bind(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn status_quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.status_burst_limit).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(Duration::from_secs(self.status_period_secs))
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
