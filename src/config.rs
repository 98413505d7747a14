use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub api_url: String,
    pub message_ttl: Duration,
    pub redirect_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".into(),
            message_ttl: Duration::from_secs(3),
            redirect_delay: Duration::from_secs(3),
        }
    }
}

impl EngineConfig {
    pub fn load() -> Self {
        Self::load_with(|key| env::var(key).ok())
    }

    /// Load through `lookup` instead of the process environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: try_load(&lookup, "BOOKING_API_URL", "http://localhost:3000".to_string()),
            message_ttl: Duration::from_millis(try_load(&lookup, "BOOKING_MESSAGE_TTL_MS", 3000)),
            redirect_delay: Duration::from_millis(try_load(
                &lookup,
                "BOOKING_REDIRECT_DELAY_MS",
                3000,
            )),
        }
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value `{raw}`: {e}, using default: {default}");
        default
    })
}
