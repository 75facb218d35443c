use std::time::Duration;

use super::environment::{get_env_var_duration, get_env_var_parse};

/// Runtime settings, loaded once at startup. Every field has a baked-in
/// default so the service starts with an empty environment.
#[derive(Clone, Debug)]
pub struct HealthConfig {
    /// How long a cached status is served without scheduling a refresh.
    /// Also the poll interval of a healthy monitor.
    pub check_interval: Duration,
    /// Ready polls in a row before a monitor stops on its own.
    pub consec_healthy: u32,
    /// Failing polls in a row before a monitor publishes the terminal
    /// failure and stops.
    pub consec_failed: u32,
    /// Kubernetes API calls per second shared by all monitors.
    pub limiter_rate: u32,
    /// Burst capacity of the shared limiter.
    pub limiter_burst: u32,
    /// Added to the poll delay after each failing poll.
    pub increase_interval: Duration,
    /// How often a still-running monitor logs that a ready resource is
    /// being rechecked.
    pub ready_check_interval: Duration,
    /// Wait before a freshly spawned monitor runs its first poll.
    pub initial_delay: Duration,
    /// Port the HTTP facade binds on.
    pub http_port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(25),
            consec_healthy: 4,
            consec_failed: 3,
            limiter_rate: 10,
            limiter_burst: 20,
            increase_interval: Duration::from_secs(15),
            ready_check_interval: Duration::from_secs(60),
            initial_delay: Duration::from_secs(10),
            http_port: 8080,
        }
    }
}

impl HealthConfig {
    pub fn load_from_env() -> Self {
        let d = Self::default();
        Self {
            check_interval: get_env_var_duration("CHECK_INTERVAL", d.check_interval),
            consec_healthy: get_env_var_parse("CONSEC_HEALTHY", d.consec_healthy),
            consec_failed: get_env_var_parse("CONSEC_FAILED", d.consec_failed),
            limiter_rate: get_env_var_parse("LIMITER_RATE", d.limiter_rate),
            limiter_burst: get_env_var_parse("LIMITER_BURST", d.limiter_burst),
            increase_interval: get_env_var_duration(
                "INCREASE_INTERVAL_VALUE",
                d.increase_interval,
            ),
            ready_check_interval: get_env_var_duration(
                "READY_CHECK_INTERVAL",
                d.ready_check_interval,
            ),
            initial_delay: get_env_var_duration("INITIAL_DELAY", d.initial_delay),
            http_port: get_env_var_parse("HTTP_PORT", d.http_port),
        }
    }
}
