//! Environment-driven service configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, ensure};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_RISK_SERVICE_URL: &str = "http://localhost:8000";
const DEFAULT_RISK_TIMEOUT_MS: u64 = 5000;
const DEFAULT_RISK_MAX_RETRIES: u32 = 1;
const DEFAULT_DOWNTIME_COST_PER_HOUR: f64 = 8000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub port: u16,
    /// Base URL of the failure-prediction service.
    pub risk_service_url: String,
    /// Per-attempt timeout for predictor calls.
    pub risk_timeout: Duration,
    /// Retries after a transient predictor failure. At most 1.
    pub risk_max_retries: u32,
    /// Used when a request omits `costs.downtime_cost_per_hour`.
    pub downtime_cost_per_hour: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            risk_service_url: DEFAULT_RISK_SERVICE_URL.to_string(),
            risk_timeout: Duration::from_millis(DEFAULT_RISK_TIMEOUT_MS),
            risk_max_retries: DEFAULT_RISK_MAX_RETRIES,
            downtime_cost_per_hour: DEFAULT_DOWNTIME_COST_PER_HOUR,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let risk_service_url = match lookup("RISK_SERVICE_URL") {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => {
                warn!(default = DEFAULT_RISK_SERVICE_URL, "RISK_SERVICE_URL not set; using default");
                DEFAULT_RISK_SERVICE_URL.to_string()
            }
        };

        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let timeout_ms = parse_var(&lookup, "RISK_TIMEOUT_MS", DEFAULT_RISK_TIMEOUT_MS)?;
        let risk_max_retries = parse_var(&lookup, "RISK_MAX_RETRIES", DEFAULT_RISK_MAX_RETRIES)?.min(1);
        let downtime_cost_per_hour =
            parse_var(&lookup, "DOWNTIME_COST_PER_HOUR", DEFAULT_DOWNTIME_COST_PER_HOUR)?;

        ensure!(timeout_ms > 0, "RISK_TIMEOUT_MS must be positive");
        ensure!(
            downtime_cost_per_hour.is_finite() && downtime_cost_per_hour >= 0.0,
            "DOWNTIME_COST_PER_HOUR must be a non-negative number, got {downtime_cost_per_hour}"
        );

        Ok(Self {
            port,
            risk_service_url,
            risk_timeout: Duration::from_millis(timeout_ms),
            risk_max_retries,
            downtime_cost_per_hour,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(config(&[]).unwrap(), ApiConfig::default());
    }

    #[test]
    fn values_are_read_and_retries_clamped() {
        let c = config(&[
            ("PORT", "9090"),
            ("RISK_SERVICE_URL", "http://risk:8000/"),
            ("RISK_TIMEOUT_MS", "250"),
            ("RISK_MAX_RETRIES", "5"),
            ("DOWNTIME_COST_PER_HOUR", "12000.5"),
        ])
        .unwrap();

        assert_eq!(c.port, 9090);
        assert_eq!(c.risk_service_url, "http://risk:8000/");
        assert_eq!(c.risk_timeout, Duration::from_millis(250));
        assert_eq!(c.risk_max_retries, 1);
        assert_eq!(c.downtime_cost_per_hour, 12000.5);
        assert_eq!(c.bind_addr().to_string(), "0.0.0.0:9090");
    }

    #[test]
    fn unparseable_values_fail() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        assert!(config(&[("DOWNTIME_COST_PER_HOUR", "-1")]).is_err());
        assert!(config(&[("RISK_TIMEOUT_MS", "0")]).is_err());
    }
}
