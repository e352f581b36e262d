use std::sync::Arc;
use std::time::Duration;

use forgeline_risk::{HttpRiskPredictor, HttpRiskPredictorConfig, PredictorHealth};
use forgeline_scheduling::{CostParams, Enrichment, Optimizer};
use tracing::info;

use crate::config::ApiConfig;

/// Shared, immutable per-process services. Runs keep no state here.
#[derive(Debug, Clone)]
pub struct AppServices {
    /// Full variant: weights used as given.
    pub optimizer: Optimizer,
    pub enrichment: Enrichment,
    /// Probed by the predictor health route; `None` when no HTTP predictor is wired.
    pub predictor: Option<Arc<HttpRiskPredictor>>,
    pub default_costs: CostParams,
}

impl AppServices {
    pub fn new(enrichment: Enrichment, default_costs: CostParams) -> Self {
        Self {
            optimizer: Optimizer::new(),
            enrichment,
            predictor: None,
            default_costs,
        }
    }

    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let predictor = Arc::new(HttpRiskPredictor::new(
            HttpRiskPredictorConfig::default()
                .with_base_url(config.risk_service_url.clone())
                .with_timeout(config.risk_timeout)
                .with_max_retries(config.risk_max_retries),
        )?);

        // The outer bound covers every attempt plus the retry pause.
        let call_timeout = config.risk_timeout * (config.risk_max_retries + 1) + Duration::from_millis(250);
        let enrichment = Enrichment::external(predictor.clone()).with_call_timeout(call_timeout);

        info!(
            url = predictor.base_url(),
            attempt_timeout_ms = u64::try_from(config.risk_timeout.as_millis()).unwrap_or(u64::MAX),
            retries = config.risk_max_retries,
            "risk predictor configured"
        );

        let mut services = Self::new(enrichment, CostParams::new(config.downtime_cost_per_hour));
        services.predictor = Some(predictor);
        Ok(services)
    }

    pub async fn predictor_health(&self) -> PredictorHealth {
        match &self.predictor {
            Some(p) => p.health_check().await,
            None => PredictorHealth {
                status: "unhealthy",
                data: None,
                error: Some("risk predictor not configured".to_string()),
            },
        }
    }
}
