//! HTTP client for the failure-prediction service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::predictor::{RiskPredictor, SensorData};
use crate::result::{RiskError, RiskPrediction};

/// Connection settings for [`HttpRiskPredictor`].
#[derive(Debug, Clone)]
pub struct HttpRiskPredictorConfig {
    /// Base URL of the service, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Extra attempts after a transient failure (0 or 1 in practice).
    pub max_retries: u32,
    /// Pause before a retry.
    pub retry_backoff: Duration,
}

impl Default for HttpRiskPredictorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 1,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

impl HttpRiskPredictorConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Result of probing the service's `/health` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictorHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Serialize)]
struct FailurePredictionRequest<'a> {
    equipment_id: &'a str,
    #[serde(flatten)]
    features: &'a SensorData,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Predictor backed by `POST {base_url}/predict/failure`.
#[derive(Debug, Clone)]
pub struct HttpRiskPredictor {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpRiskPredictor {
    pub fn new(config: HttpRiskPredictorConfig) -> Result<Self, RiskError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RiskError::Unavailable(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the service; never fails, reports `unhealthy` instead.
    pub async fn health_check(&self) -> PredictorHealth {
        let res = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match res {
            Ok(r) => PredictorHealth {
                status: "healthy",
                data: r.json::<serde_json::Value>().await.ok(),
                error: None,
            },
            Err(e) => PredictorHealth {
                status: "unhealthy",
                data: None,
                error: Some(e.to_string()),
            },
        }
    }

    async fn predict_once(
        &self,
        machine_id: &str,
        features: &SensorData,
    ) -> Result<RiskPrediction, RiskError> {
        let body = FailurePredictionRequest {
            equipment_id: machine_id,
            features,
        };

        let res = self
            .client
            .post(format!("{}/predict/failure", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or(text);
            return Err(RiskError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        res.json::<RiskPrediction>()
            .await
            .map_err(|e| RiskError::InvalidResponse(e.to_string()))?
            .validated()
    }
}

#[async_trait]
impl RiskPredictor for HttpRiskPredictor {
    async fn predict(
        &self,
        machine_id: &str,
        features: &SensorData,
    ) -> Result<RiskPrediction, RiskError> {
        let mut attempt: u32 = 0;
        loop {
            match self.predict_once(machine_id, features).await {
                Ok(p) => {
                    debug!(machine = machine_id, attempt, probability = p.failure_probability, "risk prediction received");
                    return Ok(p);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(machine = machine_id, attempt, error = %e, "risk prediction failed; retrying");
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> RiskError {
    if e.is_timeout() {
        RiskError::Timeout
    } else if e.is_decode() {
        RiskError::InvalidResponse(e.to_string())
    } else {
        RiskError::Unavailable(e.to_string())
    }
}
