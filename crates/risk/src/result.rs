use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure prediction returned by the risk service.
///
/// Only the fields the optimizer consumes are modelled; the service may send
/// more (feature importances, explanations) and those are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    /// Probability of failure in \[0, 1\].
    pub failure_probability: f64,

    /// Optional health score (service convention: `100 - probability * 100`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,

    /// Optional coarse label (`low` | `medium` | `high` | `critical`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

impl RiskPrediction {
    pub fn new(failure_probability: f64) -> Self {
        Self {
            failure_probability,
            health_score: None,
            risk_level: None,
        }
    }

    pub fn with_health_score(mut self, health_score: f64) -> Self {
        self.health_score = Some(health_score);
        self
    }

    pub fn with_risk_level(mut self, risk_level: impl Into<String>) -> Self {
        self.risk_level = Some(risk_level.into());
        self
    }

    /// Rejects probabilities the optimizer cannot use.
    pub fn validated(self) -> Result<Self, RiskError> {
        let p = self.failure_probability;
        if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
            return Err(RiskError::InvalidResponse(format!(
                "failure_probability {p} outside [0, 1]"
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("risk service unavailable: {0}")]
    Unavailable(String),

    #[error("risk service timed out")]
    Timeout,

    #[error("risk service returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    #[error("invalid risk service response: {0}")]
    InvalidResponse(String),
}

impl RiskError {
    /// Whether a bounded retry may help (connection trouble, timeouts, 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            RiskError::Unavailable(_) | RiskError::Timeout => true,
            RiskError::Upstream { status, .. } => *status >= 500,
            RiskError::InvalidResponse(_) => false,
        }
    }
}
