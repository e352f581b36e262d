//! Risk enrichment: resolve machine failure probabilities before scoring.
//!
//! The only IO in the pipeline. Machines with sensor data are sent to the
//! predictor concurrently (one task each, bounded by a per-call timeout) and
//! merged back in input order. Failures never abort the run: the machine
//! keeps whatever probability it arrived with.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use forgeline_risk::{RiskError, RiskPredictor};

use crate::model::Machine;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Enrichment strategy for a run.
#[derive(Clone, Default)]
pub enum Enrichment {
    /// Use supplied probabilities as-is.
    #[default]
    Disabled,
    /// Ask an external predictor for machines that carry sensor data.
    External {
        predictor: Arc<dyn RiskPredictor>,
        call_timeout: Duration,
    },
}

impl Enrichment {
    pub fn external(predictor: Arc<dyn RiskPredictor>) -> Self {
        Self::External {
            predictor,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(self, timeout: Duration) -> Self {
        match self {
            Self::External { predictor, .. } => Self::External {
                predictor,
                call_timeout: timeout,
            },
            Self::Disabled => Self::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::External { .. })
    }
}

impl core::fmt::Debug for Enrichment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::External { call_timeout, .. } => f
                .debug_struct("External")
                .field("call_timeout", call_timeout)
                .finish_non_exhaustive(),
        }
    }
}

/// Return `machines` with failure probabilities resolved per `enrichment`.
pub async fn enrich_machines(mut machines: Vec<Machine>, enrichment: &Enrichment) -> Vec<Machine> {
    let (predictor, call_timeout) = match enrichment {
        Enrichment::Disabled => return machines,
        Enrichment::External {
            predictor,
            call_timeout,
        } => (predictor, *call_timeout),
    };

    let mut handles = Vec::new();
    for (idx, machine) in machines.iter().enumerate() {
        let Some(features) = machine.sensor_data.clone() else {
            continue;
        };
        let predictor = Arc::clone(predictor);
        let machine_id = machine.id.to_string();

        let handle = tokio::spawn(async move {
            match tokio::time::timeout(call_timeout, predictor.predict(&machine_id, &features)).await {
                Ok(res) => res.and_then(|p| p.validated()),
                Err(_) => Err(RiskError::Timeout),
            }
        });
        handles.push((idx, handle));
    }

    for (idx, handle) in handles {
        let machine = &mut machines[idx];
        match handle.await {
            Ok(Ok(prediction)) => {
                debug!(
                    machine = %machine.id,
                    probability = prediction.failure_probability,
                    "machine risk enriched"
                );
                machine.apply_prediction(prediction);
            }
            Ok(Err(e)) => {
                warn!(
                    machine = %machine.id,
                    error = %e,
                    fallback = machine.resolved_failure_probability(),
                    "risk prediction failed; using provided value"
                );
            }
            Err(e) => {
                warn!(machine = %machine.id, error = %e, "risk prediction task aborted; using provided value");
            }
        }
    }

    machines
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forgeline_risk::{RiskPrediction, SensorData, StaticRiskPredictor};

    fn sensors() -> SensorData {
        SensorData::new(8000.0, 85.0)
    }

    #[tokio::test]
    async fn disabled_enrichment_passes_machines_through() {
        let machines = vec![
            Machine::new("M1", "cnc", 8.0)
                .with_failure_probability(0.2)
                .with_sensor_data(sensors()),
        ];

        let out = enrich_machines(machines.clone(), &Enrichment::Disabled).await;
        assert_eq!(out, machines);
    }

    #[tokio::test]
    async fn predictions_overwrite_and_failures_fall_back() {
        let predictor = Arc::new(
            StaticRiskPredictor::new().with_prediction(
                "M1",
                RiskPrediction::new(0.81)
                    .with_health_score(19.0)
                    .with_risk_level("critical"),
            ),
        );
        let machines = vec![
            Machine::new("M1", "cnc", 8.0)
                .with_failure_probability(0.1)
                .with_sensor_data(sensors()),
            // Unknown to the predictor: keeps its own value.
            Machine::new("M2", "cnc", 8.0)
                .with_failure_probability(0.35)
                .with_sensor_data(sensors()),
            // No sensor data: never sent.
            Machine::new("M3", "cnc", 8.0),
        ];

        let out = enrich_machines(machines, &Enrichment::external(predictor.clone())).await;

        assert_eq!(out[0].failure_probability, Some(0.81));
        assert_eq!(out[0].risk_level.as_deref(), Some("critical"));
        assert_eq!(out[1].failure_probability, Some(0.35));
        assert_eq!(out[2].resolved_failure_probability(), 0.0);

        let mut calls = predictor.calls();
        calls.sort();
        assert_eq!(calls, vec!["M1".to_string(), "M2".to_string()]);
    }

    struct SlowPredictor;

    #[async_trait]
    impl RiskPredictor for SlowPredictor {
        async fn predict(&self, _id: &str, _f: &SensorData) -> Result<RiskPrediction, RiskError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(RiskPrediction::new(0.99))
        }
    }

    #[tokio::test]
    async fn slow_predictor_is_cut_off_by_call_timeout() {
        let machines = vec![
            Machine::new("M1", "cnc", 8.0)
                .with_failure_probability(0.25)
                .with_sensor_data(sensors()),
        ];
        let enrichment =
            Enrichment::external(Arc::new(SlowPredictor)).with_call_timeout(Duration::from_millis(20));

        let out = enrich_machines(machines, &enrichment).await;
        assert_eq!(out[0].failure_probability, Some(0.25));
    }

    struct BogusPredictor;

    #[async_trait]
    impl RiskPredictor for BogusPredictor {
        async fn predict(&self, _id: &str, _f: &SensorData) -> Result<RiskPrediction, RiskError> {
            Ok(RiskPrediction::new(-3.0))
        }
    }

    #[tokio::test]
    async fn out_of_range_prediction_is_ignored() {
        let machines = vec![Machine::new("M1", "cnc", 8.0).with_sensor_data(sensors())];

        let out = enrich_machines(machines, &Enrichment::external(Arc::new(BogusPredictor))).await;
        assert_eq!(out[0].failure_probability, None);
    }
}
