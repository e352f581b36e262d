use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::result::{RiskError, RiskPrediction};

/// Sensor feature bag attached to a machine.
///
/// Consumed only by the risk predictor; the optimizer never reads it.
/// Every feature is optional and absent ones are omitted from the wire
/// request, so the service applies its own defaults or rejects the call.
/// Keys outside the known set are kept in `extra` and forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_months: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_consumption: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SensorData {
    pub fn new(operating_hours: f64, temperature: f64) -> Self {
        Self {
            operating_hours: Some(operating_hours),
            temperature: Some(temperature),
            ..Self::default()
        }
    }

    pub fn with_vibration(mut self, vibration: f64) -> Self {
        self.vibration = Some(vibration);
        self
    }

    /// Attach a feature the service understands but this type does not name.
    pub fn with_feature(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Source of machine failure probabilities.
///
/// Implementations may block on the network; they must be safe to call
/// concurrently for different machines.
#[async_trait]
pub trait RiskPredictor: Send + Sync + 'static {
    /// Predict the failure probability for one machine.
    async fn predict(
        &self,
        machine_id: &str,
        features: &SensorData,
    ) -> Result<RiskPrediction, RiskError>;
}

/// In-memory predictor for tests/dev.
///
/// Returns the configured prediction per machine id and
/// [`RiskError::Unavailable`] for machines it does not know.
#[derive(Debug, Default)]
pub struct StaticRiskPredictor {
    predictions: HashMap<String, RiskPrediction>,
    calls: Mutex<Vec<String>>,
}

impl StaticRiskPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prediction(mut self, machine_id: impl Into<String>, prediction: RiskPrediction) -> Self {
        self.predictions.insert(machine_id.into(), prediction);
        self
    }

    /// Machine ids this predictor has been asked about, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RiskPredictor for StaticRiskPredictor {
    async fn predict(
        &self,
        machine_id: &str,
        _features: &SensorData,
    ) -> Result<RiskPrediction, RiskError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(machine_id.to_string());
        }
        self.predictions
            .get(machine_id)
            .cloned()
            .ok_or_else(|| RiskError::Unavailable(format!("no prediction for {machine_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_features_are_left_off_the_wire() {
        let features = SensorData::new(8500.0, 92.5).with_vibration(4.8);
        let json = serde_json::to_value(&features).unwrap();

        assert_eq!(json["operating_hours"], 8500.0);
        assert_eq!(json["vibration"], 4.8);
        assert!(json.get("rpm").is_none());
    }

    #[test]
    fn partial_bag_keeps_unknown_keys() {
        let features: SensorData = serde_json::from_value(serde_json::json!({
            "vibration": 3.1,
            "rpm": 2000,
            "spindle_load": 0.7,
        }))
        .unwrap();

        assert_eq!(features.operating_hours, None);
        assert_eq!(features.temperature, None);
        assert_eq!(features.rpm, Some(2000.0));
        assert_eq!(features.extra.get("spindle_load"), Some(&serde_json::json!(0.7)));

        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"vibration": 3.1, "rpm": 2000.0, "spindle_load": 0.7})
        );
    }

    #[test]
    fn fractional_counters_are_accepted() {
        let features: SensorData =
            serde_json::from_value(serde_json::json!({"age_months": 18.5, "maintenance_count": 3}))
                .unwrap();
        assert_eq!(features.age_months, Some(18.5));
        assert_eq!(features.maintenance_count, Some(3.0));
    }

    #[tokio::test]
    async fn static_predictor_answers_known_machines_only() {
        let predictor = StaticRiskPredictor::new()
            .with_prediction("M04", RiskPrediction::new(0.72).with_risk_level("high"));
        let features = SensorData::new(100.0, 70.0);

        let hit = predictor.predict("M04", &features).await.unwrap();
        assert_eq!(hit.failure_probability, 0.72);

        let miss = predictor.predict("M99", &features).await;
        assert!(matches!(miss, Err(RiskError::Unavailable(_))));

        assert_eq!(predictor.calls(), vec!["M04".to_string(), "M99".to_string()]);
    }
}
