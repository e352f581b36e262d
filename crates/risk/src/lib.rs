//! `forgeline-risk`
//!
//! **Responsibility:** boundary to the external failure-prediction service.
//!
//! This crate is intentionally **not** part of the scheduling core:
//! - It knows nothing about jobs, candidates or schedules.
//! - It only turns a machine id + sensor features into a failure probability.
//! - Every call is untrusted IO: callers must be ready for it to fail.

pub mod http;
pub mod predictor;
pub mod result;

pub use http::{HttpRiskPredictor, HttpRiskPredictorConfig, PredictorHealth};
pub use predictor::{RiskPredictor, SensorData, StaticRiskPredictor};
pub use result::{RiskError, RiskPrediction};
