//! Objective weights and cost parameters.

use serde::{Deserialize, Serialize};

const DEFAULT_THROUGHPUT: f64 = 1.0;
const DEFAULT_DOWNTIME: f64 = 0.8;
const DEFAULT_MAINTENANCE: f64 = 0.5;
const DEFAULT_DOWNTIME_COST_PER_HOUR: f64 = 8000.0;

fn default_throughput() -> f64 {
    DEFAULT_THROUGHPUT
}

fn default_downtime() -> f64 {
    DEFAULT_DOWNTIME
}

fn default_maintenance() -> f64 {
    DEFAULT_MAINTENANCE
}

fn default_downtime_cost_per_hour() -> f64 {
    DEFAULT_DOWNTIME_COST_PER_HOUR
}

/// Objective function weights (`W1`, `W2`, `W3`). All must be non-negative.
///
/// Missing fields take their defaults individually, so `{"downtime": 2}`
/// means `{throughput: 1.0, downtime: 2.0, maintenance: 0.5}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Emphasis on revenue.
    #[serde(default = "default_throughput", alias = "W1_revenue")]
    pub throughput: f64,
    /// Aversion to expected downtime cost.
    #[serde(default = "default_downtime", alias = "W2_downtime_risk")]
    pub downtime: f64,
    /// Aversion to maintenance cost.
    #[serde(default = "default_maintenance", alias = "W3_maintenance_cost")]
    pub maintenance: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self::new(DEFAULT_THROUGHPUT, DEFAULT_DOWNTIME, DEFAULT_MAINTENANCE)
    }
}

impl Weights {
    pub const fn new(throughput: f64, downtime: f64, maintenance: f64) -> Self {
        Self {
            throughput,
            downtime,
            maintenance,
        }
    }

    /// Scale every weight by `max(W1, W2, W3, 1)` so none exceeds 1.
    pub fn normalized(&self) -> Self {
        let max = self
            .throughput
            .max(self.downtime)
            .max(self.maintenance)
            .max(1.0);
        Self::new(
            self.throughput / max,
            self.downtime / max,
            self.maintenance / max,
        )
    }

    pub(crate) fn named(&self) -> [(&'static str, f64); 3] {
        [
            ("throughput", self.throughput),
            ("downtime", self.downtime),
            ("maintenance", self.maintenance),
        ]
    }
}

/// Cost parameters for the objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostParams {
    #[serde(default = "default_downtime_cost_per_hour")]
    pub downtime_cost_per_hour: f64,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            downtime_cost_per_hour: DEFAULT_DOWNTIME_COST_PER_HOUR,
        }
    }
}

impl CostParams {
    pub fn new(downtime_cost_per_hour: f64) -> Self {
        Self {
            downtime_cost_per_hour,
        }
    }
}

/// How caller-supplied weights are turned into the weights used for scoring.
///
/// - `AsGiven`: trusted constants, used unchanged.
/// - `Normalized`: unbounded user input (dashboard sliders), see [`Weights::normalized`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum WeightPolicy {
    #[default]
    AsGiven,
    Normalized,
}

impl WeightPolicy {
    pub fn apply(self, weights: Weights) -> Weights {
        match self {
            WeightPolicy::AsGiven => weights,
            WeightPolicy::Normalized => weights.normalized(),
        }
    }
}
