//! `forgeline-scheduling`: multi-objective production scheduling optimizer.
//!
//! Assigns jobs to machines with a greedy, single-pass heuristic driven by a
//! weighted objective:
//!
//! ```text
//! score = W1 * revenue - W2 * downtime_risk - W3 * maintenance_cost
//! downtime_risk = failure_probability * downtime_cost_per_hour * duration_hours
//! ```
//!
//! Pipeline (one call, no state kept between calls):
//! 1. optional risk enrichment of machines ([`enrichment`])
//! 2. candidate generation + scoring ([`candidate`])
//! 3. ranking (score, priority, deadline)
//! 4. greedy constrained assignment with auto-maintenance ([`assignment`])
//! 5. deferral reasoning ([`deferral`])
//! 6. metrics aggregation ([`metrics`])
//!
//! The core (2 to 6) is synchronous and deterministic; only enrichment does IO.

pub mod assignment;
pub mod candidate;
pub mod deferral;
pub mod engine;
pub mod enrichment;
pub mod metrics;
pub mod model;
pub mod params;
pub mod sample;
pub mod validation;

mod precision;

pub use engine::{OptimizeRequest, Optimizer, RunResult};
pub use enrichment::Enrichment;
pub use model::{Assignment, DeferralReason, DeferredJob, Job, Machine, MaintenanceWindow};
pub use params::{CostParams, WeightPolicy, Weights};
