//! Embedded sample catalog for the real-time dashboard variant.
//!
//! Failure probabilities are pre-populated and no job carries a deadline, so
//! the only input that changes between calls is the weight triple.

use chrono::{DateTime, Utc};

use forgeline_core::DomainResult;

use crate::engine::{OptimizeRequest, Optimizer, RunResult};
use crate::model::{Job, Machine};
use crate::params::Weights;

pub fn sample_jobs() -> Vec<Job> {
    [
        ("J001", "Steel Frame Assembly", "assembly", 3.0, 45000.0, 5.0),
        ("J002", "CNC Shaft Machining", "cnc", 2.0, 32000.0, 4.0),
        ("J003", "Circuit Board Soldering", "assembly", 1.5, 18000.0, 3.0),
        ("J004", "Precision Gear Cutting", "cnc", 4.0, 56000.0, 5.0),
        ("J005", "Aluminum Die Casting", "casting", 5.0, 68000.0, 4.0),
        ("J006", "Weld Joint Fabrication", "welding", 2.5, 28000.0, 3.0),
        ("J007", "Motor Assembly", "assembly", 2.0, 35000.0, 4.0),
        ("J008", "Hydraulic Press Forming", "pressing", 3.0, 42000.0, 3.0),
        ("J009", "Surface Heat Treatment", "furnace", 6.0, 52000.0, 2.0),
        ("J010", "Final QC & Packaging", "assembly", 1.0, 12000.0, 2.0),
        ("J011", "Titanium Rod Turning", "cnc", 3.0, 48000.0, 5.0),
        ("J012", "Spot Welding Panel", "welding", 2.0, 22000.0, 3.0),
    ]
    .into_iter()
    .map(|(id, name, job_type, hours, revenue, priority)| {
        Job::new(id, job_type, hours, revenue)
            .with_name(name)
            .with_priority(priority)
    })
    .collect()
}

pub fn sample_machines() -> Vec<Machine> {
    [
        ("M01", "Assembly Line A", "assembly", 8.0, 12000.0, 1.5, 0.12),
        ("M02", "Assembly Line B", "assembly", 8.0, 14000.0, 2.0, 0.55),
        ("M03", "CNC Machine #1", "cnc", 10.0, 25000.0, 2.0, 0.30),
        ("M04", "CNC Machine #2", "cnc", 10.0, 22000.0, 1.5, 0.72),
        ("M05", "Casting Station", "casting", 12.0, 35000.0, 3.0, 0.18),
        ("M06", "Welding Bay Alpha", "welding", 8.0, 10000.0, 1.0, 0.40),
        ("M07", "Hydraulic Press #1", "pressing", 8.0, 20000.0, 2.0, 0.62),
        ("M08", "Heat Treatment Oven", "furnace", 16.0, 18000.0, 2.0, 0.25),
    ]
    .into_iter()
    .map(|(id, name, machine_type, capacity, maint_cost, maint_hours, p)| {
        Machine::new(id, machine_type, capacity)
            .with_name(name)
            .with_maintenance(maint_cost, maint_hours)
            .with_failure_probability(p)
    })
    .collect()
}

/// Run the normalizing optimizer over the sample catalog.
pub fn optimize_sample(weights: Weights, now: DateTime<Utc>) -> DomainResult<RunResult> {
    Optimizer::realtime().optimize_at(
        OptimizeRequest::new(sample_jobs(), sample_machines()).with_weights(weights),
        now,
    )
}
