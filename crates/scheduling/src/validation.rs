//! Input validation at the optimizer boundary.
//!
//! Everything is checked before any computation starts. All issues are
//! collected and reported together so a caller can fix a payload in one go:
//! - empty job or machine list
//! - duplicate job / machine ids
//! - non-positive durations and capacities
//! - negative money or maintenance durations
//! - non-finite priorities
//! - failure probabilities outside \[0, 1\]
//! - negative or non-finite weights and costs

use std::str::FromStr;

use forgeline_core::entity::duplicate_ids;
use forgeline_core::{DomainError, DomainResult, JobId, MachineId};

use crate::model::{Job, Machine};
use crate::params::{CostParams, Weights};

/// Validates a full optimizer input.
pub fn validate_input(
    jobs: &[Job],
    machines: &[Machine],
    weights: &Weights,
    costs: &CostParams,
) -> DomainResult<()> {
    // Empty inputs are reported alone: nothing else is meaningful without them.
    if jobs.is_empty() {
        return Err(DomainError::validation("No jobs provided"));
    }
    if machines.is_empty() {
        return Err(DomainError::validation("No machines provided"));
    }

    let mut issues: Vec<String> = Vec::new();

    for id in duplicate_ids(jobs) {
        issues.push(format!("duplicate job id {id}"));
    }
    for id in duplicate_ids(machines) {
        issues.push(format!("duplicate machine id {id}"));
    }

    for job in jobs {
        check_job(job, &mut issues);
    }
    for machine in machines {
        check_machine(machine, &mut issues);
    }

    for (name, value) in weights.named() {
        if !non_negative(value) {
            issues.push(format!("weight {name} must be a finite non-negative number (got {value})"));
        }
    }
    if !non_negative(costs.downtime_cost_per_hour) {
        issues.push(format!(
            "downtime_cost_per_hour must be a finite non-negative number (got {})",
            costs.downtime_cost_per_hour
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation(issues.join("; ")))
    }
}

fn check_job(job: &Job, issues: &mut Vec<String>) {
    if let Some(issue) = id_issue::<JobId>(job.id.as_str()) {
        issues.push(issue);
    }
    if !positive(job.duration_hours) {
        issues.push(format!("job {}: duration_hours must be > 0", job.id));
    }
    if !non_negative(job.revenue) {
        issues.push(format!("job {}: revenue must be >= 0", job.id));
    }
    if !job.priority.is_finite() {
        issues.push(format!("job {}: priority must be a finite number", job.id));
    }
}

fn check_machine(machine: &Machine, issues: &mut Vec<String>) {
    if let Some(issue) = id_issue::<MachineId>(machine.id.as_str()) {
        issues.push(issue);
    }
    if !positive(machine.capacity_hours_per_day) {
        issues.push(format!("machine {}: capacity_hours_per_day must be > 0", machine.id));
    }
    if !non_negative(machine.maintenance_cost) {
        issues.push(format!("machine {}: maintenance_cost must be >= 0", machine.id));
    }
    if let Some(h) = machine.maintenance_duration_hours {
        if !non_negative(h) {
            issues.push(format!("machine {}: maintenance_duration_hours must be >= 0", machine.id));
        }
    }
    if let Some(p) = machine.failure_probability {
        if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
            issues.push(format!("machine {}: failure_probability must be within [0, 1]", machine.id));
        }
    }
}

/// Re-parse a deserialized id; serde accepts any string, the id types do not.
fn id_issue<T: FromStr<Err = DomainError>>(raw: &str) -> Option<String> {
    match raw.parse::<T>() {
        Ok(_) => None,
        Err(DomainError::Validation(msg)) => Some(msg),
        Err(other) => Some(other.to_string()),
    }
}

fn positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

fn non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}
