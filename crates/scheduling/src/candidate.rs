//! Candidate generation, scoring and ranking.

use std::cmp::Ordering;

use crate::model::{Job, Machine};
use crate::params::{CostParams, Weights};
use crate::precision;

/// A feasible (job, machine) pairing.
///
/// `job` and `machine` index into the slices the candidate was generated from.
/// Score, probability and risk are stored at output precision; ranking and the
/// maintenance threshold both operate on these rounded values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub job: usize,
    pub machine: usize,
    pub score: f64,
    pub failure_probability: f64,
    pub downtime_risk: f64,
}

/// Expected cost of the machine failing while it runs the job.
pub fn downtime_risk(failure_probability: f64, downtime_cost_per_hour: f64, duration_hours: f64) -> f64 {
    failure_probability * downtime_cost_per_hour * duration_hours
}

/// Composite objective for one pairing.
pub fn score(weights: &Weights, revenue: f64, downtime_risk: f64, maintenance_cost: f64) -> f64 {
    weights.throughput * revenue - weights.downtime * downtime_risk - weights.maintenance * maintenance_cost
}

/// Enumerate every type-compatible pairing whose job fits the machine's raw
/// daily capacity.
///
/// Output order is job-major, machine-minor (input order). Low or negative
/// scores are kept: only type and raw capacity filter here.
pub fn generate_candidates(
    jobs: &[Job],
    machines: &[Machine],
    weights: &Weights,
    costs: &CostParams,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for (ji, job) in jobs.iter().enumerate() {
        for (mi, machine) in machines.iter().enumerate() {
            if machine.machine_type != job.job_type {
                continue;
            }
            if job.duration_hours > machine.capacity_hours_per_day {
                continue;
            }

            let p = machine.resolved_failure_probability();
            let risk = downtime_risk(p, costs.downtime_cost_per_hour, job.duration_hours);
            let s = score(weights, job.revenue, risk, machine.maintenance_cost);

            candidates.push(Candidate {
                job: ji,
                machine: mi,
                score: precision::money(s),
                failure_probability: precision::probability(p),
                downtime_risk: precision::money(risk),
            });
        }
    }

    candidates
}

/// Ranking comparator: score desc, then priority desc, then earliest deadline
/// (jobs without a deadline last).
pub fn compare_candidates(a: &Candidate, b: &Candidate, jobs: &[Job]) -> Ordering {
    let (ja, jb) = (&jobs[a.job], &jobs[b.job]);

    b.score
        .total_cmp(&a.score)
        .then_with(|| jb.priority.total_cmp(&ja.priority))
        .then_with(|| match (ja.deadline, jb.deadline) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Sort candidates best-first.
///
/// `sort_by` is stable, so fully tied candidates keep generation order and the
/// ranking is identical across runs.
pub fn rank_candidates(candidates: &mut [Candidate], jobs: &[Job]) {
    candidates.sort_by(|a, b| compare_candidates(a, b, jobs));
}
