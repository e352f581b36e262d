//! Run metrics: financial KPIs, fleet risk summary, per-machine utilization.
//!
//! Read-only views over a finished allocation. Currency and hours are rounded
//! to 2 decimals, probabilities to 4, percentages to 1.

use serde::{Deserialize, Serialize};

use forgeline_core::MachineId;

use crate::assignment::{Allocation, HIGH_RISK_THRESHOLD};
use crate::model::{DeferredJob, Job, Machine};
use crate::precision;

/// Financial and throughput KPIs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_jobs: usize,
    pub scheduled_jobs: usize,
    pub deferred_jobs: usize,
    pub total_revenue: f64,
    pub deferred_revenue: f64,
    pub total_downtime_risk_cost: f64,
    pub total_maintenance_cost: f64,
    /// Revenue minus downtime risk minus maintenance cost.
    pub net_value: f64,
    /// Scheduled job hours (maintenance excluded).
    pub total_production_hours: f64,
    /// Hours reserved by maintenance windows.
    pub total_downtime_hours: f64,
    pub deferred_hours: f64,
    pub avg_utilization_pct: f64,
}

/// Fleet-wide risk view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub high_risk_machines: usize,
    pub high_risk_machine_ids: Vec<MachineId>,
    pub machines_with_maintenance: usize,
    pub average_failure_probability: f64,
}

/// Utilization record for one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineUtilization {
    pub machine_id: MachineId,
    pub machine_name: String,
    #[serde(rename = "type")]
    pub machine_type: String,
    pub capacity_hours: f64,
    pub used_hours: f64,
    pub utilization_percent: f64,
    pub jobs_assigned: usize,
    pub maintenance_scheduled: bool,
    pub failure_probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunMetrics {
    pub kpis: Kpis,
    pub risk_summary: RiskSummary,
    pub machine_utilization: Vec<MachineUtilization>,
}

pub fn machine_utilization(machines: &[Machine], allocation: &Allocation) -> Vec<MachineUtilization> {
    machines
        .iter()
        .zip(&allocation.machine_states)
        .map(|(m, s)| MachineUtilization {
            machine_id: m.id.clone(),
            machine_name: m.name.clone(),
            machine_type: m.machine_type.clone(),
            capacity_hours: s.available_hours,
            used_hours: precision::hours(s.used_hours),
            utilization_percent: precision::percent(s.used_hours / s.available_hours * 100.0),
            jobs_assigned: s.slots.len(),
            maintenance_scheduled: s.maintenance_scheduled,
            failure_probability: precision::probability(m.resolved_failure_probability()),
        })
        .collect()
}

pub fn risk_summary(utilization: &[MachineUtilization]) -> RiskSummary {
    let high_risk_machine_ids: Vec<MachineId> = utilization
        .iter()
        .filter(|u| u.failure_probability > HIGH_RISK_THRESHOLD)
        .map(|u| u.machine_id.clone())
        .collect();

    RiskSummary {
        high_risk_machines: high_risk_machine_ids.len(),
        high_risk_machine_ids,
        machines_with_maintenance: utilization.iter().filter(|u| u.maintenance_scheduled).count(),
        average_failure_probability: precision::probability(mean(
            utilization.iter().map(|u| u.failure_probability),
        )),
    }
}

pub fn kpis(
    jobs: &[Job],
    allocation: &Allocation,
    deferred: &[DeferredJob],
    utilization: &[MachineUtilization],
) -> Kpis {
    let schedule = &allocation.schedule;

    let total_revenue: f64 = schedule.iter().map(|s| s.revenue).sum();
    let total_downtime_risk: f64 = schedule.iter().map(|s| s.downtime_risk).sum();
    let total_maintenance_cost: f64 = schedule
        .iter()
        .filter_map(|s| s.maintenance_window.map(|w| w.cost))
        .sum();
    let total_production_hours: f64 = schedule.iter().map(|s| s.duration_hours).sum();
    let total_downtime_hours: f64 = schedule
        .iter()
        .filter_map(|s| s.maintenance_window.map(|w| w.duration_hours()))
        .sum();

    Kpis {
        total_jobs: jobs.len(),
        scheduled_jobs: schedule.len(),
        deferred_jobs: deferred.len(),
        total_revenue: precision::money(total_revenue),
        deferred_revenue: precision::money(deferred.iter().map(|d| d.revenue).sum()),
        total_downtime_risk_cost: precision::money(total_downtime_risk),
        total_maintenance_cost: precision::money(total_maintenance_cost),
        net_value: precision::money(total_revenue - total_downtime_risk - total_maintenance_cost),
        total_production_hours: precision::hours(total_production_hours),
        total_downtime_hours: precision::hours(total_downtime_hours),
        deferred_hours: precision::hours(deferred.iter().map(|d| d.duration_hours).sum()),
        avg_utilization_pct: precision::percent(mean(
            utilization.iter().map(|u| u.utilization_percent),
        )),
    }
}

pub fn compute(
    jobs: &[Job],
    machines: &[Machine],
    allocation: &Allocation,
    deferred: &[DeferredJob],
) -> RunMetrics {
    let machine_utilization = machine_utilization(machines, allocation);
    RunMetrics {
        kpis: kpis(jobs, allocation, deferred, &machine_utilization),
        risk_summary: risk_summary(&machine_utilization),
        machine_utilization,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}
