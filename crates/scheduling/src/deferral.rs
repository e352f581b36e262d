//! Deferral reasoning for jobs that received no assignment.

use chrono::{DateTime, Utc};

use crate::assignment::{Allocation, MachineState};
use crate::model::{DeferralReason, DeferredJob, Job, Machine};

/// Every reason that explains why `job` is unscheduled, in priority order.
///
/// Capacity is judged against the final machine state, so hours consumed by
/// auto-maintenance count as used. Falls back to [`DeferralReason::Outranked`]
/// when nothing else applies.
pub fn deferral_reasons(
    job: &Job,
    machines: &[Machine],
    states: &[MachineState],
    now: DateTime<Utc>,
) -> Vec<DeferralReason> {
    let mut reasons = Vec::new();

    let type_match = machines.iter().any(|m| m.machine_type == job.job_type);
    if !type_match {
        reasons.push(DeferralReason::NoMatchingMachineType);
    }

    let capacity_match = machines
        .iter()
        .zip(states)
        .any(|(m, s)| m.machine_type == job.job_type && s.remaining_hours() >= job.duration_hours);
    if type_match && !capacity_match {
        reasons.push(DeferralReason::MachinesAtCapacity);
    }

    if !job.can_meet_deadline(now) {
        reasons.push(DeferralReason::DeadlineUnreachable);
    }

    if reasons.is_empty() {
        reasons.push(DeferralReason::Outranked);
    }

    reasons
}

/// Build the deferred list (input order) for every job the allocation left out.
pub fn defer_unassigned(
    jobs: &[Job],
    machines: &[Machine],
    allocation: &Allocation,
    now: DateTime<Utc>,
) -> Vec<DeferredJob> {
    jobs.iter()
        .enumerate()
        .filter(|(ji, _)| !allocation.is_assigned(*ji))
        .map(|(_, job)| DeferredJob {
            job_id: job.id.clone(),
            job_name: job.name.clone(),
            job_type: job.job_type.clone(),
            duration_hours: job.duration_hours,
            revenue: job.revenue,
            reasons: deferral_reasons(job, machines, &allocation.machine_states, now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::assign;
    use crate::candidate::{generate_candidates, rank_candidates};
    use crate::params::{CostParams, Weights};
    use chrono::Duration;

    fn deferred(jobs: &[Job], machines: &[Machine], now: DateTime<Utc>) -> Vec<DeferredJob> {
        let mut c = generate_candidates(jobs, machines, &Weights::default(), &CostParams::default());
        rank_candidates(&mut c, jobs);
        let allocation = assign(&c, jobs, machines, now);
        defer_unassigned(jobs, machines, &allocation, now)
    }

    #[test]
    fn missing_machine_type_is_reported() {
        let jobs = vec![Job::new("J1", "welding", 2.0, 100.0)];
        let machines = vec![Machine::new("M1", "cnc", 8.0), Machine::new("M2", "assembly", 8.0)];

        let d = deferred(&jobs, &machines, Utc::now());

        assert_eq!(d.len(), 1);
        assert_eq!(d[0].reasons, vec![DeferralReason::NoMatchingMachineType]);
    }

    #[test]
    fn maintenance_hours_count_against_remaining_capacity() {
        // J1 (3h) + 2h window leaves 1h on a 6h machine; J2 needs 2h.
        let jobs = vec![
            Job::new("J1", "cnc", 3.0, 90000.0),
            Job::new("J2", "cnc", 2.0, 100.0),
        ];
        let machines = vec![
            Machine::new("M1", "cnc", 6.0)
                .with_maintenance(100.0, 2.0)
                .with_failure_probability(0.7),
        ];

        let d = deferred(&jobs, &machines, Utc::now());

        assert_eq!(d.len(), 1);
        assert_eq!(d[0].job_id.as_str(), "J2");
        assert_eq!(d[0].reasons, vec![DeferralReason::MachinesAtCapacity]);
    }

    #[test]
    fn capacity_and_deadline_reasons_stack() {
        let now = Utc::now();
        let jobs = vec![
            Job::new("J1", "cnc", 8.0, 9000.0),
            Job::new("J2", "cnc", 4.0, 100.0).with_deadline(now + Duration::hours(2)),
        ];
        let machines = vec![Machine::new("M1", "cnc", 10.0)];

        let d = deferred(&jobs, &machines, now);

        assert_eq!(
            d[0].reasons,
            vec![DeferralReason::MachinesAtCapacity, DeferralReason::DeadlineUnreachable]
        );
    }

    #[test]
    fn oversized_job_reads_as_capacity_problem() {
        let jobs = vec![Job::new("J1", "cnc", 12.0, 100.0)];
        let machines = vec![Machine::new("M1", "cnc", 10.0)];

        let d = deferred(&jobs, &machines, Utc::now());
        assert_eq!(d[0].reasons, vec![DeferralReason::MachinesAtCapacity]);
    }

    #[test]
    fn outranked_is_the_fallback() {
        // The machine still has room after the run and no deadline applies.
        let jobs = vec![Job::new("J2", "cnc", 2.0, 100.0)];
        let machines = vec![Machine::new("M1", "cnc", 10.0)];
        let states = vec![MachineState {
            used_hours: 4.0,
            available_hours: 10.0,
            slots: Vec::new(),
            maintenance_scheduled: false,
            maintenance_hours: 0.0,
        }];

        let reasons = deferral_reasons(&jobs[0], &machines, &states, Utc::now());
        assert_eq!(reasons, vec![DeferralReason::Outranked]);
    }
}
