//! Greedy constrained assignment.
//!
//! One left-to-right pass over the ranked candidates. Per-machine state lives
//! in a table built fresh for every run and indexed like the machine slice.
//! No backtracking: a pairing skipped once is never revisited, but the job
//! stays eligible for later pairings with other machines.

use chrono::{DateTime, Utc};

use forgeline_core::{DomainError, DomainResult};

use crate::candidate::Candidate;
use crate::model::{Assignment, Job, Machine, MaintenanceWindow};
use crate::precision;

/// Failure probability above which a machine gets an auto-maintenance window.
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;

/// A job placed on a machine's timeline (hours from start of day).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub job: usize,
    pub start_hour: f64,
    pub end_hour: f64,
}

/// Bookkeeping for one machine during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    /// Hours consumed so far (jobs plus any maintenance window).
    pub used_hours: f64,
    pub available_hours: f64,
    pub slots: Vec<Slot>,
    pub maintenance_scheduled: bool,
    /// Length of the placed window, 0 if none.
    pub maintenance_hours: f64,
}

impl MachineState {
    fn new(machine: &Machine) -> Self {
        Self {
            used_hours: 0.0,
            available_hours: machine.capacity_hours_per_day,
            slots: Vec::new(),
            maintenance_scheduled: false,
            maintenance_hours: 0.0,
        }
    }

    pub fn remaining_hours(&self) -> f64 {
        self.available_hours - self.used_hours
    }

    fn fits(&self, hours: f64) -> bool {
        self.used_hours + hours <= self.available_hours
    }
}

/// Outcome of the greedy pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Assignments in the order they were made.
    pub schedule: Vec<Assignment>,
    /// Final state per machine (same indexing as the machine slice).
    pub machine_states: Vec<MachineState>,
    /// `assigned[j]` is true when job `j` got a slot.
    pub assigned: Vec<bool>,
}

impl Allocation {
    pub fn is_assigned(&self, job: usize) -> bool {
        self.assigned.get(job).copied().unwrap_or(false)
    }
}

/// Walk the ranked candidates once and commit every feasible one.
pub fn assign(
    ranked: &[Candidate],
    jobs: &[Job],
    machines: &[Machine],
    now: DateTime<Utc>,
) -> Allocation {
    let mut states: Vec<MachineState> = machines.iter().map(MachineState::new).collect();
    let mut assigned = vec![false; jobs.len()];
    let mut schedule = Vec::new();

    for c in ranked {
        if assigned[c.job] {
            continue;
        }

        let job = &jobs[c.job];
        let machine = &machines[c.machine];
        let state = &mut states[c.machine];

        if !state.fits(job.duration_hours) {
            continue;
        }
        if !job.can_meet_deadline(now) {
            continue;
        }

        let slot_start = state.used_hours;
        let slot_end = slot_start + job.duration_hours;

        // At most one window per machine; the flag is only set when it fits.
        let mut window = None;
        if c.failure_probability > HIGH_RISK_THRESHOLD && !state.maintenance_scheduled {
            if let Some(mh) = machine.maintenance_window_hours() {
                if state.fits(job.duration_hours + mh) {
                    window = Some(MaintenanceWindow {
                        start_hour: slot_end,
                        end_hour: slot_end + mh,
                        cost: machine.maintenance_cost,
                    });
                    state.maintenance_scheduled = true;
                    state.maintenance_hours = mh;
                }
            }
        }

        assigned[c.job] = true;
        state.used_hours = window.map(|w| w.end_hour).unwrap_or(slot_end);
        state.slots.push(Slot {
            job: c.job,
            start_hour: slot_start,
            end_hour: slot_end,
        });

        schedule.push(Assignment {
            job_id: job.id.clone(),
            job_name: job.name.clone(),
            machine_id: machine.id.clone(),
            machine_name: machine.name.clone(),
            start_hour: precision::hours(slot_start),
            end_hour: precision::hours(slot_end),
            duration_hours: job.duration_hours,
            revenue: job.revenue,
            score: c.score,
            failure_probability: c.failure_probability,
            downtime_risk: c.downtime_risk,
            maintenance_window: window.map(|w| MaintenanceWindow {
                start_hour: precision::hours(w.start_hour),
                end_hour: precision::hours(w.end_hour),
                cost: precision::money(w.cost),
            }),
        });
    }

    Allocation {
        schedule,
        machine_states: states,
        assigned,
    }
}

/// Check the allocation's structural invariants.
///
/// These hold by construction; a failure here is a bug, never bad input.
pub fn verify(allocation: &Allocation, jobs: &[Job], machines: &[Machine]) -> DomainResult<()> {
    const EPS: f64 = 1e-9;

    if allocation.schedule.len() != allocation.assigned.iter().filter(|a| **a).count() {
        return Err(DomainError::invariant("schedule size differs from assigned job count"));
    }

    let mut seen = vec![false; jobs.len()];
    for (mi, state) in allocation.machine_states.iter().enumerate() {
        let machine = &machines[mi];
        let booked: f64 = state
            .slots
            .iter()
            .map(|s| s.end_hour - s.start_hour)
            .sum::<f64>()
            + state.maintenance_hours;

        if booked > machine.capacity_hours_per_day + EPS || state.used_hours > state.available_hours + EPS {
            return Err(DomainError::invariant(format!("machine {} over capacity", machine.id)));
        }

        for slot in &state.slots {
            if seen[slot.job] {
                return Err(DomainError::invariant(format!("job {} assigned twice", jobs[slot.job].id)));
            }
            seen[slot.job] = true;
            if jobs[slot.job].job_type != machine.machine_type {
                return Err(DomainError::invariant(format!(
                    "job {} placed on incompatible machine {}",
                    jobs[slot.job].id, machine.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{generate_candidates, rank_candidates};
    use crate::params::{CostParams, Weights};
    use chrono::Duration;

    fn run(jobs: &[Job], machines: &[Machine], now: DateTime<Utc>) -> Allocation {
        let mut c = generate_candidates(jobs, machines, &Weights::default(), &CostParams::default());
        rank_candidates(&mut c, jobs);
        assign(&c, jobs, machines, now)
    }

    #[test]
    fn jobs_are_placed_back_to_back() {
        let jobs = vec![
            Job::new("J1", "cnc", 3.0, 3000.0),
            Job::new("J2", "cnc", 2.0, 2000.0),
            Job::new("J3", "cnc", 4.0, 1000.0),
        ];
        let machines = vec![Machine::new("M1", "cnc", 10.0)];

        let a = run(&jobs, &machines, Utc::now());

        let slots: Vec<(f64, f64)> = a.schedule.iter().map(|s| (s.start_hour, s.end_hour)).collect();
        assert_eq!(slots, vec![(0.0, 3.0), (3.0, 5.0), (5.0, 9.0)]);
        assert_eq!(a.machine_states[0].used_hours, 9.0);
        assert!(verify(&a, &jobs, &machines).is_ok());
    }

    #[test]
    fn job_falls_back_to_another_machine_when_first_choice_is_full() {
        let jobs = vec![
            Job::new("J1", "cnc", 6.0, 9000.0),
            Job::new("J2", "cnc", 6.0, 8000.0),
        ];
        // M1 is cheaper to run so both jobs prefer it.
        let machines = vec![
            Machine::new("M1", "cnc", 10.0),
            Machine::new("M2", "cnc", 10.0).with_maintenance(1000.0, 0.0),
        ];

        let a = run(&jobs, &machines, Utc::now());

        assert_eq!(a.schedule.len(), 2);
        assert_eq!(a.schedule[0].machine_id.as_str(), "M1");
        assert_eq!(a.schedule[1].machine_id.as_str(), "M2");
        assert_eq!(a.schedule[1].start_hour, 0.0);
    }

    #[test]
    fn high_risk_machine_gets_one_window_after_first_job() {
        let jobs = vec![
            Job::new("J1", "cnc", 3.0, 50000.0),
            Job::new("J2", "cnc", 2.0, 40000.0),
        ];
        let machines = vec![
            Machine::new("M1", "cnc", 10.0)
                .with_maintenance(2000.0, 2.0)
                .with_failure_probability(0.9),
        ];

        let a = run(&jobs, &machines, Utc::now());

        let w = a.schedule[0].maintenance_window.expect("first job carries the window");
        assert_eq!((w.start_hour, w.end_hour, w.cost), (3.0, 5.0, 2000.0));
        assert!(a.schedule[1].maintenance_window.is_none());
        assert_eq!((a.schedule[1].start_hour, a.schedule[1].end_hour), (5.0, 7.0));
        assert_eq!(a.machine_states[0].used_hours, 7.0);
    }

    #[test]
    fn window_that_does_not_fit_leaves_flag_unset() {
        let jobs = vec![
            Job::new("J1", "cnc", 9.0, 50000.0),
            Job::new("J2", "cnc", 1.0, 100.0),
        ];
        let machines = vec![
            Machine::new("M1", "cnc", 12.0)
                .with_maintenance(2000.0, 4.0)
                .with_failure_probability(0.8),
        ];

        let a = run(&jobs, &machines, Utc::now());

        // 9h + 4h > 12h: no window after J1 and the flag stays false.
        // J2 gets its own check, but 10h + 4h > 12h fails as well.
        assert!(a.schedule.iter().all(|s| s.maintenance_window.is_none()));
        assert!(!a.machine_states[0].maintenance_scheduled);
        assert_eq!(a.machine_states[0].used_hours, 10.0);
    }

    #[test]
    fn window_is_placed_when_job_and_window_both_fit() {
        let jobs = vec![
            Job::new("J1", "cnc", 8.0, 50000.0),
            Job::new("J2", "cnc", 1.0, 100.0),
        ];
        let machines = vec![
            Machine::new("M1", "cnc", 12.0)
                .with_maintenance(2000.0, 3.0)
                .with_failure_probability(0.8),
        ];

        let a = run(&jobs, &machines, Utc::now());

        // 8h + 3h <= 12h: J1 takes the window [8, 11) and J2 fits at 11.
        let w = a.schedule[0].maintenance_window.unwrap();
        assert_eq!((w.start_hour, w.end_hour), (8.0, 11.0));
        assert_eq!((a.schedule[1].start_hour, a.schedule[1].end_hour), (11.0, 12.0));
        assert!(a.machine_states[0].maintenance_scheduled);
    }

    #[test]
    fn exactly_half_probability_is_not_high_risk() {
        let jobs = vec![Job::new("J1", "cnc", 1.0, 50000.0)];
        let machines = vec![
            Machine::new("M1", "cnc", 10.0)
                .with_maintenance(100.0, 1.0)
                .with_failure_probability(0.5),
        ];

        let a = run(&jobs, &machines, Utc::now());
        assert!(a.schedule[0].maintenance_window.is_none());
    }

    #[test]
    fn unreachable_deadline_skips_the_job() {
        let now = Utc::now();
        let jobs = vec![
            Job::new("J1", "cnc", 3.0, 1000.0).with_deadline(now + Duration::hours(1)),
            Job::new("J2", "cnc", 3.0, 500.0).with_deadline(now + Duration::hours(4)),
        ];
        let machines = vec![Machine::new("M1", "cnc", 10.0)];

        let a = run(&jobs, &machines, now);

        assert!(!a.is_assigned(0));
        assert!(a.is_assigned(1));
        assert_eq!(a.schedule[0].start_hour, 0.0);
    }

    #[test]
    fn verify_flags_double_booking() {
        let jobs = vec![Job::new("J1", "cnc", 3.0, 1000.0)];
        let machines = vec![Machine::new("M1", "cnc", 10.0), Machine::new("M2", "cnc", 10.0)];

        let mut a = run(&jobs, &machines, Utc::now());
        let dup = a.machine_states[0].slots[0];
        a.machine_states[1].slots.push(dup);
        a.schedule.push(a.schedule[0].clone());
        a.assigned.push(true);

        assert!(matches!(
            verify(&a, &jobs, &machines),
            Err(DomainError::InvariantViolation(_))
        ));
    }
}
