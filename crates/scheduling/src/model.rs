//! Scheduling data model: inputs (jobs, machines) and outputs (assignments,
//! deferrals).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use forgeline_core::{Entity, JobId, MachineId};
use forgeline_risk::{RiskPrediction, SensorData};

/// A unit of demand to schedule. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub name: String,
    /// Category that must equal a machine's type exactly.
    #[serde(rename = "type")]
    pub job_type: String,
    pub duration_hours: f64,
    /// Value realized if the job is scheduled.
    #[serde(default)]
    pub revenue: f64,
    /// Higher is preferred. Fractional values order between their neighbours.
    #[serde(default)]
    pub priority: f64,
    /// See [`parse_deadline`] for the accepted formats.
    #[serde(
        default,
        deserialize_with = "deserialize_deadline",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(
        id: impl Into<JobId>,
        job_type: impl Into<String>,
        duration_hours: f64,
        revenue: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            job_type: job_type.into(),
            duration_hours,
            revenue,
            priority: 0.0,
            deadline: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Whether the job can still finish before its deadline when started at `now`.
    ///
    /// Jobs without a deadline always can.
    pub fn can_meet_deadline(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            None => true,
            Some(deadline) => {
                let hours_left = (deadline - now).num_milliseconds() as f64 / 3_600_000.0;
                hours_left >= self.duration_hours
            }
        }
    }
}

/// Parse a job deadline.
///
/// Accepts RFC 3339 (`2030-01-01T12:00:00Z`), a date-time without offset
/// (`2030-01-01T12:00:00`, optionally with fractional seconds or a space
/// separator) and a bare date (`2030-01-01`). Offset-less values are read
/// as UTC; a bare date means midnight UTC.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_deadline<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_deadline(&raw).map(Some).ok_or_else(|| {
        D::Error::custom(format!(
            "invalid deadline {raw:?}: expected RFC 3339, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD"
        ))
    })
}

impl Entity for Job {
    type Id = JobId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A schedulable resource with a daily hour budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub machine_type: String,
    pub capacity_hours_per_day: f64,
    #[serde(default)]
    pub maintenance_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_duration_hours: Option<f64>,
    /// Supplied by the caller or filled in by enrichment; absent means 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_data: Option<SensorData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

impl Machine {
    pub fn new(
        id: impl Into<MachineId>,
        machine_type: impl Into<String>,
        capacity_hours_per_day: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            machine_type: machine_type.into(),
            capacity_hours_per_day,
            maintenance_cost: 0.0,
            maintenance_duration_hours: None,
            failure_probability: None,
            sensor_data: None,
            health_score: None,
            risk_level: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_maintenance(mut self, cost: f64, duration_hours: f64) -> Self {
        self.maintenance_cost = cost;
        self.maintenance_duration_hours = Some(duration_hours);
        self
    }

    pub fn with_failure_probability(mut self, failure_probability: f64) -> Self {
        self.failure_probability = Some(failure_probability);
        self
    }

    pub fn with_sensor_data(mut self, sensor_data: SensorData) -> Self {
        self.sensor_data = Some(sensor_data);
        self
    }

    /// Failure probability used for scoring (0 when never supplied).
    pub fn resolved_failure_probability(&self) -> f64 {
        self.failure_probability.unwrap_or(0.0)
    }

    /// Length of the auto-maintenance window, if this machine can get one.
    pub fn maintenance_window_hours(&self) -> Option<f64> {
        self.maintenance_duration_hours.filter(|h| *h > 0.0)
    }

    /// Overwrite risk fields from a predictor response.
    pub fn apply_prediction(&mut self, prediction: RiskPrediction) {
        self.failure_probability = Some(prediction.failure_probability);
        self.health_score = prediction.health_score;
        self.risk_level = prediction.risk_level;
    }
}

impl Entity for Machine {
    type Id = MachineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Reserved machine time directly after a job on a high-risk machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    pub start_hour: f64,
    pub end_hour: f64,
    pub cost: f64,
}

impl MaintenanceWindow {
    pub fn duration_hours(&self) -> f64 {
        self.end_hour - self.start_hour
    }
}

/// One job bound to one machine at an hour offset within the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub job_id: JobId,
    pub job_name: String,
    pub machine_id: MachineId,
    pub machine_name: String,
    pub start_hour: f64,
    pub end_hour: f64,
    pub duration_hours: f64,
    pub revenue: f64,
    /// Score that won this candidate its slot.
    pub score: f64,
    pub failure_probability: f64,
    pub downtime_risk: f64,
    pub maintenance_window: Option<MaintenanceWindow>,
}

/// Why a job received no assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeferralReason {
    #[serde(rename = "No machine matches job type")]
    NoMatchingMachineType,
    #[serde(rename = "All matching machines at capacity")]
    MachinesAtCapacity,
    #[serde(rename = "Deadline cannot be met")]
    DeadlineUnreachable,
    #[serde(rename = "Lower priority than competing jobs")]
    Outranked,
}

impl DeferralReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeferralReason::NoMatchingMachineType => "No machine matches job type",
            DeferralReason::MachinesAtCapacity => "All matching machines at capacity",
            DeferralReason::DeadlineUnreachable => "Deadline cannot be met",
            DeferralReason::Outranked => "Lower priority than competing jobs",
        }
    }
}

impl core::fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job left out of the schedule, with every reason that applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredJob {
    pub job_id: JobId,
    pub job_name: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub duration_hours: f64,
    pub revenue: f64,
    pub reasons: Vec<DeferralReason>,
}
