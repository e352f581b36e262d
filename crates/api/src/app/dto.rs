use serde::Deserialize;

use forgeline_scheduling::{CostParams, Job, Machine, OptimizeRequest, Weights};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/v1/scheduling/optimize`.
///
/// Missing `jobs`/`machines` read as empty lists so the engine reports them
/// with its own validation message.
#[derive(Debug, Deserialize)]
pub struct OptimizeBody {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub machines: Vec<Machine>,
    #[serde(default)]
    pub weights: Option<Weights>,
    #[serde(default)]
    pub costs: Option<CostsBody>,
    #[serde(default, alias = "fetchMlRisk")]
    pub fetch_risk: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CostsBody {
    pub downtime_cost_per_hour: Option<f64>,
}

impl OptimizeBody {
    /// Map onto an engine request, filling omitted costs from the server default.
    pub fn into_request(self, default_costs: CostParams) -> OptimizeRequest {
        let costs = CostParams::new(
            self.costs
                .and_then(|c| c.downtime_cost_per_hour)
                .unwrap_or(default_costs.downtime_cost_per_hour),
        );

        OptimizeRequest::new(self.jobs, self.machines)
            .with_weights(self.weights.unwrap_or_default())
            .with_costs(costs)
            .with_fetch_risk(self.fetch_risk)
    }
}

/// Body of `POST /api/schedule/optimize` (dashboard sliders).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeWeightsBody {
    pub throughput_weight: Option<f64>,
    pub downtime_weight: Option<f64>,
    pub maintenance_weight: Option<f64>,
}

impl RealtimeWeightsBody {
    pub fn weights(&self) -> Weights {
        let d = Weights::default();
        Weights::new(
            self.throughput_weight.unwrap_or(d.throughput),
            self.downtime_weight.unwrap_or(d.downtime),
            self.maintenance_weight.unwrap_or(d.maintenance),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn optimize_body_accepts_aliases_and_fills_defaults() {
        let body: OptimizeBody = serde_json::from_value(json!({
            "jobs": [{"id": "J1", "type": "cnc", "duration_hours": 2, "revenue": 100}],
            "machines": [{"id": "M1", "type": "cnc", "capacity_hours_per_day": 8}],
            "weights": {"W2_downtime_risk": 2.0},
            "fetchMlRisk": true
        }))
        .unwrap();

        let req = body.into_request(CostParams::new(9500.0));
        assert_eq!(req.weights, Weights::new(1.0, 2.0, 0.5));
        assert_eq!(req.costs, CostParams::new(9500.0));
        assert!(req.fetch_risk);
        assert_eq!(req.jobs.len(), 1);
    }

    #[test]
    fn explicit_costs_win_over_server_default() {
        let body: OptimizeBody =
            serde_json::from_value(json!({"costs": {"downtime_cost_per_hour": 100}})).unwrap();

        let req = body.into_request(CostParams::new(9500.0));
        assert_eq!(req.costs, CostParams::new(100.0));
        assert!(req.jobs.is_empty());
    }

    #[test]
    fn realtime_body_defaults_missing_sliders() {
        let body: RealtimeWeightsBody = serde_json::from_value(json!({"downtimeWeight": 3})).unwrap();
        assert_eq!(body.weights(), Weights::new(1.0, 3.0, 0.5));
    }

    fn job_with(extra: serde_json::Value) -> Job {
        let mut job = json!({"id": "J1", "type": "cnc", "duration_hours": 2});
        if let (Some(job), Some(extra)) = (job.as_object_mut(), extra.as_object()) {
            job.extend(extra.clone());
        }
        let body: OptimizeBody = serde_json::from_value(json!({"jobs": [job]})).unwrap();
        body.jobs.into_iter().next().unwrap()
    }

    #[test]
    fn deadline_as_bare_date_is_midnight_utc() {
        let job = job_with(json!({"deadline": "2030-01-01"}));
        assert_eq!(job.deadline, Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn deadline_without_offset_is_read_as_utc() {
        let job = job_with(json!({"deadline": "2030-01-01T12:00:00"}));
        assert_eq!(job.deadline, Some(Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()));
    }

    #[test]
    fn deadline_in_rfc3339_is_accepted() {
        let job = job_with(json!({"deadline": "2030-01-01T12:00:00Z"}));
        assert_eq!(job.deadline, Some(Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()));
    }

    #[test]
    fn fractional_priority_is_kept() {
        assert_eq!(job_with(json!({"priority": 4.5})).priority, 4.5);
    }

    #[test]
    fn partial_sensor_bag_is_accepted() {
        let body: OptimizeBody = serde_json::from_value(json!({
            "machines": [{
                "id": "M1",
                "type": "cnc",
                "capacity_hours_per_day": 8,
                "sensor_data": {"vibration": 3.1, "rpm": 2000}
            }]
        }))
        .unwrap();

        let features = body.machines[0].sensor_data.as_ref().unwrap();
        assert_eq!(features.operating_hours, None);
        assert_eq!(features.vibration, Some(3.1));
        assert_eq!(features.rpm, Some(2000.0));
    }
}
