//! The optimizer entrypoint.
//!
//! [`Optimizer::optimize`] is the async surface (validation, optional risk
//! enrichment, then the core). [`Optimizer::optimize_at`] is the synchronous,
//! deterministic core with an injected clock.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use forgeline_core::{DomainResult, RunId};

use crate::assignment::{assign, verify};
use crate::candidate::{generate_candidates, rank_candidates};
use crate::deferral::defer_unassigned;
use crate::enrichment::{Enrichment, enrich_machines};
use crate::metrics::{self, Kpis, MachineUtilization, RiskSummary};
use crate::model::{Assignment, DeferredJob, Job, Machine};
use crate::params::{CostParams, WeightPolicy, Weights};
use crate::validation::validate_input;

/// Input of one optimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeRequest {
    pub jobs: Vec<Job>,
    pub machines: Vec<Machine>,
    pub weights: Weights,
    pub costs: CostParams,
    /// Resolve failure probabilities through the configured predictor first.
    pub fetch_risk: bool,
}

impl OptimizeRequest {
    pub fn new(jobs: Vec<Job>, machines: Vec<Machine>) -> Self {
        Self {
            jobs,
            machines,
            weights: Weights::default(),
            costs: CostParams::default(),
            fetch_risk: false,
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_costs(mut self, costs: CostParams) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_fetch_risk(mut self, fetch_risk: bool) -> Self {
        self.fetch_risk = fetch_risk;
        self
    }
}

/// Result of one optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub run_id: RunId,
    pub schedule: Vec<Assignment>,
    pub deferred_jobs: Vec<DeferredJob>,
    pub kpis: Kpis,
    pub risk_summary: RiskSummary,
    pub machine_utilization: Vec<MachineUtilization>,
    pub weights_used: Weights,
    pub costs_used: CostParams,
    pub execution_time_ms: u64,
}

/// Stateless optimizer. Holds only the weight policy; every run builds its
/// own machine state.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Optimizer {
    weight_policy: WeightPolicy,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimizer for unbounded dashboard input: weights are normalized.
    pub fn realtime() -> Self {
        Self::new().with_weight_policy(WeightPolicy::Normalized)
    }

    pub fn with_weight_policy(mut self, weight_policy: WeightPolicy) -> Self {
        self.weight_policy = weight_policy;
        self
    }

    /// Validate, optionally enrich, then run the core against the current time.
    ///
    /// Validation happens before any predictor call, so bad input never
    /// reaches the network.
    pub async fn optimize(
        &self,
        request: OptimizeRequest,
        enrichment: &Enrichment,
    ) -> DomainResult<RunResult> {
        validate_input(&request.jobs, &request.machines, &request.weights, &request.costs)?;

        let mut request = request;
        if request.fetch_risk {
            if enrichment.is_enabled() {
                request.machines = enrich_machines(request.machines, enrichment).await;
            } else {
                warn!("risk fetch requested but no predictor is configured; using supplied probabilities");
            }
        }

        self.optimize_at(request, Utc::now())
    }

    /// Synchronous core. `now` is the single clock reading used for every
    /// deadline check in the run.
    pub fn optimize_at(&self, request: OptimizeRequest, now: DateTime<Utc>) -> DomainResult<RunResult> {
        let started = Instant::now();
        let OptimizeRequest {
            jobs,
            machines,
            weights,
            costs,
            ..
        } = request;

        validate_input(&jobs, &machines, &weights, &costs)?;
        let weights = self.weight_policy.apply(weights);

        let mut candidates = generate_candidates(&jobs, &machines, &weights, &costs);
        rank_candidates(&mut candidates, &jobs);

        let allocation = assign(&candidates, &jobs, &machines, now);
        verify(&allocation, &jobs, &machines)?;

        let deferred_jobs = defer_unassigned(&jobs, &machines, &allocation, now);
        let metrics = metrics::compute(&jobs, &machines, &allocation, &deferred_jobs);

        let run_id = RunId::new();
        let execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            run_id = %run_id,
            policy = ?self.weight_policy,
            jobs = jobs.len(),
            machines = machines.len(),
            candidates = candidates.len(),
            scheduled = metrics.kpis.scheduled_jobs,
            deferred = metrics.kpis.deferred_jobs,
            revenue = metrics.kpis.total_revenue,
            execution_ms = execution_time_ms,
            "schedule optimized"
        );

        Ok(RunResult {
            run_id,
            schedule: allocation.schedule,
            deferred_jobs,
            kpis: metrics.kpis,
            risk_summary: metrics.risk_summary,
            machine_utilization: metrics.machine_utilization,
            weights_used: weights,
            costs_used: costs,
            execution_time_ms,
        })
    }
}
