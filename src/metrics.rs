use crate::gateway::GatewayOperation;
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, IntGauge, Registry, TextEncoder, histogram_opts, opts,
};

/// Prometheus metrics registry and collectors for the studio
pub struct StudioMetrics {
    registry: Registry,

    // Gateway metrics
    gateway_requests: IntCounterVec,
    gateway_duration: HistogramVec,
    degraded_results: IntCounterVec,

    // Session metrics
    stale_replies: IntCounterVec,
    aborted_sessions: IntCounterVec,

    // Workspace metrics
    artifacts: IntGauge,
}

impl StudioMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let gateway_requests = IntCounterVec::new(
            opts!(
                "bindlab_gateway_requests_total",
                "Total number of requests dispatched to the analysis gateway"
            ),
            &["operation"],
        )?;

        let gateway_duration = HistogramVec::new(
            histogram_opts!(
                "bindlab_gateway_duration_seconds",
                "Analysis gateway round-trip duration in seconds",
                vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
            ),
            &["operation"],
        )?;

        let degraded_results = IntCounterVec::new(
            opts!(
                "bindlab_degraded_results_total",
                "Gateway failures converted into degraded results"
            ),
            &["operation"],
        )?;

        let stale_replies = IntCounterVec::new(
            opts!(
                "bindlab_stale_replies_total",
                "Replies discarded because their session was superseded"
            ),
            &["operation"],
        )?;

        let aborted_sessions = IntCounterVec::new(
            opts!(
                "bindlab_aborted_sessions_total",
                "Sessions whose gateway task ended without a reply"
            ),
            &["operation"],
        )?;

        let artifacts = IntGauge::with_opts(opts!(
            "bindlab_artifacts",
            "Current number of files in the workspace"
        ))?;

        registry.register(Box::new(gateway_requests.clone()))?;
        registry.register(Box::new(gateway_duration.clone()))?;
        registry.register(Box::new(degraded_results.clone()))?;
        registry.register(Box::new(stale_replies.clone()))?;
        registry.register(Box::new(aborted_sessions.clone()))?;
        registry.register(Box::new(artifacts.clone()))?;

        Ok(Self {
            registry,
            gateway_requests,
            gateway_duration,
            degraded_results,
            stale_replies,
            aborted_sessions,
            artifacts,
        })
    }

    pub fn record_request(&self, operation: GatewayOperation) {
        self.gateway_requests
            .with_label_values(&[operation.as_str()])
            .inc();
    }

    pub fn observe_duration(&self, operation: GatewayOperation, seconds: f64) {
        self.gateway_duration
            .with_label_values(&[operation.as_str()])
            .observe(seconds);
    }

    pub fn record_degraded(&self, operation: GatewayOperation) {
        self.degraded_results
            .with_label_values(&[operation.as_str()])
            .inc();
    }

    pub fn record_stale(&self, operation: GatewayOperation) {
        self.stale_replies
            .with_label_values(&[operation.as_str()])
            .inc();
    }

    pub fn record_aborted(&self, operation: GatewayOperation) {
        self.aborted_sessions
            .with_label_values(&[operation.as_str()])
            .inc();
    }

    pub fn set_artifact_count(&self, count: usize) {
        self.artifacts.set(count as i64);
    }

    pub fn requests(&self, operation: GatewayOperation) -> u64 {
        self.gateway_requests
            .with_label_values(&[operation.as_str()])
            .get()
    }

    pub fn degraded(&self, operation: GatewayOperation) -> u64 {
        self.degraded_results
            .with_label_values(&[operation.as_str()])
            .get()
    }

    pub fn stale(&self, operation: GatewayOperation) -> u64 {
        self.stale_replies
            .with_label_values(&[operation.as_str()])
            .get()
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
