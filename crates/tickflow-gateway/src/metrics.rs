//! Prometheus metrics for monitoring.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

use tickflow_core::error::{Error, Result};
use tickflow_engine::{BacktestControl, EngineControl};

/// Metrics registry for the trading engine
#[derive(Debug)]
pub struct MetricsRegistry {
    /// Prometheus registry
    registry: Registry,
    /// Ticks consumed from the source
    pub ticks_total: Counter,
    /// Engine loop iterations
    pub loops_total: Counter,
    /// Orders emitted
    pub orders_total: Counter,
    /// Fills applied
    pub fills_total: Counter,
    /// Cancels recorded
    pub cancels_total: Counter,
    /// Signals denied by the risk gate
    pub risk_rejects_total: Counter,
    /// Current cash balance
    pub cash: Gauge<f64, AtomicU64>,
    /// Current total portfolio value
    pub equity: Gauge<f64, AtomicU64>,
    /// Realized P&L
    pub realized_pnl: Gauge<f64, AtomicU64>,
    /// Unrealized P&L
    pub unrealized_pnl: Gauge<f64, AtomicU64>,
    /// Engine loop latency histogram (nanoseconds)
    pub loop_latency_ns: Histogram,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    /// Create a new metrics registry
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let ticks_total = Counter::default();
        registry.register(
            "tickflow_ticks_total",
            "Ticks consumed from the market source",
            ticks_total.clone(),
        );

        let loops_total = Counter::default();
        registry.register(
            "tickflow_loops_total",
            "Engine loop iterations",
            loops_total.clone(),
        );

        let orders_total = Counter::default();
        registry.register(
            "tickflow_orders_total",
            "Orders emitted by the portfolio",
            orders_total.clone(),
        );

        let fills_total = Counter::default();
        registry.register(
            "tickflow_fills_total",
            "Fills applied to the portfolio",
            fills_total.clone(),
        );

        let cancels_total = Counter::default();
        registry.register(
            "tickflow_cancels_total",
            "Cancellations recorded",
            cancels_total.clone(),
        );

        let risk_rejects_total = Counter::default();
        registry.register(
            "tickflow_risk_rejects_total",
            "Signals denied by the risk gate",
            risk_rejects_total.clone(),
        );

        let cash = Gauge::<f64, AtomicU64>::default();
        registry.register("tickflow_cash", "Current cash balance", cash.clone());

        let equity = Gauge::<f64, AtomicU64>::default();
        registry.register(
            "tickflow_equity",
            "Current total portfolio value",
            equity.clone(),
        );

        let realized_pnl = Gauge::<f64, AtomicU64>::default();
        registry.register(
            "tickflow_realized_pnl",
            "Realized P&L in dollars",
            realized_pnl.clone(),
        );

        let unrealized_pnl = Gauge::<f64, AtomicU64>::default();
        registry.register(
            "tickflow_unrealized_pnl",
            "Unrealized P&L in dollars",
            unrealized_pnl.clone(),
        );

        let ns_buckets: Vec<f64> = exponential_buckets(100.0, 2.0, 20).collect();
        let loop_latency_ns = Histogram::new(ns_buckets.into_iter());
        registry.register(
            "tickflow_loop_latency_ns",
            "Engine loop latency in nanoseconds",
            loop_latency_ns.clone(),
        );

        Self {
            registry,
            ticks_total,
            loops_total,
            orders_total,
            fills_total,
            cancels_total,
            risk_rejects_total,
            cash,
            equity,
            realized_pnl,
            unrealized_pnl,
            loop_latency_ns,
        }
    }

    /// Record one engine loop iteration
    pub fn record_loop(&self, latency_ns: u64) {
        self.loops_total.inc();
        self.loop_latency_ns.observe(latency_ns as f64);
    }

    /// Encode metrics for Prometheus scraping
    #[must_use]
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        if encode(&mut buffer, &self.registry).is_err() {
            buffer.clear();
        }
        buffer
    }
}

/// Engine control that feeds loop telemetry into Prometheus and logs
/// handler errors before aborting the run.
#[derive(Debug)]
pub struct MetricsControl {
    inner: BacktestControl,
    metrics: Arc<MetricsRegistry>,
    last_ticks: u64,
}

impl MetricsControl {
    /// Wrap a backtest control with a metrics sink
    #[must_use]
    pub fn new(inner: BacktestControl, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            inner,
            metrics,
            last_ticks: 0,
        }
    }
}

impl EngineControl for MetricsControl {
    fn should_stop(&self) -> bool {
        self.inner.should_stop()
    }

    fn handle_no_event(&mut self) -> bool {
        self.inner.handle_no_event()
    }

    fn on_error(&mut self, err: Error) -> Result<()> {
        tracing::error!(error = %err, "engine handler error");
        Err(err)
    }

    fn record_loop(&mut self, latency_ns: u64, ticks: u64) {
        self.metrics.record_loop(latency_ns);
        if ticks > self.last_ticks {
            self.metrics.ticks_total.inc_by(ticks - self.last_ticks);
            self.last_ticks = ticks;
        }
        self.inner.record_loop(latency_ns, ticks);
    }
}
