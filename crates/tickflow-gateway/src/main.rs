//! Tickflow Gateway - Main Entry Point
//!
//! Wires a market source, the momentum strategy, the replay executor, and
//! the portfolio into the engine loop, with prometheus metrics on the side.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tickflow_core::traits::MarketSource;
use tickflow_core::types::SymbolId;
use tickflow_engine::{BacktestControl, Engine};
use tickflow_exec::ReplayExecutor;
use tickflow_feed::{SyntheticSource, TickFileReader};
use tickflow_gateway::config::AppConfig;
use tickflow_gateway::metrics::{MetricsControl, MetricsRegistry};
use tickflow_gateway::server::{start_metrics_server, AppStatus, ServerState};
use tickflow_portfolio::{PortfolioManager, RiskLimits};
use tickflow_strategy::{MomentumConfig, MomentumStrategy};

/// Fixed symbol universe of the gateway engine
const SYMBOL_CAPACITY: usize = 1024;

/// Tickflow Trading Engine
#[derive(Parser, Debug)]
#[command(name = "tickflow")]
#[command(version = "0.1.0")]
#[command(about = "Event-driven backtesting engine", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Binary tick file to replay; synthetic data when omitted
    #[arg(short, long)]
    data: Option<String>,

    /// Tick budget for the run
    #[arg(short, long)]
    events: Option<u64>,

    /// Seed for synthetic data
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Metrics server port
    #[arg(short, long, default_value = "9090")]
    metrics_port: u16,

    /// Keep the metrics server running after the backtest
    #[arg(long)]
    serve: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("Starting tickflow v0.1.0");

    let config = if std::path::Path::new(&args.config).exists() {
        AppConfig::load(&args.config)?
    } else {
        tracing::warn!("Config file not found, using defaults");
        AppConfig::default()
    };

    let metrics = Arc::new(MetricsRegistry::new());
    let state = Arc::new(ServerState::new(metrics.clone()));

    let server_state = state.clone();
    let metrics_port = args.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = start_metrics_server(server_state, metrics_port).await {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    state.set_status(AppStatus::Running).await;

    let run_config = config.clone();
    let run_metrics = metrics.clone();
    let data = args.data.clone();
    let seed = args.seed;
    let events = args.events;
    tokio::task::spawn_blocking(move || {
        run_backtest(&run_config, data.as_deref(), seed, events, &run_metrics)
    })
    .await??;

    if args.serve {
        tracing::info!("Backtest complete; serving metrics until Ctrl-C");
        tokio::signal::ctrl_c().await?;
    }

    state.set_status(AppStatus::Stopped).await;
    tracing::info!("tickflow shutdown complete");
    Ok(())
}

/// Run a full backtest and publish the outcome to the metrics registry.
fn run_backtest(
    config: &AppConfig,
    data: Option<&str>,
    seed: u64,
    events: Option<u64>,
    metrics: &Arc<MetricsRegistry>,
) -> anyhow::Result<()> {
    let source: Box<dyn MarketSource + Send> = match data {
        Some(path) => {
            tracing::info!("Replaying tick file {}", path);
            Box::new(TickFileReader::open(path)?)
        }
        None => {
            let mut synthetic = config.synthetic.clone();
            if let Some(n) = events {
                synthetic.limit = Some(n);
            }
            tracing::info!(
                symbols = synthetic.symbols.len(),
                limit = synthetic.limit,
                seed,
                "Using synthetic data"
            );
            Box::new(SyntheticSource::with_seed(synthetic, seed))
        }
    };

    let strategy = MomentumStrategy::new(MomentumConfig {
        threshold: config.trading.momentum_threshold,
        order_size: config.trading.momentum_order_size,
        max_position: config.trading.max_position,
        ..MomentumConfig::default()
    });

    let mut portfolio: PortfolioManager<SYMBOL_CAPACITY> =
        PortfolioManager::new(config.trading.starting_cash);
    let limits = RiskLimits::new(
        config.trading.max_position,
        config.trading.max_order_size,
        config.trading.max_notional,
    );
    for i in 0..config.synthetic.symbols.len() as u32 {
        portfolio.set_risk_limit(SymbolId::new(i), limits)?;
    }

    let control = match events {
        Some(n) => MetricsControl::new(BacktestControl::with_max_ticks(n), metrics.clone()),
        None => MetricsControl::new(BacktestControl::new(), metrics.clone()),
    };

    let mut engine: Engine<SYMBOL_CAPACITY, _, _, _, _> = Engine::new(
        source,
        strategy,
        ReplayExecutor::new(),
        portfolio,
        control,
    );

    let started = Instant::now();
    engine.run()?;
    let elapsed = started.elapsed();

    let pm = engine.portfolio();
    let summary = pm.compute_metrics();
    let equity = pm.get_total_value();

    tracing::info!("Backtest completed in {:?}", elapsed);
    tracing::info!("Ticks processed: {}", engine.ticks());
    tracing::info!("Orders emitted: {}", engine.strategy().orders_emitted());
    tracing::info!(
        "Fills: {} | Cancels: {} | Risk rejects: {}",
        pm.fill_count(),
        pm.cancel_count(),
        pm.reject_count()
    );
    tracing::info!(
        "Realized P&L: ${:.2} | Unrealized P&L: ${:.2}",
        summary.realized_pnl,
        summary.unrealized_pnl
    );
    tracing::info!(
        "Active positions: {} | Gross exposure: ${:.2}",
        summary.active_positions,
        summary.gross_exposure
    );
    tracing::info!("Cash: ${:.2} | Equity: ${:.2}", pm.cash(), equity);

    metrics.orders_total.inc_by(engine.strategy().orders_emitted());
    metrics.fills_total.inc_by(pm.fill_count());
    metrics.cancels_total.inc_by(pm.cancel_count());
    metrics.risk_rejects_total.inc_by(pm.reject_count());
    metrics.cash.set(pm.cash());
    metrics.equity.set(equity);
    metrics.realized_pnl.set(summary.realized_pnl);
    metrics.unrealized_pnl.set(summary.unrealized_pnl);

    Ok(())
}
