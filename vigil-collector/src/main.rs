//! Vigil Collector CLI
//!
//! Polls a Jenkins-style CI server and prints utilization and build metrics
//! as influx line protocol on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vigil_collector::scheduler::log_report;
use vigil_collector::sink::{LineProtocolSink, MetricSink};
use vigil_collector::{Collector, Config, CycleOutcome};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Collects job and node metrics from a Jenkins server", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "VIGIL_URL", default_value = "http://localhost:8080")]
    url: String,

    #[arg(long, env = "VIGIL_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "VIGIL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// HTTP response timeout in seconds
    #[arg(long, env = "VIGIL_RESPONSE_TIMEOUT", default_value_t = 5)]
    response_timeout: u64,

    /// Maximum simultaneous requests
    #[arg(long, env = "VIGIL_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: usize,

    /// Skip builds that started more than this many seconds ago
    #[arg(long, env = "VIGIL_MAX_BUILD_AGE", default_value_t = 3600)]
    max_build_age: u64,

    /// Stop descending at this depth (0 = unbounded)
    #[arg(long, env = "VIGIL_MAX_SUBJOB_DEPTH", default_value_t = 0)]
    max_subjob_depth: usize,

    /// Children examined per layer, newest first
    #[arg(long, env = "VIGIL_MAX_SUBJOB_PER_LAYER", default_value_t = 10)]
    max_subjob_per_layer: usize,

    /// Add a `labels` tag to node metrics
    #[arg(long, env = "VIGIL_NODE_LABELS_AS_TAG")]
    node_labels_as_tag: bool,

    /// Glob over full job paths to include (repeatable)
    #[arg(long, env = "VIGIL_JOB_INCLUDE", value_delimiter = ',')]
    job_include: Vec<String>,

    #[arg(long, env = "VIGIL_JOB_EXCLUDE", value_delimiter = ',')]
    job_exclude: Vec<String>,

    /// Glob over node names to include (repeatable)
    #[arg(long, env = "VIGIL_NODE_INCLUDE", value_delimiter = ',')]
    node_include: Vec<String>,

    #[arg(long, env = "VIGIL_NODE_EXCLUDE", value_delimiter = ',')]
    node_exclude: Vec<String>,

    /// Seconds between collection cycles
    #[arg(long, env = "VIGIL_INTERVAL", default_value_t = 10)]
    interval: u64,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            url: cli.url,
            username: cli.username,
            password: cli.password,
            response_timeout: Duration::from_secs(cli.response_timeout),
            max_connections: cli.max_connections,
            max_build_age: Duration::from_secs(cli.max_build_age),
            max_subjob_depth: cli.max_subjob_depth,
            max_subjob_per_layer: cli.max_subjob_per_layer,
            node_labels_as_tag: cli.node_labels_as_tag,
            job_include: cli.job_include,
            job_exclude: cli.job_exclude,
            node_include: cli.node_include,
            node_exclude: cli.node_exclude,
            interval: Duration::from_secs(cli.interval),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil_collector=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let once = cli.once;
    let collector = Collector::new(Config::from(cli)).context("Invalid configuration")?;

    let config = collector.config();
    info!(
        "Loaded configuration: url={}, max_connections={}, max_subjob_depth={}",
        config.url, config.max_connections, config.max_subjob_depth
    );
    let sink: Arc<dyn MetricSink> = Arc::new(LineProtocolSink::stdout());

    if once {
        let report = collector.gather(sink).await;
        log_report(&report);
        if report.outcome() == CycleOutcome::Failed {
            anyhow::bail!("collection failed with {} error(s)", report.errors.len());
        }
        return Ok(());
    }

    tokio::select! {
        _ = collector.run(sink) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
