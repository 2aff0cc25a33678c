mod handlers;
mod state;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use axum::Router;
use axum::routing::get;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use aruba_core::collector::{Collector, SshRunner};
use aruba_core::config::{Config, ConfigError};

use state::{AppInner, SharedState};

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(
    name = "aruba-exporter",
    about = "Prometheus exporter for Aruba switches",
    version = aruba_core::VERSION
)]
struct Args {
    /// Address to listen on for web interface and telemetry.
    #[arg(long = "web.listen-address", default_value = ":9909", env = "ARUBA_LISTEN")]
    listen_address: String,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", default_value = "/metrics")]
    telemetry_path: String,

    /// Comma-separated hosts to scrape (host or host:port).
    #[arg(long = "ssh.targets", default_value = "")]
    ssh_targets: String,

    /// Username to use when connecting to devices using ssh.
    #[arg(long = "ssh.user", default_value = "aruba_exporter")]
    ssh_user: String,

    /// Public key file to use when connecting to devices using ssh.
    #[arg(long = "ssh.keyfile")]
    ssh_keyfile: Option<PathBuf>,

    /// Password to use when connecting to devices using ssh.
    /// Falls back to the SSH_PASSWORD environment variable.
    #[arg(long = "ssh.password")]
    ssh_password: Option<String>,

    /// Timeout in seconds to use for SSH connections.
    #[arg(long = "ssh.timeout", default_value_t = 5)]
    ssh_timeout: u64,

    /// Read batch size in bytes for SSH session output.
    #[arg(long = "ssh.batch-size", default_value_t = 10000)]
    ssh_batch_size: usize,

    /// Log level (trace, debug, info, warn, error). RUST_LOG overrides it.
    #[arg(long, default_value = "info")]
    level: String,

    /// TOML config file. When set, the ssh.* flags are ignored.
    #[arg(long = "config.file")]
    config_file: Option<PathBuf>,
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();
    let config = load_config(&args, std::env::var("SSH_PASSWORD").ok());

    let level = config
        .as_ref()
        .map(|c| c.level.as_str())
        .unwrap_or(args.level.as_str());
    init_logging(level);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "could not initialize exporter");
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve(args, config)) {
        error!(error = ?e, "exporter failed");
        process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("aruba_exporter={0},aruba_core={0}", level)))
        .unwrap_or_else(|_| EnvFilter::new("aruba_exporter=info,aruba_core=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds the configuration from `--config.file` or, without one, from flags.
fn load_config(args: &Args, env_password: Option<String>) -> Result<Config, ConfigError> {
    let mut config = match &args.config_file {
        Some(path) => Config::load(path)?,
        None => {
            let mut config = Config::new();
            config.level = args.level.clone();
            config.timeout = args.ssh_timeout;
            config.batch_size = args.ssh_batch_size;
            config.username = args.ssh_user.clone();
            config.password = args.ssh_password.clone();
            config.key_file = args.ssh_keyfile.clone();
            config.add_targets(&args.ssh_targets)?;
            config
        }
    };
    config.fill_password(env_password);
    config.validate()?;
    Ok(config)
}

async fn serve(args: Args, config: Config) -> Result<()> {
    check_telemetry_path(&args.telemetry_path)?;

    let collector = Collector::new(&config, Arc::new(SshRunner::new(&config)));
    info!(
        version = aruba_core::VERSION,
        devices = collector.devices().len(),
        reports = ?collector.reports(),
        "starting aruba_exporter"
    );

    let state = Arc::new(AppInner::new(collector, args.telemetry_path.clone()));
    let app = router(state);

    let addr = bind_address(&args.listen_address);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("listening on {addr}"))?;
    let local_addr = listener.local_addr().context("getting local address")?;
    info!(addr = %local_addr, path = %args.telemetry_path, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

pub(crate) fn router(state: SharedState) -> Router {
    let telemetry_path = state.telemetry_path.clone();
    Router::new()
        .route("/", get(handlers::handle_landing))
        .route(&telemetry_path, get(handlers::handle_metrics))
        .route("/healthz", get(handlers::handle_health))
        .layer(CompressionLayer::new())
        .with_state(state)
}

fn check_telemetry_path(path: &str) -> Result<()> {
    ensure!(
        path.starts_with('/'),
        "telemetry path '{path}' must start with '/'"
    );
    ensure!(
        path != "/" && path != "/healthz",
        "telemetry path '{path}' collides with a built-in route"
    );
    Ok(())
}

/// Expands the `:port` shorthand to all interfaces.
fn bind_address(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}
