use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

use pulsewatch::config::AppConfig;
use pulsewatch::logging;
use pulsewatch::monitor::registry::Registry;
use pulsewatch::notifications::sink::AlertSink;
use pulsewatch::probe::{database, ProbeRunner};
use pulsewatch::version::VERSION;

const DEFAULT_CONFIG_FILE: &str = "pulsewatch.yml";

/// Alerts allowed in flight between the monitor workers and the sink before
/// workers start waiting on the hand-off.
const ALERT_QUEUE_CAPACITY: usize = 16;

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about = "Heartbeat monitor with transition alerts", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // The logging level comes out of the config, so the config loads first;
    // failures at this point can only go to stderr.
    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pulsewatch: failed to load '{}': {e}", args.config);
            std::process::exit(1);
        }
    };

    logging::init(&config.log_level);
    info!(version = VERSION, "***** pulsewatch *****");
    info!(
        config = %args.config,
        entities = config.watch.len(),
        interval_seconds = config.check_interval.max(1),
        "Configuration loaded."
    );
    config.warn_misconfigured();

    database::install_default_drivers();

    let (alert_tx, alert_rx) = mpsc::channel(ALERT_QUEUE_CAPACITY);
    let sink = AlertSink::from_config(&config.notify);
    info!(senders = ?sink.sender_names(), "Alert sink ready.");
    tokio::spawn(sink.run(alert_rx));

    let default_timeout = Duration::from_secs(config.probe_timeout.max(1));
    let mut registry = Registry::new(Arc::new(ProbeRunner::new()), alert_tx, default_timeout);

    let mut ticker = tokio::time::interval(Duration::from_secs(config.check_interval.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Running...");
    loop {
        tokio::select! {
            _ = ticker.tick() => registry.check(&config.watch),
            result = &mut shutdown => {
                match result {
                    Ok(()) => info!("Shutdown signal received; stopping."),
                    Err(e) => error!(error = %e, "Failed to listen for the shutdown signal; stopping."),
                }
                break;
            }
        }
    }

    registry.shutdown();
    info!("Stopped.");
}
