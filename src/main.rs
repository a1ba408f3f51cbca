//! Alertbridge - Forward Elasticsearch alert documents to Microsoft Teams.
//!
//! # Overview
//!
//! Alertbridge polls an Elasticsearch index for alert documents written in the
//! last polling interval (for example by Kibana alerting rules) and posts one
//! Teams message card per document to an incoming webhook.
//!
//! Each card carries:
//!
//! - **Title**: a severity icon, the event type and the rule name
//! - **Text**: the alert date, the number of matching documents and the rule name
//! - **Details**: one fact per non-empty field of the document
//! - **Tags**: the comma separated tags of the document
//!
//! # Configuration
//!
//! Every setting has a default and can be set in an optional YAML file or in
//! the environment:
//!
//! ```bash
//! export ELASTIC_HOST="https://elastic.example.com:9200"
//! export ELASTIC_PASSWORD="secret"
//! export NOTIFY_MSTEAMS_WEBHOOK="https://example.webhook.office.com/webhookb2/..."
//! export ALERT_INTERVAL=300
//! ```
//!
//! See the [`config`] module for all keys.
//!
//! # Usage
//!
//! ```bash
//! alertbridge --config alertbridge.yaml
//! alertbridge --dry-run --once
//! ```
//!
//! # Architecture
//!
//! - [`config`] - Layered configuration (defaults, YAML file, environment)
//! - [`elastic`] - Search backend client and alert documents
//! - [`notifier`] - Message card composition and Teams webhook client
//! - [`poller`] - Poll loop tying search and notification together
//!
//! # Runtime Behavior
//!
//! Cycles run sequentially: search, notify every hit, sleep `ALERT_INTERVAL`
//! seconds, repeat. Any error (search, decoding, delivery) stops the process
//! with exit code 1 so that the supervisor can restart it.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{config::Config, poller::Poller};

mod config;
mod elastic;
mod notifier;
mod poller;

/// Command-line arguments of alertbridge.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to an optional YAML configuration file.
    ///
    /// Environment variables take precedence over values of the file.
    #[arg(short, long)]
    config: Option<String>,

    /// Log the message cards instead of sending them.
    ///
    /// Forces dry run whatever the `DRYRUN` setting is.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Run a single poll cycle and exit.
    #[arg(long)]
    once: bool,
}

/// Main entry point of alertbridge.
///
/// 1. **Logging Setup**: `info` level by default, overridable with `RUST_LOG`
/// 2. **Argument Parsing**: with `clap`
/// 3. **Configuration Loading**: defaults, YAML file, environment
/// 4. **Polling**: forever, or a single cycle with `--once`
///
/// Exits with code 1 on the first error.
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting alertbridge {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if args.dry_run {
        config.dryrun = true;
    }
    info!("configuration {:?}", config);
    if config.dryrun {
        info!("dry run enabled, messages will only be logged");
    }

    let poller = match Poller::from_config(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize poller: {}", e);
            std::process::exit(1);
        }
    };

    if args.once {
        if let Err(e) = poller.run_cycle().await {
            error!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    let e = poller.run().await;
    error!("{}", e);
    std::process::exit(1);
}
