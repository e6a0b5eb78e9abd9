//! Mihomo Ctl - CLI entry point
//!
//! Resolves the effective configuration (flags > store > environment >
//! built-in default), builds the API client, and routes to the requested
//! sub-command.

use clap::{Parser, Subcommand};
use mihomo_ctl::api::ApiClient;
use mihomo_ctl::{cmd, config, Result, VERSION};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "mihomo-ctl")]
#[command(version = VERSION)]
#[command(about = "Controller for the mihomo external controller API")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Daemon address, e.g. 127.0.0.1:9090 (overrides store and environment)
    #[arg(long)]
    host: Option<String>,

    /// API secret (overrides store and environment)
    #[arg(long)]
    secret: Option<String>,

    /// Config store path
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List policy groups and endpoint nodes
    List {
        /// Show policy groups only
        #[arg(long)]
        groups: bool,

        /// Show endpoint nodes only
        #[arg(long)]
        nodes: bool,
    },

    /// Probe node delays
    Ping {
        /// Probe every member of this group (explicit --node args are ignored)
        #[arg(long)]
        group: Option<String>,

        /// Node to probe; may be repeated
        #[arg(long = "node")]
        nodes: Vec<String>,

        /// Probe URL
        #[arg(long, default_value = cmd::ping::DEFAULT_TEST_URL)]
        url: String,

        /// Probe timeout in milliseconds
        #[arg(long, default_value_t = cmd::ping::DEFAULT_TIMEOUT_MS)]
        timeout: u64,
    },

    /// Switch a group's active member
    Switch {
        /// Policy group name
        group: String,

        /// Member node to select
        node: String,

        /// Verify membership before switching
        #[arg(long)]
        validate: bool,
    },

    /// Show or update the persisted host/secret
    Config {
        /// Store this host as the default
        #[arg(long)]
        host: Option<String>,

        /// Store this secret as the default
        #[arg(long)]
        secret: Option<String>,

        /// Print the stored configuration
        #[arg(long)]
        show: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // One-shot client; a single-threaded runtime is all it needs.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mihomo_ctl=warn")))
        .init();

    let cli = Cli::parse();

    if let Command::Ping { group: None, nodes, .. } = &cli.command {
        if nodes.is_empty() {
            error!("specify --group or at least one --node to probe");
            std::process::exit(2);
        }
    }

    let store_path = config::store_path(cli.config);

    let result = match cli.command {
        // Operates on the store alone; no client, no tier resolution.
        Command::Config { host, secret, show } => cmd::config::run(&store_path, host, secret, show),
        command => {
            let stored = config::StoredConfig::load(&store_path);
            let (env_host, env_secret) = config::env_tier();
            let effective = config::resolve(cli.host, cli.secret, &stored, env_host, env_secret);

            match ApiClient::new(&effective.host, effective.secret) {
                Ok(client) => dispatch(&client, command).await,
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch(client: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::List { groups, nodes } => cmd::list::run(client, groups, nodes).await,
        Command::Ping { group, nodes, url, timeout } => {
            cmd::ping::run(client, group.as_deref(), nodes, &url, timeout).await
        }
        Command::Switch { group, node, validate } => {
            cmd::switch::run(client, &group, &node, validate).await
        }
        Command::Config { .. } => unreachable!("config is handled before client construction"),
    }
}
