//! Printboard - fingerprint registry server and client

use anyhow::Context;
use clap::{Parser, Subcommand};
use printboard_client::{SessionOptions, SyncClient, SyncSession, View};
use printboard_core::{BindMode, PrintboardConfig};
use printboard_gateway::start_gateway;
use printboard_identity::DerivationEngine;
use printboard_signals::{collect, CollectorOptions, Profile, ProfileEnvironment};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "printboard.toml";

#[derive(Parser)]
#[command(
    name = "printboard",
    about = "Browser fingerprint registry: derive, register, and watch who else is here"
)]
struct Cli {
    /// Config file (default: $PRINTBOARD_CONFIG or ./printboard.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the registry server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        /// lan | loopback
        #[arg(short, long)]
        bind: Option<String>,
        /// Durable registry directory (default: $PRINTBOARD_DATA_DIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Ignore any data directory and keep the registry in memory
        #[arg(long)]
        memory: bool,
    },
    /// Collect signals from a profile and print the derived fingerprint
    Derive {
        /// JSON profile; omitted means the host's own report
        #[arg(short, long)]
        profile: Option<PathBuf>,
        /// Print the full fingerprint as JSON
        #[arg(long)]
        json: bool,
    },
    /// Register a fingerprint and keep watching the live list
    Watch {
        /// Server URL (default: $PRINTBOARD_SERVER or client.server_url)
        #[arg(short, long)]
        server: Option<String>,
        #[arg(short, long)]
        profile: Option<PathBuf>,
        /// Also poll the debug view
        #[arg(long)]
        debug: bool,
    },
    /// Print the server's debug view
    Debug {
        #[arg(short, long)]
        server: Option<String>,
    },
    /// Print the effective configuration as TOML
    Config,
    /// Show version
    Version,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "printboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<PrintboardConfig> {
    let path = path
        .or_else(|| std::env::var("PRINTBOARD_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = PrintboardConfig::load(&path)?;

    if let Ok(dir) = std::env::var("PRINTBOARD_DATA_DIR") {
        config.server.data_dir = Some(PathBuf::from(dir));
    }
    if let Ok(url) = std::env::var("PRINTBOARD_SERVER") {
        config.client.server_url = url;
    }
    Ok(config)
}

fn load_profile(path: Option<&Path>) -> anyhow::Result<Profile> {
    match path {
        Some(path) => Ok(Profile::load(path)?),
        None => Ok(Profile::from_host()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let mut config = load_config(cli.config)?;

    match cli.command {
        Commands::Serve {
            port,
            bind,
            data_dir,
            memory,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind = BindMode::parse(&bind);
            }
            if data_dir.is_some() {
                config.server.data_dir = data_dir;
            }
            if memory {
                config.server.data_dir = None;
            }
            config.validate()?;
            start_gateway(config.server).await?;
        }

        Commands::Derive { profile, json } => {
            let engine = DerivationEngine::new(config.namespace_uuid()?);
            let env = ProfileEnvironment::new(load_profile(profile.as_deref())?);
            let collected = collect(&env, &CollectorOptions::default()).await;
            for failure in &collected.failures {
                tracing::debug!("{}", failure);
            }
            let fingerprint = engine.derive(&collected.signals)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&fingerprint)?);
            } else {
                println!("{} {}", fingerprint.emoji, fingerprint.moniker);
                println!("  id:       {}", fingerprint.id);
                println!("  browser:  {}", fingerprint.details.browser);
                println!("  os:       {}", fingerprint.details.os);
                println!("  screen:   {} ({})", fingerprint.details.screen_size, fingerprint.details.color_depth);
                println!("  timezone: {}", fingerprint.details.timezone);
                println!("  language: {}", fingerprint.details.language);
                println!("  signals unavailable: {}", collected.failures.len());
            }
        }

        Commands::Watch {
            server,
            profile,
            debug,
        } => {
            if let Some(server) = server {
                config.client.server_url = server;
            }
            config.validate()?;
            watch(&config, profile.as_deref(), debug).await?;
        }

        Commands::Debug { server } => {
            let url = server.unwrap_or(config.client.server_url.clone());
            let client = SyncClient::new(url, config.client.request_timeout())?;
            let info = client.debug().await.context("fetching debug view")?;
            println!("{} stored ({})", info.count, info.storage_type);
            for entry in info.fingerprints {
                println!(
                    "  {}  {:<24} {}  {}/{}",
                    entry.id, entry.moniker, entry.timestamp, entry.browser, entry.os
                );
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml());
        }

        Commands::Version => {
            println!("printboard v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

async fn watch(config: &PrintboardConfig, profile: Option<&Path>, debug: bool) -> anyhow::Result<()> {
    let engine = DerivationEngine::new(config.namespace_uuid()?);
    let client = SyncClient::new(config.client.server_url.clone(), config.client.request_timeout())?;
    let env = Arc::new(ProfileEnvironment::new(load_profile(profile)?));

    tracing::info!("Watching {}", client.base_url());
    let options = SessionOptions::from_config(&config.client, debug);
    let handle = SyncSession::new(client, engine, options).spawn(env);
    let mut updates = handle.subscribe();

    let mut last_rendered = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                let key = (view.last_fetch(), view.advisory().map(str::to_string), view.debug().map(|d| d.count));
                if last_rendered.as_ref() != Some(&key) {
                    render(&view);
                    last_rendered = Some(key);
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn render(view: &View) {
    let own_id = view.own().map(|f| f.id.as_str());
    let storage = view
        .storage_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "initializing".into());
    println!();
    println!("{} live fingerprints ({})", view.fingerprints().len(), storage);
    for fp in view.fingerprints() {
        let marker = if Some(fp.id.as_str()) == own_id { "  <- you" } else { "" };
        println!(
            "  {} {:<24} {}  {}/{}{}",
            fp.emoji,
            fp.moniker,
            fp.short_id(),
            fp.details.browser,
            fp.details.os,
            marker
        );
    }
    if let Some(notice) = view.storage_notice() {
        println!("  note: {}", notice);
    }
    if let Some(advisory) = view.advisory() {
        println!("  ! {}", advisory);
    }
    if let Some(debug) = view.debug() {
        println!("  debug: {} stored ({})", debug.count, debug.storage_type);
    }
}
