//! quakemap - Earthquakes and tectonic plates on an interactive map.
//!
//! Fetches the USGS earthquake feed and the PB2002 plate boundaries, styles
//! each event by magnitude and depth, and produces a Leaflet page with
//! switchable base layers, toggleable overlays and a depth legend.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

mod cli;
mod client;
mod errors;
mod map;
mod models;
mod output;
mod render;
mod server;
mod style;

use cli::{Cli, Command};
use client::{FeedConfig, UsgsClient, load_feeds};
use map::MapSession;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Render(args) => cmd_render(args),
        Command::Serve(args) => cmd_serve(args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `render` command - one-shot fetch and page output.
fn cmd_render(args: cli::RenderArgs) -> Result<()> {
    let config = FeedConfig::from(args.feeds);
    let client = UsgsClient::new(config).context("failed to create feed client")?;

    let feeds = load_feeds(&client).context("failed to fetch map data")?;
    let session = MapSession::assemble(&feeds);

    tracing::info!(
        "mapped {} earthquakes and {} plate boundary segments",
        session.earthquakes.markers.len(),
        session.plates.data.features.len()
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            output::write_session(&mut writer, &session, args.format)?;
            writer.flush()?;
            tracing::info!("wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            output::write_session(&mut handle, &session, args.format)?;
        }
    }

    Ok(())
}

/// Execute the `serve` command - start the map server.
fn cmd_serve(args: cli::ServeArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        feeds: FeedConfig::from(args.feeds),
    };

    // Print startup message
    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🌍 quakemap\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Feed:    {}", config.feeds.feed.as_str());
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config))
}
