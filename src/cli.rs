//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::client::{FeedConfig, FeedType, PLATES_URL, USGS_BASE_URL};
use crate::output::Format;

/// Earthquake and tectonic plate web map from USGS feeds.
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the feeds once and write the map page
    Render(RenderArgs),

    /// Serve the map over HTTP, refetching on every page load
    Serve(ServeArgs),
}

/// Feed selection shared by all commands.
#[derive(clap::Args, Debug, Clone)]
pub struct FeedArgs {
    /// USGS summary feed to map
    #[arg(long, default_value = "all_week", value_parser = parse_feed_type)]
    pub feed: FeedType,

    /// Base URL of the USGS earthquake service
    #[arg(long, default_value = USGS_BASE_URL)]
    pub usgs_url: String,

    /// URL of the plate boundary GeoJSON
    #[arg(long, default_value = PLATES_URL)]
    pub plates_url: String,
}

impl From<FeedArgs> for FeedConfig {
    fn from(args: FeedArgs) -> Self {
        Self {
            usgs_base_url: args.usgs_url,
            feed: args.feed,
            plates_url: args.plates_url,
        }
    }
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub feeds: FeedArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "html", value_parser = parse_format)]
    pub format: Format,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub feeds: FeedArgs,

    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse a feed type from string.
fn parse_feed_type(s: &str) -> Result<FeedType, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let cli = Cli::try_parse_from(["quakemap", "render"]).unwrap();
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.format, Format::Html);
        assert!(args.output.is_none());
        assert_eq!(FeedConfig::from(args.feeds), FeedConfig::default());
    }

    #[test]
    fn test_serve_args() {
        let cli = Cli::try_parse_from([
            "quakemap",
            "serve",
            "--port",
            "9000",
            "--feed",
            "4.5_day",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 9000);
        assert_eq!(args.feeds.feed, FeedType::Mag45Day);
    }

    #[test]
    fn test_unknown_feed_rejected() {
        assert!(Cli::try_parse_from(["quakemap", "render", "--feed", "all_year"]).is_err());
    }
}
