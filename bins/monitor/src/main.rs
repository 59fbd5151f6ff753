//! netwatch-monitor - Live kernel network state monitor
//!
//! Streams link, address, route, and wireless changes from the kernel,
//! and exposes small controls for link flags and wireless scans.

mod link;
mod scan;
mod watch;

use clap::{Parser, Subcommand};
use netwatch::{
    AddressRecord, ChangeAction, LinkRecord, Observer, Result, RouteRecord, WlanEvent,
};

#[derive(Parser)]
#[command(name = "netwatch-monitor")]
#[command(about = "Live kernel network state monitor", long_about = None)]
#[command(version)]
struct Cli {
    /// Output JSON (one object per line)
    #[arg(short, long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream network state changes
    Watch(watch::WatchArgs),

    /// Trigger a wireless scan and print the results
    Scan(scan::ScanArgs),

    /// Change a link's administrative state
    Link(link::LinkArgs),
}

/// Observer for commands that only use the control surface.
struct Silent;

impl Observer for Silent {
    fn link_change(&mut self, _action: ChangeAction, _link: LinkRecord) -> Result<()> {
        Ok(())
    }

    fn addr_change(&mut self, _action: ChangeAction, _addr: AddressRecord) -> Result<()> {
        Ok(())
    }

    fn route_change(&mut self, _action: ChangeAction, _route: RouteRecord) -> Result<()> {
        Ok(())
    }

    fn wlan_event(&mut self, _event: WlanEvent) -> Result<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(base.into()),
        )
        .init();

    match cli.command {
        Command::Watch(args) => watch::run(args, cli.json).await,
        Command::Scan(args) => scan::run(args, cli.json).await,
        Command::Link(args) => link::run(args).await,
    }
}
