mod attach;
mod cli;
mod codec;
mod config;
mod control;
mod ebpf;
mod error;
mod interface;
mod loader;
mod shutdown;
mod table;

use clap::Parser;
use cli::Cli;
use control::ControlPlane;
use ebpf::{AyaProgramLoader, XdpAttacher};
use error::BlockwallError;
use std::path::Path;
use table::{BlockTable, MemorySlots};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "blockwall=debug,info"
    } else {
        "blockwall=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli).await {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> error::Result<()> {
    if cli.check {
        return check(&cli.config);
    }

    let mut control = ControlPlane::new(AyaProgramLoader::new(), XdpAttacher::new(cli.xdp_mode));
    let report = control
        .run(
            &cli.config,
            &cli.interface,
            shutdown::wait_for_shutdown_signal(),
        )
        .await?;

    info!(
        "Stopped enforcing {} blocked addresses on {}",
        report.population.inserted, report.interface
    );
    Ok(())
}

/// Populate an in-memory table from the config and print what would be enforced
fn check(config_path: &Path) -> error::Result<()> {
    let config = config::load_config(config_path)?;
    let mut table = BlockTable::new(MemorySlots::default());
    let report = table.populate(&config.blocked_ips);

    for (slot, key) in table.entries() {
        println!("{:>4}  {}", slot, codec::decode(key));
    }
    for rejected in &report.rejected {
        println!("   -  {:?} rejected: {}", rejected.input, rejected.reason);
    }
    println!(
        "{} of {} entries valid (capacity {})",
        report.inserted,
        report.attempted,
        table.capacity()
    );

    if report.inserted == 0 {
        return Err(BlockwallError::Config(format!(
            "{} contains no valid IPv4 addresses",
            config_path.display()
        )));
    }
    Ok(())
}
