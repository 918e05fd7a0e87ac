//! Startup and teardown orchestration.
//!
//! Order: config, program load, table population, interface resolution,
//! attach, wait for shutdown, then detach, drop the table and close the
//! program. Every startup failure is fatal except rejected blocklist
//! entries, which are logged and skipped.

use crate::attach::AttachmentManager;
use crate::config::{load_config, BlocklistConfig};
use crate::error::Result;
use crate::interface::Interface;
use crate::loader::ProgramLoader;
use crate::table::PopulationReport;
use std::future::Future;
use std::path::Path;
use tracing::{debug, info, warn};

/// What a completed run enforced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub population: PopulationReport,
    pub interface: Interface,
}

pub struct ControlPlane<L, A> {
    loader: L,
    attacher: A,
}

impl<L, A> ControlPlane<L, A>
where
    L: ProgramLoader,
    A: AttachmentManager<Program = L::Program>,
{
    pub fn new(loader: L, attacher: A) -> Self {
        Self { loader, attacher }
    }

    /// Run until `shutdown` completes.
    ///
    /// The program handle is always closed before returning, whether the run
    /// succeeded or not.
    pub async fn run<F>(
        &mut self,
        config_path: &Path,
        interface_name: &str,
        shutdown: F,
    ) -> Result<RunReport>
    where
        F: Future<Output = Result<()>>,
    {
        let config = load_config(config_path)?;
        info!(
            "Loaded configuration from {}: {} blocked IPs",
            config_path.display(),
            config.blocked_ips.len()
        );

        let mut program = self.loader.load()?;
        let result = self
            .enforce(&mut program, &config, interface_name, shutdown)
            .await;
        self.loader.close(program);
        result
    }

    async fn enforce<F>(
        &mut self,
        program: &mut L::Program,
        config: &BlocklistConfig,
        interface_name: &str,
        shutdown: F,
    ) -> Result<RunReport>
    where
        F: Future<Output = Result<()>>,
    {
        // Lives until after detach
        let mut table = self.loader.block_table(program)?;
        let population = table.populate(&config.blocked_ips);
        if population.inserted == 0 {
            warn!("No valid blocklist entries, no traffic will be dropped");
        } else if !population.is_complete() {
            warn!(
                "{} blocklist entries rejected, enforcing the remaining {}",
                population.rejected.len(),
                population.inserted
            );
        }

        let interface = self.attacher.resolve(interface_name)?;
        let mut attachment = self.attacher.attach(program, &interface)?;
        info!(
            "Blocking {} source addresses on {}. Press Ctrl+C to detach.",
            population.inserted,
            attachment.interface()
        );

        let waited = shutdown.await;

        info!("Detaching XDP program and exiting");
        attachment.detach();
        debug!("Attachment {:?}", attachment.state());
        drop(attachment);
        drop(table);

        waited?;
        Ok(RunReport {
            population,
            interface,
        })
    }
}
