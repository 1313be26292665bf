//! Hub discovery command handlers.

use std::time::Duration;

use tabled::Tabled;

use hemma_api::discover::{self, DiscoveredHub};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct HubRow {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Serial Number")]
    serial: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
}

impl From<&DiscoveredHub> for HubRow {
    fn from(h: &DiscoveredHub) -> Self {
        Self {
            hostname: h.host_name.clone(),
            address: h.address.to_string(),
            port: h.port,
            serial: h.serial_number.clone(),
            firmware: h.firmware_version.clone(),
        }
    }
}

pub async fn list(timeout: u64, global: &GlobalOpts) -> Result<(), CliError> {
    let window = Duration::from_secs(timeout);

    // The scan blocks on mdns-sd's own threads.
    let hubs = tokio::task::spawn_blocking(move || discover::scan(window))
        .await
        .map_err(|e| CliError::Internal {
            message: e.to_string(),
        })??;

    if hubs.is_empty() && !global.quiet {
        eprintln!("no hubs found within {timeout}s");
    }

    let rendered = output::render_list(&global.output, &hubs, |h| HubRow::from(h), |h| {
        h.address.to_string()
    });
    output::print_output(&rendered, global.quiet);
    Ok(())
}
