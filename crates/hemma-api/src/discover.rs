// mDNS hub discovery.
//
// DIRIGERA hubs announce themselves as `_ihsp._tcp` with identifying TXT
// records. The scan browses for a bounded window and returns whatever
// resolved in that time; it is synchronous (mdns-sd runs its own
// threads), so async callers wrap it in `spawn_blocking`.

use std::collections::HashSet;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use serde::Serialize;

use crate::error::Error;

/// Service type DIRIGERA hubs register on the local network.
pub const SERVICE_TYPE: &str = "_ihsp._tcp.local.";

/// Default browse window. Hubs on the same LAN answer well within this.
pub const DEFAULT_SCAN_WINDOW: Duration = Duration::from_secs(3);

/// A hub found on the local network.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredHub {
    pub host_name: String,
    pub address: IpAddr,
    pub port: u16,
    pub serial_number: String,
    pub firmware_version: String,
}

/// Browse the local network for hubs.
///
/// Collects every hub that resolves within `window`. Non-DIRIGERA
/// services sharing the service type are filtered out via the `type`
/// TXT record.
pub fn scan(window: Duration) -> Result<Vec<DiscoveredHub>, Error> {
    let daemon = ServiceDaemon::new().map_err(|e| Error::Discovery(e.to_string()))?;
    let receiver = daemon
        .browse(SERVICE_TYPE)
        .map_err(|e| Error::Discovery(e.to_string()))?;

    let deadline = Instant::now() + window;
    let mut seen = HashSet::new();
    let mut hubs = Vec::new();

    loop {
        let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
            break;
        };
        match receiver.recv_timeout(remaining) {
            Ok(ServiceEvent::ServiceResolved(info)) => {
                if let Some(hub) = hub_from_service(&info) {
                    if seen.insert(info.get_fullname().to_owned()) {
                        tracing::debug!(host = %hub.host_name, address = %hub.address, "hub resolved");
                        hubs.push(hub);
                    }
                }
            }
            Ok(_) => {}
            // Window elapsed or the daemon went away -- either way the
            // scan is over.
            Err(_) => break,
        }
    }

    let _ = daemon.stop_browse(SERVICE_TYPE);
    let _ = daemon.shutdown();

    Ok(hubs)
}

fn hub_from_service(info: &ServiceInfo) -> Option<DiscoveredHub> {
    if info.get_property_val_str("type") != Some("DIRIGERA") {
        return None;
    }

    let address = info
        .get_addresses()
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| info.get_addresses().iter().next())
        .copied()?;

    let host_name = info
        .get_property_val_str("hostname")
        .unwrap_or_else(|| info.get_hostname())
        .trim_end_matches('.')
        .to_owned();

    Some(DiscoveredHub {
        host_name,
        address,
        port: info.get_port(),
        serial_number: info
            .get_property_val_str("uuid")
            .unwrap_or_default()
            .to_owned(),
        firmware_version: info
            .get_property_val_str("sv")
            .unwrap_or_default()
            .to_owned(),
    })
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn properties(props: &[(&str, &str)]) -> HashMap<String, String> {
        props
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn service(props: &[(&str, &str)], ip: &str) -> ServiceInfo {
        ServiceInfo::new(
            SERVICE_TYPE,
            "test-hub",
            "gw-test.local.",
            ip,
            8443,
            properties(props),
        )
        .expect("valid service info")
    }

    #[test]
    fn resolves_dirigera_services() {
        let info = service(
            &[
                ("type", "DIRIGERA"),
                ("hostname", "gw-b8d7af00aaaa"),
                ("uuid", "f8f23c9b-0000-0000-0000-000000000000"),
                ("sv", "2.390.47"),
            ],
            "192.168.1.148",
        );

        let hub = hub_from_service(&info).expect("should resolve");
        assert_eq!(hub.host_name, "gw-b8d7af00aaaa");
        assert_eq!(hub.port, 8443);
        assert_eq!(hub.firmware_version, "2.390.47");
        assert_eq!(hub.address.to_string(), "192.168.1.148");
    }

    #[test]
    fn ignores_other_service_types() {
        let info = service(&[("type", "SOMETHING_ELSE")], "192.168.1.10");
        assert!(hub_from_service(&info).is_none());
    }

    #[test]
    fn ignores_services_without_addresses() {
        let info = ServiceInfo::new(
            SERVICE_TYPE,
            "test-hub",
            "gw-test.local.",
            (),
            8443,
            properties(&[("type", "DIRIGERA")]),
        )
        .expect("valid service info");
        assert!(hub_from_service(&info).is_none());
    }
}
