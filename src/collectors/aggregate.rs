use serde::Serialize;
use serde_json::{Map, Value};

use crate::collectors::firmware::collect_firmware;
use crate::collectors::network::collect_network;
use crate::collectors::packages::collect_extra;
use crate::collectors::specs::collect_specs;
use crate::collectors::system::collect_system;
use crate::collectors::types::{ExtraInfo, FirmwareInfo, NetworkInfo, SpecsInfo, SystemInfo};
use crate::platform::Platform;

/// All domain records from one collection pass.
#[derive(Debug, Serialize)]
pub struct Report {
    pub system: SystemInfo,
    pub network: NetworkInfo,
    pub extra: ExtraInfo,
    pub firmware: FirmwareInfo,
    pub specs: SpecsInfo,
}

/// Run every collector. Collectors are independent and never fail, so the
/// report is always fully constructible.
pub fn collect_report(platform: Platform) -> Report {
    Report {
        system: collect_system(platform),
        network: collect_network(platform),
        extra: collect_extra(platform),
        firmware: collect_firmware(platform),
        specs: collect_specs(platform),
    }
}

/// Flat union of the domain records' top-level keys, merged in collection
/// order; on a key collision the later domain's value wins.
pub fn merge_flat(report: &Report) -> Value {
    let mut merged = Map::new();
    for domain in [
        serde_json::to_value(&report.system),
        serde_json::to_value(&report.network),
        serde_json::to_value(&report.extra),
        serde_json::to_value(&report.firmware),
        serde_json::to_value(&report.specs),
    ] {
        if let Ok(Value::Object(record)) = domain {
            merged.extend(record);
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_well_formed_on_an_unsupported_platform() {
        let report = collect_report(Platform::Unsupported);
        let value = serde_json::to_value(&report).unwrap();

        assert!(value.get("system").is_some());
        assert!(value.get("network").is_some());
        assert!(value.get("extra").is_some());
        assert!(value.get("specs").is_some());
        assert_eq!(
            value["firmware"],
            serde_json::json!({"firmware": "Unsupported platform"})
        );
    }

    #[test]
    fn flat_merge_lets_later_domains_win() {
        let report = collect_report(Platform::Unsupported);
        let merged = merge_flat(&report);

        // specs' cpu_info shadows system's in the merged view
        assert!(merged["cpu_info"].get("model").is_some());
        assert!(merged["cpu_info"].get("processor").is_none());
        // disjoint keys from every domain survive
        assert!(merged.get("os_info").is_some());
        assert!(merged.get("dns_servers").is_some());
        assert!(merged.get("packages").is_some());
    }
}
