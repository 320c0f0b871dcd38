use indexmap::IndexMap;
use std::path::Path;
use std::time::Duration;

use crate::collectors::types::{
    DarwinFirmware, FirmwareInfo, LinuxFirmware, UefiStatus, WindowsFirmware,
};
use crate::platform::Platform;
use crate::probe::{self, Probe};

// fwupdmgr walks every device and can be slow; give it headroom
const FWUPD_TIMEOUT: Duration = Duration::from_secs(4);

pub fn collect_firmware(platform: Platform) -> FirmwareInfo {
    match platform {
        Platform::Linux => FirmwareInfo::Linux(linux_firmware()),
        Platform::Windows => FirmwareInfo::Windows(windows_firmware()),
        Platform::Darwin => FirmwareInfo::Darwin(darwin_firmware()),
        Platform::Unsupported => FirmwareInfo::Unsupported {
            firmware: "Unsupported platform".to_string(),
        },
    }
}

fn linux_firmware() -> LinuxFirmware {
    let mut bios_version = probe::read_file("/sys/class/dmi/id/bios_version");
    let mut bios_date = probe::read_file("/sys/class/dmi/id/bios_date");
    let mut vendor = probe::read_file("/sys/class/dmi/id/sys_vendor");
    let mut motherboard = probe::read_file("/sys/class/dmi/id/board_name");

    // kernels without the dmi-sysfs attributes still expose the raw table
    if !(bios_version.is_present()
        && bios_date.is_present()
        && vendor.is_present()
        && motherboard.is_present())
    {
        if let Some(dmi) = dmi_fallback() {
            fill_missing(&mut bios_version, dmi.bios_version);
            fill_missing(&mut bios_date, dmi.bios_date);
            fill_missing(&mut vendor, dmi.vendor);
            fill_missing(&mut motherboard, dmi.board);
        }
    }

    LinuxFirmware {
        bios_version,
        bios_date,
        vendor,
        motherboard,
        uefi: Path::new("/sys/firmware/efi").exists(),
        cpu_microcode: probe::read_file("/proc/cpuinfo")
            .present()
            .and_then(|text| parse_microcode(&text))
            .unwrap_or_else(|| "Unknown".to_string()),
        fwupd_devices: fwupd_devices(),
        storage_firmware: storage_firmware(),
    }
}

fn fill_missing(slot: &mut Probe<String>, value: Option<String>) {
    if !slot.is_present() {
        if let Some(value) = value {
            *slot = Probe::Present(value);
        }
    }
}

struct DmiIdentity {
    bios_version: Option<String>,
    bios_date: Option<String>,
    vendor: Option<String>,
    board: Option<String>,
}

#[cfg(target_os = "linux")]
fn dmi_fallback() -> Option<DmiIdentity> {
    use smbioslib::*;

    let data = match SMBiosData::try_load_from_file("/sys/firmware/dmi/tables/DMI", None) {
        Ok(data) => data,
        Err(_) => {
            let raw = std::fs::read("/sys/firmware/dmi/tables/DMI").ok()?;
            SMBiosData::from_vec_and_version(raw, None)
        }
    };

    let mut identity = DmiIdentity {
        bios_version: None,
        bios_date: None,
        vendor: None,
        board: None,
    };

    for structure in data.iter() {
        match structure.defined_struct() {
            DefinedStruct::Information(bios) => {
                if identity.bios_version.is_none() {
                    identity.bios_version = bios
                        .version()
                        .to_utf8_lossy()
                        .filter(|s| !s.is_empty())
                        .map(|s| s.to_string());
                }
                if identity.bios_date.is_none() {
                    identity.bios_date = bios
                        .release_date()
                        .to_utf8_lossy()
                        .filter(|s| !s.is_empty())
                        .map(|s| s.to_string());
                }
            }
            DefinedStruct::SystemInformation(system) => {
                if identity.vendor.is_none() {
                    identity.vendor = system
                        .manufacturer()
                        .to_utf8_lossy()
                        .filter(|s| !s.is_empty() && s != "Not Specified")
                        .map(|s| s.to_string());
                }
            }
            DefinedStruct::BaseBoardInformation(board) => {
                if identity.board.is_none() {
                    identity.board = board
                        .product()
                        .to_utf8_lossy()
                        .filter(|s| !s.is_empty() && s != "Not Specified")
                        .map(|s| s.to_string());
                }
            }
            _ => {}
        }
    }

    Some(identity)
}

#[cfg(not(target_os = "linux"))]
fn dmi_fallback() -> Option<DmiIdentity> {
    None
}

/// /proc/cpuinfo lists `microcode\t: 0xde` per processor; take the token
/// after the separator following the last occurrence.
pub(crate) fn parse_microcode(cpuinfo: &str) -> Option<String> {
    if !cpuinfo.contains("microcode") {
        return None;
    }
    let rest = cpuinfo.rsplit("microcode").next()?;
    let mut tokens = rest.split_whitespace();
    tokens.next()?;
    tokens.next().map(str::to_string)
}

fn fwupd_devices() -> Probe<Vec<String>> {
    probe::run_command_with_timeout("fwupdmgr", &["get-devices"], FWUPD_TIMEOUT)
        .map(|text| parse_fwupd_devices(&text))
}

pub(crate) fn parse_fwupd_devices(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("Devices"))
        .map(str::to_string)
        .collect()
}

/// Firmware revision per block device, keyed by `/dev/<name>`.
fn storage_firmware() -> Probe<IndexMap<String, String>> {
    let listing = match probe::run_command("lsblk", &["-dno", "NAME"]) {
        Probe::Present(text) => text,
        Probe::Unavailable => return Probe::Unavailable,
        Probe::PermissionDenied => return Probe::PermissionDenied,
        Probe::TimedOut => return Probe::TimedOut,
    };

    let mut firmware = IndexMap::new();
    for disk in listing.split_whitespace() {
        let device = format!("/dev/{disk}");
        let version = match probe::run_command("smartctl", &["-i", &device]) {
            Probe::Present(text) => parse_labeled_value(&text, "Firmware Version")
                .unwrap_or_else(|| "Unknown".to_string()),
            Probe::TimedOut => "Timed out".to_string(),
            _ => "Unavailable".to_string(),
        };
        firmware.insert(device, version);
    }
    Probe::Present(firmware)
}

/// First `Label: value` line containing `label`, value trimmed.
pub(crate) fn parse_labeled_value(text: &str, label: &str) -> Option<String> {
    text.lines()
        .find(|line| line.contains(label))
        .and_then(|line| line.split(':').nth(1))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn windows_firmware() -> WindowsFirmware {
    let bios = probe::run_command(
        "wmic",
        &["bios", "get", "SMBIOSBIOSVersion,ReleaseDate", "/format:list"],
    );
    let board = probe::run_command(
        "wmic",
        &["baseboard", "get", "Product,Manufacturer", "/format:list"],
    );

    let uefi = match probe::run_command("powershell", &["-Command", "Confirm-SecureBootUEFI"]) {
        Probe::Present(output) => UefiStatus::Flag(output.contains("True")),
        _ => UefiStatus::Unknown("Unknown"),
    };

    WindowsFirmware {
        bios_version: list_field(&bios, "SMBIOSBIOSVersion"),
        bios_date: list_field(&bios, "ReleaseDate"),
        vendor: list_field(&board, "Manufacturer"),
        motherboard: list_field(&board, "Product"),
        uefi,
    }
}

fn list_field(output: &Probe<String>, key: &str) -> Probe<String> {
    match output {
        Probe::Present(text) => parse_wmic_value(text, key).into(),
        Probe::Unavailable => Probe::Unavailable,
        Probe::PermissionDenied => Probe::PermissionDenied,
        Probe::TimedOut => Probe::TimedOut,
    }
}

/// `Key=Value` lines of wmic `/format:list` output.
pub(crate) fn parse_wmic_value(text: &str, key: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn darwin_firmware() -> DarwinFirmware {
    let output = probe::run_command("system_profiler", &["SPHardwareDataType"]);

    DarwinFirmware {
        model: profiler_field(&output, "Model Name"),
        bios_version: profiler_field(&output, "Boot ROM Version"),
        smc_version: profiler_field(&output, "SMC Version"),
        uefi: true,
    }
}

fn profiler_field(output: &Probe<String>, label: &str) -> Probe<String> {
    match output {
        Probe::Present(text) => parse_labeled_value(text, label).into(),
        Probe::Unavailable => Probe::Unavailable,
        Probe::PermissionDenied => Probe::PermissionDenied,
        Probe::TimedOut => Probe::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn microcode_takes_last_occurrence() {
        assert_eq!(parse_microcode("microcode : 0x1"), Some("0x1".to_string()));
        let cpuinfo = "processor : 0\nmicrocode : 0xde\nprocessor : 1\nmicrocode : 0xde\n";
        assert_eq!(parse_microcode(cpuinfo), Some("0xde".to_string()));
        assert_eq!(parse_microcode("processor : 0\n"), None);
    }

    #[test]
    fn fwupd_listing_drops_header() {
        let text = "Devices for host\n\nThinkPad X1\n  System Firmware\n";
        assert_eq!(
            parse_fwupd_devices(text),
            vec!["ThinkPad X1", "System Firmware"]
        );
    }

    #[test]
    fn smartctl_firmware_line() {
        let text = "Model Number: Samsung SSD 980\nFirmware Version: 5B2QGXA7\n";
        assert_eq!(
            parse_labeled_value(text, "Firmware Version"),
            Some("5B2QGXA7".to_string())
        );
        assert_eq!(parse_labeled_value(text, "Serial Number"), None);
    }

    #[test]
    fn wmic_list_values() {
        let text = "ReleaseDate=20250101000000.000000+000\nSMBIOSBIOSVersion=1.0.0\n";
        assert_eq!(
            parse_wmic_value(text, "SMBIOSBIOSVersion"),
            Some("1.0.0".to_string())
        );
        assert_eq!(
            parse_wmic_value(text, "ReleaseDate"),
            Some("20250101000000.000000+000".to_string())
        );
        assert_eq!(parse_wmic_value(text, "Vendor"), None);
    }

    #[test]
    fn profiler_fields() {
        let text = "      Model Name: MacBook Pro\n      Boot ROM Version: 2069.40.2.0.0\n      SMC Version (system): 2.3f35\n";
        assert_eq!(
            parse_labeled_value(text, "Model Name"),
            Some("MacBook Pro".to_string())
        );
        assert_eq!(
            parse_labeled_value(text, "SMC Version"),
            Some("2.3f35".to_string())
        );
    }

    #[test]
    fn unsupported_platform_record() {
        let info = collect_firmware(Platform::Unsupported);
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"firmware": "Unsupported platform"})
        );
    }
}
