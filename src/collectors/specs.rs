use indexmap::IndexMap;
use std::path::Path;
use sysinfo::{Components, Disks, System};

use crate::collectors::firmware::parse_wmic_value;
use crate::collectors::system::format_gib;
use crate::collectors::types::{
    BatteryInfo, CpuSpecs, MotherboardInfo, RamSpecs, SensorReadings, SoundInfo, SpecsInfo,
    TimeLeft, VolumeSpecs,
};
use crate::platform::Platform;
use crate::probe::{self, Probe};

pub fn collect_specs(platform: Platform) -> SpecsInfo {
    let sys = System::new_all();

    SpecsInfo {
        cpu_info: cpu_specs(&sys, platform),
        ram_info: ram_specs(&sys, platform),
        storage_info: storage_specs(platform),
        motherboard_info: motherboard_specs(platform),
        gpu_info: gpu_specs(platform),
        sound_info: sound_specs(platform),
        battery_info: battery_specs(platform),
        temperature_info: temperature_specs(platform),
        fan_info: fan_specs(platform),
    }
}

fn cpu_specs(sys: &System, platform: Platform) -> CpuSpecs {
    let brand = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty());

    let model = match (brand, platform) {
        (Some(brand), _) => Probe::Present(brand),
        (None, Platform::Linux) => probe::run_command("lscpu", &[])
            .and_then(|text| parse_lscpu_model(&text).into()),
        (None, _) => Probe::Unavailable,
    };

    let max_freq = match platform {
        Platform::Linux => {
            probe::read_file("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq")
                .and_then(|raw| raw.parse::<f64>().ok().map(|khz| khz / 1000.0).into())
        }
        _ => sys
            .cpus()
            .first()
            .map(|cpu| cpu.frequency() as f64)
            .into(),
    };

    CpuSpecs {
        model,
        cores: sys.physical_core_count().into(),
        threads: sys.cpus().len(),
        max_freq,
    }
}

pub(crate) fn parse_lscpu_model(text: &str) -> Option<String> {
    text.lines()
        .find(|line| line.contains("Model name"))
        .and_then(|line| line.rsplit(':').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn ram_specs(sys: &System, platform: Platform) -> RamSpecs {
    let total = sys.total_memory();
    let used = sys.used_memory();
    let percent = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    RamSpecs {
        total: format_gib(total),
        available: format_gib(sys.available_memory()),
        used: format_gib(used),
        percent: format!("{percent:.1}%"),
        mem_type: memory_type(platform),
    }
}

fn memory_type(platform: Platform) -> String {
    match platform {
        Platform::Linux => dmi_memory_type().unwrap_or_else(|| "Unknown".to_string()),
        _ => "Unknown".to_string(),
    }
}

#[cfg(target_os = "linux")]
fn dmi_memory_type() -> Option<String> {
    use smbioslib::*;

    let data = SMBiosData::try_load_from_file("/sys/firmware/dmi/tables/DMI", None).ok()?;
    for structure in data.iter() {
        if let DefinedStruct::MemoryDevice(device) = structure.defined_struct() {
            if let Some(mem_type) = device.memory_type() {
                let label = format!("{:?}", mem_type.value).to_uppercase();
                if label != "UNKNOWN" {
                    return Some(label);
                }
            }
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn dmi_memory_type() -> Option<String> {
    None
}

fn storage_specs(platform: Platform) -> IndexMap<String, VolumeSpecs> {
    let disks = Disks::new_with_refreshed_list();
    let mut volumes = IndexMap::new();

    for disk in disks.list() {
        let device = disk.name().to_string_lossy().to_string();
        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        let percent = if total > 0 {
            used as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        volumes.insert(
            device.clone(),
            VolumeSpecs {
                mountpoint: disk.mount_point().to_string_lossy().to_string(),
                fstype: disk.file_system().to_string_lossy().to_string(),
                total: format_gib(total),
                used: format_gib(used),
                free: format_gib(free),
                percent: format!("{percent:.1}%"),
                health: volume_health(platform, &device),
            },
        );
    }

    volumes
}

fn volume_health(platform: Platform, device: &str) -> String {
    match platform {
        Platform::Linux => match probe::run_command("smartctl", &["-H", device]) {
            Probe::Present(text) => classify_smart_health(&text).to_string(),
            _ => "Unable to check".to_string(),
        },
        Platform::Windows => {
            let selector = format!("deviceid='{device}'");
            match probe::run_command("wmic", &["diskdrive", "where", &selector, "get", "status"]) {
                Probe::Present(text) => {
                    if text.contains("OK") {
                        "Healthy".to_string()
                    } else {
                        "Warning".to_string()
                    }
                }
                _ => "Unable to check".to_string(),
            }
        }
        _ => "Unable to check".to_string(),
    }
}

pub(crate) fn classify_smart_health(text: &str) -> &'static str {
    if text.contains("PASSED") {
        "Healthy"
    } else {
        "Warning"
    }
}

fn motherboard_specs(platform: Platform) -> MotherboardInfo {
    match platform {
        Platform::Linux => MotherboardInfo::Record {
            manufacturer: probe::read_file("/sys/class/dmi/id/board_vendor"),
            model: probe::read_file("/sys/class/dmi/id/board_name"),
            serial: probe::read_file("/sys/class/dmi/id/board_serial"),
        },
        Platform::Windows => MotherboardInfo::Record {
            manufacturer: wmic_column("baseboard", "manufacturer"),
            model: wmic_column("baseboard", "product"),
            serial: wmic_column("baseboard", "serialnumber"),
        },
        _ => MotherboardInfo::Error {
            error: "Motherboard info is not available on this OS.".to_string(),
        },
    }
}

fn wmic_column(alias: &str, field: &str) -> Probe<String> {
    probe::run_command("wmic", &[alias, "get", field])
        .and_then(|text| parse_wmic_column(&text).into())
}

/// wmic column output: header line, then the value.
pub(crate) fn parse_wmic_column(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .nth(1)
        .map(str::to_string)
}

fn gpu_specs(platform: Platform) -> String {
    match platform {
        Platform::Linux => probe::run_command("lspci", &[])
            .present()
            .and_then(|text| {
                let adapters = parse_vga_lines(&text);
                if adapters.is_empty() {
                    None
                } else {
                    Some(adapters.join("\n"))
                }
            })
            .unwrap_or_else(|| "No GPU information found".to_string()),
        Platform::Windows => probe::run_command(
            "wmic",
            &["path", "win32_videocontroller", "get", "caption"],
        )
        .present()
        .and_then(|text| parse_wmic_column(&text))
        .unwrap_or_else(|| "No GPU information found".to_string()),
        _ => "GPU information is not available".to_string(),
    }
}

pub(crate) fn parse_vga_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.contains("VGA") || line.contains("3D controller"))
        .map(str::to_string)
        .collect()
}

fn sound_specs(platform: Platform) -> SoundInfo {
    match platform {
        Platform::Linux => match probe::run_command("aplay", &["-l"]) {
            Probe::Present(text) => SoundInfo::Text {
                devices: text.trim().to_string(),
            },
            _ => SoundInfo::Error {
                error: "No sound card detected".to_string(),
            },
        },
        Platform::Windows => match probe::run_command("wmic", &["sounddev", "get", "caption"]) {
            Probe::Present(text) => SoundInfo::List {
                devices: text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .skip(1)
                    .map(str::to_string)
                    .collect(),
            },
            _ => SoundInfo::Error {
                error: "No sound card detected".to_string(),
            },
        },
        _ => SoundInfo::Empty {},
    }
}

fn battery_specs(platform: Platform) -> BatteryInfo {
    let battery = match platform {
        Platform::Linux => linux_battery(),
        Platform::Windows => windows_battery(),
        _ => None,
    };

    battery.unwrap_or_else(|| BatteryInfo::Error {
        error: "No battery information available".to_string(),
    })
}

fn linux_battery() -> Option<BatteryInfo> {
    let entries = std::fs::read_dir("/sys/class/power_supply").ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if probe::read_file(path.join("type")).present().as_deref() != Some("Battery") {
            continue;
        }
        let percent = probe::read_file(path.join("capacity")).present()?;
        let status = probe::read_file(path.join("status")).present().unwrap_or_default();
        let plugged = status != "Discharging";
        let time_left = battery_time_left(&path, plugged);
        return Some(BatteryInfo::Battery {
            percent: format!("{percent}%"),
            plugged,
            time_left,
        });
    }
    None
}

fn battery_time_left(path: &Path, plugged: bool) -> TimeLeft {
    if plugged {
        return TimeLeft::Label("indefinite".to_string());
    }
    let energy = probe::read_file(path.join("energy_now"))
        .present()
        .and_then(|raw| raw.parse::<u64>().ok());
    let power = probe::read_file(path.join("power_now"))
        .present()
        .and_then(|raw| raw.parse::<u64>().ok());
    match (energy, power) {
        (Some(energy), Some(power)) if power > 0 => TimeLeft::Minutes(energy * 60 / power),
        _ => TimeLeft::Label("Unknown".to_string()),
    }
}

fn windows_battery() -> Option<BatteryInfo> {
    let text = probe::run_command(
        "wmic",
        &[
            "path",
            "Win32_Battery",
            "get",
            "EstimatedChargeRemaining,BatteryStatus",
            "/format:list",
        ],
    )
    .present()?;

    let percent = parse_wmic_value(&text, "EstimatedChargeRemaining")?;
    let status = parse_wmic_value(&text, "BatteryStatus")
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(0);

    Some(BatteryInfo::Battery {
        percent: format!("{percent}%"),
        plugged: status == 2,
        time_left: TimeLeft::Label("Unknown".to_string()),
    })
}

fn temperature_specs(platform: Platform) -> SensorReadings<f32> {
    if platform != Platform::Linux {
        return SensorReadings::Error {
            error: "No temperature information available".to_string(),
        };
    }

    let components = Components::new_with_refreshed_list();
    let mut readings = IndexMap::new();
    for component in components.list() {
        readings.insert(component.label().to_string(), component.temperature());
    }

    if readings.is_empty() {
        SensorReadings::Error {
            error: "No temperature information available".to_string(),
        }
    } else {
        SensorReadings::Readings(readings)
    }
}

fn fan_specs(platform: Platform) -> SensorReadings<u64> {
    if platform != Platform::Linux {
        return SensorReadings::Error {
            error: "No fan information available".to_string(),
        };
    }

    let readings = hwmon_fans();
    if readings.is_empty() {
        SensorReadings::Error {
            error: "No fan information available".to_string(),
        }
    } else {
        SensorReadings::Readings(readings)
    }
}

/// `fanN_input` RPM values under each hwmon chip, keyed `chip/fanN`.
fn hwmon_fans() -> IndexMap<String, u64> {
    let mut fans = IndexMap::new();
    let Ok(entries) = std::fs::read_dir("/sys/class/hwmon") else {
        return fans;
    };

    let mut chips: Vec<_> = entries.flatten().map(|entry| entry.path()).collect();
    chips.sort();

    for chip in chips {
        let label = probe::read_file(chip.join("name")).present().unwrap_or_else(|| {
            chip.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let Ok(files) = std::fs::read_dir(&chip) else {
            continue;
        };
        let mut inputs: Vec<String> = files
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("fan") && name.ends_with("_input"))
            .collect();
        inputs.sort();

        for input in inputs {
            if let Some(rpm) = probe::read_file(chip.join(&input))
                .present()
                .and_then(|raw| raw.parse::<u64>().ok())
            {
                let sensor = format!("{label}/{}", input.trim_end_matches("_input"));
                fans.insert(sensor, rpm);
            }
        }
    }

    fans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lscpu_model_line() {
        let text = "Architecture:        x86_64\nModel name:          AMD Ryzen 9 5950X 16-Core Processor\n";
        assert_eq!(
            parse_lscpu_model(text),
            Some("AMD Ryzen 9 5950X 16-Core Processor".to_string())
        );
        assert_eq!(parse_lscpu_model("Architecture: x86_64\n"), None);
    }

    #[test]
    fn smart_health_classification() {
        assert_eq!(
            classify_smart_health("SMART overall-health self-assessment test result: PASSED\n"),
            "Healthy"
        );
        assert_eq!(
            classify_smart_health("SMART overall-health self-assessment test result: FAILED!\n"),
            "Warning"
        );
    }

    #[test]
    fn wmic_column_takes_second_line() {
        let text = "Manufacturer  \nASUSTeK COMPUTER INC.\n\n";
        assert_eq!(
            parse_wmic_column(text),
            Some("ASUSTeK COMPUTER INC.".to_string())
        );
        assert_eq!(parse_wmic_column("Manufacturer\n"), None);
    }

    #[test]
    fn vga_lines() {
        let text = "00:02.0 VGA compatible controller: Intel UHD Graphics\n00:14.0 USB controller: Intel\n01:00.0 3D controller: NVIDIA GA107M\n";
        let adapters = parse_vga_lines(text);
        assert_eq!(adapters.len(), 2);
        assert!(adapters[0].contains("VGA"));
        assert!(adapters[1].contains("3D controller"));
    }

    #[test]
    fn unsupported_platform_still_yields_a_record() {
        let specs = collect_specs(Platform::Unsupported);
        assert_eq!(specs.gpu_info, "GPU information is not available");
        assert!(matches!(specs.motherboard_info, MotherboardInfo::Error { .. }));
        assert!(matches!(specs.battery_info, BatteryInfo::Error { .. }));
        assert!(matches!(specs.sound_info, SoundInfo::Empty {}));
    }
}
