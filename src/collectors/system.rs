use chrono::NaiveTime;
use sysinfo::System;

use crate::collectors::types::{CpuFreq, CpuInfo, OsIdentity, RamInfo, SystemInfo, UptimeInfo};
use crate::platform::Platform;
use crate::probe::{self, Probe};

/// Display names probed in order; the first executable found wins.
const LINUX_MANAGERS: [(&str, &str); 6] = [
    ("apt", "APT (Advanced Package Tool)"),
    ("yum", "YUM (Yellowdog Updater Modified)"),
    ("dnf", "DNF (Dandified YUM)"),
    ("pacman", "Pacman"),
    ("zypper", "Zypper"),
    ("apk", "APK (Alpine Package Keeper)"),
];

pub fn collect_system(platform: Platform) -> SystemInfo {
    let sys = System::new_all();

    SystemInfo {
        os_info: os_identity(platform),
        package_manager: package_manager(platform),
        cpu_info: cpu_info(&sys, platform),
        ram_info: ram_info(&sys),
        uptime: uptime(),
    }
}

fn os_identity(platform: Platform) -> OsIdentity {
    let os_name = match platform {
        Platform::Linux => probe::read_file("/etc/os-release")
            .present()
            .and_then(|text| parse_pretty_name(&text))
            .unwrap_or_else(|| "Unknown Linux Distribution".to_string()),
        Platform::Windows | Platform::Darwin => {
            System::os_version().unwrap_or_else(|| "Unknown".to_string())
        }
        Platform::Unsupported => "Unknown OS".to_string(),
    };

    OsIdentity {
        os: platform.label().to_string(),
        os_name,
        os_version: System::long_os_version().into(),
        kernel: System::kernel_version().into(),
        architecture: std::env::consts::ARCH.to_string(),
        hostname: System::host_name().into(),
    }
}

pub(crate) fn parse_pretty_name(os_release: &str) -> Option<String> {
    for line in os_release.lines() {
        if let Some((key, value)) = line.split_once('=') {
            if key == "PRETTY_NAME" {
                let value = value.trim().replace('"', "");
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

fn package_manager(platform: Platform) -> String {
    match platform {
        Platform::Linux => LINUX_MANAGERS
            .iter()
            .find(|(exe, _)| probe::has_executable(exe))
            .map(|(_, label)| (*label).to_string())
            .unwrap_or_else(|| "Unknown Package Manager".to_string()),
        Platform::Darwin => {
            if probe::has_executable("brew") {
                "Homebrew".to_string()
            } else {
                "Unknown Package Manager".to_string()
            }
        }
        Platform::Windows => "Windows does not use a traditional package manager".to_string(),
        Platform::Unsupported => "Unknown Package Manager".to_string(),
    }
}

fn cpu_info(sys: &System, platform: Platform) -> CpuInfo {
    let processor = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    CpuInfo {
        processor,
        physical_cores: sys.physical_core_count().into(),
        logical_cores: sys.cpus().len(),
        cpu_freq: cpu_frequency(sys, platform),
    }
}

fn cpu_frequency(sys: &System, platform: Platform) -> CpuFreq {
    let current_mhz = sys.cpus().first().map(|cpu| cpu.frequency()).unwrap_or(0);
    let (min_mhz, max_mhz) = match platform {
        Platform::Linux => (
            cpufreq_mhz("cpuinfo_min_freq"),
            cpufreq_mhz("cpuinfo_max_freq"),
        ),
        _ => (Probe::Unavailable, Probe::Unavailable),
    };

    CpuFreq {
        current_mhz,
        min_mhz,
        max_mhz,
    }
}

// cpufreq sysfs reports kHz
fn cpufreq_mhz(leaf: &str) -> Probe<u64> {
    probe::read_file(format!("/sys/devices/system/cpu/cpu0/cpufreq/{leaf}"))
        .and_then(|raw| raw.parse::<u64>().ok().map(|khz| khz / 1000).into())
}

pub(crate) fn format_gib(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / (1024u64.pow(3) as f64))
}

fn ram_info(sys: &System) -> RamInfo {
    let total = sys.total_memory();
    let used = sys.used_memory();
    let percent = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    RamInfo {
        total_ram: format_gib(total),
        available_ram: format_gib(sys.available_memory()),
        used_ram: format_gib(used),
        ram_percent: format!("{percent:.1} %"),
    }
}

fn uptime() -> UptimeInfo {
    let seconds = System::uptime();
    UptimeInfo {
        uptime_seconds: seconds,
        uptime_human: format_uptime(seconds),
    }
}

// Wraps past 24h, matching a clock-face rendering of the uptime.
pub(crate) fn format_uptime(seconds: u64) -> String {
    let wrapped = (seconds % 86_400) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(wrapped, 0)
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "00:00:00".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_name_is_unquoted() {
        let text = "NAME=\"Ubuntu\"\nPRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\nID=ubuntu\n";
        assert_eq!(
            parse_pretty_name(text),
            Some("Ubuntu 22.04.3 LTS".to_string())
        );
    }

    #[test]
    fn pretty_name_missing() {
        assert_eq!(parse_pretty_name("NAME=Arch\nID=arch\n"), None);
    }

    #[test]
    fn uptime_formatting_wraps() {
        assert_eq!(format_uptime(3_723), "01:02:03");
        assert_eq!(format_uptime(86_400 + 61), "00:01:01");
    }

    #[test]
    fn gib_formatting() {
        assert_eq!(format_gib(2 * 1024 * 1024 * 1024), "2.00 GB");
    }

    #[test]
    fn collector_always_yields_a_record() {
        let info = collect_system(Platform::Unsupported);
        assert_eq!(info.os_info.os_name, "Unknown OS");
        assert!(info.cpu_info.logical_cores >= 1);
    }
}
