use indexmap::IndexMap;
use serde::Serialize;

use crate::probe::Probe;

//
// system domain
//

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub os_info: OsIdentity,
    pub package_manager: String,
    pub cpu_info: CpuInfo,
    pub ram_info: RamInfo,
    pub uptime: UptimeInfo,
}

#[derive(Debug, Serialize)]
pub struct OsIdentity {
    pub os: String,
    pub os_name: String,
    pub os_version: Probe<String>,
    pub kernel: Probe<String>,
    pub architecture: String,
    pub hostname: Probe<String>,
}

#[derive(Debug, Serialize)]
pub struct CpuInfo {
    pub processor: String,
    pub physical_cores: Probe<usize>,
    pub logical_cores: usize,
    pub cpu_freq: CpuFreq,
}

#[derive(Debug, Serialize)]
pub struct CpuFreq {
    pub current_mhz: u64,
    pub min_mhz: Probe<u64>,
    pub max_mhz: Probe<u64>,
}

#[derive(Debug, Serialize)]
pub struct RamInfo {
    pub total_ram: String,
    pub available_ram: String,
    pub used_ram: String,
    pub ram_percent: String,
}

#[derive(Debug, Serialize)]
pub struct UptimeInfo {
    pub uptime_seconds: u64,
    pub uptime_human: String,
}

//
// network domain
//

#[derive(Debug, Serialize)]
pub struct NetworkInfo {
    pub ip_address: IndexMap<String, InterfaceAddrs>,
    pub interfaces: IndexMap<String, InterfaceIdentity>,
    pub interface_stats: IndexMap<String, InterfaceStats>,
    pub dns_servers: Vec<String>,
    pub network_speed: IndexMap<String, String>,
    pub vpn_tunnels: VpnTunnels,
    pub connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Serialize)]
pub struct InterfaceAddrs {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InterfaceIdentity {
    pub ip: Option<String>,
    pub mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InterfaceStats {
    pub is_up: Probe<bool>,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VpnTunnels {
    Detected(IndexMap<String, TunnelInfo>),
    NoneDetected(String),
}

#[derive(Debug, Serialize)]
pub struct TunnelInfo {
    pub ip: Option<String>,
    pub mac: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ConnectionRecord {
    Connection {
        local_address: String,
        remote_address: String,
        status: String,
        pid: Option<i32>,
    },
    Error {
        error: String,
    },
}

//
// extra domain
//

#[derive(Debug, Serialize)]
pub struct ExtraInfo {
    pub packages: IndexMap<String, String>,
}

//
// firmware domain
//

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FirmwareInfo {
    Linux(LinuxFirmware),
    Windows(WindowsFirmware),
    Darwin(DarwinFirmware),
    Unsupported { firmware: String },
}

#[derive(Debug, Serialize)]
pub struct LinuxFirmware {
    pub bios_version: Probe<String>,
    pub bios_date: Probe<String>,
    pub vendor: Probe<String>,
    pub motherboard: Probe<String>,
    pub uefi: bool,
    pub cpu_microcode: String,
    pub fwupd_devices: Probe<Vec<String>>,
    pub storage_firmware: Probe<IndexMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct WindowsFirmware {
    pub bios_version: Probe<String>,
    pub bios_date: Probe<String>,
    pub vendor: Probe<String>,
    pub motherboard: Probe<String>,
    pub uefi: UefiStatus,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UefiStatus {
    Flag(bool),
    Unknown(&'static str),
}

#[derive(Debug, Serialize)]
pub struct DarwinFirmware {
    pub model: Probe<String>,
    pub bios_version: Probe<String>,
    pub smc_version: Probe<String>,
    pub uefi: bool,
}

//
// specs domain
//

#[derive(Debug, Serialize)]
pub struct SpecsInfo {
    pub cpu_info: CpuSpecs,
    pub ram_info: RamSpecs,
    pub storage_info: IndexMap<String, VolumeSpecs>,
    pub motherboard_info: MotherboardInfo,
    pub gpu_info: String,
    pub sound_info: SoundInfo,
    pub battery_info: BatteryInfo,
    pub temperature_info: SensorReadings<f32>,
    pub fan_info: SensorReadings<u64>,
}

#[derive(Debug, Serialize)]
pub struct CpuSpecs {
    pub model: Probe<String>,
    pub cores: Probe<usize>,
    pub threads: usize,
    pub max_freq: Probe<f64>,
}

#[derive(Debug, Serialize)]
pub struct RamSpecs {
    pub total: String,
    pub available: String,
    pub used: String,
    pub percent: String,
    #[serde(rename = "type")]
    pub mem_type: String,
}

#[derive(Debug, Serialize)]
pub struct VolumeSpecs {
    pub mountpoint: String,
    pub fstype: String,
    pub total: String,
    pub used: String,
    pub free: String,
    pub percent: String,
    pub health: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MotherboardInfo {
    Record {
        manufacturer: Probe<String>,
        model: Probe<String>,
        serial: Probe<String>,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SoundInfo {
    Text { devices: String },
    List { devices: Vec<String> },
    Error { error: String },
    Empty {},
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatteryInfo {
    Battery {
        percent: String,
        plugged: bool,
        time_left: TimeLeft,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TimeLeft {
    Minutes(u64),
    Label(String),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SensorReadings<T> {
    Readings(IndexMap<String, T>),
    Error { error: String },
}
