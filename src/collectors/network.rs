use indexmap::IndexMap;
use std::net::IpAddr;
use sysinfo::{NetworkData, Networks};

use crate::collectors::types::{
    ConnectionRecord, InterfaceAddrs, InterfaceIdentity, InterfaceStats, NetworkInfo, TunnelInfo,
    VpnTunnels,
};
use crate::platform::Platform;
use crate::probe::{self, Probe};

const TUNNEL_PREFIXES: [&str; 5] = ["tun", "tap", "ppp", "wg", "vpn"];

const IFF_UP: u32 = 0x1;

pub fn collect_network(platform: Platform) -> NetworkInfo {
    let networks = Networks::new_with_refreshed_list();
    let mut ifaces: Vec<(&String, &NetworkData)> = networks.iter().collect();
    ifaces.sort_by(|a, b| a.0.cmp(b.0));

    NetworkInfo {
        ip_address: interface_addresses(&ifaces),
        interfaces: interface_identities(&ifaces, platform),
        interface_stats: interface_stats(&ifaces, platform),
        dns_servers: dns_servers(platform),
        network_speed: network_speed(&ifaces, platform),
        vpn_tunnels: vpn_tunnels(&ifaces),
        connections: collect_connections(platform),
    }
}

fn split_addresses(data: &NetworkData) -> (Vec<String>, Vec<String>) {
    let mut ipv4 = Vec::new();
    let mut ipv6 = Vec::new();
    for network in data.ip_networks() {
        match network.addr {
            IpAddr::V4(addr) => ipv4.push(addr.to_string()),
            IpAddr::V6(addr) => ipv6.push(addr.to_string()),
        }
    }
    (ipv4, ipv6)
}

fn mac_string(data: &NetworkData) -> Option<String> {
    let mac = data.mac_address().to_string();
    if mac == "00:00:00:00:00:00" {
        None
    } else {
        Some(mac)
    }
}

/// Interfaces that carry at least one address, with their v4/v6 lists.
fn interface_addresses(ifaces: &[(&String, &NetworkData)]) -> IndexMap<String, InterfaceAddrs> {
    let mut addresses = IndexMap::new();
    for (name, data) in ifaces {
        let (ipv4, ipv6) = split_addresses(data);
        if ipv4.is_empty() && ipv6.is_empty() {
            continue;
        }
        addresses.insert((*name).clone(), InterfaceAddrs { ipv4, ipv6 });
    }
    addresses
}

fn interface_identities(
    ifaces: &[(&String, &NetworkData)],
    platform: Platform,
) -> IndexMap<String, InterfaceIdentity> {
    let mut identities = IndexMap::new();
    for (name, data) in ifaces {
        let (ipv4, _) = split_addresses(data);
        let (vendor, device) = match platform {
            Platform::Linux => pci_identity(name.as_str()),
            _ => (None, None),
        };
        identities.insert(
            (*name).clone(),
            InterfaceIdentity {
                ip: ipv4.into_iter().next(),
                mac: mac_string(data),
                vendor,
                device,
            },
        );
    }
    identities
}

/// Resolve the NIC's vendor/device names through the PCI ID database.
#[cfg(target_os = "linux")]
fn pci_identity(name: &str) -> (Option<String>, Option<String>) {
    use pciid_parser::Database;

    let device_path = std::path::Path::new("/sys/class/net")
        .join(name)
        .join("device");
    let (Some(vendor_hex), Some(device_hex)) = (
        probe::read_file(device_path.join("vendor")).present(),
        probe::read_file(device_path.join("device")).present(),
    ) else {
        return (None, None);
    };

    let parse_id = |raw: &str| u16::from_str_radix(raw.strip_prefix("0x").unwrap_or(raw), 16).ok();
    let (Some(vendor_id), Some(device_id)) = (parse_id(&vendor_hex), parse_id(&device_hex)) else {
        return (None, None);
    };

    let Ok(db) = Database::read() else {
        return (None, None);
    };
    let Some(vendor) = db.vendors.get(&vendor_id) else {
        return (None, None);
    };
    let device = vendor.devices.get(&device_id).map(|d| d.name.clone());
    (Some(vendor.name.clone()), device)
}

#[cfg(not(target_os = "linux"))]
fn pci_identity(_name: &str) -> (Option<String>, Option<String>) {
    (None, None)
}

fn interface_stats(
    ifaces: &[(&String, &NetworkData)],
    platform: Platform,
) -> IndexMap<String, InterfaceStats> {
    let mut stats = IndexMap::new();
    for (name, data) in ifaces {
        stats.insert(
            (*name).clone(),
            InterfaceStats {
                is_up: interface_up(platform, name.as_str()),
                bytes_sent: data.total_transmitted(),
                bytes_recv: data.total_received(),
            },
        );
    }
    stats
}

fn interface_up(platform: Platform, name: &str) -> Probe<bool> {
    match platform {
        Platform::Linux => probe::read_file(format!("/sys/class/net/{name}/flags"))
            .and_then(|raw| {
                parse_interface_flags(&raw)
                    .map(|flags| flags & IFF_UP != 0)
                    .into()
            }),
        Platform::Windows => probe::run_command("netsh", &["interface", "show", "interface"])
            .and_then(|text| parse_netsh_interface_state(&text, name).into()),
        Platform::Darwin => probe::run_command("ifconfig", &[name])
            .map(|text| parse_ifconfig_up(&text)),
        Platform::Unsupported => Probe::Unavailable,
    }
}

// /sys/class/net/<if>/flags holds a hex word, e.g. "0x1003"
pub(crate) fn parse_interface_flags(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    u32::from_str_radix(raw.strip_prefix("0x").unwrap_or(raw), 16).ok()
}

pub(crate) fn parse_netsh_interface_state(text: &str, name: &str) -> Option<bool> {
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() >= 4 && tokens[3..].join(" ") == name {
            return Some(tokens[1].eq_ignore_ascii_case("connected"));
        }
    }
    None
}

pub(crate) fn parse_ifconfig_up(text: &str) -> bool {
    let Some(first) = text.lines().next() else {
        return false;
    };
    let (Some(start), Some(end)) = (first.find('<'), first.find('>')) else {
        return false;
    };
    if end <= start {
        return false;
    }
    first[start + 1..end].split(',').any(|flag| flag == "UP")
}

fn dns_servers(platform: Platform) -> Vec<String> {
    match platform {
        Platform::Linux => probe::read_file("/etc/resolv.conf")
            .present()
            .map(|text| parse_resolv_conf(&text))
            .unwrap_or_default(),
        Platform::Windows => probe::run_command("nslookup", &[])
            .present()
            .map(|text| parse_nslookup_servers(&text))
            .unwrap_or_default(),
        Platform::Darwin => probe::run_command("scutil", &["--dns"])
            .present()
            .map(|text| parse_scutil_nameservers(&text))
            .unwrap_or_default(),
        Platform::Unsupported => Vec::new(),
    }
}

/// `nameserver` entries in file order.
pub(crate) fn parse_resolv_conf(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.starts_with("nameserver"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_nslookup_servers(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.contains("Server"))
        .filter_map(|line| line.split(':').nth(1))
        .map(|value| value.trim().to_string())
        .collect()
}

pub(crate) fn parse_scutil_nameservers(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.contains("nameserver"))
        .filter_map(|line| line.split(':').nth(1))
        .map(|value| value.trim().to_string())
        .collect()
}

fn network_speed(ifaces: &[(&String, &NetworkData)], platform: Platform) -> IndexMap<String, String> {
    let mut speeds = IndexMap::new();
    for (name, _) in ifaces {
        let speed = match platform {
            Platform::Linux => probe::run_command("ethtool", &[name.as_str()])
                .present()
                .and_then(|text| parse_ethtool_speed(&text)),
            Platform::Windows => {
                probe::run_command("netsh", &["interface", "show", "interface", name.as_str()])
                    .present()
                    .and_then(|text| parse_link_speed_line(&text))
            }
            Platform::Darwin => probe::run_command("networksetup", &["-getInfo", name.as_str()])
                .present()
                .and_then(|text| parse_link_speed_line(&text)),
            Platform::Unsupported => Some("Unsupported OS".to_string()),
        };
        speeds.insert(
            (*name).clone(),
            speed.unwrap_or_else(|| "Not Available".to_string()),
        );
    }
    speeds
}

pub(crate) fn parse_ethtool_speed(text: &str) -> Option<String> {
    for line in text.lines() {
        if let Some(rest) = line.trim().strip_prefix("Speed:") {
            let value = rest.trim();
            if value.eq_ignore_ascii_case("unknown!") {
                return Some("Not Available".to_string());
            }
            return Some(value.to_string());
        }
    }
    None
}

pub(crate) fn parse_link_speed_line(text: &str) -> Option<String> {
    text.lines()
        .find(|line| line.contains("Link Speed"))
        .and_then(|line| line.rsplit(':').next())
        .map(|value| value.trim().to_string())
}

pub(crate) fn is_tunnel_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    TUNNEL_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

fn vpn_tunnels(ifaces: &[(&String, &NetworkData)]) -> VpnTunnels {
    build_tunnels(ifaces.iter().map(|(name, data)| {
        let (ipv4, _) = split_addresses(data);
        (
            (*name).clone(),
            ipv4.into_iter().next(),
            mac_string(data),
        )
    }))
}

pub(crate) fn build_tunnels(
    ifaces: impl Iterator<Item = (String, Option<String>, Option<String>)>,
) -> VpnTunnels {
    let mut tunnels = IndexMap::new();
    for (name, ip, mac) in ifaces {
        if is_tunnel_name(&name) {
            tunnels.insert(name, TunnelInfo { ip, mac });
        }
    }
    if tunnels.is_empty() {
        VpnTunnels::NoneDetected("No VPN tunnels detected".to_string())
    } else {
        VpnTunnels::Detected(tunnels)
    }
}

//
// live connections
//

/// Non-listening inet connections. Enumeration failure degrades to a
/// single error record so the domain stays well-formed.
pub fn collect_connections(platform: Platform) -> Vec<ConnectionRecord> {
    let result = match platform {
        Platform::Linux => linux_connections(),
        Platform::Windows => match probe::run_command("netstat", &["-ano"]) {
            Probe::Present(text) => Ok(parse_netstat_windows(&text)),
            other => Err(probe_failure_message("netstat", &other)),
        },
        Platform::Darwin => match probe::run_command("netstat", &["-anv"]) {
            Probe::Present(text) => Ok(parse_netstat_darwin(&text)),
            other => Err(probe_failure_message("netstat", &other)),
        },
        Platform::Unsupported => {
            Err("Connection enumeration is not supported on this platform".to_string())
        }
    };

    match result {
        Ok(connections) => connections,
        Err(message) => vec![ConnectionRecord::Error { error: message }],
    }
}

fn probe_failure_message(tool: &str, outcome: &Probe<String>) -> String {
    match outcome {
        Probe::TimedOut => format!("{tool} timed out"),
        Probe::PermissionDenied => format!("{tool}: permission denied"),
        _ => format!("{tool} unavailable"),
    }
}

#[cfg(target_os = "linux")]
fn linux_connections() -> Result<Vec<ConnectionRecord>, String> {
    use procfs::net::{self, TcpState};
    use procfs::process::{all_processes, FDTarget};
    use std::collections::HashMap;

    // socket inode -> owning pid, best effort over /proc/*/fd
    let mut by_inode: HashMap<u64, i32> = HashMap::new();
    if let Ok(procs) = all_processes() {
        for proc in procs.flatten() {
            let pid = proc.pid;
            if let Ok(fds) = proc.fd() {
                for fd in fds.flatten() {
                    if let FDTarget::Socket(inode) = fd.target {
                        by_inode.insert(inode, pid);
                    }
                }
            }
        }
    }

    let mut records = Vec::new();

    let tcp = net::tcp().map_err(|err| format!("reading /proc/net/tcp failed: {err}"))?;
    let tcp6 = net::tcp6().unwrap_or_default();
    for entry in tcp.into_iter().chain(tcp6) {
        if matches!(entry.state, TcpState::Listen) {
            continue;
        }
        records.push(ConnectionRecord::Connection {
            local_address: entry.local_address.to_string(),
            remote_address: entry.remote_address.to_string(),
            status: tcp_state_label(&entry.state).to_string(),
            pid: by_inode.get(&entry.inode).copied(),
        });
    }

    let udp = net::udp().unwrap_or_default();
    let udp6 = net::udp6().unwrap_or_default();
    for entry in udp.into_iter().chain(udp6) {
        records.push(ConnectionRecord::Connection {
            local_address: entry.local_address.to_string(),
            remote_address: entry.remote_address.to_string(),
            status: "NONE".to_string(),
            pid: by_inode.get(&entry.inode).copied(),
        });
    }

    Ok(records)
}

#[cfg(not(target_os = "linux"))]
fn linux_connections() -> Result<Vec<ConnectionRecord>, String> {
    Err("procfs is only available on Linux".to_string())
}

#[cfg(target_os = "linux")]
fn tcp_state_label(state: &procfs::net::TcpState) -> &'static str {
    use procfs::net::TcpState;
    match state {
        TcpState::Established => "ESTABLISHED",
        TcpState::SynSent => "SYN_SENT",
        TcpState::SynRecv => "SYN_RECV",
        TcpState::FinWait1 => "FIN_WAIT1",
        TcpState::FinWait2 => "FIN_WAIT2",
        TcpState::TimeWait => "TIME_WAIT",
        TcpState::Close => "CLOSE",
        TcpState::CloseWait => "CLOSE_WAIT",
        TcpState::LastAck => "LAST_ACK",
        TcpState::Listen => "LISTEN",
        TcpState::Closing => "CLOSING",
        _ => "UNKNOWN",
    }
}

pub(crate) fn parse_netstat_windows(text: &str) -> Vec<ConnectionRecord> {
    let mut records = Vec::new();
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["TCP", local, remote, state, pid] => {
                if *state == "LISTENING" {
                    continue;
                }
                records.push(ConnectionRecord::Connection {
                    local_address: (*local).to_string(),
                    remote_address: (*remote).to_string(),
                    status: (*state).to_string(),
                    pid: pid.parse().ok(),
                });
            }
            ["UDP", local, remote, pid] => {
                records.push(ConnectionRecord::Connection {
                    local_address: (*local).to_string(),
                    remote_address: (*remote).to_string(),
                    status: "NONE".to_string(),
                    pid: pid.parse().ok(),
                });
            }
            _ => {}
        }
    }
    records
}

pub(crate) fn parse_netstat_darwin(text: &str) -> Vec<ConnectionRecord> {
    let mut records = Vec::new();
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 6 {
            continue;
        }
        let proto = tokens[0];
        if !proto.starts_with("tcp") && !proto.starts_with("udp") {
            continue;
        }
        let status = if proto.starts_with("tcp") {
            tokens[5].to_string()
        } else {
            "NONE".to_string()
        };
        if status.starts_with("LISTEN") {
            continue;
        }
        records.push(ConnectionRecord::Connection {
            local_address: darwin_endpoint(tokens[3]),
            remote_address: darwin_endpoint(tokens[4]),
            status,
            pid: tokens.get(8).and_then(|pid| pid.parse().ok()),
        });
    }
    records
}

// BSD netstat writes "addr.port"; rewrite the final dot as a colon.
fn darwin_endpoint(raw: &str) -> String {
    match raw.rsplit_once('.') {
        Some((addr, port)) => format!("{addr}:{port}"),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tunnel_prefixes_are_case_insensitive() {
        assert!(is_tunnel_name("tun0"));
        assert!(is_tunnel_name("WG0"));
        assert!(is_tunnel_name("vpn-corp"));
        assert!(is_tunnel_name("tap3"));
        assert!(!is_tunnel_name("eth0"));
        assert!(!is_tunnel_name("enp3s0"));
    }

    #[test]
    fn tunnels_keep_address_and_mac() {
        let ifaces = vec![
            (
                "tun0".to_string(),
                Some("10.8.0.1".to_string()),
                Some("00:11:22:33:44:66".to_string()),
            ),
            (
                "eth0".to_string(),
                Some("192.168.1.1".to_string()),
                Some("00:11:22:33:44:55".to_string()),
            ),
        ];
        match build_tunnels(ifaces.into_iter()) {
            VpnTunnels::Detected(map) => {
                assert_eq!(map.len(), 1);
                let tunnel = &map["tun0"];
                assert_eq!(tunnel.ip.as_deref(), Some("10.8.0.1"));
                assert_eq!(tunnel.mac.as_deref(), Some("00:11:22:33:44:66"));
            }
            VpnTunnels::NoneDetected(_) => panic!("expected a detected tunnel"),
        }
    }

    #[test]
    fn no_tunnels_yields_sentinel() {
        let ifaces = vec![("eth0".to_string(), None, None)];
        match build_tunnels(ifaces.into_iter()) {
            VpnTunnels::NoneDetected(message) => {
                assert_eq!(message, "No VPN tunnels detected");
            }
            VpnTunnels::Detected(_) => panic!("expected no tunnels"),
        }
    }

    #[test]
    fn resolv_conf_order_is_preserved() {
        let text = "# comment\nnameserver 8.8.8.8\nsearch lan\nnameserver 8.8.4.4\n";
        assert_eq!(parse_resolv_conf(text), vec!["8.8.8.8", "8.8.4.4"]);
    }

    #[test]
    fn ethtool_speed_line() {
        let text = "Settings for eth0:\n\tSpeed: 1000Mb/s\n\tDuplex: Full\n";
        assert_eq!(parse_ethtool_speed(text), Some("1000Mb/s".to_string()));
    }

    #[test]
    fn ethtool_unknown_speed_is_not_available() {
        let text = "Settings for wlan0:\n\tSpeed: Unknown!\n";
        assert_eq!(parse_ethtool_speed(text), Some("Not Available".to_string()));
    }

    #[test]
    fn scutil_nameservers() {
        let text = "DNS configuration\n  nameserver[0] : 8.8.8.8\n  nameserver[1] : 8.8.4.4\n";
        assert_eq!(parse_scutil_nameservers(text), vec!["8.8.8.8", "8.8.4.4"]);
    }

    #[test]
    fn interface_flags_word() {
        assert_eq!(parse_interface_flags("0x1003"), Some(0x1003));
        assert!(parse_interface_flags("0x1003").unwrap() & IFF_UP != 0);
        assert!(parse_interface_flags("0x1002").unwrap() & IFF_UP == 0);
        assert_eq!(parse_interface_flags("bogus"), None);
    }

    #[test]
    fn ifconfig_up_flag() {
        assert!(parse_ifconfig_up(
            "en0: flags=8863<UP,BROADCAST,SMART,RUNNING,SIMPLEX,MULTICAST> mtu 1500\n"
        ));
        assert!(!parse_ifconfig_up("gif0: flags=8010<POINTOPOINT,MULTICAST> mtu 1280\n"));
    }

    #[test]
    fn netsh_interface_state() {
        let text = "\
Admin State    State          Type             Interface Name
-------------------------------------------------------------------------
Enabled        Connected      Dedicated        Ethernet
Enabled        Disconnected   Dedicated        Wi-Fi 2
";
        assert_eq!(parse_netsh_interface_state(text, "Ethernet"), Some(true));
        assert_eq!(parse_netsh_interface_state(text, "Wi-Fi 2"), Some(false));
        assert_eq!(parse_netsh_interface_state(text, "Bluetooth"), None);
    }

    #[test]
    fn windows_netstat_skips_listeners() {
        let text = "\
Active Connections

  Proto  Local Address          Foreign Address        State           PID
  TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       900
  TCP    192.168.1.1:8080       93.184.216.34:80       ESTABLISHED     1234
  UDP    0.0.0.0:123            *:*                                    1024
";
        let records = parse_netstat_windows(text);
        assert_eq!(records.len(), 2);
        match &records[0] {
            ConnectionRecord::Connection {
                local_address,
                remote_address,
                status,
                pid,
            } => {
                assert_eq!(local_address, "192.168.1.1:8080");
                assert_eq!(remote_address, "93.184.216.34:80");
                assert_eq!(status, "ESTABLISHED");
                assert_eq!(*pid, Some(1234));
            }
            ConnectionRecord::Error { .. } => panic!("expected a connection"),
        }
    }

    #[test]
    fn darwin_netstat_rewrites_endpoints() {
        let text = "\
Active Internet connections (including servers)
Proto Recv-Q Send-Q  Local Address          Foreign Address        (state)      rhiwat shiwat    pid   epid
tcp4       0      0  192.168.1.5.49152      93.184.216.34.443      ESTABLISHED  131072 131072    490      0
tcp4       0      0  127.0.0.1.631          *.*                    LISTEN       131072 131072    120      0
";
        let records = parse_netstat_darwin(text);
        assert_eq!(records.len(), 1);
        match &records[0] {
            ConnectionRecord::Connection {
                local_address,
                remote_address,
                status,
                pid,
            } => {
                assert_eq!(local_address, "192.168.1.5:49152");
                assert_eq!(remote_address, "93.184.216.34:443");
                assert_eq!(status, "ESTABLISHED");
                assert_eq!(*pid, Some(490));
            }
            ConnectionRecord::Error { .. } => panic!("expected a connection"),
        }
    }

    #[test]
    fn unsupported_platform_reports_an_error_record() {
        let records = collect_connections(Platform::Unsupported);
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0], ConnectionRecord::Error { .. }));
    }
}
