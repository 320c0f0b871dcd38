use serde_json::{Map, Value};
use std::fmt::Write;

const ACRONYMS: [&str; 24] = [
    "os", "ip", "ram", "cpu", "dns", "mac", "vpn", "tcp", "udp", "http", "https", "ftp", "ssh",
    "smtp", "pop3", "imap", "ipv4", "ipv6", "usb", "gpu", "ssd", "hdd", "bios", "uefi",
];

const INDENT: &str = "⤷ ";
const SUB_INDENT: &str = "   ↳ ";

/// Human-readable rendering of a report or a single domain record.
/// Lossy, display-only, never re-parsed.
pub fn render(data: &Value) -> String {
    let mut out = String::new();

    let Value::Object(sections) = data else {
        let _ = writeln!(out, "{}", scalar(data));
        return out;
    };

    for (section, content) in sections {
        let _ = writeln!(out, "\n{}", format_key(section));
        match content {
            Value::Object(entries) => render_record(&mut out, entries),
            Value::Array(items) => render_sequence(&mut out, items),
            other => {
                let _ = writeln!(out, "{INDENT}{}", scalar(other));
            }
        }
    }

    out
}

/// Title-case a snake_case key word by word, upper-casing known acronyms.
pub fn format_key(key: &str) -> String {
    key.split('_')
        .map(|word| {
            if ACRONYMS.contains(&word.to_lowercase().as_str()) {
                word.to_uppercase()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

fn join_list(items: &[Value]) -> String {
    items.iter().map(scalar).collect::<Vec<_>>().join(", ")
}

fn render_record(out: &mut String, entries: &Map<String, Value>) {
    for (key, value) in entries {
        let key_name = format_key(key);
        match value {
            Value::Object(nested) => {
                let _ = writeln!(out, "{INDENT}{key_name}:");
                for (sub_key, sub_value) in nested {
                    let sub_name = format_key(sub_key);
                    match sub_value {
                        Value::Array(items) => {
                            let _ = writeln!(out, "{SUB_INDENT}{sub_name}: {}", join_list(items));
                        }
                        // deeper nesting falls back to generic stringification
                        other => {
                            let _ = writeln!(out, "{SUB_INDENT}{sub_name}: {}", scalar(other));
                        }
                    }
                }
            }
            Value::Array(items) => {
                let _ = writeln!(out, "{INDENT}{key_name}: {}", join_list(items));
            }
            other => {
                let _ = writeln!(out, "{INDENT}{key_name}: {}", scalar(other));
            }
        }
    }
}

fn render_sequence(out: &mut String, items: &[Value]) {
    let all_records = items.iter().all(Value::is_object);
    if !all_records {
        let _ = writeln!(out, "{INDENT}{}", join_list(items));
        return;
    }

    for item in items {
        let Value::Object(fields) = item else {
            continue;
        };
        match (fields.get("local_address"), fields.get("remote_address")) {
            (Some(local), Some(remote)) => {
                let _ = writeln!(out, "{INDENT}{} → {}", scalar(local), scalar(remote));
            }
            _ => {
                let _ = writeln!(out, "{INDENT}{item}");
            }
        }
        for (key, value) in fields {
            if key == "local_address" || key == "remote_address" {
                continue;
            }
            let _ = writeln!(out, "{SUB_INDENT}{}: {}", format_key(key), scalar(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn acronym_keys_upper_case() {
        assert_eq!(format_key("cpu_info"), "CPU Info");
        assert_eq!(format_key("ram_info"), "Ram Info");
        assert_eq!(format_key("dns_servers"), "DNS Servers");
        assert_eq!(format_key("vpn_tunnels"), "VPN Tunnels");
        assert_eq!(format_key("uptime"), "Uptime");
    }

    #[test]
    fn sections_and_nested_records() {
        let data = json!({
            "system": {
                "os_info": {"os": "Linux", "kernel": "6.8.0"},
                "package_manager": "Pacman"
            }
        });
        let text = render(&data);
        assert!(text.contains("\nSystem\n"));
        assert!(text.contains("⤷ OS Info:"));
        assert!(text.contains("   ↳ Kernel: 6.8.0"));
        assert!(text.contains("⤷ Package Manager: Pacman"));
    }

    #[test]
    fn lists_are_comma_joined() {
        let data = json!({"network": {"dns_servers": ["8.8.8.8", "8.8.4.4"]}});
        let text = render(&data);
        assert!(text.contains("⤷ DNS Servers: 8.8.8.8, 8.8.4.4"));
    }

    #[test]
    fn connection_sequences_render_endpoints() {
        let data = json!({
            "connections": [{
                "local_address": "192.168.1.1:8080",
                "remote_address": "93.184.216.34:80",
                "status": "ESTABLISHED",
                "pid": 1234
            }]
        });
        let text = render(&data);
        assert!(text.contains("⤷ 192.168.1.1:8080 → 93.184.216.34:80"));
        assert!(text.contains("   ↳ Status: ESTABLISHED"));
        assert!(text.contains("   ↳ Pid: 1234"));
        assert!(!text.contains("Local Address"));
    }

    #[test]
    fn booleans_and_nulls_render_python_style() {
        let data = json!({"specs": {"flags": {"uefi": true, "legacy": false, "extra": null}}});
        let text = render(&data);
        assert!(text.contains("   ↳ UEFI: True"));
        assert!(text.contains("   ↳ Legacy: False"));
        assert!(text.contains("   ↳ Extra: None"));
    }
}
