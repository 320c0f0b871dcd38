use indexmap::IndexMap;
use std::path::Path;

use crate::collectors::types::ExtraInfo;
use crate::platform::Platform;
use crate::probe;

pub fn collect_extra(platform: Platform) -> ExtraInfo {
    ExtraInfo {
        packages: all_packages(platform),
    }
}

/// One native package manager per platform, then the cargo-installed
/// binaries overlaid on top. A failed adapter contributes nothing.
fn all_packages(platform: Platform) -> IndexMap<String, String> {
    let mut packages = IndexMap::new();

    match platform {
        Platform::Linux => {
            if Path::new("/usr/bin/apt").exists() || Path::new("/bin/apt").exists() {
                packages.extend(apt_packages());
            } else if probe::has_executable("dnf") {
                packages.extend(dnf_packages());
            } else if probe::has_executable("pacman") {
                packages.extend(pacman_packages());
            }
        }
        Platform::Darwin => packages.extend(brew_packages()),
        Platform::Windows => packages.extend(choco_packages()),
        Platform::Unsupported => {}
    }

    // toolchain-level manager overlays the native one; later keys win
    packages.extend(cargo_packages());

    packages
}

fn apt_packages() -> IndexMap<String, String> {
    probe::run_command("dpkg-query", &["-W", "-f=${Package}=${Version}\n"])
        .present()
        .map(|text| parse_dpkg_lines(&text))
        .unwrap_or_default()
}

fn dnf_packages() -> IndexMap<String, String> {
    probe::run_command("dnf", &["list", "installed"])
        .present()
        .map(|text| parse_columns(&text, 1))
        .unwrap_or_default()
}

fn pacman_packages() -> IndexMap<String, String> {
    probe::run_command("pacman", &["-Q"])
        .present()
        .map(|text| parse_columns(&text, 0))
        .unwrap_or_default()
}

fn brew_packages() -> IndexMap<String, String> {
    probe::run_command("brew", &["list", "--versions"])
        .present()
        .map(|text| parse_columns(&text, 0))
        .unwrap_or_default()
}

fn choco_packages() -> IndexMap<String, String> {
    probe::run_command("choco", &["list", "-lo"])
        .present()
        .map(|text| parse_columns(&text, 1))
        .unwrap_or_default()
}

fn cargo_packages() -> IndexMap<String, String> {
    probe::run_command("cargo", &["install", "--list"])
        .present()
        .map(|text| parse_cargo_install_list(&text))
        .unwrap_or_default()
}

/// dpkg-query `name=version` lines; the split is on the first `=`, so a
/// version containing `=` stays intact.
pub(crate) fn parse_dpkg_lines(text: &str) -> IndexMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(name, version)| (name.to_string(), version.to_string()))
        .collect()
}

/// First two whitespace-separated columns of each line, skipping `skip`
/// header lines; lines without two columns are dropped.
pub(crate) fn parse_columns(text: &str, skip: usize) -> IndexMap<String, String> {
    text.lines()
        .skip(skip)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            match (columns.next(), columns.next()) {
                (Some(name), Some(version)) => Some((name.to_string(), version.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Root lines of `cargo install --list` look like `ripgrep v14.1.0:`;
/// indented lines list the installed binaries and are skipped.
pub(crate) fn parse_cargo_install_list(text: &str) -> IndexMap<String, String> {
    let mut packages = IndexMap::new();
    for line in text.lines() {
        if line.starts_with(char::is_whitespace) {
            continue;
        }
        let Some(rest) = line.strip_suffix(':') else {
            continue;
        };
        let mut columns = rest.split_whitespace();
        if let (Some(name), Some(version)) = (columns.next(), columns.next()) {
            packages.insert(
                name.to_string(),
                version.trim_start_matches('v').to_string(),
            );
        }
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpkg_lines_split_on_first_equals() {
        let parsed = parse_dpkg_lines("bash=5.1-6ubuntu1\nlibssl3=3.0.2-0ubuntu1.12\n");
        assert_eq!(parsed["bash"], "5.1-6ubuntu1");
        assert_eq!(parsed["libssl3"], "3.0.2-0ubuntu1.12");
    }

    #[test]
    fn pacman_columns() {
        let parsed = parse_columns("bash 5.2.026-2\ncoreutils 9.5-1\n", 0);
        assert_eq!(parsed["bash"], "5.2.026-2");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn dnf_skips_header() {
        let text = "Installed Packages\nbash.x86_64 5.2.26-1.fc40 @anaconda\n";
        let parsed = parse_columns(text, 1);
        assert_eq!(parsed["bash.x86_64"], "5.2.26-1.fc40");
    }

    #[test]
    fn cargo_roots_only() {
        let text = "ripgrep v14.1.0:\n    rg\ncargo-edit v0.12.2 (/home/u/src/cargo-edit):\n    cargo-add\n";
        let parsed = parse_cargo_install_list(text);
        assert_eq!(parsed["ripgrep"], "14.1.0");
        assert_eq!(parsed["cargo-edit"], "0.12.2");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn overlay_prefers_later_source() {
        let mut merged = parse_dpkg_lines("apt-package1=1.0.0\n");
        merged.extend([("apt-package1".to_string(), "1.0.1".to_string())]);
        assert_eq!(merged["apt-package1"], "1.0.1");
        assert_eq!(merged.len(), 1);
    }
}
