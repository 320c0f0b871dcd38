/// Closed set of operating systems the collectors know how to talk to.
///
/// Every collector dispatches on this once instead of re-checking the OS
/// per data source; adding a platform means adding a branch per collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
    Darwin,
    Unsupported,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            "macos" => Platform::Darwin,
            _ => Platform::Unsupported,
        }
    }

    /// Conventional OS family name, as reported in the `os` field.
    pub fn label(self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
            Platform::Darwin => "Darwin",
            Platform::Unsupported => std::env::consts::OS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_matches_build_target() {
        let platform = Platform::current();
        #[cfg(target_os = "linux")]
        assert_eq!(platform, Platform::Linux);
        #[cfg(target_os = "windows")]
        assert_eq!(platform, Platform::Windows);
        #[cfg(target_os = "macos")]
        assert_eq!(platform, Platform::Darwin);
    }

    #[test]
    fn labels() {
        assert_eq!(Platform::Linux.label(), "Linux");
        assert_eq!(Platform::Darwin.label(), "Darwin");
    }
}
