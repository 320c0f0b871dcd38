use std::fs;
use std::path::PathBuf;

use log::debug;
use serde::Deserialize;

/// Optional user configuration, read from the platform config directory.
/// Missing or malformed files fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Default output format when a command does not pass `--format`.
    pub format: Option<String>,
}

impl Config {
    pub fn load() -> Config {
        let Some(path) = config_path() else {
            return Config::default();
        };
        let Ok(text) = fs::read_to_string(&path) else {
            return Config::default();
        };
        match serde_yaml::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                debug!("ignoring malformed config {}: {}", path.display(), err);
                Config::default()
            }
        }
    }

    /// Format precedence: command line, then config file, then "pretty".
    pub fn resolve_format(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.format.clone())
            .unwrap_or_else(|| "pretty".to_string())
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sysprobe").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_precedence() {
        let config = Config {
            format: Some("yaml".to_string()),
        };
        assert_eq!(config.resolve_format(Some("json")), "json");
        assert_eq!(config.resolve_format(None), "yaml");
        assert_eq!(Config::default().resolve_format(None), "pretty");
    }

    #[test]
    fn parses_yaml() {
        let config: Config = serde_yaml::from_str("format: json\n").unwrap();
        assert_eq!(config.format.as_deref(), Some("json"));
    }
}
