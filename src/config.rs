use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::probe::{ProbeOptions, AUTHENTICATION_TIMEOUT, CONNECTIVITY_TIMEOUT};

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("failed to read config \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to reserialize config: {0}")]
    Reserialize(#[from] toml::ser::Error),
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq, Eq)]
pub(crate) struct Probe {
    pub connectivity_timeout_ms: Option<u64>,
    pub authentication_timeout_ms: Option<u64>,
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq, Eq)]
pub(crate) struct Config {
    pub registry_path: Option<PathBuf>,
    pub log_filter: Option<String>,
    #[serde(default)]
    pub probe: Probe,
}

impl Config {
    /// The configured registry document, or the default under
    /// `~/.config/switchboard`.
    pub(crate) fn registry_path(&self) -> Option<PathBuf> {
        self.registry_path.clone().or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config/switchboard/registry.json"))
        })
    }

    pub(crate) fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            connectivity_timeout: self
                .probe
                .connectivity_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(CONNECTIVITY_TIMEOUT),
            authentication_timeout: self
                .probe
                .authentication_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(AUTHENTICATION_TIMEOUT),
            ..ProbeOptions::default()
        }
    }
}

fn get_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME");

    if let Some(home) = home {
        let home = PathBuf::from(home);

        const USER_PATHS: [&str; 2] = [".config/switchboard/config.toml", ".switchboard.toml"];

        for &path in USER_PATHS.iter() {
            let fullpath = home.join(path);

            if fullpath.exists() {
                return Some(fullpath);
            }
        }
    }

    let system_config = PathBuf::from("/etc/switchboard.toml");

    if system_config.exists() {
        Some(system_config)
    } else {
        None
    }
}

fn extra_fields_helper<'a>(
    path: &mut Vec<&'a String>,
    user_config: &'a toml::Table,
    config: &'a toml::Table,
    extra: &mut Vec<String>,
) {
    for (user_key, user_value) in user_config {
        path.push(user_key);

        if let Some(config_value) = config.get(user_key) {
            if let (toml::Value::Table(user_value), toml::Value::Table(config_value)) =
                (user_value, config_value)
            {
                extra_fields_helper(path, user_value, config_value, extra)
            }
        } else {
            let path: Vec<&str> = path.iter().map(|&s| s.as_str()).collect();

            extra.push(path.join("."));
        }

        path.pop();
    }
}

/// Dotted paths of keys in `raw_config` that `config` has no field for.
fn extra_fields(config: &Config, raw_config: &str) -> Result<Vec<String>, Error> {
    let user_config: toml::Table = toml::de::from_str(raw_config)?;

    let config: toml::Table = {
        let seralized_config = toml::ser::to_string(&config)?;

        toml::de::from_str(&seralized_config)?
    };

    let mut path = Vec::new();
    let mut extra = Vec::new();

    extra_fields_helper(&mut path, &user_config, &config, &mut extra);

    Ok(extra)
}

fn parse_config(raw_config: &str) -> Result<Config, Error> {
    let config: Config = toml::de::from_str(raw_config)?;

    for key in extra_fields(&config, raw_config)? {
        crate::warn!("config contains extraneous key \"{}\", ignoring", key);
    }

    Ok(config)
}

/// Reads `config`, or the first config found in the usual locations. No
/// config at all is the default config.
pub(crate) fn read_config(config: Option<PathBuf>) -> Result<Config, Error> {
    let config_path = config.or_else(get_config_path);

    match config_path {
        Some(path) => {
            let raw_config = std::fs::read_to_string(&path)
                .map_err(|source| Error::Read { path, source })?;

            parse_config(&raw_config)
        }
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
registry_path = "/srv/switchboard/registry.json"
log_filter = "switchboard=debug"

[probe]
connectivity_timeout_ms = 1500
authentication_timeout_ms = 3000
"#;

    #[test]
    fn test_full_config() {
        let config = parse_config(FULL).unwrap();

        assert_eq!(
            config.registry_path(),
            Some(PathBuf::from("/srv/switchboard/registry.json"))
        );
        assert_eq!(config.log_filter.as_deref(), Some("switchboard=debug"));

        let options = config.probe_options();
        assert_eq!(options.connectivity_timeout, Duration::from_millis(1500));
        assert_eq!(options.authentication_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_probe_defaults() {
        let options = Config::default().probe_options();

        assert_eq!(options.connectivity_timeout, CONNECTIVITY_TIMEOUT);
        assert_eq!(options.authentication_timeout, AUTHENTICATION_TIMEOUT);
    }

    #[test]
    fn test_extra_fields() {
        let raw = r#"
editor = "vim"
log_filter = "info"

[probe]
connectivity_timeout_ms = 10
retries = 3

[providers.openai]
api_key = "sk-x"
"#;

        let config: Config = toml::de::from_str(raw).unwrap();
        let extra = extra_fields(&config, raw).unwrap();

        assert_eq!(extra, vec!["editor", "probe.retries", "providers"]);
    }

    #[test]
    fn test_read_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_filter = \"trace\"\n").unwrap();

        let config = read_config(Some(path)).unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("trace"));

        let err = read_config(Some(dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn test_malformed_config() {
        let err = parse_config("[probe]\nconnectivity_timeout_ms = \"soon\"").unwrap_err();

        assert!(matches!(err, Error::Parse(_)));
    }
}
