//! Application settings

use super::{default_config_path, CONFIG_ENV_VARIABLE};
use crate::core::codec::{parse_escapes, CodecError};
use crate::core::protocol::TraceFlags;
use crate::core::transport::DeviceEndpoint;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Per-byte trace output
    pub debug: bool,
    /// Progress trace output
    pub info: bool,
    /// Device to talk to
    pub device: DeviceEndpoint,
    /// Friendly command name -> wire payload (escapes allowed)
    pub commands: BTreeMap<String, String>,
}

/// Where a config path came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed explicitly (e.g. `--config`)
    Explicit(PathBuf),
    /// Named by the `config_file` environment variable
    Environment(PathBuf),
    /// The per-user default location
    Default(PathBuf),
    /// Nothing to read; built-in defaults
    BuiltIn,
}

impl ConfigSource {
    /// Pick the config path: explicit, then environment, then default location
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VARIABLE).filter(|p| !p.is_empty()) {
            return Self::Environment(PathBuf::from(path));
        }
        default_config_path().map_or(Self::BuiltIn, Self::Default)
    }

    /// File to read, `None` for built-in defaults
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Environment(p) | Self::Default(p) => Some(p),
            Self::BuiltIn => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{}", p.display()),
            Self::Environment(p) => {
                write!(f, "{} (from ${CONFIG_ENV_VARIABLE})", p.display())
            }
            Self::Default(p) => write!(f, "{} (default location)", p.display()),
            Self::BuiltIn => write!(f, "built-in defaults"),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("Error reading config file {source_desc}: {error}")]
    Read {
        /// Which source named the file
        source_desc: String,
        /// Underlying cause
        error: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("Error parsing config file {source_desc}: {error}")]
    Parse {
        /// Which source named the file
        source_desc: String,
        /// Underlying cause
        error: toml::de::Error,
    },

    /// A command payload has a malformed escape
    #[error("Command {name:?} has an invalid payload: {error}")]
    Command {
        /// Command name
        name: String,
        /// Underlying cause
        error: CodecError,
    },
}

impl AppConfig {
    /// Load config from the resolved source.
    ///
    /// An explicit or environment-named file must exist; a missing file at
    /// the default location yields defaults.
    pub fn load(source: &ConfigSource) -> Result<Self, ConfigError> {
        let path = match source {
            ConfigSource::BuiltIn => return Ok(Self::default()),
            ConfigSource::Default(p) if !p.exists() => return Ok(Self::default()),
            ConfigSource::Explicit(p) | ConfigSource::Environment(p) | ConfigSource::Default(p) => p,
        };

        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            source_desc: source.to_string(),
            error,
        })?;
        Self::from_toml(&content).map_err(|error| ConfigError::Parse {
            source_desc: source.to_string(),
            error,
        })
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Trace switches for the protocol engine
    pub fn trace(&self) -> TraceFlags {
        TraceFlags {
            debug: self.debug,
            info: self.info,
        }
    }

    /// Raw payload string configured for a command name
    pub fn command(&self, name: &str) -> Option<&str> {
        self.commands.get(name).map(String::as_str)
    }

    /// Wire payload for a command name, escapes applied
    pub fn resolve_command(&self, name: &str) -> Option<Result<Bytes, ConfigError>> {
        self.command(name).map(|raw| {
            parse_escapes(raw).map_err(|error| ConfigError::Command {
                name: name.to_string(),
                error,
            })
        })
    }

    /// Every configured command with its wire payload, in name order
    pub fn resolved_commands(
        &self,
    ) -> impl Iterator<Item = (&str, Result<Bytes, ConfigError>)> + '_ {
        self.commands.iter().map(|(name, raw)| {
            let payload = parse_escapes(raw).map_err(|error| ConfigError::Command {
                name: name.clone(),
                error,
            });
            (name.as_str(), payload)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{format_output, OutputFormat};
    use std::io::Write;

    const SAMPLE: &str = r#"
debug = true

[device]
host = "192.168.1.40"
receive_timeout_ms = 300

[commands]
power_on = "!1PWR01\r"
volume_up = "!1MVLUP\r"
"#;

    #[test]
    fn test_defaults_when_empty() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(!config.debug);
        assert!(!config.info);
        assert!(config.commands.is_empty());
    }

    #[test]
    fn test_parse_sample() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert!(config.debug);
        assert!(!config.info);
        assert_eq!(config.device.host, "192.168.1.40");
        assert_eq!(config.device.receive_timeout_ms, 300);
        assert_eq!(config.device.port, crate::core::transport::EISCP_PORT);
        assert_eq!(config.command("power_on"), Some("!1PWR01\r"));
        assert_eq!(config.trace(), TraceFlags { debug: true, info: false });
    }

    #[test]
    fn test_resolve_command_applies_escapes() {
        let config = AppConfig::from_toml(
            "[commands]\nquery = 'PWRQSTN\\r\\n'\nbad = '\\x4'\n",
        )
        .unwrap();
        let payload = config.resolve_command("query").unwrap().unwrap();
        assert_eq!(&payload[..], b"PWRQSTN\r\n");
        assert!(config.resolve_command("bad").unwrap().is_err());
        assert!(config.resolve_command("missing").is_none());
    }

    #[test]
    fn test_listing_shows_wire_payload() {
        let config = AppConfig::from_toml(
            "[commands]\nliteral = 'PWR\\r'\nbasic = \"MVL\\r\"\n",
        )
        .unwrap();

        let listed: Vec<(&str, String)> = config
            .resolved_commands()
            .map(|(name, payload)| (name, format_output(&payload.unwrap(), OutputFormat::Text)))
            .collect();

        assert_eq!(
            listed,
            vec![
                ("basic", "MVL\\r".to_string()),
                ("literal", "PWR\\r".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = ConfigSource::Explicit(file.path().to_path_buf());
        let config = AppConfig::load(&source).unwrap();
        assert_eq!(config.commands.len(), 2);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = ConfigSource::Environment(dir.path().join("absent.toml"));
        let err = AppConfig::load(&source).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("$config_file"));
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let source = ConfigSource::Default(dir.path().join("config.toml"));
        assert_eq!(AppConfig::load(&source).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"debug = \"yes\"").unwrap();
        let source = ConfigSource::Explicit(file.path().to_path_buf());
        assert!(matches!(
            AppConfig::load(&source),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_explicit_path_wins() {
        let source = ConfigSource::resolve(Some(Path::new("/tmp/avlink.toml")));
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/tmp/avlink.toml")));
    }
}
