//! Configuration management for ipfwd.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::IpfwdError;
use crate::validation::DEFAULT_MAX_EXPANSION;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/ipfwd/config.yaml";

/// Largest accepted expansion bound (a /8)
pub const MAX_EXPANSION_LIMIT: u64 = 1 << 24;

/// Route protocol identifier used when none is configured
pub const DEFAULT_PROTO_ID: &str = "66";

/// Protocol identifiers accepted by `ip route ... proto`:
/// a number 0-255 or a name from rt_protos
fn is_valid_proto_id(proto_id: &str) -> bool {
    if proto_id.is_empty() || !proto_id.is_ascii() {
        return false;
    }

    if proto_id.bytes().all(|b| b.is_ascii_digit()) {
        return proto_id.parse::<u8>().is_ok();
    }

    proto_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_".contains(c))
}

fn invalid(message: String) -> Result<()> {
    Err(IpfwdError::Config(message).into())
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Forwarding backend (auto, iproute, ifconfig)
    pub backend: BackendKind,

    /// Protocol tag stamped on managed local routes
    pub proto_id: String,

    /// Refuse to expand blocks larger than this
    pub max_expanded_addresses: u64,

    /// Route-management tool
    pub ip_command: String,

    /// Interface alias tool
    pub ifconfig_command: String,

    /// Directory holding per-interface lock files
    pub lock_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Auto,
            proto_id: DEFAULT_PROTO_ID.to_string(),
            max_expanded_addresses: DEFAULT_MAX_EXPANSION,
            ip_command: "ip".to_string(),
            ifconfig_command: "ifconfig".to_string(),
            lock_dir: PathBuf::from("/var/run"),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.proto_id.is_empty() {
            return invalid("proto_id must not be empty".to_string());
        }

        if !is_valid_proto_id(&self.proto_id) {
            return invalid(format!(
                "Invalid proto_id '{}'. Use a number 0-255 or a name like 'static'",
                self.proto_id
            ));
        }

        if self.max_expanded_addresses == 0 {
            return invalid("max_expanded_addresses must be at least 1".to_string());
        }

        if self.max_expanded_addresses > MAX_EXPANSION_LIMIT {
            return invalid(format!(
                "max_expanded_addresses {} exceeds the maximum of {}",
                self.max_expanded_addresses, MAX_EXPANSION_LIMIT
            ));
        }

        if self.ip_command.trim().is_empty() {
            return invalid("ip_command must not be empty".to_string());
        }

        if self.ifconfig_command.trim().is_empty() {
            return invalid("ifconfig_command must not be empty".to_string());
        }

        Ok(())
    }

    /// Save configuration to YAML file atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let path = path.as_ref();
        let content = serde_yaml::to_string(self).with_context(|| "Failed to serialize config")?;

        // Same directory so the rename stays on one filesystem
        let parent_dir = path.parent().unwrap_or(Path::new("/etc/ipfwd"));
        let mut temp_file = NamedTempFile::new_in(parent_dir)
            .context("Failed to create temporary file for config")?;

        temp_file.write_all(content.as_bytes())?;
        temp_file.as_file().sync_all()?;

        temp_file
            .persist(path)
            .with_context(|| format!("Failed to persist config file: {:?}", path))?;

        Ok(())
    }
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Prefer iproute, fall back to ifconfig
    #[default]
    Auto,
    /// Local routes in the kernel's local table
    Iproute,
    /// Interface aliases
    Ifconfig,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BackendKind::Auto => "auto",
            BackendKind::Iproute => "iproute",
            BackendKind::Ifconfig => "ifconfig",
        };
        f.write_str(name)
    }
}
