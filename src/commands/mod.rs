//! CLI command implementations.

pub mod add;
pub mod detect;
pub mod list;
pub mod parse;
pub mod remove;
pub mod sync;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::cmd_abstraction::RealCommandExecutor;
use crate::config::{BackendKind, Config};
use crate::forwarding::{create_backend, ForwardingBackend};
use crate::logger::TracingLogger;
use crate::validation::is_forwarded_ip_shape;

/// Load the config file (defaults if absent) and apply the CLI backend override
pub fn load_config(config_path: &Path, backend: Option<BackendKind>) -> Result<Config> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(kind) = backend {
        config.backend = kind;
    }
    Ok(config)
}

/// Backend talking to the real system tools
pub fn system_backend(config: &Config) -> Result<Box<dyn ForwardingBackend>> {
    create_backend(
        config,
        Arc::new(TracingLogger::new()),
        Arc::new(RealCommandExecutor::new()),
    )
}

/// Command-line addresses as the nullable list the backends consume
pub fn to_raw(addresses: &[String]) -> Vec<Option<String>> {
    addresses.iter().cloned().map(Some).collect()
}

/// Reject the whole invocation if any address is malformed
pub fn ensure_well_formed(addresses: &[String]) -> Result<()> {
    let invalid: Vec<&str> = addresses
        .iter()
        .map(String::as_str)
        .filter(|a| !is_forwarded_ip_shape(a))
        .collect();

    if !invalid.is_empty() {
        anyhow::bail!("Invalid address(es): {}", invalid.join(", "));
    }
    Ok(())
}

/// One address per line, or a JSON array
pub fn format_addresses(addresses: &[String], json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string(addresses)?)
    } else {
        Ok(addresses.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("none.yaml"), None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_backend_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "backend: iproute\nproto_id: static\n").unwrap();

        let config = load_config(&path, Some(BackendKind::Ifconfig)).unwrap();
        assert_eq!(config.backend, BackendKind::Ifconfig);
        assert_eq!(config.proto_id, "static");

        let config = load_config(&path, None).unwrap();
        assert_eq!(config.backend, BackendKind::Iproute);
    }

    #[test]
    fn test_to_raw() {
        let raw = to_raw(&["1.1.1.1".to_string()]);
        assert_eq!(raw, vec![Some("1.1.1.1".to_string())]);
    }

    #[test]
    fn test_ensure_well_formed() {
        let good = vec!["1.1.1.1".to_string(), "10.0.0.0/24".to_string()];
        assert!(ensure_well_formed(&good).is_ok());

        let bad = vec![
            "1.1.1.1".to_string(),
            "hello".to_string(),
            "1.1.1.1/".to_string(),
        ];
        let err = ensure_well_formed(&bad).unwrap_err();
        assert_eq!(err.to_string(), "Invalid address(es): hello, 1.1.1.1/");
    }

    #[test]
    fn test_format_addresses() {
        let ips = vec!["1.1.1.1".to_string(), "1.1.1.2".to_string()];
        assert_eq!(format_addresses(&ips, false).unwrap(), "1.1.1.1\n1.1.1.2");
        assert_eq!(
            format_addresses(&ips, true).unwrap(),
            r#"["1.1.1.1","1.1.1.2"]"#
        );
        assert_eq!(format_addresses(&[], true).unwrap(), "[]");
        assert_eq!(format_addresses(&[], false).unwrap(), "");
    }
}
