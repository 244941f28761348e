//! Error types for ipfwd.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IpfwdError {
    #[error("Could not parse IP address: {0}.")]
    InvalidAddress(String),

    #[error("Refusing to expand {address}: {count} addresses exceeds the limit of {limit}.")]
    ExpansionTooLarge {
        address: String,
        count: u64,
        limit: u64,
    },

    #[error("Exception running {command}. {reason}.")]
    Spawn { command: String, reason: String },

    #[error("Non-zero exit status running {command}. {stderr}.")]
    NonZeroExit { command: String, stderr: String },

    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_message_names_command_and_reason() {
        let err = IpfwdError::Spawn {
            command: "ip route ls".to_string(),
            reason: "No such file or directory (os error 2)".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ip route ls"));
        assert!(msg.contains("os error 2"));
    }

    #[test]
    fn test_expansion_message() {
        let err = IpfwdError::ExpansionTooLarge {
            address: "10.0.0.0/8".to_string(),
            count: 16_777_216,
            limit: 65_536,
        };
        assert!(err.to_string().contains("10.0.0.0/8"));
        assert!(err.to_string().contains("65536"));
    }
}
