//! Detect command implementation.

use anyhow::Result;

use crate::cmd_abstraction::{CommandExecutor, RealCommandExecutor};
use crate::config::{BackendKind, Config};
use crate::forwarding::detect_backend;

/// Backend that `config` resolves to, with a note when it came from detection
pub fn describe(executor: &dyn CommandExecutor, config: &Config) -> Result<String> {
    match config.backend {
        BackendKind::Auto => {
            let kind = detect_backend(executor, config)?;
            Ok(format!("{} (auto)", kind))
        }
        kind => Ok(kind.to_string()),
    }
}

/// Run the detect command
pub fn run(config: &Config) -> Result<()> {
    println!("{}", describe(&RealCommandExecutor::new(), config)?);
    Ok(())
}
