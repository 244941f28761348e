//! Logging collaborator injected into the forwarding subsystem.
//!
//! Backends and the address parser never log through a global; they receive
//! a [`Logger`] at construction time. The production implementation forwards
//! to `tracing`, tests use [`mock::RecordingLogger`] to assert on exactly
//! which warnings were emitted and in which order.

use tracing::{info, warn};

/// Sink for the warning and info lines the subsystem promises to emit.
pub trait Logger: Send + Sync {
    fn warning(&self, message: &str);

    fn info(&self, message: &str);
}

/// Logger backed by the process-wide `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn info(&self, message: &str) {
        info!("{}", message);
    }
}
