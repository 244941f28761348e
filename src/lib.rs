//! # ipfwd - Forwarded IP Manager
//!
//! Keeps the set of "forwarded" IPv4 addresses on a guest network interface
//! in line with a desired list handed down by the platform (load-balancer
//! targets, alias ranges).
//!
//! ## Features
//!
//! - **Lenient validation** - `a.b.c.d` and `a.b.c.d/nn` accepted, everything else skipped with a warning
//! - **Block expansion** - CIDR blocks expand to every covered address, with a configurable bound
//! - **Two backends** - local routes via `ip route`, or interface aliases via `ifconfig`
//! - **Never fatal** - tool failures are logged and retried on the next run
//! - **Reconciliation** - add what is missing, remove what is stale, never touch the primary address
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        ipfwd                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: parse, list, add, remove, sync, detect     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Reconcile                                                  │
//! │    └── Set difference, add then remove                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Forwarding (ForwardingBackend trait)                       │
//! │    ├── IprouteBackend  (ip route, table local)              │
//! │    └── IfconfigBackend (ifconfig alias, pnet query)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Validation (ipnet)  │  Runner (CommandExecutor)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use ipfwd::cmd_abstraction::RealCommandExecutor;
//! use ipfwd::config::Config;
//! use ipfwd::forwarding::{check_root, create_backend};
//! use ipfwd::logger::TracingLogger;
//! use ipfwd::reconcile::reconcile;
//!
//! fn main() -> anyhow::Result<()> {
//!     check_root()?;
//!
//!     let config = Config::load("/etc/ipfwd/config.yaml")?;
//!     let logger = Arc::new(TracingLogger::new());
//!     let backend = create_backend(&config, logger.clone(), Arc::new(RealCommandExecutor::new()))?;
//!
//!     let desired = vec![Some("10.1.2.3".to_string()), Some("10.1.3.0/30".to_string())];
//!     let changes = reconcile(backend.as_ref(), logger.as_ref(), "eth0", &desired, Some("10.128.0.2"));
//!     println!("added {}, removed {}", changes.to_add.len(), changes.to_remove.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`cmd_abstraction`] - External process execution
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Error types
//! - [`forwarding`] - Forwarding backends (iproute, ifconfig)
//! - [`lock`] - Per-interface file locking
//! - [`logger`] - Injected warning/info sink
//! - [`reconcile`] - Desired vs configured reconciliation
//! - [`runner`] - Tool invocation with failure containment
//! - [`validation`] - Address validation and expansion

pub mod cli;
pub mod cmd_abstraction;
pub mod commands;
pub mod config;
pub mod error;
pub mod forwarding;
pub mod lock;
pub mod logger;
pub mod reconcile;
pub mod runner;
pub mod validation;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::IpfwdError;
