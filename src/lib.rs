//! Mihomo Ctl - command-line controller for the mihomo external controller API
//!
//! Talks to a locally running daemon over its REST control API:
//! - `list`: enumerate policy groups and endpoint nodes
//! - `ping`: probe per-node latency, tolerating per-node failures
//! - `switch`: change a group's active member, optionally validated
//! - `config`: persist default host/secret
//!
//! # Architecture
//!
//! ```text
//! +-----------+      +-----------+      +-----------+
//! |  main.rs  | ---> |   cmd/    | ---> |   api/    | ---> daemon REST API
//! |  (clap)   |      | (commands)|      | (reqwest) |
//! +-----+-----+      +-----+-----+      +-----+-----+
//!       |                  |                  |
//! +-----v-----+      +-----v-----+            |
//! |  config/  |      |  proxy/   | <----------+
//! |  (tiers)  |      | (topology)|     typed decode
//! +-----------+      +-----------+
//! ```

pub mod api;
pub mod cmd;
pub mod common;
pub mod config;
pub mod proxy;

pub use common::error::{Error, Result};

/// Controller version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
