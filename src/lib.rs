//! Plugin deployment tool.
//!
//! Places a built plugin artifact directory into a host application's plugin
//! folder (`<base>/.<namespace>/plugins/<id>`), either as a symbolic link for
//! development or as a full copy for installs, converging whatever already
//! occupies the target while preserving the host's runtime state file.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: settings, environment store, and manifest resolution
//! - **[`deploy`]**: target inspection and idempotent convergence
//! - **[`fs`]**: the filesystem capability the engine works through
//! - **[`commands`]**: top-level orchestration used by the binary
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod deploy;
pub mod error;
pub mod fs;
pub mod logging;
