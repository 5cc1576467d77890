//! Resource compiler and installer for AI coding assistant CLIs.
//!
//! One canonical tree of markdown commands, agents and skills is compiled
//! into the formats the Claude, Gemini and Copilot CLIs load, and installed
//! into each host's home directory by an idempotent reconciler that removes
//! stale artifacts and never touches files outside its namespace.
//!
//! The public API is organised into layers:
//!
//! - **[`store`]**: load and validate canonical resources
//! - **[`matrix`]**: which host supports which kinds and capabilities
//! - **[`convert`]**: per-host rendering of one resource
//! - **[`materialize`]**: idempotent `check + apply` primitives for one artifact
//! - **[`install`]**: per-host reconciliation and orphan cleanup
//! - **[`report`]**: the structured result of a run
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod convert;
pub mod error;
pub mod install;
pub mod logging;
pub mod materialize;
pub mod matrix;
pub mod report;
pub mod store;
