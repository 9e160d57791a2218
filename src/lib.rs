//! paprika2notion - import Paprika recipe exports into Notion
//!
//! This crate provides the core functionality for the `p2n` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (SourceRecord, TargetRecord, Notion properties)
//! - [`loader`] - Reading `.paprikarecipe`, JSON and YAML recipe files
//! - [`remote`] - The remote page store (Notion, in-memory, dry run)
//! - [`sync`] - Fingerprinting, transform, paging, upsert and batch import
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod remote;
pub mod sync;

pub use error::{Error, Result};
