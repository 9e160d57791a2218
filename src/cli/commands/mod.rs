//! Command implementations.

pub mod completions;
pub mod import;
pub mod preview;
pub mod verify;
pub mod version;
