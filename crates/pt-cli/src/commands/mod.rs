//! CLI subcommand implementations.

pub mod demo;
pub mod permissions;
pub mod playback;
pub mod report;
pub mod users;
mod util;
