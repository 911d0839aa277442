//! Subcommands of the `tdnav` binary

pub mod evaluate;
pub mod train;
