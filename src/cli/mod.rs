//! CLI infrastructure for the tdnav toolkit
//!
//! This module provides the command-line interface for training value maps
//! and evaluating the navigation policy they induce.

pub mod commands;
pub mod config;
pub mod logging;
pub mod output;
