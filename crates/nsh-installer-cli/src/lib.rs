//! CLI library components for the nsh installer.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
