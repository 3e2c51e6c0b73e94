//! Individual steps of the install pipeline.
//!
//! Each step is implemented as a separate module with functions that
//! can be called by the orchestrator.

pub mod build;
pub mod install;
pub mod link;
pub mod path_env;
pub mod permissions;
pub mod verify;
