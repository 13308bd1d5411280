//! Command implementations

pub mod completions;
pub mod copy;
pub mod install;
pub mod paste;
