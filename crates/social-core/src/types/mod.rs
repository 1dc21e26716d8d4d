//! Core type definitions used across the workspace.

pub mod id;
pub mod principal;

pub use id::*;
pub use principal::Principal;
