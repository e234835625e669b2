//! CLI command implementations.

pub mod catalog;
pub mod daily;
pub mod normalize;
pub mod verify;
