// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
#[allow(clippy::module_inception)]
pub mod config;
pub mod gateway;
pub mod logging;
pub mod store;

pub use config::*;
pub use gateway::*;
pub use logging::*;
pub use store::*;
