//! The authenticated request gateway.

pub mod error;
#[allow(clippy::module_inception)]
pub mod gateway;
pub mod refresh;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ApiError;
pub use gateway::Gateway;
pub use refresh::{RefreshCoordinator, RefreshLead, RefreshTicket, RefreshWait};
pub use transport::{ReqwestTransport, Transport};
