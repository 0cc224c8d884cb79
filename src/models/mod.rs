pub mod request;
pub mod response;
pub mod token;

pub use request::{FilePart, OutboundRequest, RequestBody};
pub use response::{ApiResponse, RefreshResponse};
pub use token::AccessToken;
