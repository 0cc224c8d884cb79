pub mod client;
pub mod upload;

pub use client::ApiClient;
pub use upload::DocumentUpload;
