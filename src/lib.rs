//! Library exports for auditdesk, shared between the binary and tests.

pub mod api;
pub mod config;
pub mod gateway;
pub mod models;
pub mod navigation;
pub mod startup;
pub mod store;
pub mod utils;
