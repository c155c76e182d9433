//! Printboard Gateway - HTTP surface for registering and listing fingerprints

pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, serve, start_gateway, GatewayState};
