//! Printboard Core - Types, wire format, configuration, and error handling

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use config::{ClientConfig, PrintboardConfig, ServerConfig, DEFAULT_NAMESPACE};
pub use error::{
    CollectionError, ConfigError, DerivationError, Error, Result, StoreError, TransportError,
};
pub use protocol::*;
pub use types::*;
