//! Printboard Registry - live fingerprints keyed by identifier
//!
//! A durable backend serves until its first operational failure; from then
//! on the process runs on the in-memory backend until restart.

pub mod backend;
pub mod clock;
pub mod file;
pub mod memory;
pub mod store;

pub use backend::RegistryBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use store::RegistryStore;
