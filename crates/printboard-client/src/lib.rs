//! Printboard Client - the client half of the sync protocol
//!
//! A session derives its own fingerprint once, then keeps it registered on
//! one timer and polls the live list on another. Transport failures never
//! clear what is already on screen.

pub mod session;
pub mod transport;
pub mod view;

pub use session::{SessionHandle, SessionOptions, SyncSession};
pub use transport::SyncClient;
pub use view::{ListingState, RegistrationState, View};
