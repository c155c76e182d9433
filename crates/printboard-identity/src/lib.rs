//! Printboard Identity - derives a stable identifier and display attributes
//! from a signal set.
//!
//! `id` is a name-based (v5) UUID of the canonical encoding under a
//! deployment namespace. `moniker` and `emoji` are pure functions of `id`.

pub mod canonical;
pub mod display;
pub mod engine;

pub use canonical::{canonical_encoding, Encoding};
pub use display::{emoji_for, moniker_for, ADJECTIVES, EMOJIS, NOUNS};
pub use engine::{digest, project_details, DerivationEngine};
