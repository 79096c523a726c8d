//! Core timestamp bucketing.

pub mod presence;

pub use presence::{build_presence, Presence, PresenceError};
