//! Session memory for Sahayak.
//!
//! Memory is per session, bounded, and never persisted: a
//! [`SessionMemory`] keeps the last N turns, and a [`SessionStore`] hands
//! each session its own memory and forgets it when the session closes.

pub mod session;
pub mod store;

pub use session::SessionMemory;
pub use store::{SessionSlot, SessionStore};
