//! Session state and tracking.
//!
//! The transition function lives on [`LeakState`] and is pure; the
//! [`LeakStore`] supplies the ownership and serialization guarantees around
//! it: one leak, one id, one transition at a time.

mod state;
mod store;

pub use state::{BatchObservation, LeakState, LeakStatus};
pub use store::LeakStore;
