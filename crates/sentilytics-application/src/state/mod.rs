//! Shared application state.

mod handle;
mod store;

pub use handle::{BusyGuard, StateHandle};
pub use store::ApplicationStateStore;
