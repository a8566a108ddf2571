//! Application state domain module.
//!
//! The state is an immutable snapshot. Every change is expressed as a
//! [`StateAction`] and applied by the pure [`AppState::reduce`] function.

mod action;
mod busy;
mod model;
mod notice;

pub use action::StateAction;
pub use busy::{BusyState, Operation};
pub use model::AppState;
pub use notice::{MAX_NOTICES, Notice, NoticeLevel};
