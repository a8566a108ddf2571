//! Application layer for Sentilytics.
//!
//! Coordinates the domain contracts from `sentilytics-core` into the client
//! workflows: session handling, dataset upload and retrieval, and analysis
//! runs. All observable state lives in a single [`StateHandle`] snapshot.

pub mod analysis;
pub mod dataset;
pub mod session;
pub mod state;

pub use analysis::{AnalysisOrchestrator, AnalysisReport};
pub use dataset::{DatasetRegistry, ParsedTable, parse_table};
pub use session::SessionManager;
pub use state::{ApplicationStateStore, BusyGuard, StateHandle};
