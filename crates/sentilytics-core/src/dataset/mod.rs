//! Dataset domain module.

mod model;

pub use model::{Dataset, PREVIEW_ROW_LIMIT};
