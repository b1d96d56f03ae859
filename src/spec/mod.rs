//! API document model, structural loading and retrieval.

mod fetch;
mod load;
mod types;

pub use fetch::*;
pub use load::*;
pub use types::*;
