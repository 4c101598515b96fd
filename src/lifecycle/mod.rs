//! Match lifecycle: `pending -> returned`, with the finder reward.

pub mod error;
pub mod manager;
pub mod types;


pub use error::{LifecycleError, LifecycleResult};
pub use manager::MatchLifecycle;
pub use types::ReturnOutcome;
