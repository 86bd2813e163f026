//! Types handed back to callers of the engine.
mod errors;
mod outcome;

pub use errors::{Result, RuntimeError};
pub use outcome::ActionOutcome;
