//! Runtime synchronization core.
//!
//! A single [`Runtime`] owns the configuration model and the live engine
//! instance. Every mutation follows the same two-phase discipline: apply to
//! the live engine first, mirror into the model only on success. The engine
//! is the write-ahead authority; the model never contains an entry that
//! failed to materialize live.

mod lifecycle;
mod pair;
mod state;
mod sync;


pub use lifecycle::{StartOutcome, StopOutcome};
pub use state::{Runtime, RuntimeOptions};
