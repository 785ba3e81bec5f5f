//! Process-wide logging, panic handling, and metrics setup (§10), grounded on
//! this codebase's sibling `observe` crate.

pub mod metrics;
pub mod panic_hook;
pub mod tracing_setup;

pub use tracing_setup::initialize;
