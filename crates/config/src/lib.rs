//! Configuration loading (§6, §12): CLI flags doubling as environment
//! variables via `clap`, plus the `%VAR` secret-indirection convention
//! carried over from this codebase's sibling `configs` crate.

mod secret;
mod settings;

pub use secret::{Secret, SecretError};
pub use settings::{Settings, SettingsError};
