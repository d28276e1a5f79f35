//! # Generator
//!
//! Everything that touches the Go source tree: finding interfaces, deciding
//! where their mocks go, and running `mockgen` for each one on a background
//! worker.
//!
//! - [`scanner`]: `Scanner` trait and the walkdir-based `GoScanner`
//! - [`paths`]: default destination for a mock
//! - [`mockgen`]: `Emitter` trait and the `mockgen` subprocess runner
//! - [`worker`]: the sequential worker feeding the progress channel

pub mod mockgen;
pub mod paths;
pub mod scanner;
pub mod worker;

pub use mockgen::{EmitError, Emitter, MockgenEmitter};
pub use scanner::{GoScanner, ScanError, Scanner};
