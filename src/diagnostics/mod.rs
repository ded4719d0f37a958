//! Tools used for collecting insight into what each compiler phase is doing.
//! Tracing is opt-in from the command line and is independent of the `log`
//! output, which reports phase level events.
pub mod config;

pub use config::{Tracing, TracingConfig};
