//! Builder API for assembling navigation instrumentation.
//!
//! The builder collects the tracing runtime, the timer scheduler, the
//! decoration hook and the options, validates them, and produces a
//! [`NavigationInstrumentation`](crate::instrumentation::NavigationInstrumentation).

pub mod error;
pub mod instrumentation;

pub use error::BuildError;
pub use instrumentation::InstrumentationBuilder;
