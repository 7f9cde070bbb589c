//! Tether Runtime - configuration, logging and runtime wiring.
//!
//! This crate provides:
//! - Layered configuration loading and validation (`config`)
//! - `tracing-subscriber` setup driven by that configuration (`logging`)
//! - [`TetherRuntime`], which builds a plugin context from the configuration
//!   and owns the lifecycle supervisor
//!
//! ```ignore
//! use tether_runtime::TetherRuntime;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut runtime = TetherRuntime::builder()
//!         .config_file("tether.toml")
//!         .build(MyPlugin::default())?;
//!
//!     runtime.enable()?;
//!     // …
//!     runtime.disable()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, LoggingConfig, Profile, TetherConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, TetherRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
