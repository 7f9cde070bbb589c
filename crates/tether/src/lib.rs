//! # Tether
//!
//! Service registry and lifecycle supervision for plugins, with isolated
//! failures.
//!
//! ## Overview
//!
//! A plugin contributes named services. Tether registers them in declaration
//! order, drives them through `init` / `load` / `unload`, and keeps going when
//! one of them fails: the failure is recorded against that service's handle
//! and reported, and its siblings are unaffected.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌─────────────────────┐     ┌──────────────────┐
//! │ TetherRuntime │────▶│ LifecycleSupervisor │────▶│ ServiceRegistry  │──▶ services
//! │ (config, log) │     │  enable / reload /  │     │ handle → service │
//! └───────────────┘     │  disable            │     │ handle → error   │
//!                       └─────────────────────┘     └──────────────────┘
//!                          │               │
//!                          ▼               ▼
//!                    EventBinder     DiagnosticSink
//! ```
//!
//! - **Runtime**: loads configuration, initialises logging, builds the plugin context
//! - **Supervisor**: runs plugin and service hooks in order, fatal vs isolated failures
//! - **Registry**: ordered services plus the last error of each
//! - **EventBinder**: host hook that subscribes listener services to an event bus
//! - **DiagnosticSink**: host hook that receives every failure
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tether::prelude::*;
//!
//! struct Greeter;
//! impl Service for Greeter {}
//!
//! struct MyPlugin;
//! impl Plugin for MyPlugin {
//!     fn name(&self) -> &str { "my-plugin" }
//!
//!     fn register_services(&mut self, _ctx: &PluginContext) -> Result<Vec<ServiceEntry>, BoxError> {
//!         Ok(vec![ServiceEntry::new("greeter", Greeter)])
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut runtime = TetherRuntime::builder().build(MyPlugin)?;
//!     runtime.enable()?;
//!     runtime.reload()?;
//!     runtime.disable()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use tether_core as core;
pub use tether_framework as framework;
pub use tether_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tether::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use tether_runtime::{RuntimeBuilder, TetherConfig, TetherRuntime};

    // Plugin side
    pub use tether_framework::{
        LifecycleReport, LifecycleSupervisor, Plugin, PluginContext, ServiceEntry,
        ServiceRegistry,
    };

    // Service side and host collaborators
    pub use tether_core::{
        BoxError, Diagnostic, DiagnosticSink, EventBinder, HookResult, LifecycleError,
        LifecycleState, Listener, RegistryError, Service, ServiceHandle, Severity,
    };

    // Default collaborators
    pub use tether_framework::{NoopBinder, TracingSink};
}
