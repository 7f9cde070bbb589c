//! # Tether Framework
//!
//! Service registry and lifecycle supervision for Tether plugins.
//!
//! This layer provides:
//! - [`Plugin`] and [`ServiceEntry`]: what a host plugin implements
//! - [`ServiceRegistry`]: ordered handle → service map with its error map
//! - [`LifecycleSupervisor`]: drives enable / disable / reload
//! - [`NoopBinder`] and [`TracingSink`]: default host collaborators
//!
//! Config files and logging setup live in `tether-runtime`.

pub mod binder;
pub mod plugin;
pub mod registry;
pub mod sink;
pub mod supervisor;

pub use binder::NoopBinder;
pub use plugin::{BoxedPlugin, Plugin, PluginContext, ServiceEntry};
pub use registry::ServiceRegistry;
pub use sink::TracingSink;
pub use supervisor::{LifecycleReport, LifecycleSupervisor};
