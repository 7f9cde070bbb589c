//! Host plugin contract.
//!
//! A [`Plugin`] is the unit a host enables and disables. It supplies the
//! services to supervise through its factory,
//! [`register_services`](Plugin::register_services), and may hook into each
//! plugin-level step of the lifecycle.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use tether::prelude::*;
//!
//! struct Economy;
//! impl Service for Economy {
//!     fn load(&mut self) -> HookResult {
//!         Ok(())
//!     }
//! }
//!
//! struct Shop;
//! impl Plugin for Shop {
//!     fn name(&self) -> &str {
//!         "shop"
//!     }
//!
//!     fn register_services(&mut self, _ctx: &PluginContext) -> Result<Vec<ServiceEntry>, BoxError> {
//!         Ok(vec![ServiceEntry::new("economy", Economy)])
//!     }
//! }
//!
//! let mut supervisor = LifecycleSupervisor::new(Shop);
//! supervisor.enable()?;
//! ```

pub mod context;
pub mod core;

pub use context::PluginContext;
pub use self::core::{BoxedPlugin, Plugin, ServiceEntry};
