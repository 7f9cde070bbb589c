//! Runtime wiring: configuration, logging and the lifecycle supervisor.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tether_runtime::TetherRuntime;
//!
//! // Auto-loads tether.toml from the current directory
//! let mut runtime = TetherRuntime::builder().build(MyPlugin::default())?;
//! runtime.enable()?;
//!
//! // Custom configuration path and host collaborators
//! let mut runtime = TetherRuntime::builder()
//!     .config_file("config/tether.toml")
//!     .binder(my_event_bus)
//!     .build(MyPlugin::default())?;
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::{ConfigLoader, TetherConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;
use tether_core::{
    DiagnosticSink, EventBinder, LifecycleResult, LifecycleState, Service, ServiceHandle,
};
use tether_framework::{
    BoxedPlugin, LifecycleReport, LifecycleSupervisor, Plugin, PluginContext, ServiceRegistry,
};

/// A configured host for one plugin.
///
/// Owns the loaded [`TetherConfig`] and a [`LifecycleSupervisor`] whose
/// [`PluginContext`] was built from the `[plugin]` and `[services.*]` sections.
/// Lifecycle operations and queries are delegated to the supervisor.
pub struct TetherRuntime {
    config: TetherConfig,
    supervisor: LifecycleSupervisor<BoxedPlugin>,
}

impl TetherRuntime {
    /// Creates a runtime builder.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let runtime = TetherRuntime::builder()
    ///     .config_file("config/tether.toml")
    ///     .profile("production")
    ///     .build(MyPlugin::default())?;
    /// ```
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration, with the
    /// default binder and sink.
    ///
    /// Validates the configuration and initialises logging from it.
    pub fn from_config(config: TetherConfig, plugin: impl Plugin + 'static) -> RuntimeResult<Self> {
        RuntimeBuilder::new().config(config).build(plugin)
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    pub fn supervisor(&self) -> &LifecycleSupervisor<BoxedPlugin> {
        &self.supervisor
    }

    pub fn supervisor_mut(&mut self) -> &mut LifecycleSupervisor<BoxedPlugin> {
        &mut self.supervisor
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    pub fn enable(&mut self) -> LifecycleResult<LifecycleReport> {
        self.supervisor.enable()
    }

    pub fn disable(&mut self) -> LifecycleResult<LifecycleReport> {
        self.supervisor.disable()
    }

    pub fn reload(&mut self) -> LifecycleResult<LifecycleReport> {
        self.supervisor.reload()
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> LifecycleState {
        self.supervisor.state()
    }

    pub fn context(&self) -> &PluginContext {
        self.supervisor.context()
    }

    pub fn registry(&self) -> &ServiceRegistry {
        self.supervisor.registry()
    }

    pub fn get_service<T: Service>(&self, handle: &str) -> Option<&T> {
        self.supervisor.get_service(handle)
    }

    pub fn get_service_mut<T: Service>(&mut self, handle: &str) -> Option<&mut T> {
        self.supervisor.get_service_mut(handle)
    }

    pub fn service_errors(&self) -> &HashMap<ServiceHandle, String> {
        self.supervisor.service_errors()
    }

    pub fn service_error(&self, handle: &str) -> Option<&str> {
        self.supervisor.service_error(handle)
    }
}

impl std::fmt::Debug for TetherRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TetherRuntime")
            .field("supervisor", &self.supervisor)
            .finish_non_exhaustive()
    }
}

/// Builds the plugin context from the `[plugin]` and `[services.*]` sections.
fn plugin_context(name: &str, config: &TetherConfig) -> PluginContext {
    let services = config
        .services
        .iter()
        .map(|(handle, section)| (handle.clone(), section.clone()))
        .collect();
    PluginContext::new(name)
        .with_config(config.plugin.clone())
        .with_service_configs(services)
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`TetherRuntime`] with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = TetherRuntime::builder()
///     .config_file("config/tether.toml")
///     .profile("production")
///     .sink(MySink)
///     .build(MyPlugin::default())?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    /// Replaces loading entirely when set.
    config: Option<TetherConfig>,
    binder: Option<Box<dyn EventBinder>>,
    sink: Option<Box<dyn DiagnosticSink>>,
    init_logging: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            binder: None,
            sink: None,
            init_logging: true,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: TetherConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Overrides a single dotted configuration key.
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Uses `config` as is instead of loading one. It is still validated.
    pub fn config(mut self, config: TetherConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the event binder for listener services.
    pub fn binder(mut self, binder: impl EventBinder + 'static) -> Self {
        self.binder = Some(Box::new(binder));
        self
    }

    /// Sets the diagnostic sink.
    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Leaves the global `tracing` subscriber alone, for hosts that install
    /// their own.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Builds the runtime around `plugin`.
    ///
    /// Loads and validates the configuration, initialises logging, then
    /// creates the supervisor. Nothing of the plugin runs until
    /// [`TetherRuntime::enable`].
    pub fn build(self, plugin: impl Plugin + 'static) -> RuntimeResult<TetherRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_loader.load()?,
        };
        validate_config(&config)?;

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let plugin: BoxedPlugin = Box::new(plugin);
        let context = plugin_context(plugin.name(), &config);
        let mut supervisor = LifecycleSupervisor::new(plugin).with_context(context);
        if let Some(binder) = self.binder {
            supervisor = supervisor.with_binder(binder);
        }
        if let Some(sink) = self.sink {
            supervisor = supervisor.with_sink(sink);
        }

        info!(
            plugin = %supervisor.context().name(),
            log_level = %config.logging.level,
            services = config.services.len(),
            "Runtime initialized from configuration"
        );

        Ok(TetherRuntime { config, supervisor })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
