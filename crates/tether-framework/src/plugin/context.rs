//! [`PluginContext`]: explicit dependencies handed to a plugin and its services.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Everything a plugin may need from its host, passed explicitly.
///
/// There is no global plugin instance. The supervisor owns one `PluginContext`
/// and passes it to [`Plugin::init`](super::Plugin::init) and
/// [`Plugin::register_services`](super::Plugin::register_services). Services
/// that need configuration take it in their constructor.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(serde::Deserialize, Default)]
/// #[serde(default)]
/// struct EconomyConfig { starting_balance: u64 }
///
/// fn register_services(&mut self, ctx: &PluginContext) -> Result<Vec<ServiceEntry>, BoxError> {
///     let cfg: EconomyConfig = ctx.service_config("economy")?;
///     Ok(vec![ServiceEntry::new("economy", Economy::new(cfg))])
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PluginContext {
    name: String,
    /// Raw plugin section (or an empty object).
    config: Value,
    /// Raw per-service sections, keyed by service handle.
    service_configs: HashMap<String, Value>,
}

impl PluginContext {
    /// Creates a context with an empty configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: empty_object(),
            service_configs: HashMap::new(),
        }
    }

    /// Sets the raw plugin configuration section.
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Sets the raw configuration section of one service.
    pub fn with_service_config(mut self, handle: impl Into<String>, config: Value) -> Self {
        self.service_configs.insert(handle.into(), config);
        self
    }

    /// Replaces all per-service configuration sections.
    pub fn with_service_configs(mut self, configs: HashMap<String, Value>) -> Self {
        self.service_configs = configs;
        self
    }

    /// Returns the plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw plugin configuration section.
    pub fn config_json(&self) -> &Value {
        &self.config
    }

    /// Deserialises the plugin configuration section into `T`.
    ///
    /// Returns `Err` if the section is missing required fields or has the wrong
    /// shape; use `#[serde(default)]` on the struct to make all fields optional.
    pub fn get_config<T>(&self) -> serde_json::Result<T>
    where
        T: DeserializeOwned,
    {
        T::deserialize(&self.config)
    }

    /// Returns the raw configuration section of a service, if present.
    pub fn service_config_json(&self, handle: &str) -> Option<&Value> {
        self.service_configs.get(handle)
    }

    /// Deserialises the configuration section of a service into `T`.
    ///
    /// A missing section deserialises from an empty object.
    pub fn service_config<T>(&self, handle: &str) -> serde_json::Result<T>
    where
        T: DeserializeOwned,
    {
        match self.service_configs.get(handle) {
            Some(section) => T::deserialize(section),
            None => T::deserialize(&empty_object()),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::default())
}
