//! End-to-end lifecycle tests through the public `tether` API.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::json;
use tether::prelude::*;

type Journal = Rc<RefCell<Vec<String>>>;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EconomyConfig {
    starting_balance: u64,
    fail_load: Option<String>,
    fail_unload: Option<String>,
}

/// A stateful service: balances survive a reload, not a disable.
struct Economy {
    handle: &'static str,
    config: EconomyConfig,
    balances: HashMap<String, u64>,
    journal: Journal,
}

impl Economy {
    fn deposit(&mut self, player: &str, amount: u64) {
        *self
            .balances
            .entry(player.to_string())
            .or_insert(self.config.starting_balance) += amount;
    }

    fn balance(&self, player: &str) -> u64 {
        self.balances
            .get(player)
            .copied()
            .unwrap_or(self.config.starting_balance)
    }
}

impl Service for Economy {
    fn load(&mut self) -> HookResult {
        self.journal.borrow_mut().push(format!("{}.load", self.handle));
        match &self.config.fail_load {
            Some(msg) => Err(msg.clone().into()),
            None => Ok(()),
        }
    }

    fn unload(&mut self) -> HookResult {
        self.journal.borrow_mut().push(format!("{}.unload", self.handle));
        match &self.config.fail_unload {
            Some(msg) => Err(msg.clone().into()),
            None => Ok(()),
        }
    }
}

struct ChatFilter;

impl Listener for ChatFilter {
    fn topics(&self) -> &[&'static str] {
        &["player.chat", "player.join"]
    }
}

impl Service for ChatFilter {
    fn as_listener(&self) -> Option<&dyn Listener> {
        Some(self)
    }
}

struct ShopPlugin {
    journal: Journal,
    handles: Vec<&'static str>,
    fail_factory: bool,
}

impl ShopPlugin {
    fn new(journal: &Journal, handles: &[&'static str]) -> Self {
        Self {
            journal: Rc::clone(journal),
            handles: handles.to_vec(),
            fail_factory: false,
        }
    }
}

impl Plugin for ShopPlugin {
    fn name(&self) -> &str {
        "shop"
    }

    fn register_services(&mut self, ctx: &PluginContext) -> Result<Vec<ServiceEntry>, BoxError> {
        if self.fail_factory {
            return Err("database offline".into());
        }
        let mut entries = Vec::new();
        for &handle in &self.handles {
            let config: EconomyConfig = ctx.service_config(handle)?;
            entries.push(ServiceEntry::new(
                handle,
                Economy {
                    handle,
                    config,
                    balances: HashMap::new(),
                    journal: Rc::clone(&self.journal),
                },
            ));
        }
        entries.push(ServiceEntry::new("chat-filter", ChatFilter));
        Ok(entries)
    }
}

/// Event bus stand-in: remembers topic subscriptions.
#[derive(Clone, Default)]
struct TopicBus(Rc<RefCell<Vec<(String, &'static str)>>>);

impl EventBinder for TopicBus {
    fn bind(&mut self, handle: &ServiceHandle, listener: &dyn Listener) -> HookResult {
        for &topic in listener.topics() {
            self.0.borrow_mut().push((handle.to_string(), topic));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct CollectingSink(Rc<RefCell<Vec<String>>>);

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.0
            .borrow_mut()
            .push(format!("{}: {}", diagnostic.severity, diagnostic.message));
    }
}

fn config_with(services: serde_json::Value) -> TetherConfig {
    let mut config = TetherConfig::default();
    if let serde_json::Value::Object(map) = services {
        config.services.extend(map);
    }
    config
}

fn runtime(plugin: ShopPlugin, config: TetherConfig) -> (TetherRuntime, TopicBus, CollectingSink) {
    let bus = TopicBus::default();
    let sink = CollectingSink::default();
    let runtime = TetherRuntime::builder()
        .config(config)
        .binder(bus.clone())
        .sink(sink.clone())
        .without_logging()
        .build(plugin)
        .unwrap();
    (runtime, bus, sink)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_failing_load_is_isolated_to_its_service() {
    let journal = Journal::default();
    let config = config_with(json!({ "a": { "fail_load": "boom" } }));
    let (mut runtime, _bus, sink) = runtime(ShopPlugin::new(&journal, &["a", "b"]), config);

    runtime.enable().unwrap();

    assert_eq!(runtime.state(), LifecycleState::Ready);
    assert_eq!(runtime.service_error("a"), Some("boom"));
    assert_eq!(runtime.service_error("b"), None);
    assert!(journal.borrow().contains(&"b.load".to_string()));
    assert_eq!(
        *sink.0.borrow(),
        vec!["isolated: Failed to load service: a".to_string()]
    );
}

#[test]
fn test_factory_failure_leaves_no_services() {
    let journal = Journal::default();
    let mut plugin = ShopPlugin::new(&journal, &["a"]);
    plugin.fail_factory = true;
    let (mut runtime, _bus, sink) = runtime(plugin, TetherConfig::default());

    let err = runtime.enable().unwrap_err();

    assert!(matches!(err, LifecycleError::Factory { .. }));
    assert!(err.to_string().contains("database offline"));
    assert!(runtime.registry().is_empty());
    assert_eq!(sink.0.borrow().len(), 1);
    assert!(sink.0.borrow()[0].starts_with("fatal:"));
}

#[test]
fn test_reload_unload_failure_skips_load() {
    let journal = Journal::default();
    let config = config_with(json!({ "a": { "fail_unload": "stuck" } }));
    let (mut runtime, _bus, _sink) = runtime(ShopPlugin::new(&journal, &["a", "b"]), config);
    runtime.enable().unwrap();
    assert!(runtime.service_errors().is_empty());
    journal.borrow_mut().clear();

    let report = runtime.reload().unwrap();

    assert_eq!(runtime.service_error("a"), Some("stuck"));
    assert_eq!(report.failed_services().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(*journal.borrow(), vec!["a.unload", "b.unload", "b.load"]);
}

#[test]
fn test_reload_clears_errors_of_recovered_services() {
    let journal = Journal::default();
    let config = config_with(json!({
        "a": { "fail_load": "boom" },
        "b": { "fail_load": "still down" },
    }));
    let (mut runtime, _bus, _sink) = runtime(ShopPlugin::new(&journal, &["a", "b"]), config);
    runtime.enable().unwrap();

    runtime.get_service_mut::<Economy>("a").unwrap().config.fail_load = None;
    runtime.reload().unwrap();

    assert_eq!(runtime.service_error("a"), None);
    assert_eq!(runtime.service_error("b"), Some("still down"));
}

#[test]
fn test_disable_unloads_everything_despite_failures() {
    let journal = Journal::default();
    let config = config_with(json!({ "a": { "fail_unload": "stuck" } }));
    let (mut runtime, _bus, sink) = runtime(ShopPlugin::new(&journal, &["a", "b"]), config);
    runtime.enable().unwrap();
    journal.borrow_mut().clear();

    let report = runtime.disable().unwrap();

    assert_eq!(*journal.borrow(), vec!["a.unload", "b.unload"]);
    assert_eq!(report.processed().len(), 3);
    assert_eq!(runtime.state(), LifecycleState::Unloaded);
    assert!(runtime.registry().is_empty());
    assert!(sink
        .0
        .borrow()
        .contains(&"isolated: Failed to unload service: a".to_string()));
}

// =============================================================================
// Services and listeners
// =============================================================================

#[test]
fn test_service_state_survives_reload_but_not_disable() {
    let journal = Journal::default();
    let config = config_with(json!({ "bank": { "starting_balance": 10 } }));
    let (mut runtime, _bus, _sink) = runtime(ShopPlugin::new(&journal, &["bank"]), config);
    runtime.enable().unwrap();

    runtime
        .get_service_mut::<Economy>("bank")
        .unwrap()
        .deposit("alice", 5);
    runtime.reload().unwrap();
    assert_eq!(runtime.get_service::<Economy>("bank").unwrap().balance("alice"), 15);

    runtime.disable().unwrap();
    runtime.enable().unwrap();
    assert_eq!(runtime.get_service::<Economy>("bank").unwrap().balance("alice"), 10);
}

#[test]
fn test_listener_is_bound_to_each_topic_once() {
    let journal = Journal::default();
    let (mut runtime, bus, _sink) = runtime(ShopPlugin::new(&journal, &["a"]), TetherConfig::default());

    runtime.enable().unwrap();
    runtime.reload().unwrap();

    assert_eq!(
        *bus.0.borrow(),
        vec![
            ("chat-filter".to_string(), "player.chat"),
            ("chat-filter".to_string(), "player.join"),
        ]
    );
}

#[test]
fn test_wrong_type_lookup_is_reported() {
    let journal = Journal::default();
    let (mut runtime, _bus, sink) = runtime(ShopPlugin::new(&journal, &["a"]), TetherConfig::default());
    runtime.enable().unwrap();

    assert!(runtime.get_service::<ChatFilter>("a").is_none());
    assert!(runtime.get_service::<Economy>("nope").is_none());

    assert_eq!(sink.0.borrow().len(), 1);
    assert!(sink.0.borrow()[0].starts_with("reported:"));
}

#[test]
fn test_lifecycle_requires_valid_transitions() {
    let journal = Journal::default();
    let (mut runtime, _bus, _sink) = runtime(ShopPlugin::new(&journal, &["a"]), TetherConfig::default());

    assert!(matches!(
        runtime.reload(),
        Err(LifecycleError::InvalidTransition { .. })
    ));
    runtime.enable().unwrap();
    assert!(runtime.enable().is_err());
    runtime.disable().unwrap();
    assert!(runtime.disable().is_err());
}

#[test]
fn test_bad_service_config_aborts_enable() {
    let journal = Journal::default();
    let config = config_with(json!({ "a": { "starting_balance": "lots" } }));
    let (mut runtime, _bus, _sink) = runtime(ShopPlugin::new(&journal, &["a"]), config);

    assert!(matches!(
        runtime.enable(),
        Err(LifecycleError::Factory { .. })
    ));
    assert!(runtime.registry().is_empty());
}
