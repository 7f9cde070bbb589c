//! Greeter Example
//!
//! A plugin with three services, walked through a full lifecycle:
//!
//! - `greeter`: healthy, configured from `[services.greeter]`
//! - `flaky`: fails to load until it has been retried
//!   `failures_before_ready` times, then recovers on a reload
//! - `chat-log`: a listener, bound to the in-process topic bus
//!
//! # Usage
//!
//! ```bash
//! cargo run --package greeter -- --config demos/greeter/tether.toml --reloads 2
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use tether::prelude::*;
use tracing::info;

// ============================================================================
// Services
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GreeterConfig {
    name: String,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            name: "stranger".to_string(),
        }
    }
}

struct Greeter {
    greeting: String,
    config: GreeterConfig,
    greeted: usize,
}

impl Greeter {
    fn greet(&mut self) -> String {
        self.greeted += 1;
        format!("{}, {}! (#{})", self.greeting, self.config.name, self.greeted)
    }
}

impl Service for Greeter {
    fn load(&mut self) -> HookResult {
        info!(name = %self.config.name, "Greeter ready");
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlakyConfig {
    failures_before_ready: u32,
}

/// Fails its first `failures_before_ready` loads.
struct Flaky {
    remaining_failures: u32,
}

impl Service for Flaky {
    fn load(&mut self) -> HookResult {
        if self.remaining_failures > 0 {
            self.remaining_failures -= 1;
            return Err(format!(
                "upstream not reachable ({} more failures)",
                self.remaining_failures
            )
            .into());
        }
        Ok(())
    }
}

struct ChatLog;

impl Listener for ChatLog {
    fn topics(&self) -> &[&'static str] {
        &["player.chat"]
    }
}

impl Service for ChatLog {
    fn as_listener(&self) -> Option<&dyn Listener> {
        Some(self)
    }
}

// ============================================================================
// Plugin
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PluginConfig {
    greeting: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello".to_string(),
        }
    }
}

#[derive(Default)]
struct GreeterPlugin {
    config: PluginConfig,
}

impl Plugin for GreeterPlugin {
    fn name(&self) -> &str {
        "greeter"
    }

    fn init(&mut self, ctx: &PluginContext) -> HookResult {
        self.config = ctx.get_config()?;
        Ok(())
    }

    fn register_services(&mut self, ctx: &PluginContext) -> Result<Vec<ServiceEntry>, BoxError> {
        let flaky: FlakyConfig = ctx.service_config("flaky")?;
        Ok(vec![
            ServiceEntry::new(
                "greeter",
                Greeter {
                    greeting: self.config.greeting.clone(),
                    config: ctx.service_config("greeter")?,
                    greeted: 0,
                },
            ),
            ServiceEntry::new(
                "flaky",
                Flaky {
                    remaining_failures: flaky.failures_before_ready,
                },
            ),
            ServiceEntry::new("chat-log", ChatLog),
        ])
    }

    fn ready(&mut self) -> HookResult {
        info!("Greeter plugin ready");
        Ok(())
    }
}

// ============================================================================
// Host side
// ============================================================================

/// Stand-in for an event bus: only logs subscriptions.
#[derive(Default)]
struct TopicBus {
    subscriptions: usize,
}

impl EventBinder for TopicBus {
    fn bind(&mut self, handle: &ServiceHandle, listener: &dyn Listener) -> HookResult {
        for &topic in listener.topics() {
            self.subscriptions += 1;
            info!(service = %handle, topic, total = self.subscriptions, "Subscribed");
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(about = "Walks a plugin through enable, reload and disable")]
struct Args {
    /// Configuration file (defaults to searching tether.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile
    #[arg(short, long)]
    profile: Option<String>,

    /// Override logging.level
    #[arg(long)]
    log_level: Option<String>,

    /// Number of reloads between enable and disable
    #[arg(short, long, default_value_t = 1)]
    reloads: u32,
}

fn print_errors(runtime: &TetherRuntime) {
    let mut errors: Vec<_> = runtime.service_errors().iter().collect();
    errors.sort();
    if errors.is_empty() {
        info!("All services healthy");
    }
    for (handle, message) in errors {
        info!(service = %handle, error = %message, "Service has a recorded error");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = TetherRuntime::builder().binder(TopicBus::default());
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = args.profile {
        builder = builder.profile(profile);
    }
    if let Some(level) = args.log_level {
        builder = builder.set("logging.level", level);
    }
    let mut runtime = builder.build(GreeterPlugin::default())?;

    let report = runtime.enable()?;
    info!(
        services = report.processed().len(),
        failed = report.failed_services().count(),
        "Enabled"
    );
    print_errors(&runtime);

    if let Some(greeter) = runtime.get_service_mut::<Greeter>("greeter") {
        info!("{}", greeter.greet());
    }

    for round in 1..=args.reloads {
        let report = runtime.reload()?;
        info!(round, failed = report.failed_services().count(), "Reloaded");
        print_errors(&runtime);
    }

    if let Some(greeter) = runtime.get_service_mut::<Greeter>("greeter") {
        info!("{}", greeter.greet());
    }

    runtime.disable()?;
    Ok(())
}
