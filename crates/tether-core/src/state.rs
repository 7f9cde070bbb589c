//! Lifecycle state machine.

use std::fmt;

/// Lifecycle state of a supervisor.
///
/// ```text
/// Uninitialized ──enable()──► Initializing ──► Loading ──► Ready
///                                  │              │          │
///                                  └──────────────┴─disable()┴──► Unloading ──► Unloaded
///                                                                                  │
///                      Initializing ◄──────────────enable()────────────────────────┘
/// ```
///
/// A failed `enable()` leaves the state at the step that failed
/// (`Initializing` or `Loading`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Nothing has run yet.
    #[default]
    Uninitialized,
    /// Plugin `init`, the service factory and service `init` hooks are running.
    Initializing,
    /// Plugin `load` and service `load` hooks are running.
    Loading,
    /// Enabled; services are loaded (possibly some of them with errors).
    Ready,
    /// Service and plugin `unload` hooks are running.
    Unloading,
    /// Disabled; the registry has been torn down.
    Unloaded,
}

impl LifecycleState {
    /// Returns the lowercase name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Unloading => "unloading",
            Self::Unloaded => "unloaded",
        }
    }

    /// Whether `enable()` may start from this state.
    pub fn can_enable(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Unloaded)
    }

    /// Whether `disable()` may start from this state.
    ///
    /// Includes the states an aborted `enable()` leaves behind, so whatever was
    /// registered before the failure still gets unloaded.
    pub fn can_disable(self) -> bool {
        matches!(self, Self::Initializing | Self::Loading | Self::Ready)
    }

    /// Whether `reload()` may start from this state.
    pub fn can_reload(self) -> bool {
        self == Self::Ready
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lifecycle step a hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    Load,
    Ready,
    Unload,
}

impl Stage {
    /// Returns the lowercase name of the stage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Load => "load",
            Self::Ready => "ready",
            Self::Unload => "unload",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
