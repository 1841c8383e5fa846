//! Lifecycle entry points the host drives: initialize, per-frame hooks, eval
//! and shutdown.

use console_api::{api_registry, ErrorSink, Host};
use tracing::{debug, info};

use crate::config::{BridgeConfig, HookNames};
use crate::dispatch::ApiDispatch;
use crate::engine::GuestEngine;
use crate::outline::{extract_outline_with, OutlineItem};
use crate::report::drain_exception;
use crate::rng::XorShift128;
use crate::value::ScriptValue;

/// Script-defined functions the host calls at fixed moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Boot,
    Tick,
    Scanline,
    Border,
    Menu,
}

impl Hook {
    pub const ALL: [Hook; 5] = [Hook::Boot, Hook::Tick, Hook::Scanline, Hook::Border, Hook::Menu];

    /// Global name the hook resolves to.
    pub fn global_name(self, names: &HookNames) -> &str {
        match self {
            Hook::Boot => &names.boot,
            Hook::Tick => &names.tick,
            Hook::Scanline => &names.scanline,
            Hook::Border => &names.border,
            Hook::Menu => &names.menu,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Hook::Boot => "boot",
            Hook::Tick => "tick",
            Hook::Scanline => "scanline",
            Hook::Border => "border",
            Hook::Menu => "menu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimePhase {
    /// No script loaded.
    Idle,
    /// Script loaded without error; hooks run.
    Ready,
    /// Loading raised. Hooks are skipped but `evaluate` still works.
    Failed,
}

/// Owns one guest engine and the host it drives.
///
/// Every operation that runs guest code drains the engine's exception slot
/// before returning, sending any report to [`ErrorSink::report`].
pub struct ScriptRuntime<E: GuestEngine, H: Host> {
    engine: E,
    host: H,
    config: BridgeConfig,
    rng: XorShift128,
    phase: RuntimePhase,
}

impl<E: GuestEngine, H: Host> ScriptRuntime<E, H> {
    pub fn new(engine: E, host: H) -> Self {
        Self::with_config(engine, host, BridgeConfig::builtin())
    }

    pub fn with_config(engine: E, host: H, config: BridgeConfig) -> Self {
        let rng = XorShift128::new(config.rng_seed);
        Self {
            engine,
            host,
            config,
            rng,
            phase: RuntimePhase::Idle,
        }
    }

    /// Loads `source` as the top-level module. Returns false when loading
    /// raised; the exception has already been reported.
    pub fn initialize(&mut self, source: &str) -> bool {
        if self.phase != RuntimePhase::Idle {
            self.shutdown();
        }

        self.rng.reseed(self.config.rng_seed);
        let mut routines = api_registry().names();
        routines.sort_unstable();
        self.engine
            .install_native_module(&self.config.api_module, &routines);
        self.engine.start_main_module(&self.config.main_module);

        {
            let mut natives = ApiDispatch::new(&mut self.host, &mut self.rng);
            self.engine
                .interpret(source, &self.config.main_module, &mut natives);
        }
        let loaded = !self.engine.has_pending_exception();
        self.drain();

        self.phase = if loaded {
            RuntimePhase::Ready
        } else {
            RuntimePhase::Failed
        };
        info!(
            module = %self.config.main_module,
            routines = routines.len(),
            loaded,
            "script initialized"
        );
        loaded
    }

    pub fn boot(&mut self) {
        self.run_hook(Hook::Boot, &[]);
    }

    pub fn tick(&mut self) {
        self.run_hook(Hook::Tick, &[]);
    }

    pub fn scanline(&mut self, row: i32) {
        self.run_hook(Hook::Scanline, &[ScriptValue::from(row)]);
    }

    pub fn border(&mut self, row: i32) {
        self.run_hook(Hook::Border, &[ScriptValue::from(row)]);
    }

    pub fn menu(&mut self, index: i32) {
        self.run_hook(Hook::Menu, &[ScriptValue::from(index)]);
    }

    /// Runs ad-hoc source in the top-level module, for consoles and REPLs.
    pub fn evaluate(&mut self, source: &str) {
        if self.phase == RuntimePhase::Idle {
            debug!("evaluate skipped: no script loaded");
            return;
        }
        {
            let mut natives = ApiDispatch::new(&mut self.host, &mut self.rng);
            self.engine
                .interpret(source, &self.config.main_module, &mut natives);
        }
        self.drain();
    }

    /// Names of every `def` and `class` in `source`, lexed with the configured
    /// syntax. Does not touch the engine.
    pub fn outline(&self, source: &str) -> Vec<OutlineItem> {
        extract_outline_with(source, &self.config.syntax)
    }

    pub fn shutdown(&mut self) {
        if self.phase == RuntimePhase::Idle {
            return;
        }
        self.engine.shutdown();
        self.phase = RuntimePhase::Idle;
        info!("script runtime shut down");
    }

    /// Whether `hook` currently resolves to a global in the loaded script.
    pub fn has_hook(&self, hook: Hook) -> bool {
        self.phase == RuntimePhase::Ready
            && self
                .engine
                .lookup_global(hook.global_name(&self.config.hooks))
                .is_some()
    }

    pub fn phase(&self) -> RuntimePhase {
        self.phase
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn run_hook(&mut self, hook: Hook, args: &[ScriptValue]) {
        if self.phase != RuntimePhase::Ready {
            debug!(hook = hook.label(), phase = ?self.phase, "hook skipped");
            return;
        }
        let name = hook.global_name(&self.config.hooks);
        let Some(callee) = self.engine.lookup_global(name) else {
            debug!(hook = hook.label(), global = name, "hook not defined");
            return;
        };

        {
            let mut natives = ApiDispatch::new(&mut self.host, &mut self.rng);
            self.engine.call(&callee, args, &mut natives);
        }
        self.drain();
    }

    /// Reports and clears any pending guest exception.
    fn drain(&mut self) {
        let report = {
            let mut natives = ApiDispatch::new(&mut self.host, &mut self.rng);
            drain_exception(
                &mut self.engine,
                &mut natives,
                &self.config.builtins_module,
            )
        };
        if let Some(report) = report {
            self.host.report(&report);
        }
    }
}

impl<E: GuestEngine, H: Host> Drop for ScriptRuntime<E, H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
