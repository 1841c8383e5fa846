//! Contract the embedded scripting engine must satisfy.
//!
//! The engine is single-threaded and owns one exception slot. Any method that
//! runs guest code may leave that slot set; callers check
//! [`GuestEngine::has_pending_exception`] before doing anything else the guest
//! could observe.

use crate::error::BridgeError;
use crate::value::ScriptValue;

/// One traceback entry, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    pub function: String,
    pub filename: String,
    pub line: u32,
}

/// Exception taken out of the engine's slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RaisedException {
    /// The exception object itself, used for stringification.
    pub value: ScriptValue,
    pub type_name: String,
    /// Module that defines the exception type.
    pub module: Option<String>,
    pub traceback: Vec<TraceFrame>,
}

/// Positional and keyword arguments of one native call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallArgs<'a> {
    pub positional: &'a [ScriptValue],
    pub keywords: &'a [(String, ScriptValue)],
}

impl<'a> CallArgs<'a> {
    pub fn positional(values: &'a [ScriptValue]) -> Self {
        Self {
            positional: values,
            keywords: &[],
        }
    }

    pub fn with_keywords(
        positional: &'a [ScriptValue],
        keywords: &'a [(String, ScriptValue)],
    ) -> Self {
        Self {
            positional,
            keywords,
        }
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Native side of the boundary as seen by the engine: it calls back into this
/// whenever a script invokes one of the exposed routines.
pub trait NativeDispatch {
    /// Runs routine `name`. On failure the exception is raised on `engine`
    /// and [`ScriptValue::None`] is returned.
    fn invoke(
        &mut self,
        engine: &mut dyn GuestEngine,
        name: &str,
        args: CallArgs<'_>,
    ) -> ScriptValue;
}

pub trait GuestEngine {
    /// Creates (or replaces) the module that exposes `routines` to scripts.
    /// Calls to those names are forwarded to the active [`NativeDispatch`].
    fn install_native_module(&mut self, module: &str, routines: &[&'static str]);

    /// Creates a fresh top-level module and makes it current.
    fn start_main_module(&mut self, name: &str);

    /// Executes source text in the current top-level module.
    fn interpret(&mut self, source: &str, filename: &str, natives: &mut dyn NativeDispatch);

    /// Calls a guest callable. Returns [`ScriptValue::None`] when it raised.
    fn call(
        &mut self,
        callee: &ScriptValue,
        args: &[ScriptValue],
        natives: &mut dyn NativeDispatch,
    ) -> ScriptValue;

    /// Looks a name up in the top-level module.
    fn lookup_global(&self, name: &str) -> Option<ScriptValue>;

    fn has_pending_exception(&self) -> bool;

    /// Raises `error` as a guest exception of the matching class.
    fn raise(&mut self, error: &BridgeError);

    /// Removes the pending exception from the slot, if any.
    fn take_exception(&mut self) -> Option<RaisedException>;

    /// Discards any pending exception.
    fn clear_exception(&mut self);

    /// Converts an exception to its message text. Runs guest code, so it may
    /// itself raise; `None` means no usable text was produced.
    fn stringify(
        &mut self,
        exception: &RaisedException,
        natives: &mut dyn NativeDispatch,
    ) -> Option<String>;

    /// Tears down all modules and guest state.
    fn shutdown(&mut self);
}
