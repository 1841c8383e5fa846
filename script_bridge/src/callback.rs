//! Per-cell remap callback invoked from inside a native map draw.

use console_api::{Flip, Host, RemapFn, RemapResult, Rotate};

use crate::dispatch::ApiDispatch;
use crate::engine::GuestEngine;
use crate::error::BridgeError;
use crate::rng::XorShift128;
use crate::value::ScriptValue;

/// Calls a guest callable as `callback(x, y) -> (tile, flip, rotate)` for each
/// map cell.
///
/// Once any invocation leaves an exception pending, every later cell keeps its
/// identity mapping and the callable is not invoked again, so at most one
/// exception is live when the map call returns.
pub struct RemapBridge<'a> {
    engine: &'a mut dyn GuestEngine,
    callback: &'a ScriptValue,
    rng: &'a mut XorShift128,
    invocations: usize,
}

impl<'a> RemapBridge<'a> {
    pub fn new(
        engine: &'a mut dyn GuestEngine,
        callback: &'a ScriptValue,
        rng: &'a mut XorShift128,
    ) -> Self {
        Self {
            engine,
            callback,
            rng,
            invocations: 0,
        }
    }

    /// Number of times the callable has been invoked.
    pub fn invocations(&self) -> usize {
        self.invocations
    }
}

impl RemapFn for RemapBridge<'_> {
    fn remap(&mut self, host: &mut dyn Host, x: i32, y: i32, cell: &mut RemapResult) {
        if self.engine.has_pending_exception() {
            return;
        }

        self.invocations += 1;
        let args = [ScriptValue::from(x), ScriptValue::from(y)];
        let result = {
            let mut natives = ApiDispatch::new(host, &mut *self.rng);
            self.engine.call(self.callback, &args, &mut natives)
        };
        if self.engine.has_pending_exception() {
            return;
        }

        match parse_remap_result(&result) {
            Ok(remapped) => *cell = remapped,
            Err(err) => self.engine.raise(&err),
        }
    }
}

/// Validates a callback result: a tuple of exactly three ints.
pub fn parse_remap_result(value: &ScriptValue) -> Result<RemapResult, BridgeError> {
    let malformed = || {
        BridgeError::Type(format!(
            "expected tuple of int, not {}",
            value.type_name()
        ))
    };
    let items = value.as_tuple().ok_or_else(malformed)?;
    let [index, flip, rotate] = items else {
        return Err(malformed());
    };
    match (index.as_integer(), flip.as_integer(), rotate.as_integer()) {
        (Some(index), Some(flip), Some(rotate)) => Ok(RemapResult {
            index: index as u8,
            flip: Flip::from_code(flip),
            rotate: Rotate::from_code(rotate),
        }),
        _ => Err(malformed()),
    }
}
