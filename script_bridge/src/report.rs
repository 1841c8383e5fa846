//! Drains pending guest exceptions into host-readable reports.

use std::fmt::Write as _;

use tracing::warn;

use crate::engine::{GuestEngine, NativeDispatch, RaisedException};

/// Renders an exception as a multi-line report:
///
/// ```text
///
/// Traceback (most recent call last):
///   File "<main>", line 3, in TIC
/// ValueError: invalid channel
/// ```
///
/// The leading blank line is part of the format. `builtins_module` names the
/// implicit module left out of the type name.
pub fn render_report(
    exception: &RaisedException,
    message: Option<&str>,
    builtins_module: &str,
) -> String {
    let mut report = String::from("\n");

    if !exception.traceback.is_empty() {
        report.push_str("Traceback (most recent call last):\n");
        for frame in &exception.traceback {
            let _ = writeln!(
                report,
                "  File \"{}\", line {}, in {}",
                frame.filename, frame.line, frame.function
            );
        }
    }

    if let Some(module) = exception
        .module
        .as_deref()
        .filter(|module| *module != builtins_module)
    {
        report.push_str(module);
        report.push('.');
    }
    report.push_str(&exception.type_name);

    match message.filter(|text| !text.is_empty()) {
        Some(text) => {
            let _ = writeln!(report, ": {text}");
        }
        None => report.push('\n'),
    }
    report
}

/// Takes the pending exception out of `engine`, renders it and leaves the
/// engine clear. Returns `None` when nothing was pending.
///
/// Stringifying the exception runs guest code; if that raises, the report
/// falls back to the bare type name and the secondary exception is dropped.
pub fn drain_exception(
    engine: &mut dyn GuestEngine,
    natives: &mut dyn NativeDispatch,
    builtins_module: &str,
) -> Option<String> {
    let exception = engine.take_exception()?;

    let message = engine.stringify(&exception, natives);
    if engine.has_pending_exception() {
        engine.clear_exception();
    }

    warn!(
        exception = %exception.type_name,
        frames = exception.traceback.len(),
        "script raised an unhandled exception"
    );
    Some(render_report(&exception, message.as_deref(), builtins_module))
}
