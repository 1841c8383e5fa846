//! Boundary between an embedded scripting engine and the fantasy console API.
//!
//! Scripts call console routines through [`ApiDispatch`], which marshals guest
//! values into typed arguments and raises any failure back into the guest.
//! [`ScriptRuntime`] drives the lifecycle hooks and makes sure no guest
//! exception outlives the call that raised it.

pub mod callback;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod marshal;
pub mod outline;
pub mod report;
pub mod rng;
pub mod runtime;
pub mod syntax;
pub mod value;
pub mod variant;

pub use callback::{parse_remap_result, RemapBridge};
pub use config::{config_schema, BridgeConfig, ConfigError, HookNames, BUILTIN_BRIDGE_CONFIG};
pub use dispatch::ApiDispatch;
pub use engine::{CallArgs, GuestEngine, NativeDispatch, RaisedException, TraceFrame};
pub use error::{BridgeError, ErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use marshal::{marshal, Arg, Marshaled};
pub use outline::{extract_outline, extract_outline_with, OutlineItem, OutlineKind};
pub use report::{drain_exception, render_report};
pub use rng::XorShift128;
pub use runtime::{Hook, RuntimePhase, ScriptRuntime};
pub use syntax::{SyntaxConfig, KEYWORDS};
pub use value::{CallableRef, InstanceRef, ScriptValue};
pub use variant::{unpack_color_key, unpack_volume};
