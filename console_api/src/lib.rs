//! Native-side contract of the fantasy console scripting boundary.
//!
//! Holds the routine descriptor table scripts are written against, the
//! [`Host`] trait an embedding console implements, and the fixed-shape native
//! argument structures the bridge produces.

pub mod descriptor;
pub mod host;
pub mod note;
pub mod types;

pub use descriptor::{
    api_registry, ApiRegistry, DefaultValue, NativeCallDescriptor, ParamKind, ParamSpec,
    Requirement, ReturnKind, Routine,
};
pub use host::{ErrorSink, Host, RemapFn};
pub use note::{parse_note, split_note, NOTES_PER_OCTAVE};
pub use types::{
    ColorKeySet, Flip, FontStyle, MapRegion, MouseState, MusicRequest, RemapResult, Rotate,
    SfxRequest, SpriteBlit, TextStyle, TexturedTriangle, Triangle, VolumePair,
};

/// Number of palette entries; also the color-key capacity.
pub const PALETTE_SIZE: usize = 16;
/// Number of sound channels addressable by `sfx`.
pub const SOUND_CHANNELS: i32 = 4;
pub const SCREEN_WIDTH: i32 = 240;
pub const SCREEN_HEIGHT: i32 = 136;
