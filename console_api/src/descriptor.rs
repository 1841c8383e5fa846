//! Native call descriptors for every routine the console exposes to scripts.
//!
//! The table below is the compatibility surface existing cartridges are written
//! against: routine names, parameter order, parameter names (usable as keyword
//! arguments) and optional defaults must not change.

use serde::Serialize;
use std::fmt::Write as _;

use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Value shape a single parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Signed 32-bit integer.
    Int,
    /// Unsigned 32-bit mask.
    UInt,
    Float,
    /// Any value, interpreted by truthiness.
    Bool,
    /// Integer in `0..=255`.
    Byte,
    Str,
    /// Any value; interpretation is deferred to the routine.
    Variant,
}

impl ParamKind {
    /// Name used in type errors ("expected int ...").
    pub fn expected_name(&self) -> &'static str {
        match self {
            ParamKind::Int | ParamKind::UInt => "int",
            ParamKind::Float => "float",
            ParamKind::Bool => "bool",
            ParamKind::Byte => "byte",
            ParamKind::Str => "str",
            ParamKind::Variant => "object",
        }
    }
}

/// Default applied when an optional parameter is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    None,
    Int(i32),
    Float(f32),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Required,
    Default(DefaultValue),
    /// Optional without a default: the routine observes whether the caller
    /// supplied the argument at all.
    Presence,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub requirement: Requirement,
}

impl ParamSpec {
    pub fn is_required(&self) -> bool {
        matches!(self.requirement, Requirement::Required)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    None,
    Int,
    Float,
    Bool,
    Tuple,
}

/// Identifies the native behaviour behind a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routine {
    Print,
    Cls,
    Pix,
    Line,
    Rect,
    Rectb,
    Spr,
    Btn,
    Btnp,
    Sfx,
    Map,
    Mget,
    Mset,
    Peek,
    Poke,
    Peek1,
    Peek2,
    Peek4,
    Poke1,
    Poke2,
    Poke4,
    Memcpy,
    Memset,
    Trace,
    Pmem,
    Time,
    Tstamp,
    Exit,
    Font,
    Mouse,
    Circ,
    Circb,
    Elli,
    Ellib,
    Tri,
    Trib,
    Ttri,
    Clip,
    Music,
    Sync,
    Vbank,
    Reset,
    Key,
    Keyp,
    Fget,
    Fset,
    Random,
}

/// Immutable description of one exposed routine.
#[derive(Debug, Serialize)]
pub struct NativeCallDescriptor {
    pub name: &'static str,
    #[serde(skip)]
    pub routine: Routine,
    pub params: &'static [ParamSpec],
    pub returns: ReturnKind,
    pub doc: &'static str,
}

impl NativeCallDescriptor {
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|param| param.name == name)
    }

    /// Number of leading parameters that must be supplied.
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|param| param.is_required()).count()
    }

    /// Renders the call signature, e.g. `btnp(id, hold=-1, period=-1)`.
    pub fn signature(&self) -> String {
        let mut out = format!("{}(", self.name);
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            out.push_str(param.name);
            match param.requirement {
                Requirement::Required => {}
                Requirement::Presence => out.push_str("=?"),
                Requirement::Default(DefaultValue::None) => out.push_str("=None"),
                Requirement::Default(DefaultValue::Int(value)) => {
                    let _ = write!(out, "={value}");
                }
                Requirement::Default(DefaultValue::Float(value)) => {
                    let _ = write!(out, "={value:?}");
                }
                Requirement::Default(DefaultValue::Bool(value)) => {
                    out.push_str(if value { "=True" } else { "=False" });
                }
            }
        }
        out.push(')');
        out
    }
}

const fn param(name: &'static str, kind: ParamKind, requirement: Requirement) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        requirement,
    }
}

const fn int(name: &'static str) -> ParamSpec {
    param(name, ParamKind::Int, Requirement::Required)
}

const fn int_or(name: &'static str, value: i32) -> ParamSpec {
    param(
        name,
        ParamKind::Int,
        Requirement::Default(DefaultValue::Int(value)),
    )
}

const fn int_presence(name: &'static str) -> ParamSpec {
    param(name, ParamKind::Int, Requirement::Presence)
}

const fn mask_or(name: &'static str, value: i32) -> ParamSpec {
    param(
        name,
        ParamKind::UInt,
        Requirement::Default(DefaultValue::Int(value)),
    )
}

const fn float(name: &'static str) -> ParamSpec {
    param(name, ParamKind::Float, Requirement::Required)
}

const fn float_or(name: &'static str, value: f32) -> ParamSpec {
    param(
        name,
        ParamKind::Float,
        Requirement::Default(DefaultValue::Float(value)),
    )
}

const fn flag(name: &'static str) -> ParamSpec {
    param(name, ParamKind::Bool, Requirement::Required)
}

const fn flag_or(name: &'static str, value: bool) -> ParamSpec {
    param(
        name,
        ParamKind::Bool,
        Requirement::Default(DefaultValue::Bool(value)),
    )
}

const fn byte(name: &'static str) -> ParamSpec {
    param(name, ParamKind::Byte, Requirement::Required)
}

const fn text(name: &'static str) -> ParamSpec {
    param(name, ParamKind::Str, Requirement::Required)
}

const fn any_or_none(name: &'static str) -> ParamSpec {
    param(
        name,
        ParamKind::Variant,
        Requirement::Default(DefaultValue::None),
    )
}

const fn any_or_int(name: &'static str, value: i32) -> ParamSpec {
    param(
        name,
        ParamKind::Variant,
        Requirement::Default(DefaultValue::Int(value)),
    )
}

const fn describe(
    name: &'static str,
    routine: Routine,
    params: &'static [ParamSpec],
    returns: ReturnKind,
    doc: &'static str,
) -> NativeCallDescriptor {
    NativeCallDescriptor {
        name,
        routine,
        params,
        returns,
        doc,
    }
}

const API_DESCRIPTORS: &[NativeCallDescriptor] = &[
    describe(
        "print",
        Routine::Print,
        &[
            text("text"),
            int_or("x", 0),
            int_or("y", 0),
            int_or("color", 15),
            flag_or("fixed", false),
            int_or("scale", 1),
            flag_or("alt", false),
        ],
        ReturnKind::Int,
        "Print text with the system font and return its width in pixels.",
    ),
    describe(
        "cls",
        Routine::Cls,
        &[int("color")],
        ReturnKind::None,
        "Clear the screen with a palette color.",
    ),
    describe(
        "pix",
        Routine::Pix,
        &[int("x"), int("y"), int_presence("color")],
        ReturnKind::Int,
        "Read a pixel color, or write it when a color is given.",
    ),
    describe(
        "line",
        Routine::Line,
        &[
            float("x0"),
            float("y0"),
            float("x1"),
            float("y1"),
            int("color"),
        ],
        ReturnKind::None,
        "Draw a straight line.",
    ),
    describe(
        "rect",
        Routine::Rect,
        &[int("x"), int("y"), int("w"), int("h"), int("color")],
        ReturnKind::None,
        "Draw a filled rectangle.",
    ),
    describe(
        "rectb",
        Routine::Rectb,
        &[int("x"), int("y"), int("w"), int("h"), int("color")],
        ReturnKind::None,
        "Draw a rectangle border.",
    ),
    describe(
        "spr",
        Routine::Spr,
        &[
            int("index"),
            int("x"),
            int("y"),
            any_or_none("colorkey"),
            int_or("scale", 1),
            int_or("flip", 0),
            int_or("rotate", 0),
            int_or("w", 1),
            int_or("h", 1),
        ],
        ReturnKind::None,
        "Draw a sprite (or a w*h block of sprites).",
    ),
    describe(
        "btn",
        Routine::Btn,
        &[int("id")],
        ReturnKind::Bool,
        "Whether a gamepad button is held.",
    ),
    describe(
        "btnp",
        Routine::Btnp,
        &[int("id"), int_or("hold", -1), int_or("period", -1)],
        ReturnKind::Bool,
        "Whether a gamepad button was just pressed, with optional auto-repeat.",
    ),
    describe(
        "sfx",
        Routine::Sfx,
        &[
            int("id"),
            any_or_int("note", -1),
            int_or("duration", -1),
            int_or("channel", 0),
            any_or_int("volume", 15),
            int_or("speed", 0),
        ],
        ReturnKind::None,
        "Play a sound effect on a channel.",
    ),
    describe(
        "map",
        Routine::Map,
        &[
            int_or("x", 0),
            int_or("y", 0),
            int_or("w", 30),
            int_or("h", 17),
            int_or("sx", 0),
            int_or("sy", 0),
            any_or_none("colorkey"),
            int_or("scale", 1),
            any_or_none("remap"),
        ],
        ReturnKind::None,
        "Draw a region of the map, optionally remapping each cell.",
    ),
    describe(
        "mget",
        Routine::Mget,
        &[int("x"), int("y")],
        ReturnKind::Int,
        "Read the tile at a map cell.",
    ),
    describe(
        "mset",
        Routine::Mset,
        &[int("x"), int("y"), int("tile_id")],
        ReturnKind::None,
        "Write the tile at a map cell.",
    ),
    describe(
        "peek",
        Routine::Peek,
        &[int("addr"), int_or("bits", 8)],
        ReturnKind::Int,
        "Read RAM at the given bit width.",
    ),
    describe(
        "poke",
        Routine::Poke,
        &[int("addr"), int("value"), int_or("bits", 8)],
        ReturnKind::None,
        "Write RAM at the given bit width.",
    ),
    describe(
        "peek1",
        Routine::Peek1,
        &[int("addr")],
        ReturnKind::Int,
        "Read one bit of RAM.",
    ),
    describe(
        "peek2",
        Routine::Peek2,
        &[int("addr")],
        ReturnKind::Int,
        "Read two bits of RAM.",
    ),
    describe(
        "peek4",
        Routine::Peek4,
        &[int("addr")],
        ReturnKind::Int,
        "Read a nibble of RAM.",
    ),
    describe(
        "poke1",
        Routine::Poke1,
        &[int("addr"), int("value")],
        ReturnKind::None,
        "Write one bit of RAM.",
    ),
    describe(
        "poke2",
        Routine::Poke2,
        &[int("addr"), int("value")],
        ReturnKind::None,
        "Write two bits of RAM.",
    ),
    describe(
        "poke4",
        Routine::Poke4,
        &[int("addr"), int("value")],
        ReturnKind::None,
        "Write a nibble of RAM.",
    ),
    describe(
        "memcpy",
        Routine::Memcpy,
        &[int("dest"), int("source"), int("size")],
        ReturnKind::None,
        "Copy a block of RAM.",
    ),
    describe(
        "memset",
        Routine::Memset,
        &[int("dest"), int("value"), int("size")],
        ReturnKind::None,
        "Fill a block of RAM with a byte.",
    ),
    describe(
        "trace",
        Routine::Trace,
        &[text("message"), int_or("color", 15)],
        ReturnKind::None,
        "Write a message to the console.",
    ),
    describe(
        "pmem",
        Routine::Pmem,
        &[int("index"), int_presence("value")],
        ReturnKind::Int,
        "Read persistent memory, or write it when a value is given.",
    ),
    describe(
        "time",
        Routine::Time,
        &[],
        ReturnKind::Float,
        "Milliseconds elapsed since the cartridge started.",
    ),
    describe(
        "tstamp",
        Routine::Tstamp,
        &[],
        ReturnKind::Int,
        "Current Unix timestamp in seconds.",
    ),
    describe(
        "exit",
        Routine::Exit,
        &[],
        ReturnKind::None,
        "Leave the cartridge after the current frame.",
    ),
    describe(
        "font",
        Routine::Font,
        &[
            text("text"),
            int("x"),
            int("y"),
            byte("chromakey"),
            int("char_width"),
            int("char_height"),
            flag_or("fixed", false),
            int_or("scale", 1),
            flag_or("alt", false),
        ],
        ReturnKind::Int,
        "Print text using sprites as a font and return its width.",
    ),
    describe(
        "mouse",
        Routine::Mouse,
        &[],
        ReturnKind::Tuple,
        "Mouse state as (x, y, left, right, middle, scrollx, scrolly).",
    ),
    describe(
        "circ",
        Routine::Circ,
        &[int("x"), int("y"), int("radius"), int("color")],
        ReturnKind::None,
        "Draw a filled circle.",
    ),
    describe(
        "circb",
        Routine::Circb,
        &[int("x"), int("y"), int("radius"), int("color")],
        ReturnKind::None,
        "Draw a circle border.",
    ),
    describe(
        "elli",
        Routine::Elli,
        &[int("x"), int("y"), int("a"), int("b"), int("color")],
        ReturnKind::None,
        "Draw a filled ellipse.",
    ),
    describe(
        "ellib",
        Routine::Ellib,
        &[int("x"), int("y"), int("a"), int("b"), int("color")],
        ReturnKind::None,
        "Draw an ellipse border.",
    ),
    describe(
        "tri",
        Routine::Tri,
        &[
            float("x1"),
            float("y1"),
            float("x2"),
            float("y2"),
            float("x3"),
            float("y3"),
            int("color"),
        ],
        ReturnKind::None,
        "Draw a filled triangle.",
    ),
    describe(
        "trib",
        Routine::Trib,
        &[
            float("x1"),
            float("y1"),
            float("x2"),
            float("y2"),
            float("x3"),
            float("y3"),
            int("color"),
        ],
        ReturnKind::None,
        "Draw a triangle border.",
    ),
    describe(
        "ttri",
        Routine::Ttri,
        &[
            float("x1"),
            float("y1"),
            float("x2"),
            float("y2"),
            float("x3"),
            float("y3"),
            float("u1"),
            float("v1"),
            float("u2"),
            float("v2"),
            float("u3"),
            float("v3"),
            int_or("textsrc", 0),
            any_or_none("chromakey"),
            float_or("z1", 0.0),
            float_or("z2", 0.0),
            float_or("z3", 0.0),
        ],
        ReturnKind::None,
        "Draw a textured triangle, perspective-correct when depths are given.",
    ),
    describe(
        "clip",
        Routine::Clip,
        &[
            int_or("x", 0),
            int_or("y", 0),
            int_or("width", SCREEN_WIDTH),
            int_or("height", SCREEN_HEIGHT),
        ],
        ReturnKind::None,
        "Restrict drawing to a rectangle; no arguments resets it.",
    ),
    describe(
        "music",
        Routine::Music,
        &[
            int_or("track", -1),
            int_or("frame", -1),
            int_or("row", -1),
            flag_or("loop", true),
            flag_or("sustain", true),
            int_or("tempo", -1),
            int_or("speed", -1),
        ],
        ReturnKind::None,
        "Start a music track, or stop playback with no track.",
    ),
    describe(
        "sync",
        Routine::Sync,
        &[mask_or("mask", 0), int_or("bank", 0), flag_or("tocart", false)],
        ReturnKind::None,
        "Copy cartridge sections between banks and RAM.",
    ),
    describe(
        "vbank",
        Routine::Vbank,
        &[int_presence("bank")],
        ReturnKind::Int,
        "Return the active VRAM bank, switching when a bank is given.",
    ),
    describe(
        "reset",
        Routine::Reset,
        &[],
        ReturnKind::None,
        "Restart the cartridge.",
    ),
    describe(
        "key",
        Routine::Key,
        &[int_or("code", -1)],
        ReturnKind::Bool,
        "Whether a keyboard key is held (any key when omitted).",
    ),
    describe(
        "keyp",
        Routine::Keyp,
        &[int_or("code", -1), int_or("hold", -1), int_or("period", -1)],
        ReturnKind::Bool,
        "Whether a keyboard key was just pressed, with optional auto-repeat.",
    ),
    describe(
        "fget",
        Routine::Fget,
        &[int("sprite_id"), byte("flag")],
        ReturnKind::Bool,
        "Read a sprite flag.",
    ),
    describe(
        "fset",
        Routine::Fset,
        &[int("sprite_id"), byte("flag"), flag("bool")],
        ReturnKind::None,
        "Write a sprite flag.",
    ),
    describe(
        "random",
        Routine::Random,
        &[],
        ReturnKind::Float,
        "Uniform pseudo-random float in [0, 1).",
    ),
];

/// Static registry of every exposed routine.
pub struct ApiRegistry {
    descriptors: &'static [NativeCallDescriptor],
}

impl ApiRegistry {
    pub fn descriptors(&self) -> &'static [NativeCallDescriptor] {
        self.descriptors
    }

    /// Finds a descriptor by routine name.
    pub fn get(&self, name: &str) -> Option<&'static NativeCallDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.name)
            .collect()
    }
}

const REGISTRY: ApiRegistry = ApiRegistry {
    descriptors: API_DESCRIPTORS,
};

/// Returns the global routine registry.
pub const fn api_registry() -> &'static ApiRegistry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn routine_names_are_unique() {
        let mut seen = HashSet::new();
        for descriptor in api_registry().descriptors() {
            assert!(
                seen.insert(descriptor.name),
                "duplicate routine name detected: {}",
                descriptor.name
            );
        }
    }

    #[test]
    fn routines_map_to_distinct_behaviour() {
        let mut seen = HashSet::new();
        for descriptor in api_registry().descriptors() {
            assert!(seen.insert(descriptor.routine), "{}", descriptor.name);
        }
        assert_eq!(seen.len(), 47);
    }

    #[test]
    fn required_parameters_precede_optional_ones() {
        for descriptor in api_registry().descriptors() {
            let required = descriptor.required_count();
            assert!(
                descriptor.params[..required]
                    .iter()
                    .all(ParamSpec::is_required),
                "{} mixes required and optional parameters",
                descriptor.name
            );
        }
    }

    #[test]
    fn parameter_names_are_unique_per_routine() {
        for descriptor in api_registry().descriptors() {
            let mut seen = HashSet::new();
            for param in descriptor.params {
                assert!(seen.insert(param.name), "{}.{}", descriptor.name, param.name);
            }
        }
    }

    #[test]
    fn signature_lists_defaults() {
        let btnp = api_registry().get("btnp").expect("btnp registered");
        assert_eq!(btnp.signature(), "btnp(id, hold=-1, period=-1)");

        let pix = api_registry().get("pix").expect("pix registered");
        assert_eq!(pix.signature(), "pix(x, y, color=?)");

        let music = api_registry().get("music").expect("music registered");
        assert!(music.signature().contains("loop=True"));
    }

    #[test]
    fn descriptors_serialize_without_routine_tag() {
        let cls = api_registry().get("cls").expect("cls registered");
        let json = serde_json::to_value(cls).expect("descriptor serializes");
        assert_eq!(json["name"], "cls");
        assert_eq!(json["params"][0]["kind"], "int");
        assert_eq!(json["params"][0]["requirement"], "required");
        assert!(json.get("routine").is_none());
    }
}
