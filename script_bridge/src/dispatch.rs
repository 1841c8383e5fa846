//! Routes native calls from scripts to the [`Host`].

use console_api::{
    api_registry, parse_note, split_note, ColorKeySet, Flip, FontStyle, Host, MapRegion,
    MusicRequest, RemapFn, Rotate, Routine, SfxRequest, SpriteBlit, TextStyle, TexturedTriangle,
    Triangle, SOUND_CHANNELS,
};
use tracing::trace;

use crate::callback::RemapBridge;
use crate::engine::{CallArgs, GuestEngine, NativeDispatch};
use crate::error::BridgeError;
use crate::marshal::{marshal, Marshaled};
use crate::rng::XorShift128;
use crate::value::ScriptValue;
use crate::variant::{unpack_color_key, unpack_volume};

/// Dispatches one native call at a time against a borrowed host.
///
/// Created fresh for every guest entry point; nested guest calls made from a
/// routine (the map remap callback) get their own short-lived dispatcher over
/// the same host.
pub struct ApiDispatch<'a> {
    host: &'a mut dyn Host,
    rng: &'a mut XorShift128,
}

impl<'a> ApiDispatch<'a> {
    pub fn new(host: &'a mut dyn Host, rng: &'a mut XorShift128) -> Self {
        Self { host, rng }
    }

    fn call_routine(
        &mut self,
        engine: &mut dyn GuestEngine,
        args: &Marshaled,
    ) -> Result<ScriptValue, BridgeError> {
        let host = &mut *self.host;
        let value = match args.descriptor().routine {
            Routine::Print => {
                let style = TextStyle {
                    x: args.int("x")?,
                    y: args.int("y")?,
                    color: args.int("color")?,
                    fixed: args.flag("fixed")?,
                    scale: args.int("scale")?,
                    alt: args.flag("alt")?,
                };
                ScriptValue::from(host.print(args.text("text")?, style))
            }
            Routine::Cls => {
                host.cls(args.int("color")?);
                ScriptValue::None
            }
            Routine::Pix => {
                ScriptValue::from(host.pix(args.int("x")?, args.int("y")?, args.presence("color")?))
            }
            Routine::Line => {
                host.line(
                    args.float("x0")?,
                    args.float("y0")?,
                    args.float("x1")?,
                    args.float("y1")?,
                    args.int("color")?,
                );
                ScriptValue::None
            }
            Routine::Rect | Routine::Rectb => {
                let (x, y, w, h, color) = (
                    args.int("x")?,
                    args.int("y")?,
                    args.int("w")?,
                    args.int("h")?,
                    args.int("color")?,
                );
                if args.descriptor().routine == Routine::Rect {
                    host.rect(x, y, w, h, color);
                } else {
                    host.rectb(x, y, w, h, color);
                }
                ScriptValue::None
            }
            Routine::Spr => {
                let colorkey = unpack_color_key(args.value("colorkey")?)?;
                let blit = SpriteBlit {
                    index: args.int("index")?,
                    x: args.int("x")?,
                    y: args.int("y")?,
                    w: args.int("w")?,
                    h: args.int("h")?,
                    scale: args.int("scale")?,
                    flip: Flip::from_code(i64::from(args.int("flip")?)),
                    rotate: Rotate::from_code(i64::from(args.int("rotate")?)),
                };
                host.spr(blit, &colorkey);
                ScriptValue::None
            }
            Routine::Btn => ScriptValue::from(host.btn(args.int("id")?)),
            Routine::Btnp => ScriptValue::from(host.btnp(
                args.int("id")?,
                args.int("hold")?,
                args.int("period")?,
            )),
            Routine::Sfx => {
                host.sfx(sfx_request(args)?);
                ScriptValue::None
            }
            Routine::Map => {
                let region = MapRegion {
                    x: args.int("x")?,
                    y: args.int("y")?,
                    w: args.int("w")?,
                    h: args.int("h")?,
                    sx: args.int("sx")?,
                    sy: args.int("sy")?,
                    scale: args.int("scale")?,
                };
                let colorkey = unpack_color_key(args.value("colorkey")?)?;
                let remap = args.value("remap")?;
                if remap.is_none() {
                    host.map(region, &colorkey, None);
                } else {
                    let mut bridge = RemapBridge::new(engine, remap, &mut *self.rng);
                    let remap_fn: &mut dyn RemapFn = &mut bridge;
                    host.map(region, &colorkey, Some(remap_fn));
                    trace!(invocations = bridge.invocations(), "map remap finished");
                }
                ScriptValue::None
            }
            Routine::Mget => ScriptValue::from(host.mget(args.int("x")?, args.int("y")?)),
            Routine::Mset => {
                host.mset(args.int("x")?, args.int("y")?, args.int("tile_id")?);
                ScriptValue::None
            }
            Routine::Peek => ScriptValue::from(host.peek(args.int("addr")?, args.int("bits")?)),
            Routine::Peek1 => ScriptValue::from(host.peek(args.int("addr")?, 1)),
            Routine::Peek2 => ScriptValue::from(host.peek(args.int("addr")?, 2)),
            Routine::Peek4 => ScriptValue::from(host.peek(args.int("addr")?, 4)),
            Routine::Poke => {
                host.poke(args.int("addr")?, args.int("value")?, args.int("bits")?);
                ScriptValue::None
            }
            Routine::Poke1 | Routine::Poke2 | Routine::Poke4 => {
                let bits = match args.descriptor().routine {
                    Routine::Poke1 => 1,
                    Routine::Poke2 => 2,
                    _ => 4,
                };
                host.poke(args.int("addr")?, args.int("value")?, bits);
                ScriptValue::None
            }
            Routine::Memcpy => {
                host.memcpy(args.int("dest")?, args.int("source")?, args.int("size")?);
                ScriptValue::None
            }
            Routine::Memset => {
                host.memset(args.int("dest")?, args.int("value")?, args.int("size")?);
                ScriptValue::None
            }
            Routine::Trace => {
                host.trace(args.text("message")?, args.int("color")?);
                ScriptValue::None
            }
            Routine::Pmem => {
                ScriptValue::from(host.pmem(args.int("index")?, args.presence("value")?))
            }
            Routine::Time => ScriptValue::from(host.time()),
            Routine::Tstamp => ScriptValue::from(host.tstamp()),
            Routine::Exit => {
                host.exit();
                ScriptValue::None
            }
            Routine::Font => {
                let scale = args.int("scale")?;
                if scale == 0 {
                    return Ok(ScriptValue::Int(0));
                }
                let style = FontStyle {
                    x: args.int("x")?,
                    y: args.int("y")?,
                    char_width: args.int("char_width")?,
                    char_height: args.int("char_height")?,
                    fixed: args.flag("fixed")?,
                    scale,
                    alt: args.flag("alt")?,
                };
                let colorkey = ColorKeySet::single(args.byte("chromakey")?);
                ScriptValue::from(host.font(args.text("text")?, style, &colorkey))
            }
            Routine::Mouse => {
                let mouse = host.mouse();
                ScriptValue::Tuple(vec![
                    ScriptValue::from(mouse.x),
                    ScriptValue::from(mouse.y),
                    ScriptValue::from(mouse.left),
                    ScriptValue::from(mouse.right),
                    ScriptValue::from(mouse.middle),
                    ScriptValue::from(mouse.scroll_x),
                    ScriptValue::from(mouse.scroll_y),
                ])
            }
            Routine::Circ => {
                host.circ(
                    args.int("x")?,
                    args.int("y")?,
                    args.int("radius")?,
                    args.int("color")?,
                );
                ScriptValue::None
            }
            Routine::Circb => {
                host.circb(
                    args.int("x")?,
                    args.int("y")?,
                    args.int("radius")?,
                    args.int("color")?,
                );
                ScriptValue::None
            }
            Routine::Elli => {
                host.elli(
                    args.int("x")?,
                    args.int("y")?,
                    args.int("a")?,
                    args.int("b")?,
                    args.int("color")?,
                );
                ScriptValue::None
            }
            Routine::Ellib => {
                host.ellib(
                    args.int("x")?,
                    args.int("y")?,
                    args.int("a")?,
                    args.int("b")?,
                    args.int("color")?,
                );
                ScriptValue::None
            }
            Routine::Tri => {
                host.tri(triangle(args)?, args.int("color")?);
                ScriptValue::None
            }
            Routine::Trib => {
                host.trib(triangle(args)?, args.int("color")?);
                ScriptValue::None
            }
            Routine::Ttri => {
                let colorkey = unpack_color_key(args.value("chromakey")?)?;
                let depth = [args.float("z1")?, args.float("z2")?, args.float("z3")?];
                let textured = TexturedTriangle {
                    points: triangle(args)?.points,
                    uvs: [
                        (args.float("u1")?, args.float("v1")?),
                        (args.float("u2")?, args.float("v2")?),
                        (args.float("u3")?, args.float("v3")?),
                    ],
                    texture_source: args.int("textsrc")?,
                    depth: depth.iter().any(|z| *z != 0.0).then_some(depth),
                };
                host.ttri(textured, &colorkey);
                ScriptValue::None
            }
            Routine::Clip => {
                host.clip(
                    args.int("x")?,
                    args.int("y")?,
                    args.int("width")?,
                    args.int("height")?,
                );
                ScriptValue::None
            }
            Routine::Music => {
                host.music(MusicRequest {
                    track: args.int("track")?,
                    frame: args.int("frame")?,
                    row: args.int("row")?,
                    looped: args.flag("loop")?,
                    sustain: args.flag("sustain")?,
                    tempo: args.int("tempo")?,
                    speed: args.int("speed")?,
                });
                ScriptValue::None
            }
            Routine::Sync => {
                host.sync(args.uint("mask")?, args.int("bank")?, args.flag("tocart")?);
                ScriptValue::None
            }
            Routine::Vbank => ScriptValue::from(host.vbank(args.presence("bank")?)),
            Routine::Reset => {
                host.reset();
                ScriptValue::None
            }
            Routine::Key => ScriptValue::from(host.key(args.int("code")?)),
            Routine::Keyp => ScriptValue::from(host.keyp(
                args.int("code")?,
                args.int("hold")?,
                args.int("period")?,
            )),
            Routine::Fget => {
                ScriptValue::from(host.fget(args.int("sprite_id")?, args.byte("flag")?))
            }
            Routine::Fset => {
                host.fset(
                    args.int("sprite_id")?,
                    args.byte("flag")?,
                    args.flag("bool")?,
                );
                ScriptValue::None
            }
            Routine::Random => ScriptValue::from(self.rng.next_f64()),
        };
        Ok(value)
    }
}

impl NativeDispatch for ApiDispatch<'_> {
    fn invoke(
        &mut self,
        engine: &mut dyn GuestEngine,
        name: &str,
        args: CallArgs<'_>,
    ) -> ScriptValue {
        trace!(routine = name, argc = args.len(), "native call");
        let result = match api_registry().get(name) {
            Some(descriptor) => {
                marshal(descriptor, args).and_then(|marshaled| self.call_routine(engine, &marshaled))
            }
            None => Err(BridgeError::Type(format!(
                "'{name}' is not a native routine"
            ))),
        };
        match result {
            Ok(value) => value,
            Err(err) => {
                engine.raise(&err);
                ScriptValue::None
            }
        }
    }
}

fn triangle(args: &Marshaled) -> Result<Triangle, BridgeError> {
    Ok(Triangle {
        points: [
            (args.float("x1")?, args.float("y1")?),
            (args.float("x2")?, args.float("y2")?),
            (args.float("x3")?, args.float("y3")?),
        ],
    })
}

fn sfx_request(args: &Marshaled) -> Result<SfxRequest, BridgeError> {
    let note_arg = args.value("note")?;
    let (note, octave) = match note_arg.as_integer() {
        Some(value) => {
            let value = i32::try_from(value)
                .map_err(|_| BridgeError::Value(format!("note {value} out of range")))?;
            split_note(value)
        }
        None => match note_arg {
            ScriptValue::Str(name) => {
                parse_note(name).ok_or_else(|| BridgeError::Value("invalid note name".into()))?
            }
            other => {
                return Err(BridgeError::Type(format!(
                    "expected str or int, not {}",
                    other.type_name()
                )));
            }
        },
    };

    let channel = args.int("channel")?;
    if !(0..SOUND_CHANNELS).contains(&channel) {
        return Err(BridgeError::Value("invalid channel".into()));
    }

    Ok(SfxRequest {
        id: args.int("id")?,
        note,
        octave,
        duration: args.int("duration")?,
        channel,
        volume: unpack_volume(args.value("volume")?)?,
        speed: args.int("speed")?,
    })
}
