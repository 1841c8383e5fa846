//! Shared fixtures: a scripted in-memory guest engine and a recording console.
//!
//! "Scripts" are Rust closures registered against a source string. Running
//! that source through the engine runs the closure, which talks to the console
//! through [`GuestCtx`] the same way compiled guest code would.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use console_api::{
    ColorKeySet, ErrorSink, FontStyle, Host, MapRegion, MouseState, MusicRequest, RemapFn,
    RemapResult, SfxRequest, SpriteBlit, TextStyle, TexturedTriangle, Triangle,
};
use script_bridge::{
    BridgeError, CallArgs, CallableRef, GuestEngine, InstanceRef, NativeDispatch,
    RaisedException, ScriptRuntime, ScriptValue, TraceFrame,
};

/// Marker returned by guest code while an exception is unwinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Raised;

pub type GuestResult<T = ScriptValue> = Result<T, Raised>;

type Program = Rc<dyn Fn(&mut GuestCtx<'_>) -> GuestResult<()>>;
type Body = Rc<dyn Fn(&mut GuestCtx<'_>, &[ScriptValue]) -> GuestResult>;

struct Function {
    name: String,
    line: u32,
    body: Body,
}

struct NativeModule {
    name: String,
    routines: Vec<&'static str>,
}

/// Type name whose string conversion always raises.
pub const BROKEN_STR_TYPE: &str = "BrokenStr";

#[derive(Default)]
pub struct FakeEngine {
    programs: HashMap<String, Program>,
    functions: Vec<Function>,
    globals: HashMap<String, ScriptValue>,
    native_module: Option<NativeModule>,
    main_module: Option<String>,
    pending: Option<RaisedException>,
    next_instance: u64,
    depth: usize,
    pub max_depth: usize,
    pub guest_calls: usize,
    pub interprets: usize,
    pub shutdowns: usize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the behavior of `source`. Unregistered source fails to parse.
    pub fn with_program<F>(mut self, source: &str, program: F) -> Self
    where
        F: Fn(&mut GuestCtx<'_>) -> GuestResult<()> + 'static,
    {
        self.programs.insert(source.to_string(), Rc::new(program));
        self
    }

    pub fn native_module_name(&self) -> Option<&str> {
        self.native_module.as_ref().map(|module| module.name.as_str())
    }

    pub fn native_routines(&self) -> &[&'static str] {
        self.native_module
            .as_ref()
            .map(|module| module.routines.as_slice())
            .unwrap_or(&[])
    }

    pub fn main_module_name(&self) -> Option<&str> {
        self.main_module.as_deref()
    }

    pub fn global_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.globals.keys().cloned().collect();
        names.sort();
        names
    }

    fn main_filename(&self) -> String {
        self.main_module
            .clone()
            .unwrap_or_else(|| "<main>".to_string())
    }

    fn set_pending(&mut self, type_name: &str, module: Option<&str>, value: ScriptValue) {
        self.pending = Some(RaisedException {
            value,
            type_name: type_name.to_string(),
            module: module.map(str::to_string),
            traceback: Vec::new(),
        });
    }

    fn push_frame(&mut self, function: &str, line: u32) {
        let filename = self.main_filename();
        if let Some(exception) = self.pending.as_mut() {
            exception.traceback.insert(
                0,
                TraceFrame {
                    function: function.to_string(),
                    filename,
                    line,
                },
            );
        }
    }

    fn register(&mut self, name: &str, line: u32, body: Body) -> ScriptValue {
        self.functions.push(Function {
            name: name.to_string(),
            line,
            body,
        });
        ScriptValue::Callable(CallableRef(self.functions.len() as u64 - 1))
    }
}

impl GuestEngine for FakeEngine {
    fn install_native_module(&mut self, module: &str, routines: &[&'static str]) {
        self.native_module = Some(NativeModule {
            name: module.to_string(),
            routines: routines.to_vec(),
        });
    }

    fn start_main_module(&mut self, name: &str) {
        self.globals.clear();
        self.main_module = Some(name.to_string());
    }

    fn interpret(&mut self, source: &str, _filename: &str, natives: &mut dyn NativeDispatch) {
        self.interprets += 1;
        let Some(program) = self.programs.get(source).cloned() else {
            self.set_pending(
                "SyntaxError",
                Some("builtins"),
                ScriptValue::from("invalid syntax"),
            );
            return;
        };
        let mut ctx = GuestCtx {
            engine: self,
            natives,
        };
        if program(&mut ctx).is_err() {
            self.push_frame("<module>", 1);
        }
    }

    fn call(
        &mut self,
        callee: &ScriptValue,
        args: &[ScriptValue],
        natives: &mut dyn NativeDispatch,
    ) -> ScriptValue {
        let ScriptValue::Callable(CallableRef(id)) = callee else {
            self.set_pending(
                "TypeError",
                Some("builtins"),
                ScriptValue::Str(format!("'{}' object is not callable", callee.type_name())),
            );
            return ScriptValue::None;
        };
        let Some(function) = self.functions.get(*id as usize) else {
            self.set_pending(
                "NameError",
                Some("builtins"),
                ScriptValue::from("stale function reference"),
            );
            return ScriptValue::None;
        };
        let (body, name, line) = (Rc::clone(&function.body), function.name.clone(), function.line);

        self.guest_calls += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        let result = {
            let mut ctx = GuestCtx {
                engine: self,
                natives,
            };
            body(&mut ctx, args)
        };
        self.depth -= 1;

        match result {
            Ok(value) => value,
            Err(Raised) => {
                self.push_frame(&name, line);
                ScriptValue::None
            }
        }
    }

    fn lookup_global(&self, name: &str) -> Option<ScriptValue> {
        self.globals.get(name).cloned()
    }

    fn has_pending_exception(&self) -> bool {
        self.pending.is_some()
    }

    fn raise(&mut self, error: &BridgeError) {
        self.set_pending(
            error.kind().exception_name(),
            Some("builtins"),
            ScriptValue::from(error.message()),
        );
    }

    fn take_exception(&mut self) -> Option<RaisedException> {
        self.pending.take()
    }

    fn clear_exception(&mut self) {
        self.pending = None;
    }

    fn stringify(
        &mut self,
        exception: &RaisedException,
        _natives: &mut dyn NativeDispatch,
    ) -> Option<String> {
        match &exception.value {
            ScriptValue::Str(message) => Some(message.clone()),
            ScriptValue::Instance(instance) if instance.type_name == BROKEN_STR_TYPE => {
                self.set_pending(
                    "RuntimeError",
                    Some("builtins"),
                    ScriptValue::from("__str__ failed"),
                );
                None
            }
            ScriptValue::None => None,
            other => Some(other.to_string()),
        }
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
        self.functions.clear();
        self.globals.clear();
        self.native_module = None;
        self.main_module = None;
        self.pending = None;
    }
}

/// What running guest code can do.
pub struct GuestCtx<'a> {
    engine: &'a mut FakeEngine,
    natives: &'a mut dyn NativeDispatch,
}

impl GuestCtx<'_> {
    /// Calls a console routine through the native module.
    pub fn native(&mut self, name: &str, args: &[ScriptValue]) -> GuestResult {
        self.native_with(name, CallArgs::positional(args))
    }

    pub fn native_kw(
        &mut self,
        name: &str,
        args: &[ScriptValue],
        keywords: &[(&str, ScriptValue)],
    ) -> GuestResult {
        let keywords: Vec<(String, ScriptValue)> = keywords
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        self.native_with(name, CallArgs::with_keywords(args, &keywords))
    }

    fn native_with(&mut self, name: &str, args: CallArgs<'_>) -> GuestResult {
        let exposed = self
            .engine
            .native_routines()
            .iter()
            .any(|routine| *routine == name);
        if !exposed {
            return Err(self.raise(
                "AttributeError",
                Some("builtins"),
                &format!("native module has no attribute '{name}'"),
            ));
        }
        let value = self.natives.invoke(&mut *self.engine, name, args);
        if self.engine.pending.is_some() {
            Err(Raised)
        } else {
            Ok(value)
        }
    }

    /// Calls a guest callable, propagating any exception it raised.
    pub fn call(&mut self, callee: &ScriptValue, args: &[ScriptValue]) -> GuestResult {
        let value = self.engine.call(callee, args, &mut *self.natives);
        if self.engine.pending.is_some() {
            Err(Raised)
        } else {
            Ok(value)
        }
    }

    /// `def name(...)` at `line`, bound as a global.
    pub fn define<F>(&mut self, name: &str, line: u32, body: F) -> ScriptValue
    where
        F: Fn(&mut GuestCtx<'_>, &[ScriptValue]) -> GuestResult + 'static,
    {
        let function = self.function(name, line, body);
        self.engine
            .globals
            .insert(name.to_string(), function.clone());
        function
    }

    /// A function value not bound to any global.
    pub fn function<F>(&mut self, name: &str, line: u32, body: F) -> ScriptValue
    where
        F: Fn(&mut GuestCtx<'_>, &[ScriptValue]) -> GuestResult + 'static,
    {
        self.engine.register(name, line, Rc::new(body))
    }

    pub fn set_global(&mut self, name: &str, value: ScriptValue) {
        self.engine.globals.insert(name.to_string(), value);
    }

    pub fn global(&self, name: &str) -> Option<ScriptValue> {
        self.engine.globals.get(name).cloned()
    }

    /// `raise TypeName(message)`.
    pub fn raise(&mut self, type_name: &str, module: Option<&str>, message: &str) -> Raised {
        self.engine
            .set_pending(type_name, module, ScriptValue::from(message));
        Raised
    }

    /// Raises an instance whose string conversion itself raises.
    pub fn raise_broken(&mut self, type_name: &str, module: Option<&str>) -> Raised {
        self.engine.next_instance += 1;
        let instance = InstanceRef {
            id: self.engine.next_instance,
            type_name: BROKEN_STR_TYPE.to_string(),
        };
        self.engine
            .set_pending(type_name, module, ScriptValue::Instance(instance));
        Raised
    }

    /// `except:` clause: takes the pending exception.
    pub fn catch(&mut self) -> Option<RaisedException> {
        self.engine.pending.take()
    }
}

/// Console double that records every call.
pub struct RecordingHost {
    pub log: Vec<String>,
    pub reports: Vec<String>,
    pub sprites: Vec<(SpriteBlit, ColorKeySet)>,
    pub sounds: Vec<SfxRequest>,
    pub music: Vec<MusicRequest>,
    pub fonts: Vec<(String, FontStyle, ColorKeySet)>,
    pub textured: Vec<(TexturedTriangle, ColorKeySet)>,
    pub map_regions: Vec<(MapRegion, ColorKeySet)>,
    pub drawn_cells: Vec<(i32, i32, RemapResult)>,
    pub tiles: HashMap<(i32, i32), i32>,
    pub pixels: HashMap<(i32, i32), i32>,
    pub ram: HashMap<(i32, i32), i32>,
    pub pmem: HashMap<i32, i32>,
    pub sprite_flags: HashSet<(i32, u8)>,
    pub pressed: HashSet<i32>,
    pub mouse: MouseState,
    pub vbank: i32,
    pub clock: f64,
    pub exited: bool,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            log: Vec::new(),
            reports: Vec::new(),
            sprites: Vec::new(),
            sounds: Vec::new(),
            music: Vec::new(),
            fonts: Vec::new(),
            textured: Vec::new(),
            map_regions: Vec::new(),
            drawn_cells: Vec::new(),
            tiles: HashMap::new(),
            pixels: HashMap::new(),
            ram: HashMap::new(),
            pmem: HashMap::new(),
            sprite_flags: HashSet::new(),
            pressed: HashSet::new(),
            mouse: MouseState::default(),
            vbank: 0,
            clock: 16.5,
            exited: false,
        }
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, entry: String) {
        self.log.push(entry);
    }

    pub fn logged(&self, prefix: &str) -> Vec<&str> {
        self.log
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

impl ErrorSink for RecordingHost {
    fn report(&mut self, text: &str) {
        self.reports.push(text.to_string());
    }
}

impl Host for RecordingHost {
    fn print(&mut self, text: &str, style: TextStyle) -> i32 {
        self.record(format!("print({text:?}, {style:?})"));
        text.chars().count() as i32 * 6 * style.scale
    }

    fn cls(&mut self, color: i32) {
        self.record(format!("cls({color})"));
    }

    fn pix(&mut self, x: i32, y: i32, color: Option<i32>) -> i32 {
        self.record(format!("pix({x}, {y}, {color:?})"));
        match color {
            Some(color) => {
                self.pixels.insert((x, y), color);
                0
            }
            None => self.pixels.get(&(x, y)).copied().unwrap_or(0),
        }
    }

    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: i32) {
        self.record(format!("line({x0}, {y0}, {x1}, {y1}, {color})"));
    }

    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: i32) {
        self.record(format!("rect({x}, {y}, {w}, {h}, {color})"));
    }

    fn rectb(&mut self, x: i32, y: i32, w: i32, h: i32, color: i32) {
        self.record(format!("rectb({x}, {y}, {w}, {h}, {color})"));
    }

    fn spr(&mut self, blit: SpriteBlit, colorkey: &ColorKeySet) {
        self.record(format!("spr({})", blit.index));
        self.sprites.push((blit, *colorkey));
    }

    fn btn(&mut self, id: i32) -> bool {
        self.pressed.contains(&id)
    }

    fn btnp(&mut self, id: i32, hold: i32, period: i32) -> bool {
        self.record(format!("btnp({id}, {hold}, {period})"));
        self.pressed.contains(&id)
    }

    fn sfx(&mut self, request: SfxRequest) {
        self.record(format!("sfx({})", request.id));
        self.sounds.push(request);
    }

    fn map(
        &mut self,
        region: MapRegion,
        colorkey: &ColorKeySet,
        mut remap: Option<&mut dyn RemapFn>,
    ) {
        self.record(format!("map({}, {}, {}, {})", region.x, region.y, region.w, region.h));
        self.map_regions.push((region, *colorkey));
        for row in 0..region.h {
            for column in 0..region.w {
                let (x, y) = (region.x + column, region.y + row);
                let tile = self.tiles.get(&(x, y)).copied().unwrap_or(0);
                let mut cell = RemapResult::identity(tile as u8);
                if let Some(remap) = remap.as_mut() {
                    remap.remap(self, x, y, &mut cell);
                }
                self.drawn_cells.push((x, y, cell));
            }
        }
    }

    fn mget(&mut self, x: i32, y: i32) -> i32 {
        self.tiles.get(&(x, y)).copied().unwrap_or(0)
    }

    fn mset(&mut self, x: i32, y: i32, tile: i32) {
        self.record(format!("mset({x}, {y}, {tile})"));
        self.tiles.insert((x, y), tile);
    }

    fn peek(&mut self, addr: i32, bits: i32) -> i32 {
        self.record(format!("peek({addr}, {bits})"));
        self.ram.get(&(addr, bits)).copied().unwrap_or(0)
    }

    fn poke(&mut self, addr: i32, value: i32, bits: i32) {
        self.record(format!("poke({addr}, {value}, {bits})"));
        self.ram.insert((addr, bits), value);
    }

    fn memcpy(&mut self, dest: i32, source: i32, size: i32) {
        self.record(format!("memcpy({dest}, {source}, {size})"));
    }

    fn memset(&mut self, dest: i32, value: i32, size: i32) {
        self.record(format!("memset({dest}, {value}, {size})"));
    }

    fn trace(&mut self, message: &str, color: i32) {
        self.record(format!("trace({message:?}, {color})"));
    }

    fn pmem(&mut self, index: i32, value: Option<i32>) -> i32 {
        self.record(format!("pmem({index}, {value:?})"));
        let previous = self.pmem.get(&index).copied().unwrap_or(0);
        if let Some(value) = value {
            self.pmem.insert(index, value);
        }
        previous
    }

    fn time(&mut self) -> f64 {
        self.clock
    }

    fn tstamp(&mut self) -> i64 {
        1_700_000_000
    }

    fn exit(&mut self) {
        self.record("exit()".to_string());
        self.exited = true;
    }

    fn font(&mut self, text: &str, style: FontStyle, colorkey: &ColorKeySet) -> i32 {
        self.record(format!("font({text:?})"));
        self.fonts.push((text.to_string(), style, *colorkey));
        text.chars().count() as i32 * style.char_width * style.scale
    }

    fn mouse(&mut self) -> MouseState {
        self.mouse
    }

    fn circ(&mut self, x: i32, y: i32, radius: i32, color: i32) {
        self.record(format!("circ({x}, {y}, {radius}, {color})"));
    }

    fn circb(&mut self, x: i32, y: i32, radius: i32, color: i32) {
        self.record(format!("circb({x}, {y}, {radius}, {color})"));
    }

    fn elli(&mut self, x: i32, y: i32, a: i32, b: i32, color: i32) {
        self.record(format!("elli({x}, {y}, {a}, {b}, {color})"));
    }

    fn ellib(&mut self, x: i32, y: i32, a: i32, b: i32, color: i32) {
        self.record(format!("ellib({x}, {y}, {a}, {b}, {color})"));
    }

    fn tri(&mut self, triangle: Triangle, color: i32) {
        self.record(format!("tri({:?}, {color})", triangle.points));
    }

    fn trib(&mut self, triangle: Triangle, color: i32) {
        self.record(format!("trib({:?}, {color})", triangle.points));
    }

    fn ttri(&mut self, triangle: TexturedTriangle, colorkey: &ColorKeySet) {
        self.record("ttri()".to_string());
        self.textured.push((triangle, *colorkey));
    }

    fn clip(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(format!("clip({x}, {y}, {width}, {height})"));
    }

    fn music(&mut self, request: MusicRequest) {
        self.record(format!("music({})", request.track));
        self.music.push(request);
    }

    fn sync(&mut self, mask: u32, bank: i32, to_cart: bool) {
        self.record(format!("sync({mask}, {bank}, {to_cart})"));
    }

    fn vbank(&mut self, bank: Option<i32>) -> i32 {
        let previous = self.vbank;
        if let Some(bank) = bank {
            self.vbank = bank;
        }
        previous
    }

    fn reset(&mut self) {
        self.record("reset()".to_string());
    }

    fn key(&mut self, code: i32) -> bool {
        self.pressed.contains(&code)
    }

    fn keyp(&mut self, code: i32, hold: i32, period: i32) -> bool {
        self.record(format!("keyp({code}, {hold}, {period})"));
        self.pressed.contains(&code)
    }

    fn fget(&mut self, sprite: i32, flag: u8) -> bool {
        self.sprite_flags.contains(&(sprite, flag))
    }

    fn fset(&mut self, sprite: i32, flag: u8, value: bool) {
        if value {
            self.sprite_flags.insert((sprite, flag));
        } else {
            self.sprite_flags.remove(&(sprite, flag));
        }
    }
}

pub type TestRuntime = ScriptRuntime<FakeEngine, RecordingHost>;

/// Runtime over `engine` with the builtin configuration, initialized with
/// `source`. Panics if initialization unexpectedly fails.
pub fn loaded_runtime(engine: FakeEngine, source: &str) -> TestRuntime {
    let mut runtime = ScriptRuntime::new(engine, RecordingHost::new());
    assert!(
        runtime.initialize(source),
        "script failed to load: {:?}",
        runtime.host().reports
    );
    runtime
}

/// Shared counter for observing guest-side effects from a test body.
pub fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

pub fn ints(values: &[i64]) -> ScriptValue {
    ScriptValue::List(values.iter().copied().map(ScriptValue::Int).collect())
}

pub fn tuple(values: &[i64]) -> ScriptValue {
    ScriptValue::Tuple(values.iter().copied().map(ScriptValue::Int).collect())
}
