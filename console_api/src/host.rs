//! Traits the embedding console implements.

use crate::types::{
    ColorKeySet, FontStyle, MapRegion, MouseState, MusicRequest, RemapResult, SfxRequest,
    SpriteBlit, TextStyle, TexturedTriangle, Triangle,
};

/// Receives rendered script error reports. Fire-and-forget.
pub trait ErrorSink {
    fn report(&mut self, text: &str);
}

/// Per-cell hook consulted while a map region is drawn.
///
/// `cell` arrives pre-filled with the identity mapping; implementations
/// overwrite it to change how that cell is drawn. The host passes itself so
/// the hook can reach the console while the map call is in progress.
pub trait RemapFn {
    fn remap(&mut self, host: &mut dyn Host, x: i32, y: i32, cell: &mut RemapResult);
}

/// The fixed native console API.
///
/// Optional arguments a routine distinguishes from their zero value arrive as
/// `Option` (`pix` without a color reads, `pmem` without a value reads).
pub trait Host: ErrorSink {
    fn print(&mut self, text: &str, style: TextStyle) -> i32;
    fn cls(&mut self, color: i32);
    fn pix(&mut self, x: i32, y: i32, color: Option<i32>) -> i32;
    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: i32);
    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: i32);
    fn rectb(&mut self, x: i32, y: i32, w: i32, h: i32, color: i32);
    fn spr(&mut self, blit: SpriteBlit, colorkey: &ColorKeySet);
    fn btn(&mut self, id: i32) -> bool;
    fn btnp(&mut self, id: i32, hold: i32, period: i32) -> bool;
    fn sfx(&mut self, request: SfxRequest);

    /// Draws `region`, sweeping cells row-major and consulting `remap` once per
    /// cell when present.
    fn map(&mut self, region: MapRegion, colorkey: &ColorKeySet, remap: Option<&mut dyn RemapFn>);
    fn mget(&mut self, x: i32, y: i32) -> i32;
    fn mset(&mut self, x: i32, y: i32, tile: i32);

    /// Reads RAM where `addr` counts units of `bits` (1, 2, 4 or 8).
    fn peek(&mut self, addr: i32, bits: i32) -> i32;
    fn poke(&mut self, addr: i32, value: i32, bits: i32);
    fn memcpy(&mut self, dest: i32, source: i32, size: i32);
    fn memset(&mut self, dest: i32, value: i32, size: i32);
    fn trace(&mut self, message: &str, color: i32);
    fn pmem(&mut self, index: i32, value: Option<i32>) -> i32;
    fn time(&mut self) -> f64;
    fn tstamp(&mut self) -> i64;
    fn exit(&mut self);
    fn font(&mut self, text: &str, style: FontStyle, colorkey: &ColorKeySet) -> i32;
    fn mouse(&mut self) -> MouseState;
    fn circ(&mut self, x: i32, y: i32, radius: i32, color: i32);
    fn circb(&mut self, x: i32, y: i32, radius: i32, color: i32);
    fn elli(&mut self, x: i32, y: i32, a: i32, b: i32, color: i32);
    fn ellib(&mut self, x: i32, y: i32, a: i32, b: i32, color: i32);
    fn tri(&mut self, triangle: Triangle, color: i32);
    fn trib(&mut self, triangle: Triangle, color: i32);
    fn ttri(&mut self, triangle: TexturedTriangle, colorkey: &ColorKeySet);
    fn clip(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn music(&mut self, request: MusicRequest);
    fn sync(&mut self, mask: u32, bank: i32, to_cart: bool);

    /// Returns the active VRAM bank, then switches to `bank` when given.
    fn vbank(&mut self, bank: Option<i32>) -> i32;
    fn reset(&mut self);
    fn key(&mut self, code: i32) -> bool;
    fn keyp(&mut self, code: i32, hold: i32, period: i32) -> bool;
    fn fget(&mut self, sprite: i32, flag: u8) -> bool;
    fn fset(&mut self, sprite: i32, flag: u8, value: bool);
}
