use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::PALETTE_SIZE;

/// Palette indices treated as transparent by a blit. An empty set disables
/// transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorKeySet {
    colors: [u8; PALETTE_SIZE],
    count: usize,
}

impl ColorKeySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(color: u8) -> Self {
        let mut set = Self::default();
        set.colors[0] = color;
        set.count = 1;
        set
    }

    /// Appends a color, returning `false` when the set is already full.
    pub fn push(&mut self, color: u8) -> bool {
        if self.count >= PALETTE_SIZE {
            return false;
        }
        self.colors[self.count] = color;
        self.count += 1;
        true
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.colors[..self.count]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Left/right channel levels, each in `0..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumePair {
    pub left: u8,
    pub right: u8,
}

impl VolumePair {
    pub const MAX: u8 = 0x0F;

    pub fn new(left: i64, right: i64) -> Self {
        Self {
            left: (left & i64::from(Self::MAX)) as u8,
            right: (right & i64::from(Self::MAX)) as u8,
        }
    }

    pub fn uniform(level: i64) -> Self {
        Self::new(level, level)
    }
}

impl Default for VolumePair {
    fn default() -> Self {
        Self {
            left: Self::MAX,
            right: Self::MAX,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flip: u8 {
        const HORIZONTAL = 0b01;
        const VERTICAL = 0b10;
    }
}

impl Flip {
    pub fn from_code(code: i64) -> Self {
        Flip::from_bits_truncate((code & 0b11) as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotate {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarters,
}

impl Rotate {
    pub fn from_code(code: i64) -> Self {
        match code.rem_euclid(4) {
            1 => Rotate::Quarter,
            2 => Rotate::Half,
            3 => Rotate::ThreeQuarters,
            _ => Rotate::None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Rotate::None => 0,
            Rotate::Quarter => 1,
            Rotate::Half => 2,
            Rotate::ThreeQuarters => 3,
        }
    }
}

/// How a single map cell is drawn after remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemapResult {
    pub index: u8,
    pub flip: Flip,
    pub rotate: Rotate,
}

impl RemapResult {
    /// The cell drawn as stored in the map.
    pub fn identity(index: u8) -> Self {
        Self {
            index,
            flip: Flip::empty(),
            rotate: Rotate::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    pub scroll_x: f32,
    pub scroll_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub x: i32,
    pub y: i32,
    pub color: i32,
    pub fixed: bool,
    pub scale: i32,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontStyle {
    pub x: i32,
    pub y: i32,
    pub char_width: i32,
    pub char_height: i32,
    pub fixed: bool,
    pub scale: i32,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteBlit {
    pub index: i32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub scale: i32,
    pub flip: Flip,
    pub rotate: Rotate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRegion {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub sx: i32,
    pub sy: i32,
    pub scale: i32,
}

impl MapRegion {
    pub fn cell_count(&self) -> usize {
        (self.w.max(0) as usize).saturating_mul(self.h.max(0) as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub points: [(f32, f32); 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedTriangle {
    pub points: [(f32, f32); 3],
    pub uvs: [(f32, f32); 3],
    pub texture_source: i32,
    /// Per-vertex depth; present only when perspective correction is wanted.
    pub depth: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfxRequest {
    pub id: i32,
    pub note: i32,
    pub octave: i32,
    pub duration: i32,
    pub channel: i32,
    pub volume: VolumePair,
    pub speed: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusicRequest {
    pub track: i32,
    pub frame: i32,
    pub row: i32,
    pub looped: bool,
    pub sustain: bool,
    pub tempo: i32,
    pub speed: i32,
}
