//! The finite set of paintable colors, laid out as a texture atlas.
//!
//! The atlas is `cols × rows` texels, one texel per color. Quads sample a single texel so that one atlas texture
//! serves every material regardless of quad size.

use ilattice::glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::codec;

const fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, u8::MAX])
}

const DEFAULT_COLS: u32 = 5;
const DEFAULT_ROWS: u32 = 4;

const DEFAULT_COLORS: [Rgba<u8>; 20] = [
    rgb(0, 0, 0),
    rgb(244, 66, 54),
    rgb(234, 30, 99),
    rgb(156, 40, 177),
    rgb(103, 59, 183),
    rgb(63, 81, 181),
    rgb(3, 169, 245),
    rgb(0, 188, 213),
    rgb(0, 151, 136),
    rgb(76, 176, 80),
    rgb(139, 194, 74),
    rgb(205, 220, 57),
    rgb(255, 235, 60),
    rgb(254, 193, 7),
    rgb(255, 151, 0),
    rgb(244, 66, 54),
    rgb(254, 87, 34),
    rgb(121, 85, 71),
    rgb(158, 158, 158),
    rgb(96, 125, 139),
];

#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    cols: u32,
    rows: u32,
    colors: Vec<Rgba<u8>>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            colors: DEFAULT_COLORS.to_vec(),
        }
    }
}

impl Palette {
    /// Returns `None` unless there is exactly one color per tile.
    pub fn new(cols: u32, rows: u32, colors: Vec<Rgba<u8>>) -> Option<Self> {
        if cols == 0 || rows == 0 || colors.len() != (cols * rows) as usize {
            return None;
        }
        Some(Self { cols, rows, colors })
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn colors(&self) -> &[Rgba<u8>] {
        &self.colors
    }

    pub fn color_at(&self, col: u32, row: u32) -> Option<Rgba<u8>> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.colors.get((row * self.cols + col) as usize).copied()
    }

    /// The `[col, row]` tile holding `color`. The first match wins; unknown colors map to `[0, 0]`.
    pub fn coord_of(&self, color: Rgba<u8>) -> [u32; 2] {
        self.colors
            .iter()
            .position(|c| *c == color)
            .map_or([0, 0], |i| [i as u32 % self.cols, i as u32 / self.cols])
    }

    /// The center of `material`'s tile in normalized atlas coordinates.
    pub fn tile_center_uv(&self, material: u32) -> Vec2 {
        let [col, row] = codec::encode(material).map_or([0, 0], |color| self.coord_of(color));
        let tile = Vec2::new(1.0 / self.cols as f32, 1.0 / self.rows as f32);
        Vec2::new(col as f32, row as f32) * tile + tile * 0.5
    }

    /// The atlas texture, one texel per tile.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.cols, self.rows, |x, y| {
            self.colors[(y * self.cols + x) as usize]
        })
    }
}
