//! Persisted voxel layers.
//!
//! Each depth layer of a volume is saved as one PNG whose pixels are material IDs packed by the [`codec`](crate::codec).
//! Pixels are held bottom row first, so logical row `y` lives in buffer row `height - 1 - y`.

use std::path::Path;

use image::{Rgba, RgbaImage};
use log::debug;

use crate::codec::{self, EMPTY};
use crate::Result;

/// Width in voxels of a painted volume.
pub const MAP_WIDTH: u32 = 64;
/// Height in voxels of a painted volume.
pub const MAP_HEIGHT: u32 = 64;
/// Number of layers in a painted volume.
pub const MAP_DEPTH: u32 = 4;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, u8::MAX]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A 2D grid of material IDs backed by a color buffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba<u8>>,
}

impl Layer {
    /// An all-empty layer.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BLACK; width as usize * height as usize],
        }
    }

    pub fn from_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in (0..height).rev() {
            for x in 0..width {
                pixels.push(*image.get_pixel(x, y));
            }
        }

        Self {
            width,
            height,
            pixels,
        }
    }

    /// Converts back to an image. Empty pixels can be made transparent for display over a background.
    pub fn to_image(&self, replace_black_with_transparent: bool) -> RgbaImage {
        let (width, height) = (self.width, self.height);
        RgbaImage::from_fn(width, height, |x, y| {
            let pixel = self.pixels[((height - 1 - y) * width + x) as usize];
            if replace_black_with_transparent && pixel == BLACK {
                TRANSPARENT
            } else {
                pixel
            }
        })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let image = image::open(path)?.to_rgba8();
        Ok(Self::from_image(&image))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_image(false).save(path)?;
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(((self.height - 1 - y) * self.width + x) as usize)
        } else {
            None
        }
    }

    /// The material at `(x, y)`, or [`EMPTY`] outside the layer.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.pixel_index(x, y)
            .map_or(EMPTY, |i| codec::decode(self.pixels[i]))
    }

    /// Paints `(x, y)`. Coordinates outside the layer are ignored.
    pub fn set(&mut self, x: u32, y: u32, material: u32) -> Result<()> {
        let color = codec::encode(material)?;
        if let Some(i) = self.pixel_index(x, y) {
            self.pixels[i] = color;
        }
        Ok(())
    }
}

fn layer_path(dir: &Path, z: u32) -> std::path::PathBuf {
    dir.join(format!("layer{z}.png"))
}

/// Loads `layer0.png ..` from `dir`. Missing files become blank layers of the map size.
pub fn load_layers(dir: impl AsRef<Path>) -> Result<Vec<Layer>> {
    let dir = dir.as_ref();
    (0..MAP_DEPTH)
        .map(|z| {
            let path = layer_path(dir, z);
            if path.exists() {
                Layer::open(&path)
            } else {
                debug!("no layer at {}, starting blank", path.display());
                Ok(Layer::blank(MAP_WIDTH, MAP_HEIGHT))
            }
        })
        .collect()
}

pub fn save_layers(dir: impl AsRef<Path>, layers: &[Layer]) -> Result<()> {
    let dir = dir.as_ref();
    for (z, layer) in layers.iter().enumerate() {
        layer.save(layer_path(dir, z as u32))?;
    }
    Ok(())
}
