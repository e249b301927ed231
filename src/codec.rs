//! Material ID ⇄ color mapping used at the persistence boundary.
//!
//! A material ID is packed into the three color channels, most significant byte in red:
//!
//! ```text
//! id = r * 65536 + g * 256 + b
//! ```
//!
//! Alpha is always written opaque and ignored when decoding.

use image::Rgba;

use crate::{Error, Result};

/// The largest material ID that fits in three 8-bit channels (white).
pub const MAX_MATERIAL_ID: u32 = 0x00FF_FFFF;

/// The material ID of empty space (black).
pub const EMPTY: u32 = 0;

#[inline]
pub fn decode(color: Rgba<u8>) -> u32 {
    let [r, g, b, _] = color.0;
    r as u32 * 65536 + g as u32 * 256 + b as u32
}

/// Packs `id` into an opaque color.
///
/// Fails with [`Error::MaterialOutOfRange`] for IDs above [`MAX_MATERIAL_ID`].
#[inline]
pub fn encode(id: u32) -> Result<Rgba<u8>> {
    if id > MAX_MATERIAL_ID {
        return Err(Error::MaterialOutOfRange(id));
    }

    let r = id / 65536;
    let rem = id % 65536;
    let g = rem / 256;
    let b = rem % 256;

    Ok(Rgba([r as u8, g as u8, b as u8, u8::MAX]))
}
