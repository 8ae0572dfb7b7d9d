//! Terrain block extraction.
//!
//! All terrain pieces are cut from one shared texture. The block used by
//! the level is the fixed sub-rectangle at (96, 0) of `Terrain/Terrain.png`,
//! sized by the caller and scaled 2x like every other sprite. The result is
//! immutable and shared by every placed block.

use std::path::Path;

use image::{imageops, RgbaImage};

use hop_core::mask::Mask;

use crate::sheets::{alpha_mask, SCALE};

const TERRAIN_TEXTURE: &str = "Terrain.png";
const BLOCK_SRC_X: u32 = 96;
const BLOCK_SRC_Y: u32 = 0;

/// The shared block art plus its mask. `side` is the final on-screen edge
/// length (requested size times the display scale).
#[derive(Debug)]
pub struct BlockImage {
    pub image: RgbaImage,
    pub mask: Mask,
    pub side: u32,
}

/// Cut a `size` x `size` block from the terrain texture and scale it 2x.
/// Pure in `size`: same input, same block.
pub fn load_block(assets_root: &Path, size: u32) -> Result<BlockImage, String> {
    let path = assets_root.join("Terrain").join(TERRAIN_TEXTURE);
    let texture = image::open(&path)
        .map_err(|e| format!("Failed to decode terrain texture {}: {e}", path.display()))?
        .to_rgba8();
    validate_block_request(&path, &texture, size)?;

    let block = imageops::crop_imm(&texture, BLOCK_SRC_X, BLOCK_SRC_Y, size, size).to_image();
    let scaled = imageops::resize(
        &block,
        size * SCALE,
        size * SCALE,
        imageops::FilterType::Nearest,
    );
    let mask = alpha_mask(&scaled);

    Ok(BlockImage {
        mask,
        side: size * SCALE,
        image: scaled,
    })
}

fn validate_block_request(path: &Path, texture: &RgbaImage, size: u32) -> Result<(), String> {
    if size == 0 {
        return Err("Terrain validation failed: block size must be > 0".to_string());
    }
    if BLOCK_SRC_X + size > texture.width() || BLOCK_SRC_Y + size > texture.height() {
        return Err(format!(
            "Terrain validation failed: {} is {}x{}, too small for a {}px block at ({}, {})",
            path.display(),
            texture.width(),
            texture.height(),
            size,
            BLOCK_SRC_X,
            BLOCK_SRC_Y
        ));
    }
    Ok(())
}
