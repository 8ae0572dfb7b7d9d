//! Character sprite-sheet loading.
//!
//! Each PNG in a character directory is one clip: a horizontal strip of
//! fixed-size frames named after the file stem ("run.png" holds the run
//! cycle). The loader slices the strip, scales every frame 2x with
//! nearest-neighbor (pixel art -- no smoothing), and precomputes the
//! alpha-derived collision mask per frame. Direction-variant characters get
//! each clip registered twice: `<stem>_right` as authored and `<stem>_left`
//! mirrored, so the animator can address frames with a composite
//! clip-plus-direction key. Loading happens once at startup and the table
//! is shared read-only afterward.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};

use hop_core::animation::{Clip, Facing};
use hop_core::mask::Mask;

/// Display scale applied to every sliced frame.
pub const SCALE: u32 = 2;

/// One frame of one clip: the scaled image, its collision mask, and a
/// stable id used as the texture-cache key (`run_right#3`).
#[derive(Debug)]
pub struct SpriteFrame {
    pub id: String,
    pub image: RgbaImage,
    pub mask: Mask,
}

/// Clip key (e.g. `idle_left`) to ordered frame sequence.
pub type SheetTable = HashMap<String, Vec<SpriteFrame>>;

/// Build a collision mask from an image's alpha channel.
pub fn alpha_mask(image: &RgbaImage) -> Mask {
    let alpha: Vec<u8> = image.pixels().map(|p| p.0[3]).collect();
    Mask::from_alpha(image.width(), image.height(), &alpha)
}

/// Load every clip strip under `<assets_root>/<dir1>/<dir2>`.
pub fn load_sprite_sheets(
    assets_root: &Path,
    dir1: &str,
    dir2: &str,
    frame_w: u32,
    frame_h: u32,
    with_directions: bool,
) -> Result<SheetTable, String> {
    let dir = assets_root.join(dir1).join(dir2);
    let entries = fs::read_dir(&dir)
        .map_err(|e| format!("Failed to read sprite directory {}: {e}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    // Filesystem order is arbitrary; sort so load order (and any load
    // failure) is reproducible.
    files.sort();

    let mut table = SheetTable::new();
    for path in &files {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| format!("Sprite sheet {} has no usable file stem", path.display()))?
            .to_string();

        let sheet = image::open(path)
            .map_err(|e| format!("Failed to decode sprite sheet {}: {e}", path.display()))?
            .to_rgba8();
        validate_sheet_dimensions(path, &sheet, frame_w, frame_h)?;

        let frame_count = sheet.width() / frame_w;
        let mut sliced = Vec::with_capacity(frame_count as usize);
        for i in 0..frame_count {
            let frame = imageops::crop_imm(&sheet, i * frame_w, 0, frame_w, frame_h).to_image();
            let scaled = imageops::resize(
                &frame,
                frame_w * SCALE,
                frame_h * SCALE,
                imageops::FilterType::Nearest,
            );
            sliced.push(scaled);
        }

        if with_directions {
            let right_key = format!("{stem}_right");
            let left_key = format!("{stem}_left");
            let right: Vec<SpriteFrame> = sliced
                .into_iter()
                .enumerate()
                .map(|(i, image)| frame_entry(&right_key, i, image))
                .collect();
            let left: Vec<SpriteFrame> = right
                .iter()
                .enumerate()
                .map(|(i, frame)| SpriteFrame {
                    id: format!("{left_key}#{i}"),
                    image: imageops::flip_horizontal(&frame.image),
                    mask: frame.mask.flipped_horizontal(),
                })
                .collect();
            table.insert(right_key, right);
            table.insert(left_key, left);
        } else {
            let frames: Vec<SpriteFrame> = sliced
                .into_iter()
                .enumerate()
                .map(|(i, image)| frame_entry(&stem, i, image))
                .collect();
            table.insert(stem, frames);
        }
    }

    log::info!(
        "Loaded {} clips from {} ({} sheet files)",
        table.len(),
        dir.display(),
        files.len()
    );
    Ok(table)
}

fn frame_entry(clip_key: &str, index: usize, image: RgbaImage) -> SpriteFrame {
    let mask = alpha_mask(&image);
    SpriteFrame {
        id: format!("{clip_key}#{index}"),
        image,
        mask,
    }
}

fn validate_sheet_dimensions(
    path: &Path,
    sheet: &RgbaImage,
    frame_w: u32,
    frame_h: u32,
) -> Result<(), String> {
    if frame_w == 0 || frame_h == 0 {
        return Err("Sheet validation failed: frame dimensions must be > 0".to_string());
    }
    if sheet.width() == 0 || sheet.width() % frame_w != 0 {
        return Err(format!(
            "Sheet validation failed: {} is {}px wide, not a positive multiple of the {}px frame width",
            path.display(),
            sheet.width(),
            frame_w
        ));
    }
    if sheet.height() < frame_h {
        return Err(format!(
            "Sheet validation failed: {} is {}px tall, shorter than the {}px frame height",
            path.display(),
            sheet.height(),
            frame_h
        ));
    }
    Ok(())
}

/// Verify the table carries every clip the animator can select, in both
/// directions. Extra clips (hit reactions, wall jumps) are allowed and
/// simply never selected.
pub fn validate_required_clips(table: &SheetTable) -> Result<(), String> {
    const REQUIRED: &[Clip] = &[
        Clip::Idle,
        Clip::Run,
        Clip::Jump,
        Clip::DoubleJump,
        Clip::Fall,
    ];
    for &clip in REQUIRED {
        for facing in [Facing::Left, Facing::Right] {
            let key = clip.key(facing);
            match table.get(&key) {
                Some(frames) if !frames.is_empty() => {}
                Some(_) => {
                    return Err(format!(
                        "Sheet validation failed: clip '{key}' has no frames"
                    ));
                }
                None => {
                    return Err(format!("Sheet validation failed: missing clip '{key}'"));
                }
            }
        }
    }
    Ok(())
}
