//! Repeating background.
//!
//! One small tile image is repeated on a grid that covers the whole
//! viewport. The grid deliberately overshoots by one tile per axis so the
//! last row and column spill past the window edge instead of leaving a gap
//! when the viewport is not an exact multiple of the tile size. The
//! backdrop never scrolls -- it is drawn in fixed screen space behind the
//! world.

use std::path::Path;

use image::RgbaImage;

/// Decoded tile image plus the precomputed tile origins.
#[derive(Debug)]
pub struct Backdrop {
    pub image: RgbaImage,
    pub tile_size: (u32, u32),
    pub tiles: Vec<(f32, f32)>,
}

pub fn load_backdrop(
    assets_root: &Path,
    name: &str,
    viewport_w: u32,
    viewport_h: u32,
) -> Result<Backdrop, String> {
    let path = assets_root.join("Background").join(name);
    let image = image::open(&path)
        .map_err(|e| format!("Failed to decode background {}: {e}", path.display()))?
        .to_rgba8();
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(format!(
            "Backdrop validation failed: {} has a zero dimension",
            path.display()
        ));
    }

    let tiles = tile_origins(w, h, viewport_w, viewport_h);
    log::info!(
        "Background {}: {}x{} tile, {} tiles for {}x{} viewport",
        name,
        w,
        h,
        tiles.len(),
        viewport_w,
        viewport_h
    );

    Ok(Backdrop {
        image,
        tile_size: (w, h),
        tiles,
    })
}

/// Grid origins `(i*w, j*h)` for `i in 0..=ceil(W/w)`, `j in 0..=ceil(H/h)`.
fn tile_origins(tile_w: u32, tile_h: u32, viewport_w: u32, viewport_h: u32) -> Vec<(f32, f32)> {
    let cols = viewport_w.div_ceil(tile_w) + 1;
    let rows = viewport_h.div_ceil(tile_h) + 1;
    let mut tiles = Vec::with_capacity((cols * rows) as usize);
    for i in 0..cols {
        for j in 0..rows {
            tiles.push(((i * tile_w) as f32, (j * tile_h) as f32));
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_assets_root(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "hop_backdrop_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(dir.join("Background")).expect("create temp backdrop dir");
        dir
    }

    #[test]
    fn tile_count_matches_ceil_formula() {
        // 800/64 -> ceil 13 (+1), 600/64 -> ceil 10 (+1).
        assert_eq!(tile_origins(64, 64, 800, 600).len(), 14 * 11);
        // Exact multiples still get the extra row/column.
        assert_eq!(tile_origins(100, 100, 800, 600).len(), 9 * 7);
    }

    #[test]
    fn tiles_cover_the_viewport_without_gaps() {
        let (vw, vh) = (800u32, 600u32);
        let tiles = tile_origins(64, 64, vw, vh);

        let mut covered = vec![false; (vw * vh) as usize];
        for (tx, ty) in &tiles {
            let (tx, ty) = (*tx as i64, *ty as i64);
            for y in ty..(ty + 64).min(vh as i64) {
                for x in tx..(tx + 64).min(vw as i64) {
                    covered[(y * vw as i64 + x) as usize] = true;
                }
            }
        }
        assert!(covered.iter().all(|&c| c), "every viewport pixel is tiled");
    }

    #[test]
    fn origins_step_by_tile_size() {
        let tiles = tile_origins(64, 48, 128, 96);
        assert!(tiles.contains(&(0.0, 0.0)));
        assert!(tiles.contains(&(64.0, 48.0)));
        assert!(tiles.contains(&(128.0, 96.0)), "overdraw row/column exists");
    }

    #[test]
    fn loads_tile_image_and_origins() {
        let root = temp_assets_root("load");
        let tile = RgbaImage::new(64, 64);
        tile.save(root.join("Background").join("Pink.png"))
            .expect("write tile png");

        let backdrop = load_backdrop(&root, "Pink.png", 800, 600).expect("backdrop should load");
        assert_eq!(backdrop.tile_size, (64, 64));
        assert_eq!(backdrop.tiles.len(), 14 * 11);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn rejects_missing_background() {
        let root = temp_assets_root("missing");
        let err = load_backdrop(&root, "Nope.png", 800, 600).expect_err("missing file");
        assert!(err.contains("Failed to decode background"));

        let _ = fs::remove_dir_all(root);
    }
}
