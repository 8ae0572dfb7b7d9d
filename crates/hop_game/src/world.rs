//! World entities and camera scroll.
//!
//! Blocks and the player avatar are independent drawables sharing the same
//! capability set (rect + image + mask) by composition. Blocks are fixed at
//! construction; the avatar re-binds its rect and mask to the active
//! animation frame every step, so collision always tests against the
//! pixels actually on screen.

use std::sync::Arc;

use hop_core::mask::Mask;
use hop_core::player::Player;
use hop_core::rect::Rect;

use crate::sheets::{SheetTable, SpriteFrame};
use crate::terrain::BlockImage;

/// Horizontal run speed in pixels per fixed step.
pub const PLAYER_VEL: f32 = 5.0;

/// Margin near each viewport edge inside which the camera pans.
pub const SCROLL_AREA_WIDTH: f32 = 200.0;

/// Static terrain tile. All blocks share one `BlockImage`; the rect always
/// matches the image dimensions so mask tests and edge snapping agree.
pub struct Block {
    pub rect: Rect,
    image: Arc<BlockImage>,
}

impl Block {
    pub fn new(x: f32, y: f32, image: Arc<BlockImage>) -> Self {
        let side = image.side as f32;
        Self {
            rect: Rect::new(x, y, side, side),
            image,
        }
    }

    pub fn mask(&self) -> &Mask {
        &self.image.mask
    }
}

/// The player character bound to the shared sprite table.
pub struct PlayerAvatar {
    pub player: Player,
    sheets: Arc<SheetTable>,
    clip_key: String,
    frame_index: usize,
}

impl PlayerAvatar {
    pub fn new(x: f32, y: f32, w: f32, h: f32, sheets: Arc<SheetTable>) -> Self {
        let mut avatar = Self {
            player: Player::new(x, y, w, h),
            sheets,
            clip_key: String::new(),
            frame_index: 0,
        };
        avatar.refresh_sprite();
        avatar
    }

    pub fn current_frame(&self) -> &SpriteFrame {
        &self.sheets[&self.clip_key][self.frame_index]
    }

    pub fn mask(&self) -> &Mask {
        &self.current_frame().mask
    }

    /// Re-select the active clip and frame from the player's motion state,
    /// then adopt that frame's dimensions and mask. The rect keeps its
    /// top-left corner; only the size follows the frame.
    pub fn refresh_sprite(&mut self) {
        let clip = self.player.current_clip();
        let key = clip.key(self.player.facing);
        let frames = self
            .sheets
            .get(&key)
            .expect("clip table is validated at startup");
        self.frame_index = self.player.animator.frame_index(frames.len());
        let (w, h) = frames[self.frame_index].image.dimensions();
        self.clip_key = key;
        self.player.rect.resize(w as f32, h as f32);
    }
}

/// Lay out the level: a floor strip spanning one viewport to the left and
/// two to the right, plus two raised platforms.
pub fn build_level(block_image: &Arc<BlockImage>, viewport_w: u32, viewport_h: u32) -> Vec<Block> {
    let side = block_image.side as f32;
    let side_i = block_image.side as i64;
    let floor_y = viewport_h as f32 - side;

    let first = (-(viewport_w as i64)).div_euclid(side_i);
    let last = (viewport_w as i64 * 2).div_euclid(side_i);
    let mut blocks: Vec<Block> = (first..last)
        .map(|i| Block::new(i as f32 * side, floor_y, Arc::clone(block_image)))
        .collect();

    blocks.push(Block::new(
        0.0,
        viewport_h as f32 - side * 2.0,
        Arc::clone(block_image),
    ));
    blocks.push(Block::new(
        side * 3.0,
        viewport_h as f32 - side * 4.0,
        Arc::clone(block_image),
    ));

    log::info!("Level built: {} blocks, floor at y = {}", blocks.len(), floor_y);
    blocks
}

/// Pan the camera only while the player is inside the edge scroll bands
/// and moving further toward that edge. World positions are untouched;
/// only the render offset moves.
pub fn update_scroll(offset_x: f32, player: &Player, viewport_w: f32) -> f32 {
    let entering_right =
        player.rect.right() - offset_x >= viewport_w - SCROLL_AREA_WIDTH && player.x_vel > 0.0;
    let entering_left = player.rect.left() - offset_x <= SCROLL_AREA_WIDTH && player.x_vel < 0.0;

    if entering_right || entering_left {
        offset_x + player.x_vel
    } else {
        offset_x
    }
}
