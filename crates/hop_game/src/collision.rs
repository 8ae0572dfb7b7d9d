//! Per-step input application and vertical mask collision.
//!
//! Collision is resolved on the vertical axis only, after movement: a
//! descending overlap snaps the player's bottom edge onto the block and
//! lands; an ascending overlap snaps the top edge under the block and
//! bounces. Horizontal overlap is left unresolved on purpose -- see the
//! pass-through test below before changing that. Every block is tested
//! every step; with a few dozen rectangles a broad phase would cost more
//! than it saves.

use crate::world::{Block, PlayerAvatar, PLAYER_VEL};
use hop_core::rect::Rect;

/// One fixed step's worth of player input, already resolved to intents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Pixel-mask overlap between the avatar's current frame and a block.
pub fn collides(avatar: &PlayerAvatar, block: &Block) -> bool {
    // Masks match their rects in size, so disjoint rects cannot overlap;
    // skip the pixel walk for the common far-apart case.
    if !avatar.player.rect.intersects(&block.rect) {
        return false;
    }
    let (dx, dy) = mask_offset(&avatar.player.rect, &block.rect);
    avatar.mask().overlaps(block.mask(), dx, dy)
}

fn mask_offset(player_rect: &Rect, block_rect: &Rect) -> (i32, i32) {
    (
        (block_rect.x - player_rect.x).round() as i32,
        (block_rect.y - player_rect.y).round() as i32,
    )
}

/// Resolve vertical overlaps against every block. `dy` is the vertical
/// velocity the movement was integrated with; its sign picks the response.
/// Returns the indices of the blocks hit.
pub fn handle_vertical_collision(
    avatar: &mut PlayerAvatar,
    blocks: &[Block],
    dy: f32,
) -> Vec<usize> {
    let mut hit = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        if !collides(avatar, block) {
            continue;
        }
        if dy > 0.0 {
            avatar.player.rect.set_bottom(block.rect.top());
            avatar.player.landed();
        } else if dy < 0.0 {
            avatar.player.rect.set_top(block.rect.bottom());
            avatar.player.hit_head();
        }
        hit.push(index);
    }
    hit
}

/// Advance the player one fixed step: jump intent, gravity integration and
/// movement, sprite refresh, horizontal intent for the next integration,
/// then vertical collision against the world.
///
/// The jump gate lives here, at the caller: `Player::jump` is never
/// invoked once both jumps are spent.
pub fn advance(avatar: &mut PlayerAvatar, blocks: &[Block], input: FrameInput, fps: u32) {
    if input.jump && avatar.player.can_jump() {
        avatar.player.jump();
    }

    avatar.player.step(fps);
    avatar.refresh_sprite();

    avatar.player.x_vel = 0.0;
    if input.left {
        avatar.player.run_left(PLAYER_VEL);
    }
    if input.right {
        avatar.player.run_right(PLAYER_VEL);
    }

    let dy = avatar.player.y_vel;
    handle_vertical_collision(avatar, blocks, dy);
}
