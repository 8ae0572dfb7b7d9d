//! Player kinematics: gravity ramp, jump bookkeeping, and motion state.
//!
//! The gravity ramp is frame-counted rather than force-based: each step the
//! fall counter grows and the downward velocity increment is
//! `min(1, (fall_count / fps) * GRAVITY)`, so a character that just left a
//! ledge eases into the fall instead of snapping to terminal velocity. The
//! counter resets on landing and on a grounded jump, restarting the ramp.

use crate::animation::{select_clip, Animator, Clip, Facing};
use crate::rect::Rect;

pub const GRAVITY: f32 = 1.0;

/// Multiple of `GRAVITY` applied (negative) as the jump impulse.
const JUMP_IMPULSE: f32 = 8.0;

/// Maximum chained jumps: one from the ground plus one mid-air.
pub const MAX_JUMPS: u8 = 2;

#[derive(Debug, Clone)]
pub struct Player {
    pub rect: Rect,
    pub x_vel: f32,
    pub y_vel: f32,
    pub facing: Facing,
    pub animator: Animator,
    pub fall_count: u32,
    pub jump_count: u8,
}

impl Player {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            x_vel: 0.0,
            y_vel: 0.0,
            facing: Facing::Left,
            animator: Animator::new(),
            fall_count: 0,
            jump_count: 0,
        }
    }

    /// One fixed step of integration: ramp gravity into the vertical
    /// velocity, move by the current velocities, advance the animation
    /// counter. Collision response runs separately, after movement.
    pub fn step(&mut self, fps: u32) {
        self.fall_count += 1;
        self.y_vel += (self.fall_count as f32 / fps as f32 * GRAVITY).min(1.0);
        self.rect.translate(self.x_vel, self.y_vel);
        self.animator.advance();
    }

    /// Launch a jump. Callers gate on `can_jump()`; the second press chains
    /// into a double jump mid-air. Only the grounded jump restarts the
    /// gravity ramp -- a double jump keeps the accumulated fall time.
    pub fn jump(&mut self) {
        self.y_vel = -GRAVITY * JUMP_IMPULSE;
        self.animator.reset();
        self.jump_count += 1;
        if self.jump_count == 1 {
            self.fall_count = 0;
        }
    }

    pub fn can_jump(&self) -> bool {
        self.jump_count < MAX_JUMPS
    }

    /// Landing on top of a block: kill vertical motion and restore both
    /// jumps.
    pub fn landed(&mut self) {
        self.fall_count = 0;
        self.y_vel = 0.0;
        self.jump_count = 0;
    }

    /// Head bump against a block's underside: bounce back down.
    pub fn hit_head(&mut self) {
        self.y_vel = -self.y_vel;
    }

    pub fn run_left(&mut self, vel: f32) {
        self.x_vel = -vel;
        if self.facing != Facing::Left {
            self.facing = Facing::Left;
            self.animator.reset();
        }
    }

    pub fn run_right(&mut self, vel: f32) {
        self.x_vel = vel;
        if self.facing != Facing::Right {
            self.facing = Facing::Right;
            self.animator.reset();
        }
    }

    /// Clip to display this step, from current motion state.
    pub fn current_clip(&self) -> Clip {
        select_clip(self.x_vel, self.y_vel, self.jump_count, GRAVITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_applies_one_ramp_increment() {
        let mut player = Player::new(100.0, 100.0, 50.0, 50.0);
        player.step(60);
        let expected = (1.0 / 60.0_f32).min(1.0);
        assert!((player.y_vel - expected).abs() < 1e-6);
        assert!((player.rect.y - (100.0 + expected)).abs() < 1e-6);
        assert_eq!(player.rect.x, 100.0);
    }

    #[test]
    fn gravity_increment_caps_at_one() {
        let mut player = Player::new(0.0, 0.0, 50.0, 50.0);
        // Long free fall: increments approach but never exceed 1 per step.
        let mut last = 0.0;
        for _ in 0..600 {
            player.step(60);
            let increment = player.y_vel - last;
            assert!(increment <= 1.0 + 1e-6);
            last = player.y_vel;
        }
        // Deep into the fall the ramp is saturated at exactly 1 per step.
        let before = player.y_vel;
        player.step(60);
        assert!((player.y_vel - before - 1.0).abs() < 1e-6);
    }

    #[test]
    fn double_jump_is_the_limit() {
        let mut player = Player::new(0.0, 0.0, 50.0, 50.0);
        assert!(player.can_jump());
        player.jump();
        assert_eq!(player.jump_count, 1);
        assert!(player.can_jump());
        player.jump();
        assert_eq!(player.jump_count, 2);
        assert!(!player.can_jump());
    }

    #[test]
    fn grounded_jump_restarts_gravity_ramp() {
        let mut player = Player::new(0.0, 0.0, 50.0, 50.0);
        for _ in 0..30 {
            player.step(60);
        }
        assert!(player.fall_count > 0);
        player.jump();
        assert_eq!(player.fall_count, 0);
        assert!((player.y_vel - (-GRAVITY * 8.0)).abs() < 1e-6);

        // The mid-air jump keeps the accumulated fall time.
        player.step(60);
        let fall_before = player.fall_count;
        player.jump();
        assert_eq!(player.fall_count, fall_before);
    }

    #[test]
    fn landed_resets_exactly_fall_velocity_and_jumps() {
        let mut player = Player::new(0.0, 0.0, 50.0, 50.0);
        player.jump();
        for _ in 0..120 {
            player.step(60);
        }
        assert!(player.y_vel > 0.0, "should be descending by now");
        player.landed();
        assert_eq!(player.fall_count, 0);
        assert_eq!(player.y_vel, 0.0);
        assert_eq!(player.jump_count, 0);
    }

    #[test]
    fn hit_head_reverses_vertical_velocity() {
        let mut player = Player::new(0.0, 0.0, 50.0, 50.0);
        player.y_vel = -6.0;
        player.hit_head();
        assert_eq!(player.y_vel, 6.0);
    }

    #[test]
    fn turning_around_restarts_the_animation() {
        let mut player = Player::new(0.0, 0.0, 50.0, 50.0);
        player.run_right(5.0);
        for _ in 0..10 {
            player.animator.advance();
        }
        player.run_right(5.0);
        assert_ne!(player.animator.frame_index(12), 0, "same direction keeps phase");
        player.run_left(5.0);
        assert_eq!(player.animator.frame_index(12), 0);
        assert_eq!(player.facing, Facing::Left);
        assert_eq!(player.x_vel, -5.0);
    }
}
