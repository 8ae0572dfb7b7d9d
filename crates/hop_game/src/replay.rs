//! Scripted input sequences for deterministic simulation tests.
//!
//! A replay is a JSON list of input frames with repeat counts, expanded
//! into one `FrameInput` per fixed step. Tests drive the full
//! jump/gravity/collision path with them and assert on the final state.
//! Jump is edge-triggered: scripts that mean "one jump" use `repeat: 1`.

use crate::collision::FrameInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayScript {
    #[serde(default = "default_fps")]
    pub fps: u32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub jump: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayScript {
    pub fn expanded_inputs(&self) -> Vec<FrameInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(FrameInput {
                    left: frame.left,
                    right: frame.right,
                    jump: frame.jump,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplayScript, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplayScript = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplayScript) -> Result<(), String> {
    if replay.fps == 0 {
        return Err("Replay validation failed: fps must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_fps() -> u32 {
    60
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::advance;
    use crate::sheets::{alpha_mask, SheetTable, SpriteFrame};
    use crate::terrain::BlockImage;
    use crate::world::{build_level, update_scroll, Block, PlayerAvatar, PLAYER_VEL};
    use hop_core::animation::{Clip, Facing};
    use hop_core::mask::Mask;
    use image::{Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hop_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn make_sheets(frame_w: u32, frame_h: u32) -> Arc<SheetTable> {
        let mut table: SheetTable = HashMap::new();
        for clip in [
            Clip::Idle,
            Clip::Run,
            Clip::Jump,
            Clip::DoubleJump,
            Clip::Fall,
        ] {
            for facing in [Facing::Left, Facing::Right] {
                let key = clip.key(facing);
                let image =
                    RgbaImage::from_pixel(frame_w, frame_h, Rgba([255, 255, 255, 255]));
                let mask = alpha_mask(&image);
                table.insert(
                    key.clone(),
                    vec![SpriteFrame {
                        id: format!("{key}#0"),
                        image,
                        mask,
                    }],
                );
            }
        }
        Arc::new(table)
    }

    fn sample_level() -> Vec<Block> {
        let block_image = Arc::new(BlockImage {
            image: RgbaImage::from_pixel(96, 96, Rgba([0, 255, 0, 255])),
            mask: Mask::solid(96, 96),
            side: 96,
        });
        build_level(&block_image, 800, 600)
    }

    fn make_avatar() -> PlayerAvatar {
        PlayerAvatar::new(100.0, 100.0, 50.0, 50.0, make_sheets(50, 50))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "right": true, "repeat": 3 },
                { "jump": true }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        assert_eq!(replay.fps, 60);
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 4);
        assert!(expanded[0].right && !expanded[0].jump);
        assert!(expanded[3].jump);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_empty_frame_list() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("empty frames should fail");
        assert!(err.contains("frames list is empty"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "right": true, "repeat": 60 },
                { "right": true, "jump": true },
                { "right": true, "repeat": 120 },
                { "left": true, "repeat": 45 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let inputs = replay.expanded_inputs();
        let blocks = sample_level();

        let mut run_a = make_avatar();
        let mut run_b = make_avatar();
        for input in &inputs {
            advance(&mut run_a, &blocks, *input, replay.fps);
        }
        for input in &inputs {
            advance(&mut run_b, &blocks, *input, replay.fps);
        }

        assert_eq!(run_a.player.rect, run_b.player.rect);
        assert_eq!(run_a.player.x_vel, run_b.player.x_vel);
        assert_eq!(run_a.player.y_vel, run_b.player.y_vel);
        assert_eq!(run_a.player.jump_count, run_b.player.jump_count);
        assert_eq!(run_a.player.fall_count, run_b.player.fall_count);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn free_fall_script_lands_on_the_floor() {
        let path = temp_file_path("landing");
        fs::write(&path, r#"{ "frames": [ { "repeat": 600 } ] }"#).expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let blocks = sample_level();
        let mut avatar = make_avatar();

        // The floor top sits at y = 600 - 96. A resting player re-contacts
        // it every few steps as sub-pixel gravity re-accumulates, and each
        // contact must reset exactly the fall state.
        let mut landings = 0;
        for input in replay.expanded_inputs() {
            advance(&mut avatar, &blocks, input, replay.fps);
            if avatar.player.rect.bottom() == 504.0 {
                landings += 1;
                assert_eq!(avatar.player.y_vel, 0.0);
                assert_eq!(avatar.player.fall_count, 0);
                assert_eq!(avatar.player.jump_count, 0);
            }
        }
        assert!(landings > 0, "player came to rest on the floor");
        assert!(
            avatar.player.rect.bottom() < 505.0,
            "player never sinks visibly below the floor top"
        );
    }

    #[test]
    fn running_right_scrolls_the_camera_by_player_velocity() {
        let path = temp_file_path("scroll");
        fs::write(&path, r#"{ "frames": [ { "right": true, "repeat": 240 } ] }"#)
            .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let blocks = sample_level();
        let mut avatar = make_avatar();
        let mut offset_x = 0.0;
        let mut deltas = Vec::new();

        for input in replay.expanded_inputs() {
            advance(&mut avatar, &blocks, input, replay.fps);
            let next = update_scroll(offset_x, &avatar.player, 800.0);
            deltas.push(next - offset_x);
            offset_x = next;
        }

        // The camera holds still inside the middle band, then follows at
        // exactly the player's velocity per step.
        assert!(deltas.iter().all(|&d| d == 0.0 || d == PLAYER_VEL));
        assert!(deltas.iter().any(|&d| d == 0.0));
        assert!(offset_x > 0.0, "player reached the right scroll band");

        let _ = fs::remove_file(path);
    }
}
