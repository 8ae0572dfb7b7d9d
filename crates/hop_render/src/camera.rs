//! Pixel-space camera with a horizontal scroll offset.
//!
//! World coordinates match the screen convention the simulation uses:
//! origin at the top-left, y growing downward, one unit per pixel. The
//! projection maps `[offset_x, offset_x + w] x [0, h]` onto clip space, so
//! scrolling is purely a render-side translation -- entity world positions
//! never move with the camera.

use glam::Mat4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

pub struct Camera2D {
    pub offset_x: f32,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            offset_x: 0.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let w = self.viewport.0 as f32;
        let h = self.viewport.1 as f32;

        // Bottom/top swapped relative to the usual GL setup to get y-down.
        let proj = Mat4::orthographic_rh(self.offset_x, self.offset_x + w, h, 0.0, -1.0, 1.0);

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}
