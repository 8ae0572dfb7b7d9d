//! Blockhop -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. All
//! simulation runs inside `RedrawRequested` using a **fixed-timestep** model
//! (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- consume fixed 1/60 s slices: jump intent,
//!      gravity integration, sprite refresh, vertical mask collision,
//!      camera scroll
//!   3. Rebuild the sprite mesh (backdrop tiles, blocks, player)
//!   4. Upload camera uniform, issue batched draw calls, composite the
//!      egui debug overlay
//!
//! Every animation frame is uploaded as its own small texture at startup;
//! the mesh builder emits quads in painter's order and consecutive quads
//! sharing a texture collapse into one draw call.

mod backdrop;
mod collision;
#[cfg(test)]
mod replay;
mod sheets;
mod terrain;
mod world;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use backdrop::{load_backdrop, Backdrop};
use collision::FrameInput;
use sheets::{load_sprite_sheets, validate_required_clips};
use terrain::load_block;
use world::{build_level, update_scroll, Block, PlayerAvatar};

use hop_core::input::{InputState, Key};
use hop_core::time::TimeState;
use hop_devtools::{DebugOverlay, OverlayStats};
use hop_platform::window::PlatformConfig;
use hop_render::{Camera2D, GpuContext, SpritePipeline, SpriteVertex, Texture};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const FPS: u32 = 60;
const ASSETS_ROOT: &str = "assets";
const CHARACTER_SET: (&str, &str) = ("MainCharacters", "MaskDude");
const FRAME_SIZE: u32 = 32;
// 48px source cut, 96px on screen after the 2x display scale.
const BLOCK_SIZE: u32 = 48;
const BACKGROUND_NAME: &str = "Pink.png";
const PLAYER_START: (f32, f32) = (100.0, 100.0);
const PLAYER_START_SIZE: (f32, f32) = (50.0, 50.0);
const BLOCK_TEXTURE_KEY: &str = "__block";
const BACKDROP_TEXTURE_KEY: &str = "__backdrop";

/// A contiguous run of indices that share the same texture binding.
/// Draw calls are merged when consecutive quads use the same texture,
/// minimizing GPU bind-group switches during the render pass.
#[derive(Debug, Clone)]
struct DrawCall {
    texture_key: Arc<str>,
    index_start: u32,
    index_count: u32,
}

struct QuadSpec<'a> {
    texture_key: &'a str,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

/// All mutable engine state lives here. Constructed lazily in
/// `ApplicationHandler::resumed` once the window and GPU surface exist.
/// The camera scroll offset is a field of this context, threaded through
/// each frame -- there is no process-wide mutable state.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    debug_overlay: DebugOverlay,

    backdrop: Backdrop,
    avatar: PlayerAvatar,
    blocks: Vec<Block>,
    paused: bool,
    single_step_requested: bool,
    textures: HashMap<Arc<str>, wgpu::BindGroup>,

    // --- Per-frame GPU mesh state -----------------------------------------
    // The sprite mesh is rebuilt on the CPU after each simulated frame, then
    // streamed into these buffers. Buffers grow (power-of-two) but never
    // shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    draw_calls: Vec<DrawCall>,
    sprite_count: usize,
}

impl EngineState {
    fn new(window: Arc<Window>) -> Self {
        let gpu = GpuContext::new(window.clone());
        let time = TimeState::new(FPS);
        let input = InputState::new();
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        // Asset loading happens once, before the loop. Any failure here is
        // fatal: there is no recovery path once the game is running.
        let assets_root = Path::new(ASSETS_ROOT);
        let sheets = load_sprite_sheets(
            assets_root,
            CHARACTER_SET.0,
            CHARACTER_SET.1,
            FRAME_SIZE,
            FRAME_SIZE,
            true,
        )
        .unwrap_or_else(|err| panic!("Failed to load character sprites: {err}"));
        validate_required_clips(&sheets)
            .unwrap_or_else(|err| panic!("Character sprite set is incomplete: {err}"));
        let sheets = Arc::new(sheets);

        let block_image = load_block(assets_root, BLOCK_SIZE)
            .unwrap_or_else(|err| panic!("Failed to load terrain block: {err}"));
        let block_image = Arc::new(block_image);

        let backdrop = load_backdrop(assets_root, BACKGROUND_NAME, WIDTH, HEIGHT)
            .unwrap_or_else(|err| panic!("Failed to load background: {err}"));

        let avatar = PlayerAvatar::new(
            PLAYER_START.0,
            PLAYER_START.1,
            PLAYER_START_SIZE.0,
            PLAYER_START_SIZE.1,
            Arc::clone(&sheets),
        );
        let blocks = build_level(&block_image, WIDTH, HEIGHT);

        // One texture per animation frame plus the shared block and
        // backdrop images. Small textures, uploaded once, never mutated.
        let mut textures: HashMap<Arc<str>, wgpu::BindGroup> = HashMap::new();
        for frames in sheets.values() {
            for frame in frames {
                let texture = Texture::from_image(&gpu.device, &gpu.queue, &frame.image, &frame.id);
                let bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &texture);
                textures.insert(Arc::from(frame.id.as_str()), bind_group);
            }
        }
        let block_texture =
            Texture::from_image(&gpu.device, &gpu.queue, &block_image.image, "terrain block");
        textures.insert(
            Arc::from(BLOCK_TEXTURE_KEY),
            sprite_pipeline.create_texture_bind_group(&gpu.device, &block_texture),
        );
        let backdrop_texture =
            Texture::from_image(&gpu.device, &gpu.queue, &backdrop.image, "backdrop tile");
        textures.insert(
            Arc::from(BACKDROP_TEXTURE_KEY),
            sprite_pipeline.create_texture_bind_group(&gpu.device, &backdrop_texture),
        );
        log::info!("Uploaded {} sprite textures", textures.len());

        // The camera works in the 800x600 logical pixel space of the
        // simulation regardless of the physical surface size.
        let camera = Camera2D::new(WIDTH, HEIGHT);
        let camera_uniform = camera.build_uniform();
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let mut state = Self {
            window,
            gpu,
            time,
            input,
            camera,
            sprite_pipeline,
            debug_overlay,
            backdrop,
            avatar,
            blocks,
            paused: false,
            single_step_requested: false,
            textures,
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
            draw_calls: Vec::new(),
            sprite_count: 0,
        };

        state.rebuild_mesh();
        state
    }

    fn rebuild_mesh(&mut self) {
        let (vertices, indices, draw_calls) = self.build_mesh();
        self.ensure_mesh_capacity(vertices.len(), indices.len());
        self.sprite_count = vertices.len() / 4;
        self.draw_calls = draw_calls;

        if !vertices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }
        if !indices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));
        }
    }

    /// Emit quads in painter's order: backdrop, blocks, player.
    fn build_mesh(&self) -> (Vec<SpriteVertex>, Vec<u32>, Vec<DrawCall>) {
        let quad_estimate = self.backdrop.tiles.len() + self.blocks.len() + 1;
        let mut vertices = Vec::with_capacity(quad_estimate * 4);
        let mut indices = Vec::with_capacity(quad_estimate * 6);
        let mut draw_calls = Vec::with_capacity(4);

        // The backdrop is fixed to the screen: adding the scroll offset in
        // world space cancels the camera translation exactly.
        let (tile_w, tile_h) = self.backdrop.tile_size;
        for &(tx, ty) in &self.backdrop.tiles {
            add_quad(
                &mut vertices,
                &mut indices,
                &mut draw_calls,
                QuadSpec {
                    texture_key: BACKDROP_TEXTURE_KEY,
                    x: self.camera.offset_x + tx,
                    y: ty,
                    w: tile_w as f32,
                    h: tile_h as f32,
                },
            );
        }

        for block in &self.blocks {
            add_quad(
                &mut vertices,
                &mut indices,
                &mut draw_calls,
                QuadSpec {
                    texture_key: BLOCK_TEXTURE_KEY,
                    x: block.rect.x,
                    y: block.rect.y,
                    w: block.rect.w,
                    h: block.rect.h,
                },
            );
        }

        let player_rect = self.avatar.player.rect;
        add_quad(
            &mut vertices,
            &mut indices,
            &mut draw_calls,
            QuadSpec {
                texture_key: self.avatar.current_frame().id.as_str(),
                x: player_rect.x,
                y: player_rect.y,
                w: player_rect.w,
                h: player_rect.h,
            },
        );

        (vertices, indices, draw_calls)
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn overlay_stats(&self) -> OverlayStats {
        OverlayStats {
            draw_calls: self.draw_calls.len() as u32,
            sprite_count: self.sprite_count as u32,
            player_pos: (self.avatar.player.rect.x, self.avatar.player.rect.y),
            player_vel: (self.avatar.player.x_vel, self.avatar.player.y_vel),
            jump_count: self.avatar.player.jump_count,
            fall_count: self.avatar.player.fall_count,
            scroll_offset: self.camera.offset_x,
            paused: self.paused,
        }
    }
}

struct App {
    config: PlatformConfig,
    state: Option<EngineState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = hop_platform::window::create_window(event_loop, &self.config);
        self.state = Some(EngineState::new(window));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                state.gpu.resize(physical_size.width, physical_size.height);
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(engine_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(engine_key),
                            ElementState::Released => state.input.key_up(engine_key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                // Fixed-step simulation phase. Edge-triggered keys are
                // handled on the first step only: a press is consumed
                // exactly once, never repeated across the catch-up steps
                // of a slow frame, and never dropped by a zero-step frame
                // (end_frame only runs once a step consumed the press).
                state.time.begin_frame();

                let mut jump_requested = state.input.is_just_pressed(Key::Space);

                while state.time.should_step() {
                    if state.time.steps_this_frame == 1 {
                        if state.input.is_just_pressed(Key::Escape) {
                            event_loop.exit();
                            return;
                        }
                        if state.input.is_just_pressed(Key::F3) {
                            state.debug_overlay.toggle();
                        }
                    }

                    // Skip simulation while paused (unless single-stepping).
                    if state.paused && !state.single_step_requested {
                        break;
                    }
                    state.single_step_requested = false;

                    let frame_input = FrameInput {
                        left: state.input.is_held(Key::Left) || state.input.is_held(Key::A),
                        right: state.input.is_held(Key::Right) || state.input.is_held(Key::D),
                        jump: jump_requested,
                    };
                    jump_requested = false;

                    collision::advance(&mut state.avatar, &state.blocks, frame_input, FPS);
                    state.camera.offset_x =
                        update_scroll(state.camera.offset_x, &state.avatar.player, WIDTH as f32);
                }

                if state.time.steps_this_frame > 0 {
                    state.rebuild_mesh();
                }

                // Render phase reads finalized simulation state.
                let camera_uniform = state.camera.build_uniform();
                state.gpu.queue.write_buffer(
                    &state.camera_buffer,
                    0,
                    bytemuck::cast_slice(&[camera_uniform]),
                );

                let Some((output, view)) = state.gpu.begin_frame() else {
                    return;
                };

                let stats = state.overlay_stats();
                let (egui_primitives, egui_textures_delta, overlay_actions) =
                    state
                        .debug_overlay
                        .prepare(&state.window, &state.time, &stats);

                if overlay_actions.toggle_pause {
                    state.paused = !state.paused;
                    log::info!(
                        "Simulation {}",
                        if state.paused { "PAUSED" } else { "RESUMED" }
                    );
                }
                if overlay_actions.single_step {
                    state.single_step_requested = true;
                }

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [state.gpu.size.0, state.gpu.size.1],
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let mut encoder =
                    state
                        .gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Render Encoder"),
                        });

                {
                    let mut last_bound_texture_key: Option<&str> = None;
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Scene Render Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    });

                    render_pass.set_pipeline(&state.sprite_pipeline.render_pipeline);
                    render_pass.set_bind_group(0, &state.camera_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                    for draw in &state.draw_calls {
                        let Some(bind_group) = state.textures.get(&draw.texture_key) else {
                            log::warn!("No texture uploaded for key '{}'", draw.texture_key);
                            continue;
                        };
                        if last_bound_texture_key != Some(&*draw.texture_key) {
                            render_pass.set_bind_group(1, bind_group, &[]);
                            last_bound_texture_key = Some(&draw.texture_key);
                        }
                        render_pass.draw_indexed(
                            draw.index_start..(draw.index_start + draw.index_count),
                            0,
                            0..1,
                        );
                    }
                }

                state.debug_overlay.upload(
                    &state.gpu.device,
                    &state.gpu.queue,
                    &mut encoder,
                    &egui_primitives,
                    &egui_textures_delta,
                    &screen_descriptor,
                );

                {
                    let mut egui_pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("egui Render Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            ..Default::default()
                        })
                        .forget_lifetime();

                    state
                        .debug_overlay
                        .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
                }

                state.debug_overlay.cleanup(&egui_textures_delta);

                state.gpu.queue.submit(std::iter::once(encoder.finish()));
                output.present();

                // Only clear edge-triggered input after at least one fixed
                // step consumed it. Otherwise a press that lands on a frame
                // with 0 simulation steps is silently lost.
                if state.time.steps_this_frame > 0 {
                    state.input.end_frame();
                }
            }

            _ => {}
        }
    }
}

/// Streamed mesh buffers are written every simulated frame; COPY_DST is
/// implied by that usage pattern.
fn create_stream_buffer(
    device: &wgpu::Device,
    label: &str,
    byte_len: usize,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: byte_len.max(1) as u64,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    create_stream_buffer(
        device,
        "Scene Vertex Buffer",
        vertex_capacity * std::mem::size_of::<SpriteVertex>(),
        wgpu::BufferUsages::VERTEX,
    )
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    create_stream_buffer(
        device,
        "Scene Index Buffer",
        index_capacity * std::mem::size_of::<u32>(),
        wgpu::BufferUsages::INDEX,
    )
}

fn add_quad(
    vertices: &mut Vec<SpriteVertex>,
    indices: &mut Vec<u32>,
    draw_calls: &mut Vec<DrawCall>,
    spec: QuadSpec<'_>,
) {
    let color = [1.0f32, 1.0, 1.0, 1.0];
    let base_index = vertices.len() as u32;

    // Top-left origin, y-down; v = 0 at the top of the texture.
    vertices.push(SpriteVertex {
        position: [spec.x, spec.y],
        tex_coords: [0.0, 0.0],
        color,
    });
    vertices.push(SpriteVertex {
        position: [spec.x + spec.w, spec.y],
        tex_coords: [1.0, 0.0],
        color,
    });
    vertices.push(SpriteVertex {
        position: [spec.x + spec.w, spec.y + spec.h],
        tex_coords: [1.0, 1.0],
        color,
    });
    vertices.push(SpriteVertex {
        position: [spec.x, spec.y + spec.h],
        tex_coords: [0.0, 1.0],
        color,
    });

    let draw_start = indices.len() as u32;
    indices.extend_from_slice(&[
        base_index,
        base_index + 1,
        base_index + 2,
        base_index,
        base_index + 2,
        base_index + 3,
    ]);

    push_draw_call(draw_calls, Arc::from(spec.texture_key), draw_start, 6);
}

/// Append a draw call, merging with the previous one when the texture
/// matches and indices are contiguous. Backdrop tiles and floor blocks each
/// collapse into a single `draw_indexed` this way.
fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture_key: Arc<str>,
    index_start: u32,
    index_count: u32,
) {
    match draw_calls.last_mut() {
        Some(last)
            if *last.texture_key == *texture_key
                && last.index_start + last.index_count == index_start =>
        {
            last.index_count += index_count;
        }
        _ => draw_calls.push(DrawCall {
            texture_key,
            index_start,
            index_count,
        }),
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Blockhop starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
