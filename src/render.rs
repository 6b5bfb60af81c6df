//! Handing simulated state over to an outside renderer.

use crate::{
    num::Float,
    scene::{Color, FaceTextures, NodeID},
};
use nalgebra::{Matrix4, Point3};
use std::fmt;

/// Everything a renderer needs to draw one cube.
#[derive(Clone, Debug)]
pub struct CubeRenderData<F: Float> {
    pub node_id: NodeID,
    /// Whether the cube is the static boundary enclosing the simulation.
    pub is_boundary: bool,
    /// Homogeneous matrix mapping the cube's local space into world space.
    pub local_to_world: Matrix4<F>,
    /// The eight corners of the cube in world space.
    pub vertices: [Point3<F>; 8],
    pub size: F,
    pub is_filled: bool,
    pub is_colliding: bool,
    pub color: Color,
    pub face_textures: FaceTextures,
}

/// A receiver of the cubes to display for each simulated frame.
pub trait RenderSink<F: Float>: fmt::Debug {
    /// Called before the cubes of a new frame are handed over.
    fn begin_frame(&mut self, tick: u64);

    /// Called once for every cube in the frame, in scene graph order.
    fn render_cube(&mut self, cube: &CubeRenderData<F>);

    /// Called after all cubes of the frame have been handed over.
    fn end_frame(&mut self);
}

/// A [`RenderSink`] that logs a short summary of each frame.
#[derive(Clone, Debug, Default)]
pub struct LoggingRenderSink {
    tick: u64,
    n_cubes: usize,
    n_colliding_cubes: usize,
    n_frames: u64,
}

/// A [`RenderSink`] that keeps every frame it receives.
#[derive(Clone, Debug)]
pub struct RecordingRenderSink<F: Float> {
    frames: Vec<RecordedFrame<F>>,
}

/// The cubes handed to a [`RecordingRenderSink`] for one frame.
#[derive(Clone, Debug)]
pub struct RecordedFrame<F: Float> {
    pub tick: u64,
    pub cubes: Vec<CubeRenderData<F>>,
}

impl LoggingRenderSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of frames that have been completed.
    pub fn n_frames(&self) -> u64 {
        self.n_frames
    }
}

impl<F: Float> RenderSink<F> for LoggingRenderSink {
    fn begin_frame(&mut self, tick: u64) {
        self.tick = tick;
        self.n_cubes = 0;
        self.n_colliding_cubes = 0;
    }

    fn render_cube(&mut self, cube: &CubeRenderData<F>) {
        if cube.is_boundary {
            return;
        }
        self.n_cubes += 1;
        if cube.is_colliding {
            self.n_colliding_cubes += 1;
        }
        log::trace!(
            "Cube {:?} at {:?} (color {})",
            cube.node_id,
            cube.local_to_world.fixed_view::<3, 1>(0, 3),
            cube.color
        );
    }

    fn end_frame(&mut self) {
        self.n_frames += 1;
        log::info!(
            "Frame {}: {} cubes, {} colliding",
            self.tick,
            self.n_cubes,
            self.n_colliding_cubes
        );
    }
}

impl<F: Float> RecordingRenderSink<F> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Returns all recorded frames, oldest first.
    pub fn frames(&self) -> &[RecordedFrame<F>] {
        &self.frames
    }

    /// Returns the most recently recorded frame, if any.
    pub fn last_frame(&self) -> Option<&RecordedFrame<F>> {
        self.frames.last()
    }
}

impl<F: Float> Default for RecordingRenderSink<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> RenderSink<F> for RecordingRenderSink<F> {
    fn begin_frame(&mut self, tick: u64) {
        self.frames.push(RecordedFrame {
            tick,
            cubes: Vec::new(),
        });
    }

    fn render_cube(&mut self, cube: &CubeRenderData<F>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.cubes.push(cube.clone());
        } else {
            log::warn!("Cube handed to render sink outside of a frame");
        }
    }

    fn end_frame(&mut self) {}
}

impl<F: Float> RecordedFrame<F> {
    /// Returns the data of the non-boundary cubes in the frame.
    pub fn dynamic_cubes(&self) -> impl Iterator<Item = &CubeRenderData<F>> {
        self.cubes.iter().filter(|cube| !cube.is_boundary)
    }

    /// Returns the data of the boundary cube, if it was drawn.
    pub fn boundary(&self) -> Option<&CubeRenderData<F>> {
        self.cubes.iter().find(|cube| cube.is_boundary)
    }
}
