//! Main loop driving simulation and rendering.

use crate::{physics::fph, render::RenderSink, scene::TextureProvider, world::World};
use serde::{Deserialize, Serialize};
use std::{
    num::NonZeroU32,
    thread,
    time::{Duration, Instant},
};

/// A loop driving simulation and rendering of a [`World`].
///
/// Each iteration polls the texture provider for new face textures, advances
/// the world by one tick and hands the resulting frame to the render sink.
#[derive(Debug)]
pub struct GameLoop {
    world: World,
    texture_provider: Box<dyn TextureProvider>,
    render_sink: Box<dyn RenderSink<fph>>,
    frame_rate_tracker: FrameDurationTracker,
    start_time: Instant,
    previous_iter_end_time: Instant,
    n_iterations: u64,
    stop_requested: bool,
    config: GameLoopConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameLoopConfig {
    /// Upper limit on the number of iterations per second.
    pub max_fps: Option<NonZeroU32>,
    /// Number of iterations after which [`GameLoop::run`] returns. The loop
    /// runs until stopped if this is [`None`].
    pub max_ticks: Option<u64>,
}

#[derive(Clone, Debug)]
struct GenericFrameDurationTracker<const N_FRAMES: usize> {
    last_frame_durations: [Duration; N_FRAMES],
    idx_of_oldest: usize,
}

type FrameDurationTracker = GenericFrameDurationTracker<10>;

impl GameLoop {
    pub fn new(
        world: World,
        texture_provider: Box<dyn TextureProvider>,
        render_sink: Box<dyn RenderSink<fph>>,
        config: GameLoopConfig,
    ) -> Self {
        let frame_rate_tracker = FrameDurationTracker::default();
        let start_time = Instant::now();
        let previous_iter_end_time = start_time;
        Self {
            world,
            texture_provider,
            render_sink,
            frame_rate_tracker,
            start_time,
            previous_iter_end_time,
            n_iterations: 0,
            stop_requested: false,
            config,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the number of iterations performed so far.
    pub fn n_iterations(&self) -> u64 {
        self.n_iterations
    }

    /// Makes [`GameLoop::run`] return before performing another iteration.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    /// Whether the loop has been stopped or has reached its iteration limit.
    pub fn should_stop(&self) -> bool {
        self.stop_requested
            || self
                .config
                .max_ticks
                .is_some_and(|max_ticks| self.n_iterations >= max_ticks)
    }

    /// Performs iterations until the loop is stopped or reaches its iteration
    /// limit.
    ///
    /// # Returns
    /// The total number of iterations performed.
    pub fn run(&mut self) -> u64 {
        with_timing_info_logging!("Running game loop"; {
            while !self.should_stop() {
                self.perform_iteration();
            }
        });
        log::info!(
            "Game loop finished after {} iterations (~{} FPS)",
            self.n_iterations,
            self.smooth_fps()
        );
        self.n_iterations
    }

    pub fn perform_iteration(&mut self) {
        if let Some(face_textures) = self.texture_provider.next_face_textures() {
            self.world.supply_face_textures(face_textures);
        }

        self.world.update();
        self.world.draw(&mut *self.render_sink);

        let iter_end_time = self.wait_for_target_frame_duration();

        let iter_duration = iter_end_time - self.previous_iter_end_time;
        self.frame_rate_tracker.add_frame_duration(iter_duration);
        self.previous_iter_end_time = iter_end_time;
        self.n_iterations += 1;

        log::debug!(
            "Completed game loop iteration {} after {:.1} ms",
            self.n_iterations,
            iter_duration.as_secs_f64() * 1e3
        );
    }

    pub fn smooth_frame_duration(&self) -> Duration {
        self.frame_rate_tracker.compute_smooth_frame_duration()
    }

    pub fn smooth_fps(&self) -> u32 {
        frame_duration_to_fps(self.smooth_frame_duration())
    }

    pub fn elapsed_time(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn wait_for_target_frame_duration(&self) -> Instant {
        let mut iter_end_time = Instant::now();
        if let Some(min_frame_duration) = self.config.min_frame_duration() {
            let target_end_time = self.previous_iter_end_time + min_frame_duration;

            while iter_end_time < target_end_time {
                let remaining_duration = target_end_time - iter_end_time;

                if remaining_duration > Duration::from_millis(1) {
                    thread::sleep(remaining_duration - Duration::from_micros(500));
                } else {
                    // Busy-wait for the final microseconds
                    std::hint::spin_loop();
                }

                iter_end_time = Instant::now();
            }
        };
        iter_end_time
    }
}

impl<const N_FRAMES: usize> GenericFrameDurationTracker<N_FRAMES> {
    fn new(initial_frame_duration: Duration) -> Self {
        let last_frame_durations = [initial_frame_duration; N_FRAMES];
        Self {
            last_frame_durations,
            idx_of_oldest: 0,
        }
    }

    fn compute_smooth_frame_duration(&self) -> Duration {
        let total_duration: Duration = self.last_frame_durations.iter().sum();
        total_duration.div_f64(N_FRAMES as f64)
    }

    fn add_frame_duration(&mut self, frame_duration: Duration) {
        self.last_frame_durations[self.idx_of_oldest] = frame_duration;
        self.idx_of_oldest = (self.idx_of_oldest + 1) % N_FRAMES;
    }
}

impl<const N_FRAMES: usize> Default for GenericFrameDurationTracker<N_FRAMES> {
    fn default() -> Self {
        Self::new(fps_to_frame_duration(30))
    }
}

fn frame_duration_to_fps(duration: Duration) -> u32 {
    (1.0 / duration.as_secs_f64()).round() as u32
}

fn fps_to_frame_duration(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps))
}

impl GameLoopConfig {
    fn min_frame_duration(&self) -> Option<Duration> {
        self.max_fps.map(|fps| fps_to_frame_duration(fps.get()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        render::CubeRenderData,
        scene::{FaceTextures, NoTextureProvider, StaticTextureProvider},
        world::WorldConfig,
    };
    use approx::assert_abs_diff_eq;
    use image::RgbaImage;
    use std::{cell::Cell, rc::Rc, sync::Arc};

    #[derive(Debug, Default)]
    struct FrameCounter {
        n_frames: Rc<Cell<u64>>,
        n_textured_cubes: Rc<Cell<u64>>,
    }

    impl RenderSink<fph> for FrameCounter {
        fn begin_frame(&mut self, _tick: u64) {}

        fn render_cube(&mut self, cube: &CubeRenderData<fph>) {
            if cube.face_textures.front.is_some() {
                self.n_textured_cubes.set(self.n_textured_cubes.get() + 1);
            }
        }

        fn end_frame(&mut self) {
            self.n_frames.set(self.n_frames.get() + 1);
        }
    }

    fn world() -> World {
        World::with_seed(WorldConfig::default(), 0).unwrap()
    }

    #[test]
    fn frame_duration_tracker_averages_recent_frames() {
        let mut tracker = GenericFrameDurationTracker::<2>::new(Duration::from_millis(10));
        tracker.add_frame_duration(Duration::from_millis(30));
        assert_eq!(
            tracker.compute_smooth_frame_duration(),
            Duration::from_millis(20)
        );
        tracker.add_frame_duration(Duration::from_millis(30));
        tracker.add_frame_duration(Duration::from_millis(50));
        assert_eq!(
            tracker.compute_smooth_frame_duration(),
            Duration::from_millis(40)
        );
    }

    #[test]
    fn fps_and_frame_duration_convert_to_each_other() {
        assert_abs_diff_eq!(fps_to_frame_duration(50).as_secs_f64(), 0.02, epsilon = 1e-9);
        assert_eq!(frame_duration_to_fps(Duration::from_millis(20)), 50);
    }

    #[test]
    fn running_loop_stops_at_tick_limit() {
        let counter = FrameCounter::default();
        let n_frames = Rc::clone(&counter.n_frames);
        let mut game_loop = GameLoop::new(
            world(),
            Box::new(NoTextureProvider),
            Box::new(counter),
            GameLoopConfig {
                max_fps: None,
                max_ticks: Some(4),
            },
        );

        assert_eq!(game_loop.run(), 4);
        assert_eq!(n_frames.get(), 4);
        assert_eq!(game_loop.world().tick_count(), 4);
        assert!(game_loop.should_stop());
    }

    #[test]
    fn stopped_loop_performs_no_iterations() {
        let mut game_loop = GameLoop::new(
            world(),
            Box::new(NoTextureProvider),
            Box::new(FrameCounter::default()),
            GameLoopConfig::default(),
        );
        game_loop.stop();
        assert_eq!(game_loop.run(), 0);
        assert_eq!(game_loop.world().tick_count(), 0);
    }

    #[test]
    fn supplied_textures_reach_render_sink() {
        let counter = FrameCounter::default();
        let n_textured_cubes = Rc::clone(&counter.n_textured_cubes);
        let provider =
            StaticTextureProvider::new(FaceTextures::uniform(Arc::new(RgbaImage::new(1, 1))));
        let mut game_loop = GameLoop::new(
            world(),
            Box::new(provider),
            Box::new(counter),
            GameLoopConfig::default(),
        );

        game_loop.perform_iteration();

        let n_cubes = game_loop.world().n_cubes() as u64;
        assert_eq!(n_textured_cubes.get(), n_cubes);
    }

    #[test]
    fn frame_rate_is_capped() {
        let mut game_loop = GameLoop::new(
            world(),
            Box::new(NoTextureProvider),
            Box::new(FrameCounter::default()),
            GameLoopConfig {
                max_fps: NonZeroU32::new(200),
                max_ticks: Some(3),
            },
        );
        let start = Instant::now();
        game_loop.run();
        assert!(start.elapsed() >= Duration::from_millis(14));
    }
}
