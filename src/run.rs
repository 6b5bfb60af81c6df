//! Setting up and running a simulation.

use crate::{
    game_loop::{GameLoop, GameLoopConfig},
    io,
    render::LoggingRenderSink,
    scene::{FaceTextures, NoTextureProvider, StaticTextureProvider, TextureProvider},
    world::{World, WorldConfig},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a full simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub game_loop: GameLoopConfig,
}

/// Options for a simulation run that are not part of the configuration file.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Seed for generating the cubes. A random seed is used if [`None`].
    pub seed: Option<u64>,
    /// Image files to texture the left, front and right face of every cube
    /// with.
    pub left_texture_path: Option<PathBuf>,
    pub front_texture_path: Option<PathBuf>,
    pub right_texture_path: Option<PathBuf>,
}

/// Runs the simulation headless with the given configuration, logging every
/// frame, until the iteration limit of the game loop is reached.
///
/// # Returns
/// The number of iterations performed.
pub fn run(config: SimulationConfig, options: RunOptions) -> Result<u64> {
    init_logging()?;
    let mut game_loop = init_game_loop(config, &options)?;
    Ok(game_loop.run())
}

/// Creates a game loop for the given configuration, with a [`World`] of
/// randomly generated cubes and a [`LoggingRenderSink`].
pub fn init_game_loop(config: SimulationConfig, options: &RunOptions) -> Result<GameLoop> {
    let world = match options.seed {
        Some(seed) => World::with_seed(config.world, seed)?,
        None => World::new(config.world)?,
    };

    let face_textures = load_face_textures(options)?;
    let texture_provider: Box<dyn TextureProvider> = if face_textures.is_empty() {
        Box::new(NoTextureProvider)
    } else {
        Box::new(StaticTextureProvider::new(face_textures))
    };

    Ok(GameLoop::new(
        world,
        texture_provider,
        Box::new(LoggingRenderSink::new()),
        config.game_loop,
    ))
}

fn init_logging() -> Result<()> {
    env_logger::init();
    Ok(())
}

fn load_face_textures(options: &RunOptions) -> Result<FaceTextures> {
    let load = |path: &Option<PathBuf>| path.as_deref().map(io::load_texture_image).transpose();
    Ok(FaceTextures::new(
        load(&options.left_texture_path)?,
        load(&options.front_texture_path)?,
        load(&options.right_texture_path)?,
    ))
}

/// Writes the default simulation configuration to the given path.
pub fn write_default_config(output_path: impl AsRef<Path>) -> Result<()> {
    io::write_ron_file(&SimulationConfig::default(), output_path)
}
