use anyhow::Result;

#[cfg(feature = "cli")]
mod main {
    use super::*;
    use anyhow::bail;
    use clap::{Parser, Subcommand};
    use cube_world::{
        io::parse_ron_file,
        run::{self, RunOptions, SimulationConfig},
    };
    use std::{num::NonZeroU32, path::PathBuf};

    #[derive(Debug, Parser)]
    #[command(about = "Textured cubes bouncing around inside a box", long_about = None)]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Debug, Subcommand)]
    enum Command {
        /// Run the simulation
        Run {
            /// Path to RON configuration file to use
            #[arg(short, long)]
            config: Option<PathBuf>,
            /// Number of ticks to simulate (overrides the configuration file)
            #[arg(short, long)]
            ticks: Option<u64>,
            /// Seed for generating the cubes
            #[arg(short, long)]
            seed: Option<u64>,
            /// Maximum number of ticks per second (overrides the configuration
            /// file)
            #[arg(long)]
            max_fps: Option<NonZeroU32>,
            /// Image to texture the left face of every cube with
            #[arg(long)]
            left: Option<PathBuf>,
            /// Image to texture the front face of every cube with
            #[arg(long)]
            front: Option<PathBuf>,
            /// Image to texture the right face of every cube with
            #[arg(long)]
            right: Option<PathBuf>,
        },
        /// Generate the default RON configuration file
        GenerateConfig {
            /// Path where the file should be written
            #[arg(short, long)]
            output_path: PathBuf,
            /// Overwrite any existing file at the given path
            #[arg(short, long)]
            force_overwrite: bool,
        },
    }

    pub fn main() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            Command::Run {
                config,
                ticks,
                seed,
                max_fps,
                left,
                front,
                right,
            } => {
                let mut config = match config {
                    Some(file_path) => parse_ron_file(file_path)?,
                    None => SimulationConfig::default(),
                };
                if ticks.is_some() {
                    config.game_loop.max_ticks = ticks;
                }
                if max_fps.is_some() {
                    config.game_loop.max_fps = max_fps;
                }

                let options = RunOptions {
                    seed,
                    left_texture_path: left,
                    front_texture_path: front,
                    right_texture_path: right,
                };

                run::run(config, options)?;
                Ok(())
            }
            Command::GenerateConfig {
                output_path,
                force_overwrite,
            } => {
                if !force_overwrite && output_path.exists() {
                    bail!("File {} already exists", output_path.display());
                }
                run::write_default_config(output_path)
            }
        }
    }
}

#[cfg(not(feature = "cli"))]
mod main {
    use super::*;

    pub fn main() -> Result<()> {
        anyhow::bail!("This binary requires the `cli` feature to be enabled.")
    }
}

fn main() -> Result<()> {
    main::main()
}
