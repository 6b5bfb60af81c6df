//! Scene graph and rigid-box collision simulation of cubes moving inside a
//! boundary cube.

#[macro_use]
mod macros;

pub mod game_loop;
pub mod geometry;
pub mod io;
pub mod num;
pub mod physics;
pub mod render;
pub mod run;
pub mod scene;
pub mod world;
