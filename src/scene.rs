//! Scene containing the simulated objects.

mod cube;
mod graph;
mod node;
mod texture;

pub use cube::{Color, Cube, CubeFlags};
pub use graph::{CompositeNode, NodeID, NodeStorage, SceneGraph, SceneNode};
pub use node::{GraphicObject, TransformNode};
pub use texture::{
    FaceTextures, NoTextureProvider, StaticTextureProvider, TextureHandle, TextureProvider,
};
