//! Face textures supplied to cubes from outside the simulation.

use image::RgbaImage;
use std::sync::Arc;

/// Shared, immutable handle to a texture image. The simulation never inspects
/// the pixels, it only carries the handle through to the render sink.
pub type TextureHandle = Arc<RgbaImage>;

/// Textures for the three visible faces of a cube. A face without a texture
/// is drawn with the cube's color only.
#[derive(Clone, Debug, Default)]
pub struct FaceTextures {
    pub left: Option<TextureHandle>,
    pub front: Option<TextureHandle>,
    pub right: Option<TextureHandle>,
}

/// A source of face textures, polled once per tick.
pub trait TextureProvider: std::fmt::Debug {
    /// Returns the next set of face textures, or [`None`] if there is no new
    /// set for this tick.
    fn next_face_textures(&mut self) -> Option<FaceTextures>;
}

/// A [`TextureProvider`] that supplies the same set of textures every tick.
#[derive(Clone, Debug, Default)]
pub struct StaticTextureProvider {
    face_textures: FaceTextures,
}

/// A [`TextureProvider`] that never supplies anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTextureProvider;

impl FaceTextures {
    /// Creates a new set of face textures.
    pub fn new(
        left: Option<TextureHandle>,
        front: Option<TextureHandle>,
        right: Option<TextureHandle>,
    ) -> Self {
        Self { left, front, right }
    }

    /// Creates a set where every face uses the same texture.
    pub fn uniform(texture: TextureHandle) -> Self {
        Self::new(
            Some(Arc::clone(&texture)),
            Some(Arc::clone(&texture)),
            Some(texture),
        )
    }

    /// Whether no face has a texture.
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.front.is_none() && self.right.is_none()
    }

    /// Returns the number of faces that have a texture.
    pub fn n_textured_faces(&self) -> usize {
        [&self.left, &self.front, &self.right]
            .into_iter()
            .filter(|texture| texture.is_some())
            .count()
    }
}

impl StaticTextureProvider {
    /// Creates a provider that will supply the given textures every tick.
    pub fn new(face_textures: FaceTextures) -> Self {
        Self { face_textures }
    }
}

impl TextureProvider for StaticTextureProvider {
    fn next_face_textures(&mut self) -> Option<FaceTextures> {
        if self.face_textures.is_empty() {
            None
        } else {
            Some(self.face_textures.clone())
        }
    }
}

impl TextureProvider for NoTextureProvider {
    fn next_face_textures(&mut self) -> Option<FaceTextures> {
        None
    }
}
