//! Cubes with orientation, motion and collision state.

use crate::{
    geometry::{AxisAlignedBox, NodeTransform, OrientedBox},
    num::Float,
    physics::{Motion, collision::BoundaryConfinement},
    render::{CubeRenderData, RenderSink},
    scene::{FaceTextures, GraphicObject, NodeID, TransformNode},
};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use nalgebra::{Isometry3, Point3, UnitVector3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A color packed as 32-bit ARGB, with alpha in the most significant byte.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Zeroable, Pod, Serialize, Deserialize)]
pub struct Color(pub u32);

bitflags! {
    /// Bitflags encoding a set of binary states or properties for a cube.
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Zeroable, Pod)]
    pub struct CubeFlags: u8 {
        /// The cube moves according to its velocities when updated.
        const IS_DYNAMIC   = 1 << 0;
        /// The faces of the cube should be filled when drawn, rather than
        /// only its edges.
        const IS_FILLED    = 1 << 1;
        /// The cube intersected another cube in the current tick.
        const IS_COLLIDING = 1 << 2;
    }
}

/// A cube with a fixed edge length that may move and rotate.
///
/// The relative bounding box is the cube's extent in its own local space,
/// centered at the local origin. The absolute bounding box is the world space
/// axis-aligned box enclosing the eight rotated vertices, and is refreshed
/// whenever the cube's transform or the transform of its parent changes.
#[derive(Clone, Debug)]
pub struct Cube<F: Float> {
    node: TransformNode<F>,
    size: F,
    relative_bounding_box: AxisAlignedBox<F>,
    absolute_bounding_box: AxisAlignedBox<F>,
    motion: Motion<F>,
    color: Color,
    flags: CubeFlags,
    face_textures: FaceTextures,
}

impl Color {
    pub const BLACK: Self = Self::from_argb(0xFF, 0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::from_argb(0xFF, 0xFF, 0xFF, 0xFF);

    /// Creates a color from its alpha, red, green and blue channels.
    pub const fn from_argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self(u32::from_be_bytes([alpha, red, green, blue]))
    }

    pub const fn alpha(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    pub const fn red(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    pub const fn green(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    pub const fn blue(self) -> u8 {
        self.0.to_be_bytes()[3]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

impl<F: Float> Cube<F> {
    /// Creates a filled cube with the given edge length, transform relative
    /// to its parent and motion, which will move when updated.
    pub fn new_dynamic(
        size: F,
        transform: NodeTransform<F>,
        motion: Motion<F>,
        color: Color,
    ) -> Self {
        Self::new(
            size,
            transform,
            motion,
            color,
            CubeFlags::IS_DYNAMIC | CubeFlags::IS_FILLED,
        )
    }

    /// Creates an unfilled cube with the given edge length and translation,
    /// which never moves.
    pub fn new_static(size: F, translation: Vector3<F>, color: Color) -> Self {
        Self::new(
            size,
            NodeTransform::from_translation(translation),
            Motion::stationary(),
            color,
            CubeFlags::empty(),
        )
    }

    fn new(
        size: F,
        transform: NodeTransform<F>,
        motion: Motion<F>,
        color: Color,
        flags: CubeFlags,
    ) -> Self {
        debug_assert!(size > F::ZERO, "Tried to create cube with non-positive size");

        let half_size = F::ONE_HALF * size;
        let relative_bounding_box =
            AxisAlignedBox::centered(Point3::origin(), Vector3::repeat(half_size));

        let mut cube = Self {
            node: TransformNode::new(transform),
            size,
            absolute_bounding_box: relative_bounding_box.clone(),
            relative_bounding_box,
            motion,
            color,
            flags,
            face_textures: FaceTextures::default(),
        };
        cube.recompute_absolute_bounding_box();
        cube
    }

    /// Returns the edge length of the cube.
    pub fn size(&self) -> F {
        self.size
    }

    pub fn transform(&self) -> &NodeTransform<F> {
        self.node.transform()
    }

    /// Sets the translation of the cube relative to its parent.
    pub fn set_translation(&mut self, translation: Vector3<F>) {
        *self.node.transform_mut().translation_mut() = translation;
        self.recompute_absolute_bounding_box();
    }

    /// Moves the cube by the given displacement in its parent's space.
    pub fn translate(&mut self, displacement: &Vector3<F>) {
        *self.node.transform_mut().translation_mut() += displacement;
        self.recompute_absolute_bounding_box();
    }

    /// Sets the rotation angles (in degrees) of the cube relative to its
    /// parent.
    pub fn set_rotation_angles(&mut self, rotation_angles: Vector3<F>) {
        *self.node.transform_mut().rotation_angles_mut() = rotation_angles;
        self.recompute_absolute_bounding_box();
    }

    /// Replaces the transform of the cube relative to its parent.
    pub fn set_transform(&mut self, transform: NodeTransform<F>) {
        self.node.set_transform(transform);
        self.recompute_absolute_bounding_box();
    }

    pub fn motion(&self) -> &Motion<F> {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut Motion<F> {
        &mut self.motion
    }

    pub fn translational_velocity(&self) -> &Vector3<F> {
        self.motion.translational_velocity()
    }

    pub fn set_translational_velocity(&mut self, velocity: Vector3<F>) {
        *self.motion.translational_velocity_mut() = velocity;
    }

    /// Returns the rotational velocity in degrees per tick about each axis.
    pub fn rotational_velocity(&self) -> &Vector3<F> {
        self.motion.rotational_velocity()
    }

    pub fn set_rotational_velocity(&mut self, velocity: Vector3<F>) {
        *self.motion.rotational_velocity_mut() = velocity;
    }

    /// Negates all three components of the translational velocity.
    pub fn reverse_translational_velocity(&mut self) {
        self.motion.reverse_translational_velocity();
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn flags(&self) -> CubeFlags {
        self.flags
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(CubeFlags::IS_DYNAMIC)
    }

    pub fn is_filled(&self) -> bool {
        self.flags.contains(CubeFlags::IS_FILLED)
    }

    pub fn set_filled(&mut self, filled: bool) {
        self.flags.set(CubeFlags::IS_FILLED, filled);
    }

    /// Whether the cube has been marked as colliding in the current tick.
    pub fn is_colliding(&self) -> bool {
        self.flags.contains(CubeFlags::IS_COLLIDING)
    }

    /// Marks the cube as colliding and gives it the given color.
    pub fn mark_colliding(&mut self, collision_color: Color) {
        self.flags.insert(CubeFlags::IS_COLLIDING);
        self.color = collision_color;
    }

    /// Clears the collision mark and restores the given color.
    pub fn clear_collision(&mut self, default_color: Color) {
        self.flags.remove(CubeFlags::IS_COLLIDING);
        self.color = default_color;
    }

    pub fn face_textures(&self) -> &FaceTextures {
        &self.face_textures
    }

    pub fn set_face_textures(&mut self, face_textures: FaceTextures) {
        self.face_textures = face_textures;
    }

    /// Returns the bounding box of the cube in its local space.
    pub fn relative_bounding_box(&self) -> &AxisAlignedBox<F> {
        &self.relative_bounding_box
    }

    /// Returns the world space axis-aligned box enclosing the cube.
    pub fn absolute_bounding_box(&self) -> &AxisAlignedBox<F> {
        &self.absolute_bounding_box
    }

    /// Computes the oriented box occupied by the cube in world space.
    pub fn compute_oriented_box(&self) -> OrientedBox<F> {
        let half_size = F::ONE_HALF * self.size;
        OrientedBox::aligned_at_origin(half_size, half_size, half_size)
            .transformed(&self.node.compute_node_to_world_transform())
    }

    /// Computes the eight corners of the cube in world space.
    pub fn compute_vertices(&self) -> [Point3<F>; 8] {
        self.compute_oriented_box().compute_corners()
    }

    /// Computes the world space directions of the cube's local x-, y- and
    /// z-axis, which are the normals of its three pairs of faces.
    pub fn compute_normal_vectors(&self) -> [UnitVector3<F>; 3] {
        let rotation = self.node.compute_world_rotation();
        [
            UnitVector3::new_unchecked(rotation * Vector3::x()),
            UnitVector3::new_unchecked(rotation * Vector3::y()),
            UnitVector3::new_unchecked(rotation * Vector3::z()),
        ]
    }

    /// Whether this cube and the given cube intersect. Cubes that only touch
    /// are considered intersecting.
    pub fn intersects(&self, other: &Self) -> bool {
        self.compute_oriented_box()
            .intersects(&other.compute_oriented_box())
    }

    /// Moves the cube back inside the given world space boundary box along
    /// every axis where it protrudes, reversing its velocity along those
    /// axes.
    ///
    /// The velocity is reversed along the world axes, so this assumes the
    /// axes of the cube's parent space are aligned with the world axes.
    ///
    /// # Returns
    /// Whether the cube had to be confined.
    pub fn confine_within(&mut self, boundary_aabb: &AxisAlignedBox<F>) -> bool {
        let Some(confinement) =
            BoundaryConfinement::compute(&self.absolute_bounding_box, boundary_aabb)
        else {
            return false;
        };

        let displacement = self
            .node
            .parent_to_world_transform()
            .inverse_transform_vector(confinement.displacement());
        self.translate(&displacement);

        for axis in confinement.reflected_axes() {
            self.motion.reverse_translational_velocity_along_axis(axis);
        }
        true
    }

    /// Gathers the state a renderer needs to draw the cube.
    pub fn render_data(&self, node_id: NodeID, is_boundary: bool) -> CubeRenderData<F> {
        CubeRenderData {
            node_id,
            is_boundary,
            local_to_world: self.node.compute_local_to_world_matrix(),
            vertices: self.compute_vertices(),
            size: self.size,
            is_filled: self.is_filled(),
            is_colliding: self.is_colliding(),
            color: self.color,
            face_textures: self.face_textures.clone(),
        }
    }

    pub(crate) fn node_mut(&mut self) -> &mut TransformNode<F> {
        &mut self.node
    }

    fn recompute_absolute_bounding_box(&mut self) {
        self.absolute_bounding_box =
            AxisAlignedBox::aabb_for_point_array(&self.compute_vertices());
    }
}

impl<F: Float> GraphicObject<F> for Cube<F> {
    fn node(&self) -> &TransformNode<F> {
        &self.node
    }

    fn update(&mut self) {
        if self.is_dynamic() {
            self.motion.advance(self.node.transform_mut());
        }
        self.recompute_absolute_bounding_box();
    }

    fn set_parent_to_world_transform(&mut self, parent_to_world_transform: Isometry3<F>) {
        self.node
            .set_parent_to_world_transform(parent_to_world_transform);
        self.recompute_absolute_bounding_box();
    }

    fn draw(&self, node_id: NodeID, sink: &mut dyn RenderSink<F>) {
        sink.render_cube(&self.render_data(node_id, false));
    }

    /// Maps the point into the cube's local space and checks it against the
    /// relative bounding box. For a cube this is exact, with the surface
    /// counting as inside.
    fn is_inside(&self, point: &Point3<F>) -> bool {
        self.relative_bounding_box
            .contains_point(&self.node.world_to_local(point))
    }
}
