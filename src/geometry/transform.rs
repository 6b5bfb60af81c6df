//! Translation and rotation of a reference frame relative to its parent.

use crate::{
    geometry::{Angle, Degrees},
    num::Float,
};
use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};

/// A translation together with rotations about the x-, y- and z-axis,
/// defining the transform from a local reference frame into the reference
/// frame of its parent.
///
/// The rotation angles are in degrees. The rotations are always applied in
/// the fixed order X, Y, Z, so the full transform is
/// `translate(t) * rotate_x(rx) * rotate_y(ry) * rotate_z(rz)`. Changing this
/// order would change the meaning of every composed hierarchy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform<F: Float> {
    translation: Vector3<F>,
    rotation_angles: Vector3<F>,
}

impl<F: Float> NodeTransform<F> {
    /// Creates a new transform with the given translation and rotation angles
    /// (in degrees) about the x-, y- and z-axis.
    pub fn new(translation: Vector3<F>, rotation_angles: Vector3<F>) -> Self {
        Self {
            translation,
            rotation_angles,
        }
    }

    /// Creates the identity transform.
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Creates a transform with the given translation and no rotation.
    pub fn from_translation(translation: Vector3<F>) -> Self {
        Self::new(translation, Vector3::zeros())
    }

    /// Returns the translation.
    pub fn translation(&self) -> &Vector3<F> {
        &self.translation
    }

    /// Returns a mutable reference to the translation.
    pub fn translation_mut(&mut self) -> &mut Vector3<F> {
        &mut self.translation
    }

    /// Returns the rotation angles about the x-, y- and z-axis in degrees.
    pub fn rotation_angles(&self) -> &Vector3<F> {
        &self.rotation_angles
    }

    /// Returns a mutable reference to the rotation angles (in degrees).
    pub fn rotation_angles_mut(&mut self) -> &mut Vector3<F> {
        &mut self.rotation_angles
    }

    /// Returns the rotation angle about the x-axis.
    pub fn rotation_x(&self) -> Degrees<F> {
        Degrees(self.rotation_angles.x)
    }

    /// Returns the rotation angle about the y-axis.
    pub fn rotation_y(&self) -> Degrees<F> {
        Degrees(self.rotation_angles.y)
    }

    /// Returns the rotation angle about the z-axis.
    pub fn rotation_z(&self) -> Degrees<F> {
        Degrees(self.rotation_angles.z)
    }

    /// Computes the rotation part of the transform, composed as
    /// `rotate_x * rotate_y * rotate_z`.
    pub fn compute_rotation(&self) -> UnitQuaternion<F> {
        let rotation_x =
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.rotation_x().radians());
        let rotation_y =
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.rotation_y().radians());
        let rotation_z =
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.rotation_z().radians());
        rotation_x * rotation_y * rotation_z
    }

    /// Computes the rigid transform from the local frame to the parent frame.
    pub fn compute_isometry(&self) -> Isometry3<F> {
        Isometry3::from_parts(Translation3::from(self.translation), self.compute_rotation())
    }

    /// Computes the homogeneous 4x4 matrix that maps local coordinates into
    /// the parent's coordinate space.
    pub fn compute_transformation_matrix(&self) -> Matrix4<F> {
        self.compute_isometry().to_homogeneous()
    }

    /// Computes the homogeneous 4x4 matrix containing only the rotation part
    /// of the transform.
    pub fn compute_rotation_matrix(&self) -> Matrix4<F> {
        self.compute_rotation().to_homogeneous()
    }

    /// Transforms the given point from the local frame to the parent frame.
    pub fn local_to_parent(&self, point: &Point3<F>) -> Point3<F> {
        self.compute_isometry().transform_point(point)
    }

    /// Transforms the given point from the parent frame to the local frame.
    pub fn parent_to_local(&self, point: &Point3<F>) -> Point3<F> {
        self.compute_isometry().inverse_transform_point(point)
    }
}

impl<F: Float> Default for NodeTransform<F> {
    fn default() -> Self {
        Self::identity()
    }
}
