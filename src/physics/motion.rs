//! Velocities and their integration.

use crate::{
    geometry::{InclusiveBounds, NodeTransform},
    num::Float,
};
use nalgebra::Vector3;
use rand::{Rng, distr::uniform::SampleUniform};

/// Translational and rotational velocity of an object.
///
/// The translational velocity is in units of distance per tick, and the
/// rotational velocity holds the change in rotation angle about each of the
/// x-, y- and z-axis, in degrees per tick. Both are expressed in the
/// reference frame of the object's parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion<F: Float> {
    translational_velocity: Vector3<F>,
    rotational_velocity: Vector3<F>,
}

impl<F: Float> Motion<F> {
    /// Creates a new motion with the given translational and rotational
    /// velocity.
    pub fn new(translational_velocity: Vector3<F>, rotational_velocity: Vector3<F>) -> Self {
        Self {
            translational_velocity,
            rotational_velocity,
        }
    }

    /// Creates a motion with zero velocity.
    pub fn stationary() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Creates a motion with the given translational velocity and no rotation.
    pub fn translational(translational_velocity: Vector3<F>) -> Self {
        Self::new(translational_velocity, Vector3::zeros())
    }

    /// Creates a motion where every component of the translational and
    /// rotational velocity is drawn uniformly from the given bounds.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        translational_velocity_bounds: &InclusiveBounds<F>,
        rotational_velocity_bounds: &InclusiveBounds<F>,
    ) -> Self
    where
        F: SampleUniform,
    {
        let translational_velocity =
            Vector3::from_fn(|_, _| translational_velocity_bounds.sample(rng));
        let rotational_velocity = Vector3::from_fn(|_, _| rotational_velocity_bounds.sample(rng));
        Self::new(translational_velocity, rotational_velocity)
    }

    pub fn translational_velocity(&self) -> &Vector3<F> {
        &self.translational_velocity
    }

    pub fn translational_velocity_mut(&mut self) -> &mut Vector3<F> {
        &mut self.translational_velocity
    }

    pub fn rotational_velocity(&self) -> &Vector3<F> {
        &self.rotational_velocity
    }

    pub fn rotational_velocity_mut(&mut self) -> &mut Vector3<F> {
        &mut self.rotational_velocity
    }

    /// Whether both velocities are exactly zero.
    pub fn is_stationary(&self) -> bool {
        self.translational_velocity == Vector3::zeros()
            && self.rotational_velocity == Vector3::zeros()
    }

    /// Negates all three components of the translational velocity.
    pub fn reverse_translational_velocity(&mut self) {
        self.translational_velocity.neg_mut();
    }

    /// Negates the translational velocity component along the given axis
    /// (0, 1 or 2 for x, y or z).
    ///
    /// # Panics
    /// If the axis index exceeds 2.
    pub fn reverse_translational_velocity_along_axis(&mut self, axis: usize) {
        self.translational_velocity[axis] = -self.translational_velocity[axis];
    }

    /// Advances the given transform by one tick of this motion, adding the
    /// velocities to the translation and rotation angles componentwise.
    pub fn advance(&self, transform: &mut NodeTransform<F>) {
        *transform.translation_mut() += self.translational_velocity;
        *transform.rotation_angles_mut() += self.rotational_velocity;
    }
}

impl<F: Float> Default for Motion<F> {
    fn default() -> Self {
        Self::stationary()
    }
}
