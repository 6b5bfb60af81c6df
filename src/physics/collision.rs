//! Collision detection between boxes and confinement within a boundary.

use crate::{
    geometry::{AxisAlignedBox, OrientedBox},
    num::Float,
};
use nalgebra::Vector3;

/// Indices of two intersecting objects in the slice they were detected in.
/// The first index is always the smaller one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair {
    pub first: usize,
    pub second: usize,
}

/// The correction needed to bring an object that has protruded through a
/// boundary back inside it.
///
/// Along every axis where the object has penetrated the boundary, the object
/// is moved back by twice the penetration depth, so that it ends up as far
/// inside the boundary as it was outside, unless that would push it through
/// the opposite end. Its velocity along that axis should be reversed.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryConfinement<F: Float> {
    displacement: Vector3<F>,
    reflected_axes: [bool; 3],
}

/// Finds every unordered pair of boxes in the given slice that intersect.
///
/// Pairs are tested and returned in lexicographic index order, so the result
/// is deterministic for a given slice.
pub fn detect_pairwise_intersections<F: Float>(boxes: &[OrientedBox<F>]) -> Vec<CollisionPair> {
    let mut pairs = Vec::new();
    for (first, box_a) in boxes.iter().enumerate() {
        for (offset, box_b) in boxes[first + 1..].iter().enumerate() {
            if box_a.intersects(box_b) {
                let second = first + 1 + offset;
                log::trace!("Boxes {first} and {second} intersect");
                pairs.push(CollisionPair { first, second });
            }
        }
    }
    pairs
}

impl<F: Float> BoundaryConfinement<F> {
    /// Computes the confinement needed to keep an object with the given
    /// axis-aligned bounding box within the given boundary box.
    ///
    /// Each axis is handled independently. Touching the boundary exactly does
    /// not count as penetrating it. The reflected object never ends up past
    /// the opposite end of the boundary: the displacement is limited to the
    /// room left on that side. An object wider than the boundary along an
    /// axis can not fit, so it is instead centered on the boundary along that
    /// axis.
    ///
    /// # Returns
    /// [`None`] if the object lies within the boundary.
    pub fn compute(
        object_aabb: &AxisAlignedBox<F>,
        boundary_aabb: &AxisAlignedBox<F>,
    ) -> Option<Self> {
        let mut displacement = Vector3::zeros();
        let mut reflected_axes = [false; 3];

        let object_center = object_aabb.center();
        let boundary_center = boundary_aabb.center();

        for dim in 0..3 {
            let lower_penetration =
                boundary_aabb.lower_corner()[dim] - object_aabb.lower_corner()[dim];
            let upper_penetration =
                object_aabb.upper_corner()[dim] - boundary_aabb.upper_corner()[dim];

            if lower_penetration <= F::ZERO && upper_penetration <= F::ZERO {
                continue;
            }
            reflected_axes[dim] = true;

            displacement[dim] = if object_aabb.extents()[dim] > boundary_aabb.extents()[dim] {
                boundary_center[dim] - object_center[dim]
            } else if lower_penetration > F::ZERO {
                // The room above is at least the penetration, since the
                // object fits within the boundary
                (F::TWO * lower_penetration).min(-upper_penetration)
            } else {
                (-F::TWO * upper_penetration).max(lower_penetration)
            };
        }

        if reflected_axes.contains(&true) {
            Some(Self {
                displacement,
                reflected_axes,
            })
        } else {
            None
        }
    }

    /// Returns the displacement that moves the object back inside the
    /// boundary.
    pub fn displacement(&self) -> &Vector3<F> {
        &self.displacement
    }

    /// Whether the object must be reflected along the given axis.
    pub fn is_reflected_along_axis(&self, axis: usize) -> bool {
        self.reflected_axes[axis]
    }

    /// Returns the indices of the axes along which the object must be
    /// reflected.
    pub fn reflected_axes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..3).filter(|&axis| self.reflected_axes[axis])
    }
}
