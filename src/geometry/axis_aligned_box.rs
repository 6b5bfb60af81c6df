//! Representation of axis-aligned boxes.

use crate::num::Float;
use nalgebra::{self as na, Point3, Vector3};

/// A box with orientation aligned with the coordinate system axes. The width,
/// height and length axes are aligned with the x-, y- and z-axis respectively.
///
/// The box is immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisAlignedBox<F: Float> {
    corners: [Point3<F>; 2],
}

impl<F: Float> AxisAlignedBox<F> {
    /// Creates a new box with the given lower and upper corner points.
    ///
    /// # Panics
    /// In debug builds, if any component of the lower corner exceeds the
    /// corresponding component of the upper corner.
    pub fn new(lower_corner: Point3<F>, upper_corner: Point3<F>) -> Self {
        debug_assert!(
            (0..3).all(|dim| lower_corner[dim] <= upper_corner[dim]),
            "Lower corner {lower_corner:?} exceeds upper corner {upper_corner:?}"
        );
        Self {
            corners: [lower_corner, upper_corner],
        }
    }

    /// Creates a box spanning from the given origin point to the point
    /// displaced from it by the given extents. The extents may be negative,
    /// in which case the origin becomes the upper corner along that axis, so
    /// this never fails.
    pub fn from_origin_and_extents(origin: Point3<F>, extents: Vector3<F>) -> Self {
        let opposite = origin + extents;
        Self::new(origin.inf(&opposite), origin.sup(&opposite))
    }

    /// Creates a box centered at the given point with the given half extents
    /// along each axis.
    pub fn centered(center: Point3<F>, half_extents: Vector3<F>) -> Self {
        let half_extents = half_extents.abs();
        Self::new(center - half_extents, center + half_extents)
    }

    /// Creates the axis-aligned bounding box for the set of points in the given
    /// array.
    ///
    /// # Panics
    /// If the point array is empty.
    pub fn aabb_for_point_array<const N: usize>(points: &[Point3<F>; N]) -> Self {
        assert!(N > 0, "Tried to create AABB for empty point array");
        Self::aabb_for_points(points)
    }

    /// Creates the axis-aligned bounding box for the set of points in the given
    /// slice.
    ///
    /// # Panics
    /// If the point slice is empty.
    pub fn aabb_for_points(points: &[Point3<F>]) -> Self {
        assert!(
            !points.is_empty(),
            "Tried to create AABB for empty point slice"
        );

        let first_point = points[0];

        let (lower_corner, upper_corner) = points.iter().skip(1).fold(
            (first_point, first_point),
            |(lower_corner, upper_corner), point| {
                (lower_corner.inf(point), upper_corner.sup(point))
            },
        );

        Self::new(lower_corner, upper_corner)
    }

    /// Returns a reference to the lower corner of the box.
    pub fn lower_corner(&self) -> &Point3<F> {
        &self.corners[0]
    }

    /// Returns a reference to the upper corner of the box.
    pub fn upper_corner(&self) -> &Point3<F> {
        &self.corners[1]
    }

    /// Returns the smallest x-coordinate of the box.
    pub fn min_x(&self) -> F {
        self.lower_corner().x
    }

    /// Returns the smallest y-coordinate of the box.
    pub fn min_y(&self) -> F {
        self.lower_corner().y
    }

    /// Returns the smallest z-coordinate of the box.
    pub fn min_z(&self) -> F {
        self.lower_corner().z
    }

    /// Returns the largest x-coordinate of the box.
    pub fn max_x(&self) -> F {
        self.upper_corner().x
    }

    /// Returns the largest y-coordinate of the box.
    pub fn max_y(&self) -> F {
        self.upper_corner().y
    }

    /// Returns the largest z-coordinate of the box.
    pub fn max_z(&self) -> F {
        self.upper_corner().z
    }

    /// Calculates and returns the center point of the box.
    pub fn center(&self) -> Point3<F> {
        na::center(self.lower_corner(), self.upper_corner())
    }

    /// Returns the extent of the box along the x-axis (the width).
    pub fn extent_x(&self) -> F {
        self.max_x() - self.min_x()
    }

    /// Returns the extent of the box along the y-axis (the height).
    pub fn extent_y(&self) -> F {
        self.max_y() - self.min_y()
    }

    /// Returns the extent of the box along the z-axis (the length).
    pub fn extent_z(&self) -> F {
        self.max_z() - self.min_z()
    }

    /// Returns the extents of the box along all three axes.
    pub fn extents(&self) -> Vector3<F> {
        self.upper_corner() - self.lower_corner()
    }

    /// Whether the given point is inside the box or on its boundary.
    pub fn contains_point(&self, point: &Point3<F>) -> bool {
        (0..3).all(|dim| {
            point[dim] >= self.lower_corner()[dim] && point[dim] <= self.upper_corner()[dim]
        })
    }

    /// Whether all of the given axis-aligned box is outside this box. If the
    /// boundaries exactly touch each other, the box is considered inside.
    pub fn box_lies_outside(&self, other: &Self) -> bool {
        !(0..3).all(|dim| {
            self.lower_corner()[dim] <= other.upper_corner()[dim]
                && self.upper_corner()[dim] >= other.lower_corner()[dim]
        })
    }

    /// Whether the given box lies fully within this box. Shared boundaries
    /// count as contained.
    pub fn contains_box(&self, other: &Self) -> bool {
        self.contains_point(other.lower_corner()) && self.contains_point(other.upper_corner())
    }

    /// Creates a new box corresponding to this box translated by the given
    /// displacement.
    pub fn translated(&self, displacement: &Vector3<F>) -> Self {
        Self::new(
            self.lower_corner() + displacement,
            self.upper_corner() + displacement,
        )
    }
}
