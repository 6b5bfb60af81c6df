//! Representation of boxes with arbitrary orientations.

use crate::{geometry::AxisAlignedBox, num::Float};
use nalgebra::{Isometry3, Point3, UnitQuaternion, UnitVector3, Vector3};

/// A box with arbitrary position, orientation and extents.
#[derive(Clone, Debug)]
pub struct OrientedBox<F: Float> {
    center: Point3<F>,
    orientation: UnitQuaternion<F>,
    half_width: F,
    half_height: F,
    half_depth: F,
}

/// Interval covered by the projection of a set of points onto an axis.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ProjectionInterval<F> {
    min: F,
    max: F,
}

impl<F: Float> OrientedBox<F> {
    /// Creates a new box with the given center position, orientation quaternion
    /// and half extents along each of its three axes.
    pub fn new(
        center: Point3<F>,
        orientation: UnitQuaternion<F>,
        half_width: F,
        half_height: F,
        half_depth: F,
    ) -> Self {
        Self {
            center,
            orientation,
            half_width,
            half_height,
            half_depth,
        }
    }

    /// Creates a new box with the given half extents, centered at the origin
    /// and with the width, height and depth axes aligned with the x-, y- and
    /// z-axis respectively.
    pub fn aligned_at_origin(half_width: F, half_height: F, half_depth: F) -> Self {
        Self::new(
            Point3::origin(),
            UnitQuaternion::identity(),
            half_width,
            half_height,
            half_depth,
        )
    }

    /// Returns the center of the box.
    pub fn center(&self) -> &Point3<F> {
        &self.center
    }

    /// Returns the orientation of the box.
    pub fn orientation(&self) -> &UnitQuaternion<F> {
        &self.orientation
    }

    /// Returns half the width of the box.
    pub fn half_width(&self) -> F {
        self.half_width
    }

    /// Returns half the height of the box.
    pub fn half_height(&self) -> F {
        self.half_height
    }

    /// Returns half the depth of the box.
    pub fn half_depth(&self) -> F {
        self.half_depth
    }

    /// Computes the unit vector representing the width axis of the box.
    pub fn compute_width_axis(&self) -> UnitVector3<F> {
        UnitVector3::new_unchecked(self.orientation.transform_vector(&Vector3::x_axis()))
    }

    /// Computes the unit vector representing the height axis of the box.
    pub fn compute_height_axis(&self) -> UnitVector3<F> {
        UnitVector3::new_unchecked(self.orientation.transform_vector(&Vector3::y_axis()))
    }

    /// Computes the unit vector representing the depth axis of the box.
    pub fn compute_depth_axis(&self) -> UnitVector3<F> {
        UnitVector3::new_unchecked(self.orientation.transform_vector(&Vector3::z_axis()))
    }

    /// Computes the normal vectors of the three pairs of opposing faces of
    /// the box, in the order width, height, depth.
    pub fn compute_face_normals(&self) -> [UnitVector3<F>; 3] {
        [
            self.compute_width_axis(),
            self.compute_height_axis(),
            self.compute_depth_axis(),
        ]
    }

    /// Creates a new box corresponding to transforming this box with the given
    /// rigid transform.
    pub fn transformed(&self, transform: &Isometry3<F>) -> Self {
        Self::new(
            transform.transform_point(&self.center),
            transform.rotation * self.orientation,
            self.half_width,
            self.half_height,
            self.half_depth,
        )
    }

    /// Computes the eight corners of the oriented box. The corners are ordered
    /// from smaller to larger coordinates along the box axes, with the depth
    /// component varying fastest.
    pub fn compute_corners(&self) -> [Point3<F>; 8] {
        let half_width_vector = self.compute_width_axis().scale(self.half_width);
        let half_height_vector = self.compute_height_axis().scale(self.half_height);
        let half_depth_vector = self.compute_depth_axis().scale(self.half_depth);
        [
            self.center - half_width_vector - half_height_vector - half_depth_vector,
            self.center - half_width_vector - half_height_vector + half_depth_vector,
            self.center - half_width_vector + half_height_vector - half_depth_vector,
            self.center - half_width_vector + half_height_vector + half_depth_vector,
            self.center + half_width_vector - half_height_vector - half_depth_vector,
            self.center + half_width_vector - half_height_vector + half_depth_vector,
            self.center + half_width_vector + half_height_vector - half_depth_vector,
            self.center + half_width_vector + half_height_vector + half_depth_vector,
        ]
    }

    /// Computes the axis-aligned box tightly enclosing this box.
    pub fn compute_aabb(&self) -> AxisAlignedBox<F> {
        AxisAlignedBox::aabb_for_point_array(&self.compute_corners())
    }

    /// Whether this box and the given box intersect, determined exactly with
    /// the separating axis test.
    ///
    /// The candidate axes are the three face normals of each box and the nine
    /// cross products between them. Axes that vanish because the
    /// corresponding normals are parallel are skipped. Boxes that only touch
    /// at a face, edge or corner are considered intersecting.
    pub fn intersects(&self, other: &Self) -> bool {
        let corners = self.compute_corners();
        let other_corners = other.compute_corners();

        let normals = self.compute_face_normals();
        let other_normals = other.compute_face_normals();

        let face_axes = normals
            .iter()
            .chain(other_normals.iter())
            .copied()
            .map(UnitVector3::into_inner);

        let edge_axes = normals.iter().flat_map(|normal| {
            other_normals
                .iter()
                .map(move |other_normal| normal.cross(other_normal.as_ref()))
        });

        !face_axes
            .chain(edge_axes)
            .any(|axis| are_disjoint_along_axis(&corners, &other_corners, &axis))
    }
}

impl<F: Float> ProjectionInterval<F> {
    /// Projects the given points onto the given (non-zero) axis.
    fn of_points_along_axis(points: &[Point3<F>], axis: &Vector3<F>) -> Self {
        let inverse_axis_length = F::ONE / axis.norm();

        let mut distances = points
            .iter()
            .map(|point| point.coords.dot(axis) * inverse_axis_length);

        let first_distance = distances.next().unwrap_or(F::ZERO);

        distances.fold(
            Self {
                min: first_distance,
                max: first_distance,
            },
            |interval, distance| Self {
                min: interval.min.min(distance),
                max: interval.max.max(distance),
            },
        )
    }

    fn length(&self) -> F {
        self.max - self.min
    }
}

/// Whether the two point sets have non-overlapping projections onto the given
/// axis. Vanishing axes never separate anything. Projections that exactly
/// touch are not considered disjoint.
fn are_disjoint_along_axis<F: Float>(
    points_a: &[Point3<F>],
    points_b: &[Point3<F>],
    axis: &Vector3<F>,
) -> bool {
    if axis.norm_squared() <= F::default_epsilon() {
        return false;
    }

    let interval_a = ProjectionInterval::of_points_along_axis(points_a, axis);
    let interval_b = ProjectionInterval::of_points_along_axis(points_b, axis);

    let total_length = interval_a.length() + interval_b.length();
    let total_span = interval_a.max.max(interval_b.max) - interval_a.min.min(interval_b.min);

    total_span > total_length
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{point, vector};
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn unit_box_at(center: Point3<f64>, orientation: UnitQuaternion<f64>) -> OrientedBox<f64> {
        OrientedBox::new(center, orientation, 1.0, 1.0, 1.0)
    }

    #[test]
    fn oriented_box_axes_are_correct() {
        let oriented_box = unit_box_at(
            Point3::origin(),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI / 2.0),
        );
        assert_abs_diff_eq!(oriented_box.compute_width_axis(), Vector3::x_axis());
        assert_abs_diff_eq!(oriented_box.compute_height_axis(), Vector3::z_axis());
        assert_abs_diff_eq!(oriented_box.compute_depth_axis(), -Vector3::y_axis());

        let oriented_box = unit_box_at(
            Point3::origin(),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -PI / 2.0),
        );
        assert_abs_diff_eq!(oriented_box.compute_width_axis(), Vector3::z_axis());
        assert_abs_diff_eq!(oriented_box.compute_height_axis(), Vector3::y_axis());
        assert_abs_diff_eq!(oriented_box.compute_depth_axis(), -Vector3::x_axis());
    }

    #[test]
    fn corners_of_aligned_box_are_correct() {
        let corners = OrientedBox::aligned_at_origin(1.0, 2.0, 3.0).compute_corners();
        assert_abs_diff_eq!(corners[0], point![-1.0, -2.0, -3.0]);
        assert_abs_diff_eq!(corners[1], point![-1.0, -2.0, 3.0]);
        assert_abs_diff_eq!(corners[6], point![1.0, 2.0, -3.0]);
        assert_abs_diff_eq!(corners[7], point![1.0, 2.0, 3.0]);
    }

    #[test]
    fn aabb_of_rotated_box_encloses_rotated_corners() {
        let oriented_box = unit_box_at(
            Point3::origin(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 4.0),
        );
        let aabb = oriented_box.compute_aabb();
        let half_diagonal = f64::sqrt(2.0);
        assert_abs_diff_eq!(aabb.max_x(), half_diagonal, epsilon = 1e-12);
        assert_abs_diff_eq!(aabb.min_y(), -half_diagonal, epsilon = 1e-12);
        assert_abs_diff_eq!(aabb.max_z(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn transforming_box_moves_center_and_rotates_axes() {
        let transform = Isometry3::new(vector![1.0, 2.0, 3.0], vector![0.0, 0.0, PI / 2.0]);
        let oriented_box = OrientedBox::aligned_at_origin(1.0, 1.0, 1.0).transformed(&transform);
        assert_abs_diff_eq!(*oriented_box.center(), point![1.0, 2.0, 3.0]);
        assert_abs_diff_eq!(
            oriented_box.compute_width_axis(),
            Vector3::y_axis(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn identical_boxes_intersect() {
        let a = unit_box_at(point![3.0, -2.0, 1.0], UnitQuaternion::identity());
        assert!(a.intersects(&a.clone()));
    }

    #[test]
    fn aligned_boxes_separated_along_one_axis_do_not_intersect() {
        let a = unit_box_at(Point3::origin(), UnitQuaternion::identity());
        let b = unit_box_at(point![2.5, 0.0, 0.0], UnitQuaternion::identity());
        assert!(!a.intersects(&b));
    }

    #[test]
    fn boxes_touching_at_face_intersect() {
        let a = unit_box_at(Point3::origin(), UnitQuaternion::identity());
        let b = unit_box_at(point![2.0, 0.0, 0.0], UnitQuaternion::identity());
        assert!(a.intersects(&b));
    }

    #[test]
    fn boxes_touching_at_edge_and_corner_intersect() {
        let a = unit_box_at(Point3::origin(), UnitQuaternion::identity());
        let along_edge = unit_box_at(point![2.0, 2.0, 0.0], UnitQuaternion::identity());
        let at_corner = unit_box_at(point![2.0, 2.0, 2.0], UnitQuaternion::identity());
        assert!(a.intersects(&along_edge));
        assert!(a.intersects(&at_corner));
    }

    #[test]
    fn rotated_box_in_aabb_gap_does_not_intersect() {
        // Corner regions of the axis-aligned bounding boxes overlap, but a
        // box rotated 45 degrees about z leaves a gap along the diagonal
        let a = unit_box_at(
            Point3::origin(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 4.0),
        );
        let b = unit_box_at(point![2.2, 2.2, 0.0], UnitQuaternion::identity());
        assert!(a.compute_aabb().contains_point(&point![1.3, 1.3, 0.0]));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn boxes_rotated_about_different_axes_and_separated_diagonally_do_not_intersect() {
        let a = unit_box_at(
            Point3::origin(),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI / 4.0),
        );
        let b = unit_box_at(
            point![2.2, 2.2, 0.0],
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 4.0),
        );
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn rotated_box_penetrating_with_edge_intersects() {
        // No corner of either box lies inside the other, but the edges cross
        let a = OrientedBox::new(Point3::origin(), UnitQuaternion::identity(), 1.0, 1.0, 3.0);
        let b = OrientedBox::new(
            point![0.0, 0.0, 0.0],
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 4.0),
            3.0,
            0.2,
            0.2,
        );
        assert!(a.intersects(&b));
    }

    #[test]
    fn vanishing_axis_never_separates() {
        let points = [point![0.0, 0.0, 0.0]];
        let far_points = [point![100.0, 100.0, 100.0]];
        assert!(!are_disjoint_along_axis(
            &points,
            &far_points,
            &Vector3::zeros()
        ));
    }

    #[test]
    fn projection_is_normalized_by_axis_length() {
        let points = [point![1.0, 0.0, 0.0], point![3.0, 5.0, 0.0]];
        let interval =
            ProjectionInterval::of_points_along_axis(&points, &vector![10.0, 0.0, 0.0]);
        assert_abs_diff_eq!(interval.min, 1.0);
        assert_abs_diff_eq!(interval.max, 3.0);
    }

    fn arbitrary_box() -> impl Strategy<Value = OrientedBox<f64>> {
        (
            prop::array::uniform3(-20.0..20.0_f64),
            prop::array::uniform3(-PI..PI),
            prop::array::uniform3(0.1..5.0_f64),
        )
            .prop_map(|(center, angles, half_extents)| {
                OrientedBox::new(
                    Point3::from(center),
                    UnitQuaternion::from_euler_angles(angles[0], angles[1], angles[2]),
                    half_extents[0],
                    half_extents[1],
                    half_extents[2],
                )
            })
    }

    proptest! {
        #[test]
        fn intersection_test_is_symmetric(a in arbitrary_box(), b in arbitrary_box()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn boxes_beyond_bounding_spheres_never_intersect(
            a in arbitrary_box(),
            b in arbitrary_box(),
            direction in prop::array::uniform3(-1.0..1.0_f64),
        ) {
            let direction = Vector3::from(direction);
            prop_assume!(direction.norm() > 1e-3);

            let radius = |oriented_box: &OrientedBox<f64>| {
                vector![
                    oriented_box.half_width(),
                    oriented_box.half_height(),
                    oriented_box.half_depth()
                ]
                .norm()
            };
            let separation = radius(&a) + radius(&b) + 1e-3;

            let b = OrientedBox::new(
                a.center() + direction.normalize() * separation,
                *b.orientation(),
                b.half_width(),
                b.half_height(),
                b.half_depth(),
            );
            prop_assert!(!a.intersects(&b));
        }

        #[test]
        fn box_always_intersects_box_at_own_center(a in arbitrary_box(), b in arbitrary_box()) {
            let b = OrientedBox::new(
                *a.center(),
                *b.orientation(),
                b.half_width(),
                b.half_height(),
                b.half_depth(),
            );
            prop_assert!(a.intersects(&b));
        }
    }
}
