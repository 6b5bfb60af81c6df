//! Transform nodes and the capabilities shared by all scene objects.

use crate::{geometry::NodeTransform, num::Float, render::RenderSink, scene::NodeID};
use nalgebra::{Isometry3, Matrix4, Point3, UnitQuaternion, Vector3};

/// The spatial part of a [`SceneGraph`](crate::scene::SceneGraph) node: a
/// transform relative to an optional parent node, together with the cached
/// transform from the parent's space to world space.
///
/// The parent is referenced by ID only, so a node never keeps its parent
/// alive. A node without a parent has its transform relative to world
/// space. The cached parent-to-world transform is kept current by the scene
/// graph whenever the node or one of its ancestors is updated.
#[derive(Clone, Debug)]
pub struct TransformNode<F: Float> {
    parent_node_id: Option<NodeID>,
    transform: NodeTransform<F>,
    parent_to_world_transform: Isometry3<F>,
}

/// Represents an object that can be placed in a
/// [`SceneGraph`](crate::scene::SceneGraph).
pub trait GraphicObject<F: Float> {
    /// Returns the transform node of the object.
    fn node(&self) -> &TransformNode<F>;

    /// Advances the object by one tick and refreshes any state derived from
    /// its world transform.
    fn update(&mut self);

    /// Informs the object that the transform from its parent's space to world
    /// space has changed, so that any state derived from its world transform
    /// can be refreshed.
    fn set_parent_to_world_transform(&mut self, parent_to_world_transform: Isometry3<F>);

    /// Hands the renderable state of the object, identified by the given node
    /// ID, to the given render sink.
    fn draw(&self, node_id: NodeID, sink: &mut dyn RenderSink<F>);

    /// Whether the given world space point lies inside the object. Depending
    /// on the object the test may yield false positives, but never false
    /// negatives.
    fn is_inside(&self, point: &Point3<F>) -> bool;

    /// Returns the translation of the object relative to its parent.
    fn translation(&self) -> &Vector3<F> {
        self.node().transform().translation()
    }

    /// Returns the rotation angles (in degrees) of the object relative to
    /// its parent.
    fn rotation_angles(&self) -> &Vector3<F> {
        self.node().transform().rotation_angles()
    }
}

impl<F: Float> TransformNode<F> {
    /// Creates a new node with the given transform and no parent.
    pub fn new(transform: NodeTransform<F>) -> Self {
        Self {
            parent_node_id: None,
            transform,
            parent_to_world_transform: Isometry3::identity(),
        }
    }

    /// Returns the ID of the parent node, if any.
    pub fn parent_node_id(&self) -> Option<NodeID> {
        self.parent_node_id
    }

    /// Returns the transform relative to the parent.
    pub fn transform(&self) -> &NodeTransform<F> {
        &self.transform
    }

    /// Returns the cached transform from the parent's space to world space.
    pub fn parent_to_world_transform(&self) -> &Isometry3<F> {
        &self.parent_to_world_transform
    }

    /// Computes the transform from the node's local space to its parent's
    /// space.
    pub fn compute_node_to_parent_transform(&self) -> Isometry3<F> {
        self.transform.compute_isometry()
    }

    /// Computes the transform from the node's local space to world space.
    pub fn compute_node_to_world_transform(&self) -> Isometry3<F> {
        self.parent_to_world_transform * self.compute_node_to_parent_transform()
    }

    /// Computes the homogeneous matrix mapping local coordinates into the
    /// parent's space.
    pub fn compute_transformation_matrix(&self) -> Matrix4<F> {
        self.transform.compute_transformation_matrix()
    }

    /// Computes the homogeneous matrix mapping local coordinates into world
    /// space.
    pub fn compute_local_to_world_matrix(&self) -> Matrix4<F> {
        self.compute_node_to_world_transform().to_homogeneous()
    }

    /// Computes the orientation of the node's local axes in world space.
    pub fn compute_world_rotation(&self) -> UnitQuaternion<F> {
        self.parent_to_world_transform.rotation * self.transform.compute_rotation()
    }

    pub fn local_to_parent(&self, point: &Point3<F>) -> Point3<F> {
        self.transform.local_to_parent(point)
    }

    pub fn parent_to_local(&self, point: &Point3<F>) -> Point3<F> {
        self.transform.parent_to_local(point)
    }

    /// Transforms the given point from local space to world space.
    pub fn local_to_world(&self, point: &Point3<F>) -> Point3<F> {
        self.parent_to_world_transform
            .transform_point(&self.local_to_parent(point))
    }

    /// Transforms the given point from world space to local space.
    pub fn world_to_local(&self, point: &Point3<F>) -> Point3<F> {
        self.parent_to_local(
            &self
                .parent_to_world_transform
                .inverse_transform_point(point),
        )
    }

    pub(crate) fn transform_mut(&mut self) -> &mut NodeTransform<F> {
        &mut self.transform
    }

    pub(crate) fn set_transform(&mut self, transform: NodeTransform<F>) {
        self.transform = transform;
    }

    pub(super) fn set_parent_node_id(&mut self, parent_node_id: Option<NodeID>) {
        self.parent_node_id = parent_node_id;
    }

    pub(crate) fn set_parent_to_world_transform(&mut self, transform: Isometry3<F>) {
        self.parent_to_world_transform = transform;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Translation3, point, vector};

    #[test]
    fn node_without_parent_treats_transform_as_world_relative() {
        let node = TransformNode::new(NodeTransform::new(
            vector![1.0, 2.0, 3.0],
            vector![0.0, 0.0, 90.0],
        ));
        assert!(node.parent_node_id().is_none());
        let point = point![1.0, 0.0, 0.0];
        assert_abs_diff_eq!(
            node.local_to_world(&point),
            node.local_to_parent(&point),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            node.local_to_world(&point),
            point![1.0, 3.0, 3.0],
            epsilon = 1e-12
        );
    }

    #[test]
    fn local_to_world_applies_parent_transform_after_own() {
        let mut node = TransformNode::new(NodeTransform::from_translation(vector![1.0, 0.0, 0.0]));
        node.set_parent_to_world_transform(Isometry3::from_parts(
            Translation3::new(0.0, 10.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
        ));
        assert_abs_diff_eq!(
            node.local_to_world(&Point3::origin()),
            point![0.0, 11.0, 0.0],
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            node.compute_local_to_world_matrix()
                .transform_point(&Point3::origin()),
            point![0.0, 11.0, 0.0],
            epsilon = 1e-12
        );
    }

    #[test]
    fn world_to_local_inverts_local_to_world() {
        let mut node = TransformNode::new(NodeTransform::new(
            vector![-4.0, 2.0, 8.0],
            vector![30.0, -60.0, 15.0],
        ));
        node.set_parent_to_world_transform(Isometry3::from_parts(
            Translation3::new(5.0, 0.0, -1.0),
            UnitQuaternion::from_euler_angles(0.3, 0.2, -0.1),
        ));
        let point = point![1.0, -2.0, 3.0];
        assert_abs_diff_eq!(
            node.world_to_local(&node.local_to_world(&point)),
            point,
            epsilon = 1e-10
        );
    }

    #[test]
    fn world_rotation_combines_parent_and_own_rotation() {
        let mut node = TransformNode::new(NodeTransform::new(
            Vector3::zeros(),
            vector![0.0, 0.0, 45.0],
        ));
        node.set_parent_to_world_transform(Isometry3::rotation(
            Vector3::z() * std::f64::consts::FRAC_PI_4,
        ));
        assert_abs_diff_eq!(
            node.compute_world_rotation() * Vector3::x(),
            Vector3::y(),
            epsilon = 1e-12
        );
    }
}
