//! Scene graph implementation.

use crate::{
    geometry::NodeTransform,
    num::Float,
    render::RenderSink,
    scene::{Cube, GraphicObject, TransformNode},
};
use bytemuck::{Pod, Zeroable};
use nalgebra::{Isometry3, Point3};

/// A tree structure that defines a spatial hierarchy of objects in the world.
///
/// The root is a [`CompositeNode`]. Composite nodes have an ordered list of
/// children, which may be cubes, the boundary cube or other composite nodes.
/// Every node holds the transform from its own space to the space of its
/// parent. Updating and drawing a composite node fans out to its children in
/// order.
#[derive(Clone, Debug)]
pub struct SceneGraph<F: Float> {
    root_node_id: NodeID,
    nodes: NodeStorage<SceneNode<F>>,
}

/// Flat storage for [`SceneGraph`] nodes, addressed by generational
/// [`NodeID`]s. Slots of removed nodes are reused, but an ID referring to a
/// removed node never resolves to the node that later takes its slot.
#[derive(Clone, Debug)]
pub struct NodeStorage<N> {
    slots: Vec<NodeSlot<N>>,
    free_slot_indices: Vec<u32>,
    n_nodes: usize,
}

#[derive(Clone, Debug)]
struct NodeSlot<N> {
    generation: u32,
    node: Option<N>,
}

/// Identifier for a node in a [`SceneGraph`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
pub struct NodeID {
    idx: u32,
    generation: u32,
}

/// A node in a [`SceneGraph`].
#[derive(Clone, Debug)]
pub enum SceneNode<F: Float> {
    Cube(Cube<F>),
    /// The static cube enclosing the simulation.
    Boundary(Cube<F>),
    Composite(CompositeNode<F>),
}

/// A [`SceneGraph`] node grouping an ordered list of child nodes under a
/// common transform.
#[derive(Clone, Debug)]
pub struct CompositeNode<F: Float> {
    node: TransformNode<F>,
    child_node_ids: Vec<NodeID>,
}

impl<F: Float> SceneGraph<F> {
    /// Creates a new scene graph containing only an empty root composite
    /// node with the identity transform.
    pub fn new() -> Self {
        let mut nodes = NodeStorage::new();
        let root_node_id = nodes.add_node(SceneNode::Composite(CompositeNode::new(
            NodeTransform::identity(),
        )));
        Self {
            root_node_id,
            nodes,
        }
    }

    /// Returns the ID of the root composite node.
    pub fn root_node_id(&self) -> NodeID {
        self.root_node_id
    }

    /// Returns the number of nodes in the graph, including the root.
    pub fn n_nodes(&self) -> usize {
        self.nodes.n_nodes()
    }

    /// Whether a node with the given ID exists in the graph.
    pub fn has_node(&self, node_id: NodeID) -> bool {
        self.nodes.has_node(node_id)
    }

    /// Returns a reference to the node with the given ID.
    ///
    /// # Panics
    /// If the node does not exist.
    pub fn node(&self, node_id: NodeID) -> &SceneNode<F> {
        self.nodes.node(node_id)
    }

    /// Returns a reference to the node with the given ID, or [`None`] if it
    /// does not exist.
    pub fn get_node(&self, node_id: NodeID) -> Option<&SceneNode<F>> {
        self.nodes.get_node(node_id)
    }

    /// Returns a reference to the cube (regular or boundary) with the given
    /// node ID, or [`None`] if the node does not exist or is not a cube.
    pub fn get_cube(&self, node_id: NodeID) -> Option<&Cube<F>> {
        self.nodes.get_node(node_id).and_then(SceneNode::as_cube)
    }

    /// Returns a mutable reference to the cube (regular or boundary) with the
    /// given node ID, or [`None`] if the node does not exist or is not a
    /// cube.
    ///
    /// Cubes are always leaves, so modifying the returned cube never
    /// invalidates the state of other nodes.
    pub fn get_cube_mut(&mut self, node_id: NodeID) -> Option<&mut Cube<F>> {
        self.nodes
            .get_node_mut(node_id)
            .and_then(SceneNode::as_cube_mut)
    }

    /// Returns a reference to the composite node with the given ID, or
    /// [`None`] if the node does not exist or is not a composite.
    pub fn get_composite(&self, node_id: NodeID) -> Option<&CompositeNode<F>> {
        match self.nodes.get_node(node_id)? {
            SceneNode::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// Returns the IDs of the children of the composite node with the given
    /// ID, in order.
    ///
    /// # Panics
    /// If the node does not exist or is not a composite.
    pub fn child_node_ids(&self, node_id: NodeID) -> &[NodeID] {
        self.nodes.node(node_id).composite().child_node_ids()
    }

    /// Includes the given cube in the scene graph as the last child of the
    /// given composite node.
    ///
    /// # Returns
    /// The ID of the created cube node.
    ///
    /// # Panics
    /// If the parent node does not exist or is not a composite.
    pub fn add_cube_node(&mut self, parent_node_id: NodeID, cube: Cube<F>) -> NodeID {
        self.add_child_node(parent_node_id, SceneNode::Cube(cube))
    }

    /// Includes the given cube in the scene graph as a boundary node, placed
    /// as the last child of the given composite node.
    ///
    /// # Returns
    /// The ID of the created boundary node.
    ///
    /// # Panics
    /// If the parent node does not exist or is not a composite.
    pub fn add_boundary_node(&mut self, parent_node_id: NodeID, cube: Cube<F>) -> NodeID {
        self.add_child_node(parent_node_id, SceneNode::Boundary(cube))
    }

    /// Creates a new empty composite node with the given transform relative
    /// to the given parent composite node and includes it in the graph.
    ///
    /// # Returns
    /// The ID of the created composite node.
    ///
    /// # Panics
    /// If the parent node does not exist or is not a composite.
    pub fn add_composite_node(
        &mut self,
        parent_node_id: NodeID,
        transform: NodeTransform<F>,
    ) -> NodeID {
        self.add_child_node(
            parent_node_id,
            SceneNode::Composite(CompositeNode::new(transform)),
        )
    }

    /// Removes the node with the given ID and all of its descendants from the
    /// graph.
    ///
    /// # Returns
    /// The removed node, or [`None`] if it did not exist.
    ///
    /// # Panics
    /// If the node is the root node.
    pub fn remove_node(&mut self, node_id: NodeID) -> Option<SceneNode<F>> {
        assert_ne!(
            node_id, self.root_node_id,
            "Tried to remove root node of scene graph"
        );

        let node = self.nodes.remove_node(node_id)?;

        if let Some(parent_node_id) = node.node().parent_node_id() {
            if let Some(SceneNode::Composite(parent)) = self.nodes.get_node_mut(parent_node_id) {
                parent.remove_child_node(node_id);
            }
        }

        if let SceneNode::Composite(composite) = &node {
            for &child_node_id in composite.child_node_ids() {
                self.remove_descendants(child_node_id);
            }
        }

        Some(node)
    }

    /// Sets the transform of the composite node with the given ID relative
    /// to its parent, and refreshes the world transforms of all its
    /// descendants.
    ///
    /// # Panics
    /// If the node does not exist or is not a composite.
    pub fn set_composite_transform(&mut self, node_id: NodeID, transform: NodeTransform<F>) {
        self.nodes
            .node_mut(node_id)
            .composite_mut()
            .node
            .set_transform(transform);
        self.sync_subtree_transforms(node_id);
    }

    /// Computes the transform from the space of the node with the given ID to
    /// world space by walking up through every ancestor.
    ///
    /// # Panics
    /// If the node or any of its ancestors does not exist.
    pub fn compute_node_to_world_transform(&self, node_id: NodeID) -> Isometry3<F> {
        let mut transform = Isometry3::identity();
        let mut current_node_id = Some(node_id);
        while let Some(id) = current_node_id {
            let node = self.nodes.node(id).node();
            transform = node.compute_node_to_parent_transform() * transform;
            current_node_id = node.parent_node_id();
        }
        transform
    }

    /// Updates every node in the graph in depth-first order.
    pub fn update(&mut self) {
        self.update_subtree(self.root_node_id);
    }

    /// Updates the node with the given ID and then, if it is a composite, each
    /// of its descendants after handing them their new parent-to-world
    /// transform.
    ///
    /// # Panics
    /// If the node does not exist.
    pub fn update_subtree(&mut self, node_id: NodeID) {
        let node = self.nodes.node_mut(node_id);
        node.update();

        if let SceneNode::Composite(composite) = node {
            let node_to_world_transform = composite.node.compute_node_to_world_transform();
            let child_node_ids = composite.child_node_ids.clone();

            for child_node_id in child_node_ids {
                self.nodes
                    .node_mut(child_node_id)
                    .set_parent_to_world_transform(node_to_world_transform);
                self.update_subtree(child_node_id);
            }
        }
    }

    /// Hands every node in the graph to the given render sink in depth-first
    /// order.
    pub fn draw(&self, sink: &mut dyn RenderSink<F>) {
        self.draw_subtree(self.root_node_id, sink);
    }

    /// Hands the node with the given ID and all of its descendants to the
    /// given render sink in depth-first order.
    ///
    /// # Panics
    /// If the node does not exist.
    pub fn draw_subtree(&self, node_id: NodeID, sink: &mut dyn RenderSink<F>) {
        let node = self.nodes.node(node_id);
        node.draw(node_id, sink);

        if let SceneNode::Composite(composite) = node {
            for &child_node_id in composite.child_node_ids() {
                self.draw_subtree(child_node_id, sink);
            }
        }
    }

    /// Whether the given world space point lies inside the node with the
    /// given ID. A composite node contains the point if any of its
    /// descendants does.
    ///
    /// # Panics
    /// If the node does not exist.
    pub fn is_inside(&self, node_id: NodeID, point: &Point3<F>) -> bool {
        match self.nodes.node(node_id) {
            SceneNode::Composite(composite) => composite
                .child_node_ids()
                .iter()
                .any(|&child_node_id| self.is_inside(child_node_id, point)),
            node => node.is_inside(point),
        }
    }

    fn add_child_node(&mut self, parent_node_id: NodeID, mut node: SceneNode<F>) -> NodeID {
        let parent_to_world_transform = self
            .nodes
            .node(parent_node_id)
            .composite()
            .node
            .compute_node_to_world_transform();

        node.node_mut().set_parent_node_id(Some(parent_node_id));
        node.set_parent_to_world_transform(parent_to_world_transform);

        let node_id = self.nodes.add_node(node);
        self.nodes
            .node_mut(parent_node_id)
            .composite_mut()
            .child_node_ids
            .push(node_id);
        node_id
    }

    fn remove_descendants(&mut self, node_id: NodeID) {
        if let Some(SceneNode::Composite(composite)) = self.nodes.remove_node(node_id) {
            for child_node_id in composite.child_node_ids {
                self.remove_descendants(child_node_id);
            }
        }
    }

    fn sync_subtree_transforms(&mut self, node_id: NodeID) {
        if let SceneNode::Composite(composite) = self.nodes.node(node_id) {
            let node_to_world_transform = composite.node.compute_node_to_world_transform();
            let child_node_ids = composite.child_node_ids.clone();

            for child_node_id in child_node_ids {
                self.nodes
                    .node_mut(child_node_id)
                    .set_parent_to_world_transform(node_to_world_transform);
                self.sync_subtree_transforms(child_node_id);
            }
        }
    }
}

impl<F: Float> Default for SceneGraph<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> NodeStorage<N> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_slot_indices: Vec::new(),
            n_nodes: 0,
        }
    }

    /// Returns the number of nodes in the storage.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Whether a node with the given ID exists in the storage.
    pub fn has_node(&self, node_id: NodeID) -> bool {
        self.get_node(node_id).is_some()
    }

    /// Returns a reference to the node with the given ID.
    ///
    /// # Panics
    /// If the node does not exist.
    pub fn node(&self, node_id: NodeID) -> &N {
        self.get_node(node_id)
            .unwrap_or_else(|| panic!("Tried to access missing scene graph node {node_id:?}"))
    }

    /// Returns a reference to the node with the given ID, or [`None`] if it
    /// does not exist.
    pub fn get_node(&self, node_id: NodeID) -> Option<&N> {
        self.slots
            .get(node_id.idx as usize)
            .filter(|slot| slot.generation == node_id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, node_id: NodeID) -> &mut N {
        self.get_node_mut(node_id)
            .unwrap_or_else(|| panic!("Tried to access missing scene graph node {node_id:?}"))
    }

    fn get_node_mut(&mut self, node_id: NodeID) -> Option<&mut N> {
        self.slots
            .get_mut(node_id.idx as usize)
            .filter(|slot| slot.generation == node_id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn add_node(&mut self, node: N) -> NodeID {
        self.n_nodes += 1;
        if let Some(idx) = self.free_slot_indices.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.node = Some(node);
            NodeID {
                idx,
                generation: slot.generation,
            }
        } else {
            assert!(
                self.slots.len() < u32::MAX as usize,
                "Number of scene graph nodes exceeds u32::MAX"
            );
            let idx = self.slots.len() as u32;
            self.slots.push(NodeSlot {
                generation: 0,
                node: Some(node),
            });
            NodeID { idx, generation: 0 }
        }
    }

    fn remove_node(&mut self, node_id: NodeID) -> Option<N> {
        let slot = self
            .slots
            .get_mut(node_id.idx as usize)
            .filter(|slot| slot.generation == node_id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slot_indices.push(node_id.idx);
        self.n_nodes -= 1;
        Some(node)
    }
}

impl NodeID {
    /// Returns an ID that does not refer to any node.
    pub fn not_applicable() -> Self {
        Self {
            idx: u32::MAX,
            generation: u32::MAX,
        }
    }
}

impl<F: Float> SceneNode<F> {
    /// Returns the cube held by the node, if it is a regular or boundary
    /// cube.
    pub fn as_cube(&self) -> Option<&Cube<F>> {
        match self {
            Self::Cube(cube) | Self::Boundary(cube) => Some(cube),
            Self::Composite(_) => None,
        }
    }

    /// Returns the cube held by the node mutably, if it is a regular or
    /// boundary cube.
    pub fn as_cube_mut(&mut self) -> Option<&mut Cube<F>> {
        match self {
            Self::Cube(cube) | Self::Boundary(cube) => Some(cube),
            Self::Composite(_) => None,
        }
    }

    /// Converts the node into the cube it holds, if it is a regular or
    /// boundary cube.
    pub fn into_cube(self) -> Option<Cube<F>> {
        match self {
            Self::Cube(cube) | Self::Boundary(cube) => Some(cube),
            Self::Composite(_) => None,
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary(_))
    }

    fn node_mut(&mut self) -> &mut TransformNode<F> {
        match self {
            Self::Cube(cube) | Self::Boundary(cube) => cube.node_mut(),
            Self::Composite(composite) => &mut composite.node,
        }
    }

    fn composite(&self) -> &CompositeNode<F> {
        match self {
            Self::Composite(composite) => composite,
            _ => panic!("Expected scene graph node to be a composite"),
        }
    }

    fn composite_mut(&mut self) -> &mut CompositeNode<F> {
        match self {
            Self::Composite(composite) => composite,
            _ => panic!("Expected scene graph node to be a composite"),
        }
    }
}

impl<F: Float> GraphicObject<F> for SceneNode<F> {
    fn node(&self) -> &TransformNode<F> {
        match self {
            Self::Cube(cube) | Self::Boundary(cube) => cube.node(),
            Self::Composite(composite) => composite.node(),
        }
    }

    fn update(&mut self) {
        match self {
            Self::Cube(cube) | Self::Boundary(cube) => cube.update(),
            Self::Composite(composite) => composite.update(),
        }
    }

    fn set_parent_to_world_transform(&mut self, parent_to_world_transform: Isometry3<F>) {
        match self {
            Self::Cube(cube) | Self::Boundary(cube) => {
                cube.set_parent_to_world_transform(parent_to_world_transform);
            }
            Self::Composite(composite) => {
                composite.set_parent_to_world_transform(parent_to_world_transform);
            }
        }
    }

    fn draw(&self, node_id: NodeID, sink: &mut dyn RenderSink<F>) {
        match self {
            Self::Cube(cube) => cube.draw(node_id, sink),
            Self::Boundary(cube) => sink.render_cube(&cube.render_data(node_id, true)),
            Self::Composite(composite) => composite.draw(node_id, sink),
        }
    }

    fn is_inside(&self, point: &Point3<F>) -> bool {
        match self {
            Self::Cube(cube) | Self::Boundary(cube) => cube.is_inside(point),
            Self::Composite(composite) => composite.is_inside(point),
        }
    }
}

impl<F: Float> CompositeNode<F> {
    fn new(transform: NodeTransform<F>) -> Self {
        Self {
            node: TransformNode::new(transform),
            child_node_ids: Vec::new(),
        }
    }

    /// Returns the IDs of the child nodes, in order.
    pub fn child_node_ids(&self) -> &[NodeID] {
        &self.child_node_ids
    }

    /// Returns the number of child nodes.
    pub fn n_children(&self) -> usize {
        self.child_node_ids.len()
    }

    fn remove_child_node(&mut self, node_id: NodeID) {
        self.child_node_ids.retain(|&id| id != node_id);
    }
}

/// A composite node has no extent or visual of its own. Updating, drawing and
/// testing containment for its children goes through the [`SceneGraph`],
/// which owns them.
impl<F: Float> GraphicObject<F> for CompositeNode<F> {
    fn node(&self) -> &TransformNode<F> {
        &self.node
    }

    fn update(&mut self) {}

    fn set_parent_to_world_transform(&mut self, parent_to_world_transform: Isometry3<F>) {
        self.node
            .set_parent_to_world_transform(parent_to_world_transform);
    }

    fn draw(&self, _node_id: NodeID, _sink: &mut dyn RenderSink<F>) {}

    fn is_inside(&self, _point: &Point3<F>) -> bool {
        false
    }
}
