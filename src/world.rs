//! The simulated world of cubes moving inside a boundary.

use crate::{
    geometry::{Bounds, InclusiveBounds, NodeTransform},
    physics::{Motion, collision, fph},
    render::RenderSink,
    scene::{Color, Cube, FaceTextures, GraphicObject, NodeID, SceneGraph},
};
use anyhow::{Context, Result, bail};
use nalgebra::{Point3, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// The root of the simulation: a static boundary cube centered at the origin
/// and an ordered group of dynamic cubes moving inside it.
///
/// Each call to [`World::update`] advances the simulation by one tick:
///
/// 1. Every dynamic cube gets its default color back and loses its collision
///    mark.
/// 2. Every dynamic cube is moved and rotated by its velocities.
/// 3. Every dynamic cube protruding through the boundary is reflected back
///    inside, with its velocity reversed along the affected axes.
/// 4. Every pair of intersecting dynamic cubes is marked as colliding.
///
/// The collision marks thus always refer to the positions that are drawn.
#[derive(Clone, Debug)]
pub struct World {
    config: WorldConfig,
    scene_graph: SceneGraph<fph>,
    boundary_node_id: NodeID,
    cube_group_node_id: NodeID,
    tick_count: u64,
}

/// Configuration parameters for a [`World`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of the boundary cube centered at the origin.
    pub boundary_size: fph,
    /// Range for the number of randomly generated cubes.
    pub cube_count_range: InclusiveBounds<usize>,
    /// Range for the edge length of generated cubes.
    pub cube_size_range: InclusiveBounds<fph>,
    /// Range for each coordinate of the initial position of generated cubes.
    pub position_range: InclusiveBounds<fph>,
    /// Range for each initial rotation angle of generated cubes, in degrees.
    pub rotation_range: InclusiveBounds<fph>,
    /// Range for each component of the translational velocity of generated
    /// cubes, in distance per tick.
    pub translational_velocity_range: InclusiveBounds<fph>,
    /// Range for each component of the rotational velocity of generated
    /// cubes, in degrees per tick.
    pub rotational_velocity_range: InclusiveBounds<fph>,
    /// Color of cubes that are not colliding.
    pub default_color: Color,
    /// Color of cubes that collided in the current tick.
    pub collision_color: Color,
    /// Color of the boundary cube.
    pub boundary_color: Color,
}

impl World {
    /// Creates a new world with randomly generated cubes, drawing from the
    /// thread-local random number generator.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: WorldConfig) -> Result<Self> {
        Self::with_rng(config, &mut rand::rng())
    }

    /// Creates a new world with randomly generated cubes, drawing from a
    /// generator seeded with the given seed so that the result is
    /// reproducible.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_seed(config: WorldConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, &mut StdRng::seed_from_u64(seed))
    }

    /// Creates a new world with randomly generated cubes, drawing from the
    /// given random number generator.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_rng<R: Rng + ?Sized>(config: WorldConfig, rng: &mut R) -> Result<Self> {
        let mut world = Self::empty(config)?;

        let n_cubes = world.config.cube_count_range.sample(rng);
        for _ in 0..n_cubes {
            world.add_random_cube(rng);
        }

        log::info!(
            "Created world with {} cubes inside boundary of size {}",
            world.n_cubes(),
            world.config.boundary_size
        );

        Ok(world)
    }

    /// Creates a new world containing only the boundary cube.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn empty(config: WorldConfig) -> Result<Self> {
        config.validate().context("Invalid world configuration")?;

        let mut scene_graph = SceneGraph::new();
        let root_node_id = scene_graph.root_node_id();

        let boundary_node_id = scene_graph.add_boundary_node(
            root_node_id,
            Cube::new_static(config.boundary_size, Vector3::zeros(), config.boundary_color),
        );
        let cube_group_node_id =
            scene_graph.add_composite_node(root_node_id, NodeTransform::identity());

        Ok(Self {
            config,
            scene_graph,
            boundary_node_id,
            cube_group_node_id,
            tick_count: 0,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn scene_graph(&self) -> &SceneGraph<fph> {
        &self.scene_graph
    }

    /// Returns the static boundary cube.
    pub fn boundary(&self) -> &Cube<fph> {
        self.scene_graph
            .get_cube(self.boundary_node_id)
            .expect("World is missing its boundary cube")
    }

    /// Returns the number of dynamic cubes.
    pub fn n_cubes(&self) -> usize {
        self.cube_ids().len()
    }

    /// Returns the IDs of the dynamic cubes, in the order they are processed.
    pub fn cube_ids(&self) -> &[NodeID] {
        self.scene_graph.child_node_ids(self.cube_group_node_id)
    }

    /// Returns the dynamic cubes, in the order they are processed.
    pub fn cubes(&self) -> impl Iterator<Item = &Cube<fph>> {
        self.cube_ids()
            .iter()
            .filter_map(|&cube_id| self.scene_graph.get_cube(cube_id))
    }

    /// Returns the dynamic cube with the given ID, or [`None`] if it does not
    /// exist.
    pub fn cube(&self, cube_id: NodeID) -> Option<&Cube<fph>> {
        self.scene_graph
            .get_cube(cube_id)
            .filter(|cube| cube.node().parent_node_id() == Some(self.cube_group_node_id))
    }

    /// Returns the dynamic cube with the given ID mutably, or [`None`] if it
    /// does not exist.
    pub fn cube_mut(&mut self, cube_id: NodeID) -> Option<&mut Cube<fph>> {
        let cube_group_node_id = self.cube_group_node_id;
        self.scene_graph
            .get_cube_mut(cube_id)
            .filter(|cube| cube.node().parent_node_id() == Some(cube_group_node_id))
    }

    /// Returns the number of ticks the world has been updated for.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Adds the given cube to the end of the ordered group of cubes. Its
    /// transform is taken as relative to world space.
    pub fn add_cube(&mut self, cube: Cube<fph>) -> NodeID {
        let center = Point3::from(*cube.translation());
        if !self.boundary().absolute_bounding_box().contains_point(&center) {
            log::warn!("Added cube with center {center} outside the boundary");
        }
        let cube_id = self.scene_graph.add_cube_node(self.cube_group_node_id, cube);
        log::trace!("Added cube {cube_id:?}");
        cube_id
    }

    /// Adds a cube with edge length, position, rotation and velocities drawn
    /// from the configured ranges.
    pub fn add_random_cube<R: Rng + ?Sized>(&mut self, rng: &mut R) -> NodeID {
        let cube = self.generate_random_cube(rng);
        self.add_cube(cube)
    }

    /// Removes the dynamic cube with the given ID from the world.
    ///
    /// # Returns
    /// The removed cube, or [`None`] if it did not exist.
    pub fn remove_cube(&mut self, cube_id: NodeID) -> Option<Cube<fph>> {
        self.cube(cube_id)?;
        let cube = self.scene_graph.remove_node(cube_id)?.into_cube();
        log::trace!("Removed cube {cube_id:?}");
        cube
    }

    /// Attaches the given set of face textures to every dynamic cube,
    /// replacing any previous set.
    pub fn supply_face_textures(&mut self, face_textures: FaceTextures) {
        log::trace!(
            "Supplying {} face textures to cubes",
            face_textures.n_textured_faces()
        );
        for cube_id in self.cube_ids().to_vec() {
            if let Some(cube) = self.scene_graph.get_cube_mut(cube_id) {
                cube.set_face_textures(face_textures.clone());
            }
        }
    }

    /// Advances the simulation by one tick.
    pub fn update(&mut self) {
        with_debug_logging!("Updating world for tick {}", self.tick_count + 1; {
            self.reset_collision_state();

            self.scene_graph.update();

            let n_confined_cubes = self.confine_cubes_within_boundary();
            let n_colliding_cubes = self.mark_colliding_cubes();

            log::debug!(
                "{} of {} cubes reflected off boundary, {} colliding",
                n_confined_cubes,
                self.n_cubes(),
                n_colliding_cubes
            );
        });
        self.tick_count += 1;
    }

    /// Hands the boundary and all dynamic cubes to the given render sink as
    /// one frame.
    pub fn draw(&self, sink: &mut dyn RenderSink<fph>) {
        sink.begin_frame(self.tick_count);
        self.scene_graph.draw(sink);
        sink.end_frame();
    }

    /// Whether the given point lies inside any of the dynamic cubes.
    pub fn is_inside_any_cube(&self, point: &Point3<fph>) -> bool {
        self.scene_graph.is_inside(self.cube_group_node_id, point)
    }

    fn generate_random_cube<R: Rng + ?Sized>(&self, rng: &mut R) -> Cube<fph> {
        let config = &self.config;
        let size = config.cube_size_range.sample(rng);
        let translation = Vector3::from_fn(|_, _| config.position_range.sample(rng));
        let rotation_angles = Vector3::from_fn(|_, _| config.rotation_range.sample(rng));
        let motion = Motion::random(
            rng,
            &config.translational_velocity_range,
            &config.rotational_velocity_range,
        );
        Cube::new_dynamic(
            size,
            NodeTransform::new(translation, rotation_angles),
            motion,
            config.default_color,
        )
    }

    fn reset_collision_state(&mut self) {
        let default_color = self.config.default_color;
        for cube_id in self.cube_ids().to_vec() {
            if let Some(cube) = self.scene_graph.get_cube_mut(cube_id) {
                cube.clear_collision(default_color);
            }
        }
    }

    fn confine_cubes_within_boundary(&mut self) -> usize {
        let boundary_aabb = self.boundary().absolute_bounding_box().clone();
        let mut n_confined_cubes = 0;
        for cube_id in self.cube_ids().to_vec() {
            if let Some(cube) = self.scene_graph.get_cube_mut(cube_id) {
                if cube.confine_within(&boundary_aabb) {
                    log::trace!("Cube {cube_id:?} reflected off boundary");
                    n_confined_cubes += 1;
                }
            }
        }
        n_confined_cubes
    }

    fn mark_colliding_cubes(&mut self) -> usize {
        let cube_ids = self.cube_ids().to_vec();
        let oriented_boxes: Vec<_> = self.cubes().map(Cube::compute_oriented_box).collect();

        let collision_pairs = collision::detect_pairwise_intersections(&oriented_boxes);

        let collision_color = self.config.collision_color;
        for pair in &collision_pairs {
            for idx in [pair.first, pair.second] {
                if let Some(cube) = self.scene_graph.get_cube_mut(cube_ids[idx]) {
                    cube.mark_colliding(collision_color);
                }
            }
        }

        self.cubes().filter(|cube| cube.is_colliding()).count()
    }
}

impl WorldConfig {
    /// Checks that the configuration describes a valid world.
    ///
    /// # Errors
    /// Returns an error if any range is reversed or non-finite, if the
    /// boundary size is not positive and finite, if cube sizes are not
    /// positive or if a cube in some orientation could be wider than the
    /// boundary.
    pub fn validate(&self) -> Result<()> {
        if !(self.boundary_size.is_finite() && self.boundary_size > 0.0) {
            bail!(
                "Boundary size must be positive and finite, got {}",
                self.boundary_size
            );
        }

        self.cube_count_range
            .validate()
            .context("Invalid cube count range")?;

        for (name, range) in [
            ("cube size", &self.cube_size_range),
            ("position", &self.position_range),
            ("rotation", &self.rotation_range),
            ("translational velocity", &self.translational_velocity_range),
            ("rotational velocity", &self.rotational_velocity_range),
        ] {
            if !(range.lower().is_finite() && range.upper().is_finite()) {
                bail!("The {name} range must be finite, got {range:?}");
            }
            range
                .validate()
                .with_context(|| format!("Invalid {name} range"))?;
        }

        if self.cube_size_range.lower() <= 0.0 {
            bail!(
                "Cube sizes must be positive, got lower bound {}",
                self.cube_size_range.lower()
            );
        }
        // The bounding box of a rotated cube spans up to its space diagonal
        let max_cube_diagonal = fph::sqrt(3.0) * self.cube_size_range.upper();
        if max_cube_diagonal > self.boundary_size {
            bail!(
                "Cube sizes (up to {}, with diagonal {:.2}) must not exceed the boundary size ({})",
                self.cube_size_range.upper(),
                max_cube_diagonal,
                self.boundary_size
            );
        }

        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            boundary_size: 400.0,
            cube_count_range: InclusiveBounds::new(3, 10),
            cube_size_range: InclusiveBounds::new(10.0, 75.0),
            position_range: InclusiveBounds::new(-190.0, 190.0),
            rotation_range: InclusiveBounds::new(0.0, 0.0),
            translational_velocity_range: InclusiveBounds::new(-5.0, 5.0),
            rotational_velocity_range: InclusiveBounds::new(-5.0, 5.0),
            default_color: Color(0xFF00A0A0),
            collision_color: Color(0xFFFF4040),
            boundary_color: Color::WHITE,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::render::RecordingRenderSink;
    use approx::assert_abs_diff_eq;
    use image::RgbaImage;
    use nalgebra::vector;
    use std::sync::Arc;

    fn empty_world() -> World {
        World::empty(WorldConfig::default()).unwrap()
    }

    fn cube_with_velocity(
        size: fph,
        translation: Vector3<fph>,
        velocity: Vector3<fph>,
    ) -> Cube<fph> {
        Cube::new_dynamic(
            size,
            NodeTransform::from_translation(translation),
            Motion::translational(velocity),
            WorldConfig::default().default_color,
        )
    }

    #[test]
    fn default_config_is_valid() {
        WorldConfig::default().validate().unwrap();
    }

    #[test]
    fn non_positive_or_non_finite_boundary_is_rejected() {
        for boundary_size in [0.0, -10.0, fph::NAN, fph::INFINITY] {
            let config = WorldConfig {
                boundary_size,
                ..Default::default()
            };
            assert!(World::empty(config).is_err());
        }
    }

    #[test]
    fn reversed_range_is_rejected() {
        let config = WorldConfig {
            translational_velocity_range: ron::from_str("(lower: 5.0, upper: -5.0)").unwrap(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WorldConfig {
            cube_count_range: ron::from_str("(lower: 4, upper: 2)").unwrap(),
            ..Default::default()
        };
        assert!(World::new(config).is_err());
    }

    #[test]
    fn non_positive_cube_size_is_rejected() {
        let config = WorldConfig {
            cube_size_range: InclusiveBounds::new(0.0, 10.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn cubes_larger_than_boundary_are_rejected() {
        let config = WorldConfig {
            boundary_size: 50.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn cubes_that_could_outgrow_boundary_when_rotated_are_rejected() {
        let config = WorldConfig {
            cube_size_range: InclusiveBounds::new(10.0, 300.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WorldConfig {
            cube_size_range: InclusiveBounds::new(10.0, 230.0),
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn non_finite_range_is_rejected() {
        let config = WorldConfig {
            position_range: InclusiveBounds::new(-fph::INFINITY, 0.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn generated_world_respects_configured_ranges() {
        let config = WorldConfig::default();
        for seed in 0..10 {
            let world = World::with_seed(config.clone(), seed).unwrap();
            assert!(config.cube_count_range.contain(world.n_cubes()));
            for cube in world.cubes() {
                assert!(config.cube_size_range.contain(cube.size()));
                assert!(cube.translation().iter().all(|&x| config.position_range.contain(x)));
                assert_eq!(*cube.rotation_angles(), Vector3::zeros());
                assert!(
                    cube.translational_velocity()
                        .iter()
                        .all(|&v| config.translational_velocity_range.contain(v))
                );
                assert!(cube.is_dynamic());
                assert_eq!(cube.color(), config.default_color);
            }
        }
    }

    #[test]
    fn worlds_with_same_seed_are_identical() {
        let a = World::with_seed(WorldConfig::default(), 1234).unwrap();
        let b = World::with_seed(WorldConfig::default(), 1234).unwrap();
        assert_eq!(a.n_cubes(), b.n_cubes());
        for (cube_a, cube_b) in a.cubes().zip(b.cubes()) {
            assert_eq!(cube_a.transform(), cube_b.transform());
            assert_eq!(cube_a.motion(), cube_b.motion());
        }
    }

    #[test]
    fn single_count_range_gives_exact_number_of_cubes() {
        let config = WorldConfig {
            cube_count_range: InclusiveBounds::new(5, 5),
            ..Default::default()
        };
        assert_eq!(World::with_seed(config, 0).unwrap().n_cubes(), 5);
    }

    #[test]
    fn boundary_is_static_unfilled_and_centered() {
        let world = empty_world();
        let boundary = world.boundary();
        assert!(!boundary.is_dynamic());
        assert!(!boundary.is_filled());
        assert_eq!(boundary.size(), 400.0);
        assert_abs_diff_eq!(
            *boundary.absolute_bounding_box().lower_corner(),
            point(-200.0)
        );
        assert_abs_diff_eq!(
            *boundary.absolute_bounding_box().upper_corner(),
            point(200.0)
        );
    }

    fn point(value: fph) -> Point3<fph> {
        Point3::new(value, value, value)
    }

    #[test]
    fn updating_empty_world_only_advances_tick() {
        let mut world = empty_world();
        world.update();
        world.update();
        assert_eq!(world.tick_count(), 2);
        assert_eq!(world.n_cubes(), 0);
    }

    #[test]
    fn overlapping_cubes_are_both_marked_colliding() {
        let mut world = empty_world();
        let a = world.add_cube(cube_with_velocity(20.0, Vector3::zeros(), Vector3::zeros()));
        let b = world.add_cube(cube_with_velocity(
            20.0,
            vector![5.0, 5.0, 5.0],
            Vector3::zeros(),
        ));
        let c = world.add_cube(cube_with_velocity(
            20.0,
            vector![100.0, 0.0, 0.0],
            Vector3::zeros(),
        ));

        world.update();

        let collision_color = world.config().collision_color;
        for id in [a, b] {
            let cube = world.cube(id).unwrap();
            assert!(cube.is_colliding());
            assert_eq!(cube.color(), collision_color);
        }
        let cube = world.cube(c).unwrap();
        assert!(!cube.is_colliding());
        assert_eq!(cube.color(), world.config().default_color);
    }

    #[test]
    fn collision_marks_are_cleared_once_cubes_separate() {
        let mut world = empty_world();
        let a = world.add_cube(cube_with_velocity(
            10.0,
            vector![-6.0, 0.0, 0.0],
            vector![-5.0, 0.0, 0.0],
        ));
        let b = world.add_cube(cube_with_velocity(
            10.0,
            vector![6.0, 0.0, 0.0],
            vector![5.0, 0.0, 0.0],
        ));

        // The cubes move apart during the first tick
        world.update();
        assert!(!world.cube(a).unwrap().is_colliding());

        world.cube_mut(a).unwrap().set_translation(vector![0.0, 0.0, 0.0]);
        world.cube_mut(b).unwrap().set_translation(vector![-5.0, 0.0, 0.0]);
        world.update();
        assert!(world.cube(a).unwrap().is_colliding());
        assert!(world.cube(b).unwrap().is_colliding());

        world.update();
        assert!(!world.cube(a).unwrap().is_colliding());
        assert!(!world.cube(b).unwrap().is_colliding());
    }

    #[test]
    fn collisions_do_not_change_velocities() {
        let mut world = empty_world();
        let a = world.add_cube(cube_with_velocity(
            20.0,
            Vector3::zeros(),
            vector![1.0, 0.0, 0.0],
        ));
        world.add_cube(cube_with_velocity(
            20.0,
            vector![5.0, 0.0, 0.0],
            vector![-1.0, 0.0, 0.0],
        ));
        world.update();
        assert!(world.cube(a).unwrap().is_colliding());
        assert_eq!(
            *world.cube(a).unwrap().translational_velocity(),
            vector![1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn cube_crossing_boundary_is_reflected() {
        let mut world = empty_world();
        let id = world.add_cube(cube_with_velocity(
            10.0,
            vector![195.0, 0.0, 0.0],
            vector![5.0, 0.0, 0.0],
        ));

        world.update();

        let cube = world.cube(id).unwrap();
        assert!(cube.translation().x < 200.0);
        assert!(cube.translational_velocity().x < 0.0);
        assert_abs_diff_eq!(cube.translation().x, 190.0);
        assert_abs_diff_eq!(cube.absolute_bounding_box().max_x(), 195.0);
        assert_eq!(cube.translation().y, 0.0);
        assert_eq!(cube.translational_velocity().y, 0.0);
    }

    #[test]
    fn removing_cube_destroys_it() {
        let mut world = empty_world();
        let a = world.add_cube(cube_with_velocity(1.0, Vector3::zeros(), Vector3::zeros()));
        let b = world.add_cube(cube_with_velocity(
            2.0,
            vector![10.0, 0.0, 0.0],
            Vector3::zeros(),
        ));

        assert_eq!(world.remove_cube(a).map(|cube| cube.size()), Some(1.0));
        assert_eq!(world.cube_ids(), &[b]);
        assert!(world.cube(a).is_none());
        assert!(world.remove_cube(a).is_none());
    }

    #[test]
    fn boundary_is_not_accessible_as_dynamic_cube() {
        let mut world = empty_world();
        let boundary_node_id = world.boundary_node_id;
        assert!(world.cube(boundary_node_id).is_none());
        assert!(world.cube_mut(boundary_node_id).is_none());
        assert!(world.remove_cube(boundary_node_id).is_none());
    }

    #[test]
    fn supplied_face_textures_are_attached_to_every_cube() {
        let mut world = World::with_seed(WorldConfig::default(), 3).unwrap();
        let texture = Arc::new(RgbaImage::new(4, 4));
        world.supply_face_textures(FaceTextures::new(Some(Arc::clone(&texture)), None, None));

        assert!(world.cubes().all(|cube| {
            cube.face_textures()
                .left
                .as_ref()
                .is_some_and(|left| Arc::ptr_eq(left, &texture))
                && cube.face_textures().front.is_none()
        }));
        assert!(world.boundary().face_textures().is_empty());

        world.supply_face_textures(FaceTextures::default());
        assert!(world.cubes().all(|cube| cube.face_textures().is_empty()));
    }

    #[test]
    fn drawing_hands_boundary_and_cubes_to_sink_as_one_frame() {
        let mut world = World::with_seed(WorldConfig::default(), 8).unwrap();
        world.update();

        let mut sink = RecordingRenderSink::new();
        world.draw(&mut sink);

        let frame = sink.last_frame().unwrap();
        assert_eq!(frame.tick, 1);
        assert_eq!(frame.cubes.len(), world.n_cubes() + 1);
        assert!(frame.boundary().is_some_and(|boundary| !boundary.is_filled));
        let drawn_ids: Vec<_> = frame.dynamic_cubes().map(|cube| cube.node_id).collect();
        assert_eq!(drawn_ids, world.cube_ids());
    }

    #[test]
    fn point_containment_checks_every_cube() {
        let mut world = empty_world();
        world.add_cube(cube_with_velocity(
            10.0,
            vector![50.0, 0.0, 0.0],
            Vector3::zeros(),
        ));
        assert!(world.is_inside_any_cube(&Point3::new(52.0, 3.0, -4.0)));
        assert!(!world.is_inside_any_cube(&Point3::origin()));
    }
}
