//! Scene representation of an annotation cuboid.
//!
//! A cuboid is two entities:
//!
//! ```text
//! CuboidNode + Transform (position, rotation, unit scale)
//!   └─> CuboidExtent + Transform (scale = box extent)
//! ```
//!
//! Everything that should follow the box without inheriting its extent
//! (view cameras, handles) hangs off the root frame. [`CuboidGeometry`] is the
//! only place that reads or writes this structure as a [`CuboidPose`].

/// Pose value type and conversions to and from transforms.
pub mod pose;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::engine::error::CuboidError;
pub use pose::CuboidPose;

/// Identifier the annotation store uses for a cuboid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CuboidId(pub String);

impl From<&str> for CuboidId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CuboidId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for CuboidId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-owning reference to a cuboid: its store id and its root entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CuboidHandle {
    pub id: CuboidId,
    pub entity: Entity,
}

/// Root of a cuboid. Carries the store id, display colour and the Euler
/// angles last written through [`CuboidGeometry`].
#[derive(Component, Debug, Clone)]
pub struct CuboidNode {
    pub id: CuboidId,
    pub color: Color,
    euler: Vec3,
}

impl CuboidNode {
    pub fn new(id: impl Into<CuboidId>, color: Color) -> Self {
        Self {
            id: id.into(),
            color,
            euler: Vec3::ZERO,
        }
    }
}

/// Marks the child entity whose scale is the box extent.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct CuboidExtent;

/// Spawns the root + extent structure for a cuboid and returns the root.
pub fn spawn_cuboid(
    commands: &mut Commands,
    id: impl Into<CuboidId>,
    pose: CuboidPose,
    color: Color,
) -> Entity {
    let id = id.into();
    let pose = pose.sanitized();
    let node = CuboidNode {
        euler: pose.rotation,
        ..CuboidNode::new(id.clone(), color)
    };

    commands
        .spawn((
            Name::new(format!("cuboid_{id}")),
            node,
            pose.root_transform(),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                Name::new(format!("cuboid_{id}_extent")),
                CuboidExtent,
                pose.extent_transform(),
                Visibility::default(),
            ));
        })
        .id()
}

/// Reads and writes cuboid poses on the root + extent structure.
#[derive(SystemParam)]
pub struct CuboidGeometry<'w, 's> {
    roots: Query<
        'w,
        's,
        (
            Entity,
            &'static mut CuboidNode,
            &'static mut Transform,
            Option<&'static Children>,
        ),
        Without<CuboidExtent>,
    >,
    extents: Query<'w, 's, &'static mut Transform, (With<CuboidExtent>, Without<CuboidNode>)>,
}

impl CuboidGeometry<'_, '_> {
    /// Whether `entity` is still a cuboid root, valid or not.
    pub fn contains(&self, entity: Entity) -> bool {
        self.roots.contains(entity)
    }

    /// Whether `entity` is a cuboid root with an extent child and a positive extent.
    pub fn is_valid_cuboid(&self, entity: Entity) -> bool {
        self.pose(entity).is_ok_and(|pose| pose.has_positive_scale())
    }

    pub fn handle(&self, entity: Entity) -> Result<CuboidHandle, CuboidError> {
        let node = self.node(entity)?;
        Ok(CuboidHandle {
            id: node.id.clone(),
            entity,
        })
    }

    /// Looks a cuboid up by store id.
    pub fn find(&self, id: &CuboidId) -> Option<CuboidHandle> {
        self.roots
            .iter()
            .find(|(_, node, _, _)| &node.id == id)
            .map(|(entity, node, _, _)| CuboidHandle {
                id: node.id.clone(),
                entity,
            })
    }

    pub fn handles(&self) -> Vec<CuboidHandle> {
        self.roots
            .iter()
            .map(|(entity, node, _, _)| CuboidHandle {
                id: node.id.clone(),
                entity,
            })
            .collect()
    }

    pub fn pose(&self, entity: Entity) -> Result<CuboidPose, CuboidError> {
        let (_, node, root, _) = self
            .roots
            .get(entity)
            .map_err(|_| CuboidError::NotACuboid(entity))?;
        let extent_entity = self.extent_entity(entity)?;
        let extent = self
            .extents
            .get(extent_entity)
            .map_err(|_| CuboidError::MissingExtent(node.id.clone()))?;

        Ok(CuboidPose::from_transforms(root, extent, Some(node.euler)))
    }

    /// Writes `pose` and returns what was committed. Non-finite components
    /// keep their prior value; a non-positive extent is rejected untouched.
    pub fn set_pose(&mut self, entity: Entity, pose: &CuboidPose) -> Result<CuboidPose, CuboidError> {
        let prior = self.pose(entity)?;
        let pose = pose.merged_onto(&prior);
        if !pose.has_positive_scale() {
            return Err(CuboidError::NonPositiveScale {
                id: self.node(entity)?.id.clone(),
                scale: pose.scale,
            });
        }

        let extent_entity = self.extent_entity(entity)?;
        if let Ok((_, mut node, mut root, _)) = self.roots.get_mut(entity) {
            node.euler = pose.rotation;
            root.translation = pose.position;
            root.rotation = pose.rotation_quat();
        }
        if let Ok(mut extent) = self.extents.get_mut(extent_entity) {
            extent.scale = pose.scale;
        }

        Ok(pose)
    }

    pub fn scale(&self, entity: Entity) -> Result<Vec3, CuboidError> {
        Ok(self.pose(entity)?.scale)
    }

    pub fn set_scale(&mut self, entity: Entity, scale: Vec3) -> Result<Vec3, CuboidError> {
        let pose = CuboidPose {
            scale,
            ..self.pose(entity)?
        };
        Ok(self.set_pose(entity, &pose)?.scale)
    }

    pub fn color(&self, entity: Entity) -> Result<Color, CuboidError> {
        Ok(self.node(entity)?.color)
    }

    fn node(&self, entity: Entity) -> Result<&CuboidNode, CuboidError> {
        self.roots
            .get(entity)
            .map(|(_, node, _, _)| node)
            .map_err(|_| CuboidError::NotACuboid(entity))
    }

    fn extent_entity(&self, entity: Entity) -> Result<Entity, CuboidError> {
        let (_, node, _, children) = self
            .roots
            .get(entity)
            .map_err(|_| CuboidError::NotACuboid(entity))?;
        let children: &[Entity] = children.map(|c| &**c).unwrap_or(&[]);

        children
            .iter()
            .copied()
            .find(|child| self.extents.contains(*child))
            .ok_or_else(|| CuboidError::MissingExtent(node.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn spawn(world: &mut World, pose: CuboidPose) -> Entity {
        world
            .run_system_once(move |mut commands: Commands| {
                spawn_cuboid(&mut commands, "a", pose, Color::WHITE)
            })
            .unwrap()
    }

    fn read(world: &mut World, entity: Entity) -> Result<CuboidPose, CuboidError> {
        world
            .run_system_once(move |geometry: CuboidGeometry| geometry.pose(entity))
            .unwrap()
    }

    fn write(world: &mut World, entity: Entity, pose: CuboidPose) -> Result<CuboidPose, CuboidError> {
        world
            .run_system_once(move |mut geometry: CuboidGeometry| geometry.set_pose(entity, &pose))
            .unwrap()
    }

    #[test]
    fn pose_round_trips_exactly() {
        let mut world = World::new();
        let entity = spawn(&mut world, CuboidPose::default());
        let pose = CuboidPose::from_array([1.5, -2.0, 0.25, 0.4, -1.1, 3.0, 2.0, 0.5, 1.25]);

        write(&mut world, entity, pose).unwrap();
        assert_eq!(read(&mut world, entity).unwrap(), pose);
    }

    #[test]
    fn extent_lives_on_child_and_root_keeps_unit_scale() {
        let mut world = World::new();
        let pose = CuboidPose::new(Vec3::ZERO, Vec3::ZERO, Vec3::new(2.0, 3.0, 4.0));
        let entity = spawn(&mut world, pose);

        assert_eq!(world.get::<Transform>(entity).unwrap().scale, Vec3::ONE);
        let extent = world.get::<Children>(entity).unwrap()[0];
        assert_eq!(world.get::<Transform>(extent).unwrap().scale, pose.scale);
    }

    #[test]
    fn non_positive_scale_is_rejected_untouched() {
        let mut world = World::new();
        let original = CuboidPose::new(Vec3::ONE, Vec3::ZERO, Vec3::ONE);
        let entity = spawn(&mut world, original);
        let bad = CuboidPose {
            scale: Vec3::new(1.0, 0.0, 1.0),
            ..original
        };

        assert!(matches!(
            write(&mut world, entity, bad),
            Err(CuboidError::NonPositiveScale { .. })
        ));
        assert_eq!(read(&mut world, entity).unwrap(), original);
    }

    #[test]
    fn non_finite_components_keep_prior_values() {
        let mut world = World::new();
        let original = CuboidPose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::ONE);
        let entity = spawn(&mut world, original);
        let update = CuboidPose::new(Vec3::new(f32::NAN, 5.0, 3.0), Vec3::ZERO, Vec3::ONE);

        let committed = write(&mut world, entity, update).unwrap();
        assert_eq!(committed.position, Vec3::new(1.0, 5.0, 3.0));
    }

    #[test]
    fn root_without_extent_is_invalid() {
        let mut world = World::new();
        let entity = world
            .spawn((CuboidNode::new("bare", Color::WHITE), Transform::default()))
            .id();

        assert!(matches!(
            read(&mut world, entity),
            Err(CuboidError::MissingExtent(_))
        ));
        let valid = world
            .run_system_once(move |geometry: CuboidGeometry| geometry.is_valid_cuboid(entity))
            .unwrap();
        assert!(!valid);
    }

    #[test]
    fn set_scale_writes_the_extent_child() {
        let mut world = World::new();
        let original = CuboidPose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.0, 0.7), Vec3::ONE);
        let entity = spawn(&mut world, original);
        let scale = Vec3::new(4.0, 2.5, 0.5);

        let committed = world
            .run_system_once(move |mut geometry: CuboidGeometry| geometry.set_scale(entity, scale))
            .unwrap();
        assert_eq!(committed, Ok(scale));

        let read_back = world
            .run_system_once(move |geometry: CuboidGeometry| geometry.scale(entity))
            .unwrap();
        assert_eq!(read_back, Ok(scale));
        assert_eq!(
            read(&mut world, entity).unwrap(),
            CuboidPose { scale, ..original }
        );
    }

    #[test]
    fn set_scale_rejects_non_positive_extent() {
        let mut world = World::new();
        let original = CuboidPose::new(Vec3::ONE, Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0));
        let entity = spawn(&mut world, original);

        let result = world
            .run_system_once(move |mut geometry: CuboidGeometry| {
                geometry.set_scale(entity, Vec3::new(2.0, -1.0, 1.0))
            })
            .unwrap();
        assert!(matches!(result, Err(CuboidError::NonPositiveScale { .. })));
        assert_eq!(read(&mut world, entity).unwrap(), original);
    }

    #[test]
    fn color_is_the_spawned_colour() {
        let mut world = World::new();
        let colour = Color::srgb(0.9, 0.4, 0.1);
        let entity = world
            .run_system_once(move |mut commands: Commands| {
                spawn_cuboid(&mut commands, "tinted", CuboidPose::default(), colour)
            })
            .unwrap();

        let read_back = world
            .run_system_once(move |geometry: CuboidGeometry| geometry.color(entity))
            .unwrap();
        assert_eq!(read_back, Ok(colour));

        let missing = Entity::from_raw(9999);
        let error = world
            .run_system_once(move |geometry: CuboidGeometry| geometry.color(missing))
            .unwrap();
        assert_eq!(error, Err(CuboidError::NotACuboid(missing)));
    }

    #[test]
    fn find_resolves_store_ids() {
        let mut world = World::new();
        let entity = spawn(&mut world, CuboidPose::default());
        let handle = world
            .run_system_once(|geometry: CuboidGeometry| geometry.find(&CuboidId::from("a")))
            .unwrap();
        assert_eq!(handle.map(|h| h.entity), Some(entity));
    }
}
