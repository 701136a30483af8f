use bevy::prelude::*;
use bevy::render::view::RenderLayers;

use super::HandleId;
use crate::engine::camera::view_camera::ViewCameraController;
use crate::engine::cuboid::{CuboidExtent, CuboidGeometry, CuboidNode};
use crate::tools::transform::TransformInteraction;

/// Mesh entity drawing one handle of one view's gizmo.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GizmoHandleMesh {
    pub view: Entity,
    pub handle: HandleId,
}

/// Spawns handle meshes for each new view, on that view's render layers
/// minus the shared scene layer, so only that view draws them.
pub fn spawn_gizmo_handle_meshes(
    mut commands: Commands,
    views: Query<(Entity, &TransformInteraction, Option<&RenderLayers>), Added<TransformInteraction>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (view, interaction, layers) in &views {
        let layers = layers
            .cloned()
            .unwrap_or_default()
            .without(0);

        for handle in interaction.gizmo().handles() {
            let mesh = match handle.id {
                HandleId::Rotate => meshes.add(Sphere::new(0.5)),
                HandleId::Translate | HandleId::Scale(_) => meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
            };
            let material = materials.add(StandardMaterial {
                base_color: Color::WHITE.with_alpha(handle.opacity),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                cull_mode: None,
                ..default()
            });

            commands.spawn((
                Name::new(format!("gizmo_{}_{}", interaction.view(), handle.id)),
                GizmoHandleMesh {
                    view,
                    handle: handle.id,
                },
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::IDENTITY,
                Visibility::Hidden,
                layers.clone(),
            ));
        }
    }
}

/// Copies handle placement, cuboid colour and opacity onto the meshes.
pub fn sync_gizmo_handle_meshes(
    views: Query<(&TransformInteraction, &ViewCameraController)>,
    geometry: CuboidGeometry,
    mut handle_meshes: Query<
        (
            &GizmoHandleMesh,
            &mut Transform,
            &mut Visibility,
            &MeshMaterial3d<StandardMaterial>,
        ),
        (Without<CuboidNode>, Without<CuboidExtent>),
    >,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (mesh, mut transform, mut visibility, material) in &mut handle_meshes {
        let placed = views.get(mesh.view).ok().and_then(|(interaction, controller)| {
            let gizmo = interaction.gizmo();
            let handle = gizmo.handle(mesh.handle).filter(|_| gizmo.is_shown())?;
            let color = controller
                .target()
                .and_then(|target| geometry.color(target.entity).ok())
                .unwrap_or(Color::WHITE);
            Some((handle.transform, color.with_alpha(handle.opacity)))
        });

        let Some((placement, color)) = placed else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };

        visibility.set_if_neq(Visibility::Inherited);
        transform.set_if_neq(placement);
        let stale = materials
            .get(&material.0)
            .is_some_and(|current| current.base_color != color);
        if stale {
            if let Some(material) = materials.get_mut(&material.0) {
                material.base_color = color;
            }
        }
    }
}
