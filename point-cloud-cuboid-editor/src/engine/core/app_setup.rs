use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::render::camera::Viewport;
use bevy::render::view::RenderLayers;
use bevy::window::PrimaryWindow;
use constants::gizmo::GIZMO_RENDER_LAYER_BASE;

use crate::engine::camera::orbit_camera::{OrbitView, OrbitViewCamera};
use crate::engine::camera::view_camera::ViewCameraController;
use crate::engine::core::window_config::create_window_config;
use crate::engine::cuboid::{CuboidExtent, CuboidHandle, CuboidNode, CuboidPose, spawn_cuboid};
use crate::engine::view::ViewAxis;
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tools::selection::{SelectCuboid, SelectionSource};
use crate::tools::transform::{TransformInteraction, ViewEditOptions};
use crate::tools::{CuboidEditorInputPlugin, CuboidEditorPlugin, CuboidEditorSet};

/// Screen quadrant a camera renders into, row-major from the top left.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportQuadrant(pub u32);

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(CuboidEditorPlugin)
        .add_plugins(CuboidEditorInputPlugin)
        .add_plugins(WebRpcPlugin)
        .insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.1)));

    app.add_systems(Startup, (setup, spawn_demo_cuboids).chain())
        .add_systems(
            Update,
            layout_viewports.before(CuboidEditorSet::Input),
        )
        .add_systems(
            Update,
            draw_cuboid_outlines.in_set(CuboidEditorSet::Render),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn spawn_orbit_camera(commands: &mut Commands, orbit: &OrbitViewCamera) {
    commands.spawn((
        Name::new("orbit_view"),
        Camera3d::default(),
        Camera {
            order: 0,
            ..default()
        },
        orbit.target_transform(),
        OrbitView,
        ViewportQuadrant(0),
        RenderLayers::layer(0),
    ));
}

fn spawn_view_cameras(commands: &mut Commands) {
    for (index, view) in ViewAxis::ALL.into_iter().enumerate() {
        let index = index as u32;
        commands.spawn((
            Name::new(format!("{view}_view")),
            Camera3d::default(),
            Camera {
                order: index as isize + 1,
                ..default()
            },
            Projection::Orthographic(OrthographicProjection::default_3d()),
            Transform::IDENTITY,
            RenderLayers::from_layers(&[0, GIZMO_RENDER_LAYER_BASE + index as usize]),
            ViewCameraController::new(view),
            TransformInteraction::new(view, ViewEditOptions::default()),
            ViewportQuadrant(index + 1),
        ));
    }
}

fn setup(mut commands: Commands, orbit: Res<OrbitViewCamera>) {
    spawn_lighting(&mut commands);
    spawn_orbit_camera(&mut commands, &orbit);
    spawn_view_cameras(&mut commands);
}

/// A few annotated objects to edit, with the first one selected.
fn spawn_demo_cuboids(mut commands: Commands, mut selections: EventWriter<SelectCuboid>) {
    let demo = [
        (
            "car-001",
            [0.0, 0.0, 0.8, 0.0, 0.0, 0.3, 4.4, 1.9, 1.6],
            Color::srgb(0.95, 0.55, 0.1),
        ),
        (
            "pedestrian-002",
            [4.0, 3.0, 0.9, 0.0, 0.0, -0.6, 0.6, 0.6, 1.8],
            Color::srgb(0.2, 0.8, 0.35),
        ),
        (
            "sign-003",
            [-5.0, 2.5, 1.5, 0.0, 0.0, 0.0, 0.2, 0.9, 3.0],
            Color::srgb(0.3, 0.55, 0.95),
        ),
    ];

    let mut first = None;
    for (id, pose, color) in demo {
        let entity = spawn_cuboid(&mut commands, id, CuboidPose::from_array(pose), color);
        first.get_or_insert(CuboidHandle {
            id: id.into(),
            entity,
        });
    }

    if let Some(handle) = first {
        selections.write(SelectCuboid::select(handle, SelectionSource::Store));
    }
}

/// Splits the window into four quadrants: orbit, top, side, front.
fn layout_viewports(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<(&ViewportQuadrant, &mut Camera)>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let half = window.physical_size() / 2;
    if half.x == 0 || half.y == 0 {
        return;
    }

    for (quadrant, mut camera) in &mut cameras {
        let position = UVec2::new(quadrant.0 % 2, quadrant.0 / 2) * half;
        let unchanged = camera.viewport.as_ref().is_some_and(|viewport| {
            viewport.physical_position == position && viewport.physical_size == half
        });
        if !unchanged {
            camera.viewport = Some(Viewport {
                physical_position: position,
                physical_size: half,
                ..default()
            });
        }
    }
}

/// Wireframe of every cuboid plus a ground cross, visible in all views.
fn draw_cuboid_outlines(
    mut gizmos: Gizmos,
    roots: Query<(&CuboidNode, &Transform, &Children)>,
    extents: Query<&Transform, With<CuboidExtent>>,
) {
    for (node, root, children) in &roots {
        for &child in &**children {
            if let Ok(extent) = extents.get(child) {
                gizmos.cuboid(root.mul_transform(*extent), node.color);
            }
        }
    }

    gizmos.line(Vec3::new(-20.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0), Color::srgb(0.6, 0.2, 0.2));
    gizmos.line(Vec3::new(0.0, -20.0, 0.0), Vec3::new(0.0, 20.0, 0.0), Color::srgb(0.2, 0.6, 0.2));
}
