use bevy::prelude::*;

use crate::engine::camera::view_camera::{AttachKind, ViewCameraController};
use crate::engine::cuboid::{CuboidGeometry, CuboidHandle};
use crate::engine::error::ViewError;
use crate::tools::transform::{DragOwner, TransformInteraction};

/// Where a selection change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Store,
    Rpc,
    Keyboard,
}

/// Selects a cuboid for editing in every view, or clears the selection.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SelectCuboid {
    pub cuboid: Option<CuboidHandle>,
    pub source: SelectionSource,
}

impl SelectCuboid {
    pub fn select(handle: CuboidHandle, source: SelectionSource) -> Self {
        Self {
            cuboid: Some(handle),
            source,
        }
    }

    pub fn clear(source: SelectionSource) -> Self {
        Self {
            cuboid: None,
            source,
        }
    }
}

/// Attaches or detaches every view camera. Attaching to something that is
/// not a valid cuboid is a caller bug and fails the system.
pub fn apply_cuboid_selection(
    mut selections: EventReader<SelectCuboid>,
    geometry: CuboidGeometry,
    mut views: Query<(Entity, &mut ViewCameraController, &mut TransformInteraction)>,
    mut owner: ResMut<DragOwner>,
) -> Result {
    for event in selections.read() {
        match &event.cuboid {
            Some(handle) => {
                let pose = geometry
                    .pose(handle.entity)
                    .map_err(ViewError::InvalidTarget)?;
                for (view, mut controller, mut interaction) in &mut views {
                    if controller.attach(handle, &pose)? == AttachKind::Reframed {
                        interaction.cancel();
                        owner.release(view);
                    }
                }
                info!("Selected cuboid '{}' via {:?}", handle.id, event.source);
            }
            None => {
                for (view, mut controller, mut interaction) in &mut views {
                    controller.detach();
                    interaction.cancel();
                    interaction.gizmo_mut().hide();
                    owner.release(view);
                }
                info!("Selection cleared via {:?}", event.source);
            }
        }
    }
    Ok(())
}

/// `Tab` cycles the selection through all cuboids, `Escape` clears it.
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_selection_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    geometry: CuboidGeometry,
    views: Query<&ViewCameraController>,
    mut selections: EventWriter<SelectCuboid>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        selections.write(SelectCuboid::clear(SelectionSource::Keyboard));
        return;
    }
    if !keyboard.just_pressed(KeyCode::Tab) {
        return;
    }

    let mut handles = geometry.handles();
    if handles.is_empty() {
        return;
    }
    handles.sort_by(|a, b| a.id.0.cmp(&b.id.0));

    let current = views.iter().find_map(|view| view.target().cloned());
    let next = match current.and_then(|c| handles.iter().position(|h| h.entity == c.entity)) {
        Some(index) => (index + 1) % handles.len(),
        None => 0,
    };
    selections.write(SelectCuboid::select(
        handles[next].clone(),
        SelectionSource::Keyboard,
    ));
}

/// Keyboard shortcuts are handled by the host page on the web.
#[cfg(target_arch = "wasm32")]
pub fn handle_selection_keyboard_shortcuts() {}
