//! The interaction state machine: turns the continuous pointer stream into
//! discrete intents (select, drag, rotate, hover, click-through) against the
//! scene.
//!
//! All mutable interaction state lives in [`InteractionController`]. The
//! three pointer systems run chained - move, then down, then up - so events
//! within a frame are always interpreted in that order.

use bevy::prelude::*;
use bevy::window::CursorMoved;

use crate::ground::GroundPlane;
use crate::handles::{cursor_over_handle, RotationHandleConfig};
use crate::hud::HudState;
use crate::picking::{ray_hits, PickingCameraState};
use crate::selectable::{AwaitingPlacement, Furnishing, HitBox, Hovered, SelectedFurnishing};
use crate::surfaces::{FloorClicked, FloorSurface, NothingClicked, WallClicked, WallSurface};

/// The mutually exclusive interaction states. Exactly one is active at any
/// time; transitions happen only inside the pointer systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionState {
    /// No active selection.
    #[default]
    Unselected,
    /// An object is selected but not being manipulated.
    Selected,
    /// The selected object follows the pointer across the ground plane.
    Dragging,
    /// The selected object rotates toward the pointer, button held.
    Rotating,
    /// Rotation continues with the button released; the next press ends it.
    RotatingFree,
    /// Reserved for camera panning consumers; no pointer transition enters
    /// it.
    Panning,
}

/// Owns the interaction state machine and the (weak) selection and hover
/// references. External collaborators receive calls but never mutate this
/// state directly.
#[derive(Resource, Debug)]
pub struct InteractionController {
    /// While false every pointer handler is a no-op. An in-progress drag or
    /// rotate freezes at its last pose and resumes on re-enable.
    pub enabled: bool,
    state: InteractionState,
    selected: Option<Entity>,
    hovered: Option<Entity>,
    pressed: bool,
    moved_since_press: bool,
    rotate_handle_hovered: bool,
    needs_update: bool,
    pointer_blocked: bool,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            enabled: true,
            state: InteractionState::default(),
            selected: None,
            hovered: None,
            pressed: false,
            moved_since_press: false,
            rotate_handle_hovered: false,
            needs_update: true,
            pointer_blocked: false,
        }
    }
}

impl InteractionController {
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// The current selection. At most one entity, validated against the
    /// live world through removal notifications.
    pub fn selected(&self) -> Option<Entity> {
        self.selected
    }

    /// The entity under the pointer while no button is pressed.
    pub fn hovered(&self) -> Option<Entity> {
        self.hovered
    }

    pub fn rotate_handle_hovered(&self) -> bool {
        self.rotate_handle_hovered
    }

    pub fn is_rotating(&self) -> bool {
        matches!(
            self.state,
            InteractionState::Rotating | InteractionState::RotatingFree
        )
    }

    /// True while the pointer is actively manipulating the selection.
    pub fn is_interacting(&self) -> bool {
        matches!(
            self.state,
            InteractionState::Dragging | InteractionState::Rotating | InteractionState::RotatingFree
        )
    }

    /// Whether a redraw was requested since the last call. The renderer is
    /// expected to poll this once per frame.
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    pub fn request_update(&mut self) {
        self.needs_update = true;
    }

    pub(crate) fn pointer_blocked(&self) -> bool {
        self.pointer_blocked
    }

    pub(crate) fn set_pointer_blocked(&mut self, blocked: bool) {
        self.pointer_blocked = blocked;
    }

    fn accepts_pointer(&self) -> bool {
        self.enabled && !self.pointer_blocked
    }

    /// Move to a new state, running the old state's exit hook and the new
    /// state's entry hook. Requesting the current state is a no-op: no
    /// hooks fire. The HUD rotating flag is refreshed either way.
    fn switch_state(&mut self, new_state: InteractionState, hud: &mut HudState) {
        if new_state != self.state {
            debug!("interaction state {:?} -> {:?}", self.state, new_state);
            self.on_state_exit(self.state);
            self.on_state_entry(new_state);
            self.state = new_state;
        }
        hud.set_rotating(self.is_rotating());
    }

    fn on_state_exit(&mut self, old_state: InteractionState) {
        match old_state {
            InteractionState::Dragging
            | InteractionState::Rotating
            | InteractionState::RotatingFree => {
                // The manipulation visuals (handle ring, highlight) need one
                // more frame to settle.
                self.needs_update = true;
            }
            _ => {}
        }
    }

    fn on_state_entry(&mut self, new_state: InteractionState) {
        match new_state {
            InteractionState::Dragging
            | InteractionState::Rotating
            | InteractionState::RotatingFree => {
                self.needs_update = true;
            }
            InteractionState::Selected | InteractionState::Unselected => {
                self.rotate_handle_hovered = false;
            }
            InteractionState::Panning => {}
        }
    }
}

type FurnishingsQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut Furnishing,
        &'static mut Transform,
        Option<&'static HitBox>,
    ),
>;

pub(crate) fn on_pointer_move(
    mut cursor_moved_reader: EventReader<CursorMoved>,
    mut controller: ResMut<InteractionController>,
    mut hud: ResMut<HudState>,
    cameras_query: Query<&PickingCameraState>,
    mut furnishings_query: FurnishingsQuery,
    ground: Res<GroundPlane>,
    handle_config: Res<RotationHandleConfig>,
    mut commands: Commands,
) {
    if cursor_moved_reader.read().count() == 0 {
        return;
    }
    if !controller.accepts_pointer() {
        return;
    }

    let Some((cursor_ray, under_cursor)) = cameras_query
        .iter()
        .find_map(|camera_state| Some((camera_state.cursor_ray?, camera_state.furnishing_under_cursor)))
    else {
        // A sample with no usable ray counts as no movement, so it cannot
        // cancel a motionless click-through.
        return;
    };
    controller.moved_since_press = true;

    if !controller.pressed
        && matches!(
            controller.state,
            InteractionState::Unselected | InteractionState::Selected
        )
    {
        update_hover(
            &mut controller,
            under_cursor.map(|(entity, _)| entity),
            &mut furnishings_query,
            &mut commands,
        );
        controller.rotate_handle_hovered = controller.state == InteractionState::Selected
            && controller
                .selected
                .and_then(|selected| {
                    let (furnishing, transform, hit_box) = furnishings_query.get(selected).ok()?;
                    let hit_box = hit_box?;
                    if furnishing.fixed {
                        return None;
                    }
                    Some(cursor_over_handle(
                        cursor_ray,
                        transform.translation,
                        hit_box,
                        &handle_config,
                    ))
                })
                .unwrap_or(false);
    }

    if controller.is_interacting() {
        let Some(selected) = controller.selected else {
            return;
        };
        let Ok((mut furnishing, mut transform, _)) = furnishings_query.get_mut(selected) else {
            return;
        };
        let Some(point) = ground.intersect(cursor_ray) else {
            return;
        };
        if controller.is_rotating() {
            furnishing.behavior.rotate(&mut transform, point);
        } else {
            furnishing.behavior.click_dragged(&mut transform, point);
        }
        hud.refresh();
        controller.needs_update = true;
    }
}

pub(crate) fn on_pointer_down(
    buttons: Res<ButtonInput<MouseButton>>,
    mut controller: ResMut<InteractionController>,
    mut hud: ResMut<HudState>,
    cameras_query: Query<&PickingCameraState>,
    mut furnishings_query: FurnishingsQuery,
    ground: Res<GroundPlane>,
    mut commands: Commands,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    if !controller.accepts_pointer() {
        return;
    }
    controller.pressed = true;
    controller.moved_since_press = false;

    let Some((cursor_ray, under_cursor)) = cameras_query
        .iter()
        .find_map(|camera_state| Some((camera_state.cursor_ray?, camera_state.furnishing_under_cursor)))
    else {
        return;
    };

    match controller.state {
        InteractionState::Selected if controller.rotate_handle_hovered => {
            controller.switch_state(InteractionState::Rotating, &mut hud);
        }
        InteractionState::Unselected | InteractionState::Selected => {
            if let Some((entity, _)) = under_cursor {
                press_on_entity(
                    &mut controller,
                    &mut hud,
                    entity,
                    cursor_ray,
                    &ground,
                    &mut furnishings_query,
                    &mut commands,
                );
            }
        }
        InteractionState::RotatingFree => {
            // A press during free rotation follows the normal down-rules,
            // falling back to plain selection on empty space.
            if let Some((entity, _)) = under_cursor {
                press_on_entity(
                    &mut controller,
                    &mut hud,
                    entity,
                    cursor_ray,
                    &ground,
                    &mut furnishings_query,
                    &mut commands,
                );
            } else {
                controller.switch_state(InteractionState::Selected, &mut hud);
            }
        }
        _ => {}
    }
}

pub(crate) fn on_pointer_up(
    buttons: Res<ButtonInput<MouseButton>>,
    mut controller: ResMut<InteractionController>,
    mut hud: ResMut<HudState>,
    cameras_query: Query<&PickingCameraState>,
    mut furnishings_query: FurnishingsQuery,
    walls_query: Query<(Entity, &GlobalTransform, &HitBox), With<WallSurface>>,
    floors_query: Query<(Entity, &GlobalTransform, &HitBox), With<FloorSurface>>,
    mut wall_clicked: EventWriter<WallClicked>,
    mut floor_clicked: EventWriter<FloorClicked>,
    mut nothing_clicked: EventWriter<NothingClicked>,
    mut commands: Commands,
) {
    if !buttons.just_released(MouseButton::Left) {
        return;
    }
    if !controller.accepts_pointer() {
        return;
    }
    controller.pressed = false;

    match controller.state {
        InteractionState::Dragging => {
            if let Some(selected) = controller.selected {
                if let Ok((mut furnishing, mut transform, _)) = furnishings_query.get_mut(selected)
                {
                    furnishing.behavior.click_released(&mut transform);
                }
            }
            controller.switch_state(InteractionState::Selected, &mut hud);
        }
        InteractionState::Rotating => {
            let next = if controller.moved_since_press {
                InteractionState::Selected
            } else {
                InteractionState::RotatingFree
            };
            controller.switch_state(next, &mut hud);
        }
        InteractionState::Unselected => {
            if !controller.moved_since_press {
                check_walls_and_floors(
                    &controller,
                    &cameras_query,
                    &walls_query,
                    &floors_query,
                    &mut wall_clicked,
                    &mut floor_clicked,
                    &mut nothing_clicked,
                );
            }
        }
        InteractionState::Selected => {
            let under_cursor = cameras_query
                .iter()
                .find_map(|camera_state| camera_state.furnishing_under_cursor);
            if !controller.moved_since_press && under_cursor.is_none() {
                set_selected(&mut controller, None, &mut furnishings_query, &mut commands);
                controller.switch_state(InteractionState::Unselected, &mut hud);
                check_walls_and_floors(
                    &controller,
                    &cameras_query,
                    &walls_query,
                    &floors_query,
                    &mut wall_clicked,
                    &mut floor_clicked,
                    &mut nothing_clicked,
                );
            }
        }
        _ => {}
    }
}

/// A furnishing spawned without a settled position is picked up on sight, so
/// the user places it with the very next pointer move instead of entering a
/// separate placement mode.
pub(crate) fn pick_up_new_furnishings(
    mut controller: ResMut<InteractionController>,
    mut hud: ResMut<HudState>,
    ground: Res<GroundPlane>,
    pending_query: Query<Entity, With<AwaitingPlacement>>,
    mut furnishings_query: FurnishingsQuery,
    mut commands: Commands,
) {
    for entity in pending_query.iter() {
        if let Some(mut entity_commands) = commands.get_entity(entity) {
            entity_commands.remove::<AwaitingPlacement>();
        }
        let Ok((furnishing, transform, _)) = furnishings_query.get(entity) else {
            continue;
        };
        if furnishing.fixed {
            continue;
        }
        let press_point = ground.project(transform.translation);
        set_selected(
            &mut controller,
            Some(entity),
            &mut furnishings_query,
            &mut commands,
        );
        controller.switch_state(InteractionState::Dragging, &mut hud);
        if let Ok((mut furnishing, mut transform, _)) = furnishings_query.get_mut(entity) {
            furnishing.behavior.click_pressed(&mut transform, press_point);
        }
    }
}

/// Clear stale references when a furnishing leaves the scene, whatever state
/// the machine is in.
pub(crate) fn reconcile_removed_furnishings(
    mut removed: RemovedComponents<Furnishing>,
    mut controller: ResMut<InteractionController>,
    mut hud: ResMut<HudState>,
) {
    for entity in removed.read() {
        if controller.selected == Some(entity) {
            warn!(
                "selected furnishing {:?} removed from the scene; dropping selection",
                entity
            );
            controller.selected = None;
            controller.switch_state(InteractionState::Unselected, &mut hud);
            controller.needs_update = true;
        }
        if controller.hovered == Some(entity) {
            controller.hovered = None;
            controller.needs_update = true;
        }
    }
}

fn press_on_entity(
    controller: &mut InteractionController,
    hud: &mut HudState,
    entity: Entity,
    cursor_ray: Ray3d,
    ground: &GroundPlane,
    furnishings_query: &mut FurnishingsQuery,
    commands: &mut Commands,
) {
    set_selected(controller, Some(entity), furnishings_query, commands);
    let Ok((mut furnishing, mut transform, _)) = furnishings_query.get_mut(entity) else {
        return;
    };
    if furnishing.fixed {
        controller.switch_state(InteractionState::Selected, hud);
    } else {
        controller.switch_state(InteractionState::Dragging, hud);
        if let Some(point) = ground.intersect(cursor_ray) {
            furnishing.behavior.click_pressed(&mut transform, point);
        }
    }
}

fn set_selected(
    controller: &mut InteractionController,
    new_selection: Option<Entity>,
    furnishings_query: &mut FurnishingsQuery,
    commands: &mut Commands,
) {
    if controller.selected == new_selection {
        return;
    }
    if let Some(old) = controller.selected.take() {
        if let Ok((mut furnishing, ..)) = furnishings_query.get_mut(old) {
            furnishing.behavior.set_unselected();
        }
        if let Some(mut entity_commands) = commands.get_entity(old) {
            entity_commands.remove::<SelectedFurnishing>();
        }
    }
    if let Some(new) = new_selection {
        if let Some(mut entity_commands) = commands.get_entity(new) {
            entity_commands.insert(SelectedFurnishing);
        }
    }
    controller.selected = new_selection;
    controller.needs_update = true;
}

/// Paired mouse-off/mouse-over forwarding: the entity losing hover always
/// hears `mouse_off` before the entity gaining it hears `mouse_over`, and no
/// entity hears `mouse_over` twice without a `mouse_off` in between.
fn update_hover(
    controller: &mut InteractionController,
    new_hover: Option<Entity>,
    furnishings_query: &mut FurnishingsQuery,
    commands: &mut Commands,
) {
    if controller.hovered == new_hover {
        return;
    }
    if let Some(old) = controller.hovered.take() {
        if let Ok((mut furnishing, ..)) = furnishings_query.get_mut(old) {
            furnishing.behavior.mouse_off();
        }
        if let Some(mut entity_commands) = commands.get_entity(old) {
            entity_commands.remove::<Hovered>();
        }
    }
    if let Some(new) = new_hover {
        if let Ok((mut furnishing, ..)) = furnishings_query.get_mut(new) {
            furnishing.behavior.mouse_over();
        }
        if let Some(mut entity_commands) = commands.get_entity(new) {
            entity_commands.insert(Hovered);
        }
    }
    controller.hovered = new_hover;
    controller.needs_update = true;
}

fn check_walls_and_floors(
    controller: &InteractionController,
    cameras_query: &Query<&PickingCameraState>,
    walls_query: &Query<(Entity, &GlobalTransform, &HitBox), With<WallSurface>>,
    floors_query: &Query<(Entity, &GlobalTransform, &HitBox), With<FloorSurface>>,
    wall_clicked: &mut EventWriter<WallClicked>,
    floor_clicked: &mut EventWriter<FloorClicked>,
    nothing_clicked: &mut EventWriter<NothingClicked>,
) {
    if controller.state != InteractionState::Unselected || controller.hovered.is_some() {
        return;
    }
    let Some(cursor_ray) = cameras_query
        .iter()
        .find_map(|camera_state| camera_state.cursor_ray)
    else {
        return;
    };
    // Walls take priority over floors; nearest hit wins within a category.
    if let Some((wall, _)) = ray_hits(cursor_ray, walls_query.iter()).into_iter().next() {
        wall_clicked.send(WallClicked(wall));
        return;
    }
    if let Some((floor, _)) = ray_hits(cursor_ray, floors_query.iter()).into_iter().next() {
        floor_clicked.send(FloorClicked(floor));
        return;
    }
    nothing_clicked.send(NothingClicked);
}
