//! # Bevy Furnish - pointer-driven furnishing placement for 3D room planners.
//!
//! Pick a furnishing, drag it across the floor plane, rotate it in place, or
//! navigate the camera - all from pointer and keyboard input. The crate owns
//! the interaction policy only: meshes, materials, the floor-plan data model
//! and persistence all stay with the application.
//!
//! To use, add the egui plugin and [`FurnishPlugin`] to the Bevy app:
//!
//! ```no_run
//! # use bevy::prelude::*;
//! # use bevy_egui::EguiPlugin;
//! # use bevy_furnish::FurnishPlugin;
//! # let mut app = App::new();
//! app.add_plugins(EguiPlugin);
//! app.add_plugins(FurnishPlugin);
//! ```
//!
//! Give the camera a [`PickingCameraState`](picking::PickingCameraState) and
//! an [`OrbitCamera`](camera_nav::OrbitCamera), and spawn furnishings with a
//! [`Furnishing`](selectable::Furnishing) and a
//! [`HitBox`](selectable::HitBox):
//!
//! ```no_run
//! # use bevy::prelude::*;
//! # use bevy_furnish::prelude::*;
//! fn setup(mut commands: Commands) {
//!     commands.spawn((
//!         Camera3dBundle::default(),
//!         PickingCameraState::default(),
//!         OrbitCamera::new(Vec3::ZERO),
//!     ));
//!     commands.spawn((
//!         SpatialBundle::default(),
//!         Furnishing::movable(FreePlacement::default()),
//!         HitBox::new(Vec3::new(0.5, 0.4, 0.5)),
//!         AwaitingPlacement,
//!     ));
//! }
//! ```
//!
//! The plugins are split so the state machine can run without the picking
//! backend (that is also how the integration tests drive it):
//!
//! * [`FurnishInteractionPlugin`] - the interaction state machine.
//! * [`FurnishPickingPlugin`] - cursor rays and hit testing from the real
//!   window and camera.
//! * [`FurnishOverlayPlugin`] - HUD panel, cursor shape, rotation-handle
//!   ring.
//! * [`CameraNavPlugin`] - orbit buttons and the first-person walk mode.

pub mod camera_nav;
pub mod first_person;
pub mod ground;
pub mod handles;
pub mod hud;
pub mod interaction;
pub mod picking;
pub mod selectable;
pub mod surfaces;

use bevy::prelude::*;

use self::camera_nav::{CameraNavMode, CameraNavSettings, OrbitCommand};
use self::ground::GroundPlane;
use self::handles::RotationHandleConfig;
use self::hud::HudState;
use self::interaction::InteractionController;
use self::surfaces::{FloorClicked, NothingClicked, WallClicked};

pub mod prelude {
    pub use crate::camera_nav::{CameraNavMode, CameraNavSettings, OrbitCamera, OrbitCommand};
    pub use crate::first_person::FirstPersonController;
    pub use crate::ground::GroundPlane;
    pub use crate::handles::RotationHandleConfig;
    pub use crate::hud::HudState;
    pub use crate::interaction::{InteractionController, InteractionState};
    pub use crate::picking::{CursorHit, PickingCameraState};
    pub use crate::selectable::{
        AwaitingPlacement, FreePlacement, Furnishing, HitBox, Hovered, PlacementBehavior,
        SelectedFurnishing,
    };
    pub use crate::surfaces::{
        FloorClicked, FloorSurface, NothingClicked, WallClicked, WallSurface,
    };
    pub use crate::{
        CameraNavPlugin, FurnishInteractionPlugin, FurnishOverlayPlugin, FurnishPickingPlugin,
        FurnishPlugin, FurnishSystemSet,
    };
}

/// Order of operations each frame. The picking backend fills the camera
/// state before the interaction systems interpret it.
#[derive(SystemSet, Clone, PartialEq, Eq, Debug, Hash)]
pub enum FurnishSystemSet {
    /// Reset per-frame camera state and update the cursor ray.
    PrepareCameraState,
    /// Hit-test the scene and record what the cursor points at.
    UpdateCameraState,
    /// Interpret the pointer data and run the state machine.
    HandleInput,
}

/// Everything: interaction, picking backend, overlay and camera navigation.
/// The application must add `bevy_egui`'s `EguiPlugin` itself.
pub struct FurnishPlugin;

impl Plugin for FurnishPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            FurnishInteractionPlugin,
            FurnishPickingPlugin,
            FurnishOverlayPlugin,
            CameraNavPlugin,
        ));
    }
}

/// The interaction state machine, lifecycle reconciliation and the scene
/// click-through events. Has no dependency on windowing or egui, so it can
/// run headless with camera state injected by hand.
pub struct FurnishInteractionPlugin;

impl Plugin for FurnishInteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionController>();
        app.init_resource::<GroundPlane>();
        app.init_resource::<HudState>();
        app.init_resource::<RotationHandleConfig>();
        app.add_event::<WallClicked>();
        app.add_event::<FloorClicked>();
        app.add_event::<NothingClicked>();
        app.configure_sets(
            Update,
            (
                FurnishSystemSet::PrepareCameraState,
                FurnishSystemSet::UpdateCameraState,
                FurnishSystemSet::HandleInput,
            )
                .chain(),
        );
        app.add_systems(
            Update,
            (
                interaction::pick_up_new_furnishings,
                interaction::on_pointer_move,
                interaction::on_pointer_down,
                interaction::on_pointer_up,
                interaction::reconcile_removed_furnishings,
            )
                .chain()
                .in_set(FurnishSystemSet::HandleInput),
        );
    }
}

/// The picking backend: cursor rays from the real window and camera, and
/// nearest-hit testing against furnishing hit-boxes.
pub struct FurnishPickingPlugin;

impl Plugin for FurnishPickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionController>();
        app.add_systems(
            Update,
            (picking::prepare_camera_state, picking::update_cursor_ray)
                .in_set(FurnishSystemSet::PrepareCameraState),
        );
        app.add_systems(
            Update,
            picking::update_furnishing_under_cursor.in_set(FurnishSystemSet::UpdateCameraState),
        );
    }
}

/// Visual feedback: the HUD status panel, the pointer cursor hint and the
/// rotation-handle ring. Also blocks scene clicks while egui owns the
/// pointer.
pub struct FurnishOverlayPlugin;

impl Plugin for FurnishOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            hud::sync_pointer_block.in_set(FurnishSystemSet::UpdateCameraState),
        );
        app.add_systems(
            Update,
            (
                hud::hud_status_panel,
                hud::update_cursor_icon,
                handles::draw_rotation_handles,
            ),
        );
    }
}

/// Orbit pan/zoom/reset buttons and the first-person walk mode.
pub struct CameraNavPlugin;

impl Plugin for CameraNavPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraNavSettings>();
        app.init_resource::<CameraNavMode>();
        app.add_event::<OrbitCommand>();
        app.add_systems(
            Update,
            (
                camera_nav::camera_nav_ui,
                camera_nav::remember_home,
                camera_nav::apply_orbit_commands,
                camera_nav::handle_mode_changes,
            )
                .chain(),
        );
        app.add_systems(
            Update,
            (
                first_person::read_movement_keys,
                first_person::accumulate_look_deltas,
                first_person::update_first_person,
            )
                .chain()
                .after(camera_nav::handle_mode_changes),
        );
    }
}
