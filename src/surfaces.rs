//! Read-only hit surfaces supplied by the floor-plan model, and the
//! scene-level click events the controller emits against them.
//!
//! The controller only queries these on a motionless click that landed on no
//! furnishing; walls are tested before floors, and the nearest hit wins
//! within each category. Surrounding UI (texture pickers, context menus) can
//! react to the events without the controller knowing about it.

use bevy::prelude::*;

/// A wall-edge hit surface. Needs a [`HitBox`](crate::selectable::HitBox) on
/// the same entity.
#[derive(Component, Default)]
pub struct WallSurface;

/// A floor-region hit surface. Needs a [`HitBox`](crate::selectable::HitBox)
/// on the same entity.
#[derive(Component, Default)]
pub struct FloorSurface;

/// A motionless click landed on a wall surface.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClicked(pub Entity);

/// A motionless click landed on a floor surface (and no wall).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorClicked(pub Entity);

/// A motionless click landed on nothing at all.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct NothingClicked;
