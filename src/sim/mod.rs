//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame delta, clamped at the platform boundary
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod input;
pub mod player;
pub mod state;
pub mod tick;

pub use collision::{aabb_overlap, horizontal_gap};
pub use entity::{Body, CannonTruck, Elk, Entity, EntityKind, EntityTag, LightningBurst};
pub use input::{InputSnapshot, Key};
pub use player::Player;
pub use state::{GamePhase, GameState, Particle, RenderEntity};
pub use tick::{SpawnKind, choose_spawn, tick};
