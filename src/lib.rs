//! Rock Hauler - a side-scrolling dump truck arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, game state)
//! - `tuning`: Data-driven game balance
//! - `renderer`: Canvas 2D scene and HUD painting (browser only)

#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

/// Engine constants that are not gameplay balance
pub mod consts {
    /// Longest frame delta fed to the simulation (seconds). Browsers stop
    /// firing animation frames in background tabs; without this cap the
    /// first frame after refocus would be one giant catch-up step.
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play-field size before the first resize event
    pub const DEFAULT_VIEW_W: f32 = 900.0;
    pub const DEFAULT_VIEW_H: f32 = 520.0;

    /// Height of the ground strip at the bottom of the play field
    pub const GROUND_HEIGHT: f32 = 50.0;

    /// Where the player truck sits horizontally
    pub const PLAYER_START_X: f32 = 100.0;
}
