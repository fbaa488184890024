//! Data-driven game balance
//!
//! Persisted separately from session state in LocalStorage, so a tweaked
//! value survives a page reload.

use serde::{Deserialize, Serialize};

/// Every gameplay constant in one place.
///
/// Damage values, spawn weights and the victory threshold are balance, not
/// behavior; they live here so a tweak never touches the tick loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player truck ===
    /// Rocks in the truck bed at the start of a run. The pool is both laser
    /// ammunition and the life total.
    pub starting_rocks: u32,
    /// Jumps available before the truck has to touch the ground again
    pub max_jumps: u32,
    /// Downward acceleration while airborne (pixels/s^2)
    pub gravity: f32,
    /// Vertical velocity applied by a jump (negative is up)
    pub jump_velocity: f32,
    /// Per-second decay rate of residual horizontal velocity
    pub friction: f32,
    /// Horizontal shove applied when an obstacle hits the truck
    pub knockback: f32,
    pub player_width: f32,
    pub player_height: f32,

    // === Laser ===
    pub laser_speed: f32,
    pub laser_cooldown: f32,
    pub laser_width: f32,
    pub laser_height: f32,

    // === Damage and scoring ===
    /// Rocks lost when a cannon truck or rock projectile hits the player
    pub obstacle_damage: u32,
    /// Rocks lost to one lightning strike
    pub lightning_damage: u32,
    /// Score for shooting down an elk or a rock projectile
    pub laser_hit_score: u64,
    /// Score for reducing a cannon truck to zero hit points
    pub truck_destroyed_score: u64,
    /// Destroyed-truck count that ends the run in victory
    pub victory_trucks: u32,

    // === Elk ===
    pub elk_width: f32,
    pub elk_height: f32,
    /// Ground speed toward the player (positive; applied leftward)
    pub elk_speed: f32,
    /// Speed factor once the herd is angry
    pub elk_angry_multiplier: f32,
    /// Seconds between lightning attacks from one angry elk
    pub lightning_interval: f32,
    /// Seconds a lightning burst stays live before fizzling
    pub lightning_window: f32,
    /// Horizontal distance within which a live burst strikes the player
    pub lightning_range: f32,

    // === Cannon trucks ===
    pub truck_width: f32,
    pub truck_height: f32,
    pub truck_speed: f32,
    /// Laser hits a regular truck absorbs
    pub truck_hp: u32,
    /// Seconds between cannon shots
    pub fire_interval: f32,
    /// Seconds before a shot during which the barrel telegraphs
    pub fire_telegraph: f32,
    pub rock_size: f32,
    /// Projectile speed (positive; applied leftward)
    pub rock_speed: f32,
    /// Spawned-truck count after which new trucks are the boss variant
    pub boss_after_trucks: u32,
    pub boss_scale: f32,
    pub boss_hp: u32,

    // === Spawning ===
    /// Seconds between spawn rolls
    pub spawn_interval: f32,
    /// Roll share that produces an elk
    pub elk_weight: f32,
    /// Roll share that produces a cannon truck; the remainder spawns nothing
    pub truck_weight: f32,
    /// How far past the right edge new entities appear
    pub spawn_lead: f32,

    // === Scrolling ===
    pub min_scroll: f32,
    pub max_scroll: f32,
    pub start_scroll: f32,
    /// Scroll speed change per second of held accelerate/brake input
    pub scroll_accel: f32,

    // === Pacing ===
    /// Seconds the explosion plays before the game-over screen
    pub explosion_duration: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_rocks: 30,
            max_jumps: 2,
            gravity: 1000.0,
            jump_velocity: -420.0,
            friction: 6.0,
            knockback: 120.0,
            player_width: 80.0,
            player_height: 50.0,

            laser_speed: 400.0,
            laser_cooldown: 0.3,
            laser_width: 20.0,
            laser_height: 5.0,

            obstacle_damage: 10,
            lightning_damage: 5,
            laser_hit_score: 50,
            truck_destroyed_score: 200,
            victory_trucks: 25,

            elk_width: 60.0,
            elk_height: 70.0,
            elk_speed: 150.0,
            elk_angry_multiplier: 1.6,
            lightning_interval: 2.5,
            lightning_window: 0.6,
            lightning_range: 140.0,

            truck_width: 90.0,
            truck_height: 60.0,
            truck_speed: 100.0,
            truck_hp: 2,
            fire_interval: 3.0,
            fire_telegraph: 0.5,
            rock_size: 15.0,
            rock_speed: 300.0,
            boss_after_trucks: 10,
            boss_scale: 1.5,
            boss_hp: 5,

            spawn_interval: 2.0,
            elk_weight: 0.4,
            truck_weight: 0.3,
            spawn_lead: 50.0,

            min_scroll: 60.0,
            max_scroll: 400.0,
            start_scroll: 150.0,
            scroll_accel: 220.0,

            explosion_duration: 1.2,
        }
    }
}

impl Tuning {
    /// Clamp out-of-range values after deserializing user-edited JSON.
    ///
    /// The simulation assumes a non-negative scroll band, at least one jump
    /// and spawn weights that fit in one roll.
    pub fn sanitize(&mut self) {
        self.min_scroll = self.min_scroll.max(0.0);
        self.max_scroll = self.max_scroll.max(self.min_scroll);
        self.start_scroll = self.start_scroll.clamp(self.min_scroll, self.max_scroll);
        self.max_jumps = self.max_jumps.max(1);
        self.victory_trucks = self.victory_trucks.max(1);
        self.spawn_interval = self.spawn_interval.max(0.1);
        self.explosion_duration = self.explosion_duration.max(0.1);
        self.elk_weight = self.elk_weight.clamp(0.0, 1.0);
        self.truck_weight = self.truck_weight.clamp(0.0, 1.0 - self.elk_weight);
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "rock_hauler_tuning";

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(mut tuning) = serde_json::from_str::<Tuning>(&json) {
                    tuning.sanitize();
                    log::info!("Loaded tuning from LocalStorage");
                    return tuning;
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Save tuning to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Tuning saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
