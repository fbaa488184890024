//! The player's dump truck
//!
//! One resource pool does double duty: the rocks in the bed are laser
//! ammunition and the life total. Run dry and the run is over.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Body;
use super::input::{InputSnapshot, Key};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Rocks left in the bed; never goes negative
    pub rocks: u32,
    /// Jumps taken since the truck last touched the ground
    pub jumps_used: u32,
    pub laser_cooldown: f32,
    pub on_ground: bool,
}

impl Player {
    pub fn new(x: f32, ground_level: f32, tuning: &Tuning) -> Self {
        Self {
            body: Body::new(
                x,
                ground_level - tuning.player_height,
                tuning.player_width,
                tuning.player_height,
            ),
            rocks: tuning.starting_rocks,
            jumps_used: 0,
            laser_cooldown: 0.0,
            on_ground: true,
        }
    }

    /// Adjust the rock pool, saturating at zero on the way down
    pub fn add_rocks(&mut self, delta: i32) {
        if delta >= 0 {
            self.rocks = self.rocks.saturating_add(delta as u32);
        } else {
            self.rocks = self.rocks.saturating_sub(delta.unsigned_abs());
        }
    }

    pub fn out_of_rocks(&self) -> bool {
        self.rocks == 0
    }

    /// One frame of truck control: gravity, jumps, friction, laser fire.
    ///
    /// Returns the muzzle position of a laser fired this frame, if any; the
    /// caller turns it into an entity so id allocation stays in one place.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot, tuning: &Tuning) -> Option<Vec2> {
        if self.on_ground {
            self.body.accel = Vec2::ZERO;
            if self.body.vel.y > 0.0 {
                self.body.vel.y = 0.0;
            }
        } else {
            self.body.accel = Vec2::new(0.0, tuning.gravity);
        }

        // Airborne jumps are a budget, refilled on landing
        if input.is_just_pressed(Key::Up) && self.jumps_used < tuning.max_jumps {
            self.body.vel.y = tuning.jump_velocity;
            self.on_ground = false;
            self.jumps_used += 1;
        }

        // Knockback from obstacle hits bleeds off over a few frames
        self.body.vel.x -= self.body.vel.x * (tuning.friction * dt).min(1.0);

        if self.laser_cooldown > 0.0 {
            self.laser_cooldown -= dt;
        }

        let mut muzzle = None;
        if input.is_down(Key::Down) && self.laser_cooldown <= 0.0 && self.rocks > 0 {
            // Lasers leave from the back of the truck at headlight height
            muzzle = Some(Vec2::new(
                self.body.pos.x + self.body.width,
                self.body.pos.y + self.body.height / 2.0 - tuning.laser_height / 2.0,
            ));
            self.laser_cooldown = tuning.laser_cooldown;
            self.rocks -= 1;
        }

        self.body.integrate(dt);
        muzzle
    }

    /// Clamp the truck to the ground plane after integration.
    ///
    /// The jump budget refills on the exact frame the truck is marked
    /// grounded, never earlier.
    pub fn snap_to_ground(&mut self, ground_level: f32) {
        if self.body.bottom() >= ground_level {
            self.body.pos.y = ground_level - self.body.height;
            if self.body.vel.y > 0.0 {
                self.body.vel.y = 0.0;
            }
            self.on_ground = true;
            self.jumps_used = 0;
        } else {
            self.on_ground = false;
        }
    }
}
