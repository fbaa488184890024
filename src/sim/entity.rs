//! Entity types for everything on the road
//!
//! The cast is a closed set, so each variant is a payload in a tagged union
//! and the tick loop dispatches on the tag. No trait objects, no downcasts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Discriminant used for collision dispatch and the render boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityTag {
    Player,
    Elk,
    CannonTruck,
    Laser,
    Rock,
    Ground,
}

/// A moving rectangle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub accel: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            width,
            height,
        }
    }

    /// Semi-implicit Euler step: velocity first, so acceleration applied
    /// this frame already moves the body.
    ///
    /// No bounds checking here; ground clamping and screen culling are the
    /// caller's job.
    pub fn integrate(&mut self, dt: f32) {
        self.vel += self.accel * dt;
        self.pos += self.vel * dt;
    }

    /// Strict AABB overlap; touching edges do not count
    pub fn intersects(&self, other: &Body) -> bool {
        super::collision::aabb_overlap(self, other)
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Bottom edge in screen coordinates (y grows downward)
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }
}

/// One ranged attack from an angry elk.
///
/// The burst lives for a fixed window and damages the player at most once;
/// `consumed` latches on the first strike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightningBurst {
    pub age: f32,
    pub consumed: bool,
    /// Player x at the moment of firing, kept so the bolt can be drawn
    pub target_x: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Elk {
    /// Set for the whole herd as soon as any elk is hit
    pub angry: bool,
    pub attack_timer: f32,
    pub lightning: Option<LightningBurst>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannonTruck {
    /// Laser hits left before the truck is destroyed
    pub hp: u32,
    pub boss: bool,
    pub fire_timer: f32,
    /// True inside the telegraph window just before a shot
    pub about_to_fire: bool,
}

/// Variant payloads. Lasers, rocks and the ground carry no extra state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Elk(Elk),
    CannonTruck(CannonTruck),
    Laser,
    Rock,
    Ground,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub body: Body,
    /// Cleared to mark for removal; the tick loop purges once per frame.
    /// An inactive entity never reaches the render list.
    pub active: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn tag(&self) -> EntityTag {
        match self.kind {
            EntityKind::Elk(_) => EntityTag::Elk,
            EntityKind::CannonTruck(_) => EntityTag::CannonTruck,
            EntityKind::Laser => EntityTag::Laser,
            EntityKind::Rock => EntityTag::Rock,
            EntityKind::Ground => EntityTag::Ground,
        }
    }

    /// Elk run at ground level toward the player. A herd that is already
    /// enraged spawns its reinforcements angry too.
    pub fn elk(id: u32, x: f32, ground_level: f32, tuning: &Tuning, angry: bool) -> Self {
        let mut body = Body::new(
            x,
            ground_level - tuning.elk_height,
            tuning.elk_width,
            tuning.elk_height,
        );
        body.vel = Vec2::new(-tuning.elk_speed, 0.0);
        Self {
            id,
            body,
            active: true,
            kind: EntityKind::Elk(Elk {
                angry,
                ..Elk::default()
            }),
        }
    }

    /// Cannon trucks roll in from the right and lob rocks on a timer.
    /// The boss variant is upsized and takes more laser hits.
    pub fn cannon_truck(id: u32, x: f32, ground_level: f32, tuning: &Tuning, boss: bool) -> Self {
        let scale = if boss { tuning.boss_scale } else { 1.0 };
        let width = tuning.truck_width * scale;
        let height = tuning.truck_height * scale;
        let mut body = Body::new(x, ground_level - height, width, height);
        body.vel = Vec2::new(-tuning.truck_speed, 0.0);
        Self {
            id,
            body,
            active: true,
            kind: EntityKind::CannonTruck(CannonTruck {
                hp: if boss { tuning.boss_hp } else { tuning.truck_hp },
                boss,
                fire_timer: 0.0,
                about_to_fire: false,
            }),
        }
    }

    /// Lasers leave the back of the truck and fly right
    pub fn laser(id: u32, muzzle: Vec2, tuning: &Tuning) -> Self {
        let mut body = Body::new(muzzle.x, muzzle.y, tuning.laser_width, tuning.laser_height);
        body.vel = Vec2::new(tuning.laser_speed, 0.0);
        Self {
            id,
            body,
            active: true,
            kind: EntityKind::Laser,
        }
    }

    /// Rocks fired by a cannon truck fly left in a flat line
    pub fn rock(id: u32, muzzle: Vec2, tuning: &Tuning) -> Self {
        let mut body = Body::new(muzzle.x, muzzle.y, tuning.rock_size, tuning.rock_size);
        body.vel = Vec2::new(-tuning.rock_speed, 0.0);
        Self {
            id,
            body,
            active: true,
            kind: EntityKind::Rock,
        }
    }

    /// The ground strip. Decorative floor only: it is skipped by the update
    /// loop, the world scroll and collision dispatch.
    pub fn ground(id: u32, view_w: f32, view_h: f32, ground_level: f32) -> Self {
        Self {
            id,
            body: Body::new(0.0, ground_level, view_w, view_h - ground_level),
            active: true,
            kind: EntityKind::Ground,
        }
    }
}
