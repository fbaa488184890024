//! Session state and the render boundary
//!
//! Everything the tick loop mutates lives in one `GameState`, so the whole
//! state machine is testable without a canvas or an animation frame.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, EntityTag};
use super::player::Player;
use crate::consts::*;
use crate::tuning::Tuning;

/// Session phase. Exactly one holds at a time.
///
/// Transitions are one-directional except `Dead -> Playing` via `reset`.
/// `Victorious` is terminal; the page has to be reloaded to play again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first confirm press
    NotStarted,
    /// Live simulation
    Playing,
    /// Fatal elk collision; the wreck burns for a fixed beat
    Exploding,
    /// Game-over screen, confirm restarts
    Dead,
    /// Enough trucks destroyed; the run is won
    Victorious,
}

/// A cosmetic explosion fragment. Never affects gameplay.
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in the 0..=1 range; dead at zero
    pub life: f32,
    pub size: f32,
}

/// What the renderer needs to draw one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderEntity {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub tag: EntityTag,
}

impl RenderEntity {
    fn of(entity: &Entity) -> Self {
        Self {
            pos: entity.body.pos,
            width: entity.body.width,
            height: entity.body.height,
            tag: entity.tag(),
        }
    }
}

/// Complete game session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed; a session replays exactly from seed plus inputs
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,

    // Play field
    pub view_w: f32,
    pub view_h: f32,
    pub ground_level: f32,

    // Session scalars
    pub phase: GamePhase,
    pub score: u64,
    pub scroll_speed: f32,
    pub camera_offset: f32,
    pub spawn_timer: f32,
    pub trucks_spawned: u32,
    pub trucks_destroyed: u32,
    /// Latched the first time any elk is hit; spawned elk inherit it
    pub herd_enraged: bool,
    pub explosion_timer: f32,
    /// Decaying camera shake amplitude in 0..=1, rendering only
    pub screen_shake: f32,
    /// Simulated seconds since the session began
    pub time: f64,

    pub player: Player,
    pub entities: Vec<Entity>,
    pub particles: Vec<Particle>,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let ground_level = DEFAULT_VIEW_H - GROUND_HEIGHT;
        let player = Player::new(PLAYER_START_X, ground_level, &tuning);
        let scroll_speed = tuning.start_scroll;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            view_w: DEFAULT_VIEW_W,
            view_h: DEFAULT_VIEW_H,
            ground_level,
            phase: GamePhase::NotStarted,
            score: 0,
            scroll_speed,
            camera_offset: 0.0,
            spawn_timer: 0.0,
            trucks_spawned: 0,
            trucks_destroyed: 0,
            herd_enraged: false,
            explosion_timer: 0.0,
            screen_shake: 0.0,
            time: 0.0,
            player,
            entities: Vec::new(),
            particles: Vec::new(),
            next_id: 1,
        };
        state.spawn_ground();
        state
    }

    /// Allocate a monotonically increasing entity id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_ground(&mut self) {
        let id = self.next_entity_id();
        self.entities
            .push(Entity::ground(id, self.view_w, self.view_h, self.ground_level));
    }

    /// Fresh `Playing` session: entity list, player and scalars rebuilt.
    ///
    /// The RNG keeps rolling rather than reseeding, so back-to-back runs see
    /// different spawns while the session as a whole stays reproducible.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.particles.clear();
        self.score = 0;
        self.scroll_speed = self.tuning.start_scroll;
        self.camera_offset = 0.0;
        self.spawn_timer = 0.0;
        self.trucks_spawned = 0;
        self.trucks_destroyed = 0;
        self.herd_enraged = false;
        self.explosion_timer = 0.0;
        self.screen_shake = 0.0;
        self.player = Player::new(PLAYER_START_X, self.ground_level, &self.tuning);
        self.spawn_ground();
        self.phase = GamePhase::Playing;
    }

    /// Resize-driven reconfiguration of the play field.
    ///
    /// Recomputes the ground plane, restretches the ground strip and keeps
    /// the player inside the new bounds.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.view_w = width.max(1.0);
        self.view_h = height.max(1.0);
        self.ground_level = self.view_h - GROUND_HEIGHT;

        for entity in &mut self.entities {
            if let EntityKind::Ground = entity.kind {
                entity.body = Entity::ground(entity.id, self.view_w, self.view_h, self.ground_level)
                    .body;
            }
        }

        // Keep a grounded truck glued to the new ground plane; clamp a
        // mid-air truck that would otherwise end up underground
        let player = &mut self.player;
        player.body.pos.x = player
            .body
            .pos
            .x
            .clamp(0.0, (self.view_w - player.body.width).max(0.0));
        if player.on_ground || player.body.bottom() > self.ground_level {
            player.body.pos.y = self.ground_level - player.body.height;
            player.snap_to_ground(self.ground_level);
        }
    }

    pub fn rocks_remaining(&self) -> u32 {
        self.player.rocks
    }

    /// The render boundary: active entities with position, size and tag.
    ///
    /// Ground comes first so it paints under everything; the player comes
    /// last and is withheld while the wreck burns or the game-over screen
    /// is up.
    pub fn render_entities(&self) -> Vec<RenderEntity> {
        let mut out = Vec::with_capacity(self.entities.len() + 1);
        for entity in self.entities.iter().filter(|e| e.active) {
            if entity.tag() == EntityTag::Ground {
                out.push(RenderEntity::of(entity));
            }
        }
        for entity in self.entities.iter().filter(|e| e.active) {
            if entity.tag() != EntityTag::Ground {
                out.push(RenderEntity::of(entity));
            }
        }
        if !matches!(self.phase, GamePhase::Exploding | GamePhase::Dead) {
            out.push(RenderEntity {
                pos: self.player.body.pos,
                width: self.player.body.width,
                height: self.player.body.height,
                tag: EntityTag::Player,
            });
        }
        out
    }
}
