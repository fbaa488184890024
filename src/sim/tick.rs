//! Per-frame simulation step
//!
//! One call to [`tick`] advances the whole session by `dt` seconds: scroll
//! control, player physics, type-dispatched entity updates, collision
//! resolution, the lightning sweep, deferred purge and timed spawning.
//! Entities are only ever marked inactive mid-frame and removed once at the
//! end, so no list is mutated while it is being walked.

use std::ops::Range;

use glam::Vec2;
use rand::Rng;

use super::collision::horizontal_gap;
use super::entity::{CannonTruck, Elk, Entity, EntityKind, EntityTag, LightningBurst};
use super::input::{InputSnapshot, Key};
use super::state::{GamePhase, GameState, Particle};
use crate::tuning::Tuning;

/// What one spawn roll decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Elk,
    CannonTruck,
}

/// Map one uniform roll in `[0, 1)` to a spawn decision
pub fn choose_spawn(roll: f32, tuning: &Tuning) -> Option<SpawnKind> {
    if roll < tuning.elk_weight {
        Some(SpawnKind::Elk)
    } else if roll < tuning.elk_weight + tuning.truck_weight {
        Some(SpawnKind::CannonTruck)
    } else {
        None
    }
}

/// Advance the session by one frame
pub fn tick(state: &mut GameState, input: &InputSnapshot, dt: f32) {
    state.time += dt as f64;

    // Shake decays whatever the phase
    state.screen_shake *= (-8.0 * dt).exp();
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }

    match state.phase {
        GamePhase::NotStarted => {
            if input.is_just_pressed(Key::Confirm) {
                log::info!("run started with seed {}", state.seed);
                state.phase = GamePhase::Playing;
            }
        }
        GamePhase::Playing => step_playing(state, input, dt),
        GamePhase::Exploding => {
            // Gameplay is frozen; only the wreck burns
            update_particles(state, dt);
            state.explosion_timer += dt;
            if state.explosion_timer >= state.tuning.explosion_duration {
                state.phase = GamePhase::Dead;
            }
        }
        GamePhase::Dead => {
            update_particles(state, dt);
            if input.is_just_pressed(Key::Confirm) {
                log::info!("restarting after game over, final score {}", state.score);
                state.reset();
            }
        }
        // Terminal by design; a reload starts the next run
        GamePhase::Victorious => {}
    }
}

fn step_playing(state: &mut GameState, input: &InputSnapshot, dt: f32) {
    let tuning = state.tuning.clone();

    // 1. Scroll control and camera
    if input.is_down(Key::Right) {
        state.scroll_speed += tuning.scroll_accel * dt;
    }
    if input.is_down(Key::Left) {
        state.scroll_speed -= tuning.scroll_accel * dt;
    }
    state.scroll_speed = state.scroll_speed.clamp(tuning.min_scroll, tuning.max_scroll);
    state.camera_offset += state.scroll_speed * dt;

    // 2-3. Player, then ground clamp
    if let Some(muzzle) = state.player.update(dt, input, &tuning) {
        let id = state.next_entity_id();
        state.entities.push(Entity::laser(id, muzzle, &tuning));
    }
    state.player.snap_to_ground(state.ground_level);
    let max_x = (state.view_w - state.player.body.width).max(0.0);
    state.player.body.pos.x = state.player.body.pos.x.clamp(0.0, max_x);

    // 4. Everything else: type-dispatched update, world scroll, cull
    let scroll = state.scroll_speed;
    let ground = state.ground_level;
    let view_w = state.view_w;
    let view_h = state.view_h;
    let player_x = state.player.body.center_x();
    let mut rocks_to_spawn: Vec<Vec2> = Vec::new();

    for entity in state.entities.iter_mut() {
        if !entity.active {
            continue;
        }
        let Entity {
            ref mut body,
            ref mut kind,
            ref mut active,
            ..
        } = *entity;
        match kind {
            // The ground is scenery; it neither moves nor culls
            EntityKind::Ground => continue,
            EntityKind::Elk(elk) => update_elk(body, elk, dt, ground, player_x, &tuning),
            EntityKind::CannonTruck(truck) => {
                update_cannon_truck(body, truck, dt, &tuning, &mut rocks_to_spawn)
            }
            EntityKind::Laser | EntityKind::Rock => body.integrate(dt),
        }

        body.pos.x -= scroll * dt;

        // Cull margin scales with the entity so a boss truck is not clipped
        // while half its hull is still visible
        let margin = 2.0 * body.width.max(body.height);
        if body.pos.x + body.width < -margin
            || body.pos.x > view_w + margin
            || body.pos.y > view_h + margin
        {
            *active = false;
        }
    }

    // Cannon fire lands after the walk so the list never grows mid-iteration
    for muzzle in rocks_to_spawn {
        let id = state.next_entity_id();
        state.entities.push(Entity::rock(id, muzzle, &tuning));
    }

    // 5. Collisions
    resolve_collisions(state, &tuning);

    // 6. Lightning is not a bounding box; it gets its own sweep
    if state.phase == GamePhase::Playing {
        lightning_sweep(state, &tuning);
    }

    update_particles(state, dt);

    // 7. Deferred purge, exactly once per frame
    state.entities.retain(|e| e.active);

    // A collision may have ended the run this frame
    if state.phase != GamePhase::Playing {
        return;
    }

    // 8. Timed spawning
    state.spawn_timer += dt;
    if state.spawn_timer >= tuning.spawn_interval {
        state.spawn_timer = 0.0;
        let roll: f32 = state.rng.random();
        match choose_spawn(roll, &tuning) {
            Some(SpawnKind::Elk) => spawn_elk(state, &tuning),
            Some(SpawnKind::CannonTruck) => spawn_cannon_truck(state, &tuning),
            None => {}
        }
    }

    // 9. Victory
    if state.trucks_destroyed >= tuning.victory_trucks {
        log::info!(
            "victory: {} trucks wrecked, final score {}",
            state.trucks_destroyed,
            state.score
        );
        state.phase = GamePhase::Victorious;
    }
}

/// Elk hug the ground; an angry one charges faster and rakes the road with
/// lightning on a timer.
fn update_elk(
    body: &mut super::entity::Body,
    elk: &mut Elk,
    dt: f32,
    ground_level: f32,
    player_x: f32,
    tuning: &Tuning,
) {
    if body.bottom() < ground_level {
        body.accel = Vec2::new(0.0, tuning.gravity);
    } else {
        body.pos.y = ground_level - body.height;
        body.vel.y = 0.0;
        body.accel = Vec2::ZERO;
    }

    let speed = if elk.angry {
        tuning.elk_speed * tuning.elk_angry_multiplier
    } else {
        tuning.elk_speed
    };
    body.vel.x = -speed;

    // Age out the current burst before possibly charging a new one
    if let Some(burst) = elk.lightning.as_mut() {
        burst.age += dt;
        if burst.age >= tuning.lightning_window {
            elk.lightning = None;
        }
    }
    if elk.angry {
        elk.attack_timer += dt;
        if elk.attack_timer >= tuning.lightning_interval && elk.lightning.is_none() {
            elk.attack_timer = 0.0;
            elk.lightning = Some(LightningBurst {
                age: 0.0,
                consumed: false,
                target_x: player_x,
            });
        }
    }

    body.integrate(dt);
}

/// Cannon trucks roll left and lob a rock every `fire_interval` seconds,
/// telegraphing for `fire_telegraph` seconds beforehand.
fn update_cannon_truck(
    body: &mut super::entity::Body,
    truck: &mut CannonTruck,
    dt: f32,
    tuning: &Tuning,
    rocks_to_spawn: &mut Vec<Vec2>,
) {
    truck.fire_timer += dt;
    truck.about_to_fire = truck.fire_timer >= tuning.fire_interval - tuning.fire_telegraph;
    if truck.fire_timer >= tuning.fire_interval {
        truck.fire_timer = 0.0;
        truck.about_to_fire = false;
        // Muzzle sits at the front bumper, barrel height
        rocks_to_spawn.push(Vec2::new(body.pos.x, body.pos.y + body.height * 0.3));
    }

    body.integrate(dt);
}

/// Tag-dispatched collision pass: the player against obstacles, then each
/// laser against the first target it overlaps in list order.
fn resolve_collisions(state: &mut GameState, tuning: &Tuning) {
    // Player against obstacles
    for i in 0..state.entities.len() {
        if !state.entities[i].active {
            continue;
        }
        match state.entities[i].tag() {
            EntityTag::Elk => {
                if state.player.body.intersects(&state.entities[i].body) {
                    state.entities[i].active = false;
                    enrage_herd(state);
                    begin_explosion(state);
                    return;
                }
            }
            EntityTag::CannonTruck | EntityTag::Rock => {
                if state.player.body.intersects(&state.entities[i].body) {
                    state.entities[i].active = false;
                    state.player.add_rocks(-(tuning.obstacle_damage as i32));
                    state.player.body.vel.x = -tuning.knockback;
                    state.screen_shake = (state.screen_shake + 0.4).min(1.0);
                    let impact = Vec2::new(
                        state.player.body.pos.x + state.player.body.width,
                        state.player.body.pos.y + state.player.body.height / 2.0,
                    );
                    spawn_burst(state, impact, 8, 40.0..160.0);
                    log::debug!("obstacle hit, {} rocks left", state.player.rocks);
                    if state.player.out_of_rocks() {
                        log::info!("out of rocks, game over at score {}", state.score);
                        state.phase = GamePhase::Dead;
                        return;
                    }
                }
            }
            _ => {}
        }
    }

    // Lasers: single-hit projectiles, first overlap in list order wins
    for i in 0..state.entities.len() {
        if !state.entities[i].active || state.entities[i].tag() != EntityTag::Laser {
            continue;
        }
        let laser_body = state.entities[i].body.clone();
        for j in 0..state.entities.len() {
            if i == j || !state.entities[j].active {
                continue;
            }
            let target_tag = state.entities[j].tag();
            let hittable = matches!(
                target_tag,
                EntityTag::Elk | EntityTag::CannonTruck | EntityTag::Rock
            );
            if !hittable || !laser_body.intersects(&state.entities[j].body) {
                continue;
            }

            state.entities[i].active = false;
            match target_tag {
                EntityTag::Elk => {
                    state.entities[j].active = false;
                    state.score += tuning.laser_hit_score;
                    enrage_herd(state);
                }
                EntityTag::Rock => {
                    state.entities[j].active = false;
                    state.score += tuning.laser_hit_score;
                }
                EntityTag::CannonTruck => {
                    let mut destroyed = false;
                    if let EntityKind::CannonTruck(truck) = &mut state.entities[j].kind {
                        truck.hp = truck.hp.saturating_sub(1);
                        destroyed = truck.hp == 0;
                    }
                    if destroyed {
                        state.entities[j].active = false;
                        state.trucks_destroyed += 1;
                        state.score += tuning.truck_destroyed_score;
                        log::debug!("truck destroyed ({} total)", state.trucks_destroyed);
                    }
                }
                _ => {}
            }
            break;
        }
    }
}

/// Any elk-related hit angers every active elk, and the rage sticks for the
/// rest of the session: reinforcements arrive angry too.
fn enrage_herd(state: &mut GameState) {
    if !state.herd_enraged {
        log::info!("the herd is enraged");
    }
    state.herd_enraged = true;
    for entity in state.entities.iter_mut() {
        if let EntityKind::Elk(elk) = &mut entity.kind {
            if entity.active {
                elk.angry = true;
            }
        }
    }
}

/// Every unconsumed live burst checks horizontal range to the player.
/// A burst that connects is spent on the spot.
fn lightning_sweep(state: &mut GameState, tuning: &Tuning) {
    let player_body = state.player.body.clone();
    let mut strikes: u32 = 0;

    for entity in state.entities.iter_mut() {
        if !entity.active {
            continue;
        }
        let EntityKind::Elk(elk) = &mut entity.kind else {
            continue;
        };
        let Some(burst) = elk.lightning.as_mut() else {
            continue;
        };
        if burst.consumed || burst.age >= tuning.lightning_window {
            continue;
        }
        if horizontal_gap(&entity.body, &player_body) < tuning.lightning_range {
            burst.consumed = true;
            strikes += 1;
        }
    }

    if strikes > 0 {
        state.player.add_rocks(-((tuning.lightning_damage * strikes) as i32));
        state.screen_shake = (state.screen_shake + 0.3).min(1.0);
        let top = Vec2::new(player_body.center_x(), player_body.pos.y);
        spawn_burst(state, top, 6 * strikes as usize, 30.0..120.0);
        log::debug!(
            "{} lightning strike(s), {} rocks left",
            strikes,
            state.player.rocks
        );
        if state.player.out_of_rocks() {
            log::info!("drained by lightning, game over at score {}", state.score);
            state.phase = GamePhase::Dead;
        }
    }
}

fn begin_explosion(state: &mut GameState) {
    log::info!("elk collision, final score {}", state.score);
    state.phase = GamePhase::Exploding;
    state.explosion_timer = 0.0;
    state.screen_shake = 1.0;
    let center = Vec2::new(
        state.player.body.center_x(),
        state.player.body.pos.y + state.player.body.height / 2.0,
    );
    spawn_burst(state, center, 40, 60.0..260.0);
}

/// Scatter debris particles from a point
fn spawn_burst(state: &mut GameState, center: Vec2, count: usize, speed: Range<f32>) {
    for _ in 0..count {
        let angle = state.rng.random_range(0.0..std::f32::consts::TAU);
        let magnitude = state.rng.random_range(speed.clone());
        let size = state.rng.random_range(2.0..7.0);
        state.particles.push(Particle {
            pos: center,
            vel: Vec2::new(angle.cos(), angle.sin()) * magnitude,
            life: 1.0,
            size,
        });
    }
}

fn update_particles(state: &mut GameState, dt: f32) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        // Debris falls and drags to a stop
        particle.vel.y += 500.0 * dt;
        particle.vel *= (1.0 - 2.0 * dt).max(0.0);
        particle.life -= dt / 1.2;
    }
    state.particles.retain(|p| p.life > 0.0);
}

fn spawn_elk(state: &mut GameState, tuning: &Tuning) {
    let id = state.next_entity_id();
    let x = state.view_w + tuning.spawn_lead;
    let angry = state.herd_enraged;
    state
        .entities
        .push(Entity::elk(id, x, state.ground_level, tuning, angry));
    log::debug!("spawned elk (angry: {angry})");
}

fn spawn_cannon_truck(state: &mut GameState, tuning: &Tuning) {
    let boss = state.trucks_spawned >= tuning.boss_after_trucks;
    if boss && state.trucks_spawned == tuning.boss_after_trucks {
        log::info!("boss trucks incoming");
    }
    state.trucks_spawned += 1;
    let id = state.next_entity_id();
    let x = state.view_w + tuning.spawn_lead;
    state
        .entities
        .push(Entity::cannon_truck(id, x, state.ground_level, tuning, boss));
    log::debug!("spawned cannon truck (boss: {boss})");
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn playing_state() -> GameState {
        let mut state = GameState::new(7, Tuning::default());
        state.phase = GamePhase::Playing;
        state
    }

    fn confirm() -> InputSnapshot {
        let mut input = InputSnapshot::new();
        input.press(Key::Confirm);
        input
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::new()
    }

    fn push_elk(state: &mut GameState, x: f32, angry: bool) -> u32 {
        let tuning = state.tuning.clone();
        let id = state.next_entity_id();
        let ground = state.ground_level;
        state.entities.push(Entity::elk(id, x, ground, &tuning, angry));
        id
    }

    fn push_truck(state: &mut GameState, x: f32, hp: u32) -> u32 {
        let tuning = state.tuning.clone();
        let id = state.next_entity_id();
        let ground = state.ground_level;
        let mut truck = Entity::cannon_truck(id, x, ground, &tuning, false);
        if let EntityKind::CannonTruck(t) = &mut truck.kind {
            t.hp = hp;
        }
        state.entities.push(truck);
        id
    }

    fn push_laser(state: &mut GameState, x: f32, y: f32) {
        let tuning = state.tuning.clone();
        let id = state.next_entity_id();
        state
            .entities
            .push(Entity::laser(id, Vec2::new(x, y), &tuning));
    }

    fn elk_payload(state: &GameState, id: u32) -> Option<&Elk> {
        state.entities.iter().find(|e| e.id == id).and_then(|e| {
            if let EntityKind::Elk(elk) = &e.kind {
                Some(elk)
            } else {
                None
            }
        })
    }

    #[test]
    fn test_confirm_starts_the_run() {
        let mut state = GameState::new(1, Tuning::default());
        tick(&mut state, &idle(), DT);
        assert_eq!(state.phase, GamePhase::NotStarted);

        tick(&mut state, &confirm(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_obstacle_hit_at_ten_rocks_ends_the_run() {
        // Scenario: the bed holds exactly what one truck hit costs
        let mut state = playing_state();
        state.player.rocks = 10;
        let x = state.player.body.pos.x;
        push_truck(&mut state, x, 2);

        tick(&mut state, &idle(), DT);

        assert_eq!(state.player.rocks, 0);
        assert_eq!(state.phase, GamePhase::Dead);
        // The obstacle is gone by the end of the frame that deactivated it
        assert!(
            state
                .entities
                .iter()
                .all(|e| e.tag() != EntityTag::CannonTruck)
        );
    }

    #[test]
    fn test_obstacle_hit_knocks_back_and_play_continues() {
        let mut state = playing_state();
        let x = state.player.body.pos.x;
        push_truck(&mut state, x, 2);

        tick(&mut state, &idle(), DT);

        assert_eq!(
            state.player.rocks,
            state.tuning.starting_rocks - state.tuning.obstacle_damage
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.player.body.vel.x < 0.0);
        assert!(state.screen_shake > 0.0);
    }

    #[test]
    fn test_laser_kill_enrages_the_herd() {
        let mut state = playing_state();
        let victim = push_elk(&mut state, 500.0, false);
        let witness = push_elk(&mut state, 700.0, false);
        let laser_y = state.ground_level - 30.0;
        push_laser(&mut state, 505.0, laser_y);

        tick(&mut state, &idle(), DT);

        assert!(state.herd_enraged);
        assert!(elk_payload(&state, victim).is_none(), "victim purged");
        assert!(elk_payload(&state, witness).is_some_and(|e| e.angry));
        assert_eq!(state.score, state.tuning.laser_hit_score);
        // The laser was spent on the hit
        assert!(state.entities.iter().all(|e| e.tag() != EntityTag::Laser));
    }

    #[test]
    fn test_single_hp_truck_dies_to_one_laser() {
        let mut state = playing_state();
        push_truck(&mut state, 500.0, 1);
        let laser_y = state.ground_level - 30.0;
        push_laser(&mut state, 505.0, laser_y);

        tick(&mut state, &idle(), DT);

        assert_eq!(state.trucks_destroyed, 1);
        assert_eq!(state.score, state.tuning.truck_destroyed_score);
        assert!(
            state
                .entities
                .iter()
                .all(|e| e.tag() != EntityTag::CannonTruck)
        );
    }

    #[test]
    fn test_truck_soaks_hits_until_hp_runs_out() {
        let mut state = playing_state();
        let id = push_truck(&mut state, 500.0, 2);
        let laser_y = state.ground_level - 30.0;
        push_laser(&mut state, 505.0, laser_y);

        tick(&mut state, &idle(), DT);

        // First hit: truck lives, laser dies, no reward yet
        assert_eq!(state.trucks_destroyed, 0);
        assert_eq!(state.score, 0);
        let truck = state.entities.iter().find(|e| e.id == id);
        assert!(truck.is_some());
        assert!(state.entities.iter().all(|e| e.tag() != EntityTag::Laser));

        let laser_y = state.ground_level - 30.0;
        push_laser(&mut state, 505.0, laser_y);
        tick(&mut state, &idle(), DT);

        assert_eq!(state.trucks_destroyed, 1);
        assert_eq!(state.score, state.tuning.truck_destroyed_score);
    }

    #[test]
    fn test_laser_spends_on_one_target_per_frame() {
        let mut state = playing_state();
        // Two overlapping elk; one laser can only pay out once
        push_elk(&mut state, 500.0, false);
        push_elk(&mut state, 510.0, false);
        let laser_y = state.ground_level - 30.0;
        push_laser(&mut state, 505.0, laser_y);

        tick(&mut state, &idle(), DT);

        assert_eq!(state.score, state.tuning.laser_hit_score);
        let elk_left = state
            .entities
            .iter()
            .filter(|e| e.tag() == EntityTag::Elk)
            .count();
        assert_eq!(elk_left, 1);
    }

    #[test]
    fn test_victory_latches() {
        let mut state = playing_state();
        state.trucks_destroyed = state.tuning.victory_trucks;

        tick(&mut state, &idle(), DT);
        assert_eq!(state.phase, GamePhase::Victorious);

        // No input gets out of a won run
        for _ in 0..10 {
            tick(&mut state, &confirm(), DT);
        }
        assert_eq!(state.phase, GamePhase::Victorious);
    }

    #[test]
    fn test_elk_collision_explodes_then_dies_then_resets() {
        let mut state = playing_state();
        let witness = push_elk(&mut state, 700.0, false);
        let player_x = state.player.body.pos.x;
        push_elk(&mut state, player_x, false);

        tick(&mut state, &idle(), DT);

        assert_eq!(state.phase, GamePhase::Exploding);
        assert!(state.herd_enraged);
        assert!(elk_payload(&state, witness).is_some_and(|e| e.angry));
        assert!(!state.particles.is_empty());
        // The wreck is hidden while it burns
        assert!(
            state
                .render_entities()
                .iter()
                .all(|e| e.tag != EntityTag::Player)
        );

        // Fixed-duration beat, then the game-over screen
        tick(&mut state, &idle(), 0.7);
        assert_eq!(state.phase, GamePhase::Exploding);
        tick(&mut state, &idle(), 0.7);
        assert_eq!(state.phase, GamePhase::Dead);

        // Confirm resumes straight into a fresh run
        tick(&mut state, &confirm(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.rocks_remaining(), state.tuning.starting_rocks);
        assert!(!state.herd_enraged);
    }

    #[test]
    fn test_lightning_strikes_once_per_burst() {
        let mut state = playing_state();
        state.player.rocks = 30;
        let id = push_elk(&mut state, 200.0, true);
        if let Some(entity) = state.entities.iter_mut().find(|e| e.id == id) {
            if let EntityKind::Elk(elk) = &mut entity.kind {
                elk.lightning = Some(LightningBurst {
                    age: 0.0,
                    consumed: false,
                    target_x: 140.0,
                });
            }
        }

        tick(&mut state, &idle(), DT);
        assert_eq!(state.player.rocks, 30 - state.tuning.lightning_damage);

        // The consumed burst never pays out again
        tick(&mut state, &idle(), DT);
        assert_eq!(state.player.rocks, 30 - state.tuning.lightning_damage);
        assert!(elk_payload(&state, id).is_some_and(|e| e
            .lightning
            .as_ref()
            .is_some_and(|b| b.consumed)));
    }

    #[test]
    fn test_lightning_out_of_range_misses() {
        let mut state = playing_state();
        let id = push_elk(&mut state, 600.0, true);
        if let Some(entity) = state.entities.iter_mut().find(|e| e.id == id) {
            if let EntityKind::Elk(elk) = &mut entity.kind {
                elk.lightning = Some(LightningBurst {
                    age: 0.0,
                    consumed: false,
                    target_x: 140.0,
                });
            }
        }

        tick(&mut state, &idle(), DT);
        assert_eq!(state.player.rocks, state.tuning.starting_rocks);
    }

    #[test]
    fn test_lightning_can_end_the_run() {
        let mut state = playing_state();
        state.player.rocks = state.tuning.lightning_damage;
        let id = push_elk(&mut state, 200.0, true);
        if let Some(entity) = state.entities.iter_mut().find(|e| e.id == id) {
            if let EntityKind::Elk(elk) = &mut entity.kind {
                elk.lightning = Some(LightningBurst {
                    age: 0.0,
                    consumed: false,
                    target_x: 140.0,
                });
            }
        }

        tick(&mut state, &idle(), DT);
        assert_eq!(state.player.rocks, 0);
        assert_eq!(state.phase, GamePhase::Dead);
    }

    #[test]
    fn test_angry_elk_charges_a_burst_on_the_interval() {
        let mut state = playing_state();
        let id = push_elk(&mut state, 600.0, true);
        if let Some(entity) = state.entities.iter_mut().find(|e| e.id == id) {
            if let EntityKind::Elk(elk) = &mut entity.kind {
                elk.attack_timer = state.tuning.lightning_interval - 0.001;
            }
        }

        tick(&mut state, &idle(), DT);

        let elk = elk_payload(&state, id).expect("elk still on screen");
        assert!(elk.lightning.is_some());
        assert_eq!(elk.attack_timer, 0.0);
    }

    #[test]
    fn test_calm_elk_never_fires() {
        let mut state = playing_state();
        let id = push_elk(&mut state, 600.0, false);

        for _ in 0..120 {
            tick(&mut state, &idle(), DT);
        }

        if let Some(elk) = elk_payload(&state, id) {
            assert!(elk.lightning.is_none());
            assert_eq!(elk.attack_timer, 0.0);
        }
    }

    #[test]
    fn test_angry_elk_is_faster() {
        let mut state = playing_state();
        let calm = push_elk(&mut state, 600.0, false);
        let angry = push_elk(&mut state, 600.0, true);

        tick(&mut state, &idle(), DT);

        let calm_x = state
            .entities
            .iter()
            .find(|e| e.id == calm)
            .map(|e| e.body.pos.x)
            .unwrap();
        let angry_x = state
            .entities
            .iter()
            .find(|e| e.id == angry)
            .map(|e| e.body.pos.x)
            .unwrap();
        assert!(angry_x < calm_x);
    }

    #[test]
    fn test_cannon_telegraphs_then_fires() {
        let mut state = playing_state();
        let id = push_truck(&mut state, 600.0, 2);
        let warmup = state.tuning.fire_interval - state.tuning.fire_telegraph + 0.01;
        if let Some(entity) = state.entities.iter_mut().find(|e| e.id == id) {
            if let EntityKind::CannonTruck(truck) = &mut entity.kind {
                truck.fire_timer = warmup;
            }
        }

        tick(&mut state, &idle(), DT);

        let telegraphing = state.entities.iter().find(|e| e.id == id).is_some_and(|e| {
            matches!(&e.kind, EntityKind::CannonTruck(t) if t.about_to_fire)
        });
        assert!(telegraphing);
        assert!(state.entities.iter().all(|e| e.tag() != EntityTag::Rock));

        let telegraph = state.tuning.fire_telegraph;
        tick(&mut state, &idle(), telegraph);

        assert!(state.entities.iter().any(|e| e.tag() == EntityTag::Rock));
        let reset = state.entities.iter().find(|e| e.id == id).is_some_and(|e| {
            matches!(&e.kind, EntityKind::CannonTruck(t) if !t.about_to_fire && t.fire_timer == 0.0)
        });
        assert!(reset);
    }

    #[test]
    fn test_offscreen_entities_are_purged() {
        let mut state = playing_state();
        let tuning = state.tuning.clone();
        let id = state.next_entity_id();
        let mut rock = Entity::rock(id, Vec2::new(-500.0, 100.0), &tuning);
        rock.body.vel = Vec2::ZERO;
        state.entities.push(rock);

        tick(&mut state, &idle(), DT);

        assert!(state.entities.iter().all(|e| e.tag() != EntityTag::Rock));
    }

    #[test]
    fn test_nearby_offscreen_entity_survives_the_margin() {
        let mut state = playing_state();
        // A boss-sized truck just past the left edge is still inside its
        // size-proportional margin
        let tuning = state.tuning.clone();
        let id = state.next_entity_id();
        let mut truck = Entity::cannon_truck(id, -100.0, state.ground_level, &tuning, true);
        truck.body.vel = Vec2::ZERO;
        state.entities.push(truck);

        tick(&mut state, &idle(), DT);

        assert!(state.entities.iter().any(|e| e.id == id));
    }

    #[test]
    fn test_scroll_speed_clamps_to_the_band() {
        // No traffic: this run is about the scroll band alone
        let tuning = Tuning {
            elk_weight: 0.0,
            truck_weight: 0.0,
            ..Tuning::default()
        };
        let mut state = GameState::new(7, tuning);
        state.phase = GamePhase::Playing;
        let mut input = InputSnapshot::new();
        input.press(Key::Right);
        for _ in 0..200 {
            tick(&mut state, &input, DT);
            input.begin_frame();
        }
        assert_eq!(state.scroll_speed, state.tuning.max_scroll);
        assert!(state.camera_offset > 0.0);

        input.release(Key::Right);
        input.press(Key::Left);
        for _ in 0..200 {
            tick(&mut state, &input, DT);
            input.begin_frame();
        }
        assert_eq!(state.scroll_speed, state.tuning.min_scroll);
    }

    #[test]
    fn test_spawn_timer_produces_traffic() {
        let mut state = playing_state();
        // One roll per tick; over a hundred intervals something must spawn
        for _ in 0..100 {
            let interval = state.tuning.spawn_interval;
            tick(&mut state, &idle(), interval);
        }
        let spawned_anything = state.trucks_spawned > 0 || state.entities.len() > 1;
        assert!(spawned_anything);
        assert!(state.spawn_timer < state.tuning.spawn_interval);
    }

    #[test]
    fn test_choose_spawn_weights() {
        let tuning = Tuning::default();
        assert_eq!(choose_spawn(0.0, &tuning), Some(SpawnKind::Elk));
        assert_eq!(choose_spawn(0.39, &tuning), Some(SpawnKind::Elk));
        assert_eq!(choose_spawn(0.4, &tuning), Some(SpawnKind::CannonTruck));
        assert_eq!(choose_spawn(0.69, &tuning), Some(SpawnKind::CannonTruck));
        assert_eq!(choose_spawn(0.7, &tuning), None);
        assert_eq!(choose_spawn(0.99, &tuning), None);
    }

    #[test]
    fn test_trucks_upsize_after_the_boss_threshold() {
        let mut state = playing_state();
        let tuning = state.tuning.clone();
        state.trucks_spawned = tuning.boss_after_trucks;

        spawn_cannon_truck(&mut state, &tuning);

        assert_eq!(state.trucks_spawned, tuning.boss_after_trucks + 1);
        let boss = state
            .entities
            .iter()
            .find(|e| e.tag() == EntityTag::CannonTruck)
            .expect("truck spawned");
        assert!(matches!(&boss.kind, EntityKind::CannonTruck(t) if t.boss && t.hp == tuning.boss_hp));
        assert!(boss.body.width > tuning.truck_width);
    }

    #[test]
    fn test_enraged_herd_spawns_angry_reinforcements() {
        let mut state = playing_state();
        state.herd_enraged = true;
        let tuning = state.tuning.clone();

        spawn_elk(&mut state, &tuning);

        let elk = state
            .entities
            .iter()
            .find(|e| e.tag() == EntityTag::Elk)
            .expect("elk spawned");
        assert!(matches!(&elk.kind, EntityKind::Elk(e) if e.angry));
    }

    #[test]
    fn test_firing_adds_a_laser_entity() {
        let mut state = playing_state();
        let mut input = InputSnapshot::new();
        input.press(Key::Down);

        tick(&mut state, &input, DT);

        assert!(state.entities.iter().any(|e| e.tag() == EntityTag::Laser));
        assert_eq!(state.rocks_remaining(), state.tuning.starting_rocks - 1);
    }

    #[test]
    fn test_determinism_from_seed_and_inputs() {
        let tuning = Tuning::default();
        let mut a = GameState::new(99, tuning.clone());
        let mut b = GameState::new(99, tuning);

        let mut input_a = InputSnapshot::new();
        let mut input_b = InputSnapshot::new();
        input_a.press(Key::Confirm);
        input_b.press(Key::Confirm);

        for frame in 0..600 {
            // Vary the inputs a bit, identically on both sides
            if frame == 10 {
                input_a.press(Key::Down);
                input_b.press(Key::Down);
            }
            if frame == 120 {
                input_a.press(Key::Up);
                input_b.press(Key::Up);
            }
            tick(&mut a, &input_a, DT);
            tick(&mut b, &input_b, DT);
            input_a.begin_frame();
            input_b.begin_frame();
        }

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.score, b.score);
        assert_eq!(a.trucks_spawned, b.trucks_spawned);
        assert_eq!(a.entities.len(), b.entities.len());
        assert_eq!(a.player.body.pos, b.player.body.pos);
        assert_eq!(a.player.rocks, b.player.rocks);
    }

    #[test]
    fn test_every_frame_ends_with_only_active_entities() {
        let mut state = playing_state();
        push_elk(&mut state, 500.0, false);
        push_truck(&mut state, 700.0, 1);
        let laser_y = state.ground_level - 30.0;
        push_laser(&mut state, 505.0, laser_y);

        for _ in 0..180 {
            tick(&mut state, &idle(), DT);
            assert!(state.entities.iter().all(|e| e.active));
        }
    }

    // Sanity check for the body reuse in collision dispatch
    #[test]
    fn test_player_ignores_lasers_and_ground() {
        let mut state = playing_state();
        let x = state.player.body.pos.x;
        let y = state.player.body.pos.y;
        push_laser(&mut state, x, y);

        tick(&mut state, &idle(), DT);

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.rocks_remaining(), state.tuning.starting_rocks);
    }

    #[test]
    fn test_bodies_only_touching_do_not_collide() {
        let mut state = playing_state();
        let tuning = state.tuning.clone();
        // Truck sharing the player's right edge exactly
        let x = state.player.body.pos.x + state.player.body.width;
        let id = state.next_entity_id();
        let mut truck = Entity::cannon_truck(id, x, state.ground_level, &tuning, false);
        truck.body.vel = Vec2::ZERO;
        state.entities.push(truck);

        // Zero dt: nothing moves, so the edge contact is preserved exactly
        tick(&mut state, &idle(), 0.0);

        assert_eq!(state.rocks_remaining(), state.tuning.starting_rocks);
        assert_eq!(state.phase, GamePhase::Playing);
    }
}
