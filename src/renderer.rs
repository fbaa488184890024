//! Canvas 2D scene and HUD painting
//!
//! Purely decorative. The renderer reads the simulation each frame and never
//! mutates it; dropping this module entirely would not change a single
//! gameplay outcome.

use web_sys::CanvasRenderingContext2d;

use crate::sim::{Body, CannonTruck, Elk, EntityKind, GamePhase, GameState};

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn draw(&self, state: &GameState) {
        let w = state.view_w as f64;
        let h = state.view_h as f64;
        let ctx = &self.ctx;

        // Sky
        ctx.set_fill_style_str("#87CEEB");
        ctx.fill_rect(0.0, 0.0, w, h);

        ctx.save();
        if state.screen_shake > 0.0 {
            let t = state.time * 30.0;
            let amp = (state.screen_shake * 6.0) as f64;
            let _ = ctx.translate(t.sin() * amp, (t * 1.3).cos() * amp);
        }

        self.draw_background(state, w);

        // Ground first, everything else on top (the sim's render order)
        for entity in &state.entities {
            if let EntityKind::Ground = entity.kind {
                self.draw_ground(&entity.body, w);
            }
        }
        for entity in &state.entities {
            match &entity.kind {
                EntityKind::Ground => {}
                EntityKind::Elk(elk) => self.draw_elk(&entity.body, elk, state),
                EntityKind::CannonTruck(truck) => self.draw_truck(&entity.body, truck),
                EntityKind::Laser => self.draw_laser(&entity.body),
                EntityKind::Rock => self.draw_rock(&entity.body),
            }
        }

        if !matches!(state.phase, GamePhase::Exploding | GamePhase::Dead) {
            self.draw_player(&state.player.body);
        }

        for particle in &state.particles {
            ctx.set_global_alpha(particle.life.clamp(0.0, 1.0) as f64);
            ctx.set_fill_style_str("#e67e22");
            ctx.fill_rect(
                particle.pos.x as f64,
                particle.pos.y as f64,
                particle.size as f64,
                particle.size as f64,
            );
        }
        ctx.set_global_alpha(1.0);

        ctx.restore();

        self.draw_hud(state, w, h);
    }

    /// Mountains and clouds, slow-scrolled against the camera for parallax
    fn draw_background(&self, state: &GameState, w: f64) {
        let ctx = &self.ctx;
        let ground = state.ground_level as f64;
        let offset = state.camera_offset as f64;

        ctx.set_fill_style_str("#95a5a6");
        for i in 0..4 {
            let mountain_w = 200.0 + i as f64 * 50.0;
            let mountain_h = 120.0 + i as f64 * 30.0;
            let x = (i as f64 * 300.0 - offset * 0.3).rem_euclid(w + mountain_w) - mountain_w;
            ctx.begin_path();
            ctx.move_to(x, ground);
            ctx.line_to(x + mountain_w / 2.0, ground - mountain_h);
            ctx.line_to(x + mountain_w, ground);
            ctx.close_path();
            ctx.fill();
        }

        ctx.set_fill_style_str("rgba(255, 255, 255, 0.7)");
        for i in 0..5 {
            let x = (i as f64 * 200.0 - offset * 0.15).rem_euclid(w + 80.0) - 80.0;
            let y = 50.0 + i as f64 * 20.0;
            ctx.begin_path();
            let _ = ctx.arc(x, y, 20.0, 0.0, std::f64::consts::TAU);
            let _ = ctx.arc(x + 15.0, y - 10.0, 15.0, 0.0, std::f64::consts::TAU);
            let _ = ctx.arc(x + 30.0, y, 25.0, 0.0, std::f64::consts::TAU);
            ctx.fill();
        }
    }

    fn draw_ground(&self, body: &Body, w: f64) {
        let ctx = &self.ctx;
        let y = body.pos.y as f64;
        let h = body.height as f64;

        ctx.set_fill_style_str("#8B4513");
        ctx.fill_rect(0.0, y, w, h);
        ctx.set_fill_style_str("#2ecc71");
        ctx.fill_rect(0.0, y, w, 10.0);

        // Dirt variation; hashed per column so it does not flicker
        ctx.set_fill_style_str("#6d4c41");
        let mut x = 0.0;
        while x < w {
            let hash = (x as u32).wrapping_mul(2654435761);
            let patch_w = 10.0 + (hash % 30) as f64;
            let patch_y = 15.0 + (hash >> 8 & 0x7) as f64;
            ctx.fill_rect(x, y + patch_y, patch_w, 5.0);
            x += 50.0;
        }
    }

    fn draw_player(&self, body: &Body) {
        let ctx = &self.ctx;
        let (x, y) = (body.pos.x as f64, body.pos.y as f64);
        let (w, h) = (body.width as f64, body.height as f64);

        // Dump truck: orange body, red cab, bed full of gray rocks
        ctx.set_fill_style_str("#f39c12");
        ctx.fill_rect(x, y, w, h);
        ctx.set_fill_style_str("#7f8c8d");
        ctx.fill_rect(x + w * 0.3, y, w * 0.7, h * 0.7);
        ctx.set_fill_style_str("#e74c3c");
        ctx.fill_rect(x, y, w * 0.3, h * 0.7);

        ctx.set_fill_style_str("#2c3e50");
        ctx.begin_path();
        let _ = ctx.arc(x + w * 0.2, y + h, h * 0.2, 0.0, std::f64::consts::TAU);
        ctx.fill();
        ctx.begin_path();
        let _ = ctx.arc(x + w * 0.8, y + h, h * 0.2, 0.0, std::f64::consts::TAU);
        ctx.fill();

        // Rear headlight the lasers leave from
        ctx.set_fill_style_str("#f1c40f");
        ctx.fill_rect(x + w - 5.0, y + h * 0.5 - 5.0, 5.0, 10.0);
    }

    fn draw_elk(&self, body: &Body, elk: &Elk, state: &GameState) {
        let ctx = &self.ctx;
        let (x, y) = (body.pos.x as f64, body.pos.y as f64);
        let (w, h) = (body.width as f64, body.height as f64);

        // Angry elk run hot
        let coat = if elk.angry { "#8e3b2e" } else { "#795548" };
        ctx.set_fill_style_str(coat);
        ctx.fill_rect(x, y, w, h * 0.6);
        ctx.fill_rect(x + w * 0.7, y - h * 0.2, w * 0.3, h * 0.3);

        ctx.set_stroke_style_str(coat);
        ctx.set_line_width(2.0);
        ctx.begin_path();
        ctx.move_to(x + w * 0.8, y - h * 0.2);
        ctx.line_to(x + w * 0.9, y - h * 0.5);
        ctx.line_to(x + w, y - h * 0.3);
        ctx.stroke();
        ctx.begin_path();
        ctx.move_to(x + w * 0.7, y - h * 0.2);
        ctx.line_to(x + w * 0.6, y - h * 0.5);
        ctx.line_to(x + w * 0.5, y - h * 0.3);
        ctx.stroke();

        ctx.set_fill_style_str("#5D4037");
        ctx.fill_rect(x + w * 0.2, y + h * 0.6, w * 0.1, h * 0.4);
        ctx.fill_rect(x + w * 0.7, y + h * 0.6, w * 0.1, h * 0.4);

        // A live burst arcs from the antlers toward where the player was
        if let Some(burst) = &elk.lightning {
            if !burst.consumed && burst.age < state.tuning.lightning_window {
                let fade = 1.0 - (burst.age / state.tuning.lightning_window) as f64;
                let from_x = x + w * 0.7;
                let from_y = y - h * 0.3;
                let to_x = burst.target_x as f64;
                let to_y = (state.ground_level - 20.0) as f64;

                ctx.set_global_alpha(fade);
                ctx.set_stroke_style_str("#f1c40f");
                ctx.set_line_width(3.0);
                ctx.begin_path();
                ctx.move_to(from_x, from_y);
                // Jagged bolt: zig-zag the midpoints
                for step in 1..=4 {
                    let t = step as f64 / 4.0;
                    let jag = if step % 2 == 0 { 10.0 } else { -10.0 };
                    ctx.line_to(
                        from_x + (to_x - from_x) * t,
                        from_y + (to_y - from_y) * t + jag,
                    );
                }
                ctx.stroke();
                ctx.set_global_alpha(1.0);
            }
        }
    }

    fn draw_truck(&self, body: &Body, truck: &CannonTruck) {
        let ctx = &self.ctx;
        let (x, y) = (body.pos.x as f64, body.pos.y as f64);
        let (w, h) = (body.width as f64, body.height as f64);

        ctx.set_fill_style_str("#34495e");
        ctx.fill_rect(x, y, w, h * 0.7);
        ctx.set_fill_style_str("#2c3e50");
        ctx.fill_rect(x, y, w * 0.3, h * 0.5);

        // Log stack on the flatbed
        ctx.set_fill_style_str("#795548");
        for i in 0..3 {
            ctx.fill_rect(
                x + w * 0.35,
                y + i as f64 * (h * 0.15),
                w * 0.6,
                h * 0.1,
            );
        }

        // Barrel glows through the telegraph window
        let barrel = if truck.about_to_fire {
            "#e67e22"
        } else {
            "#7f8c8d"
        };
        ctx.set_fill_style_str(barrel);
        ctx.fill_rect(x - w * 0.2, y + h * 0.25, w * 0.3, h * 0.15);

        ctx.set_fill_style_str("#2c3e50");
        ctx.begin_path();
        let _ = ctx.arc(x + w * 0.2, y + h * 0.85, h * 0.15, 0.0, std::f64::consts::TAU);
        ctx.fill();
        ctx.begin_path();
        let _ = ctx.arc(x + w * 0.8, y + h * 0.85, h * 0.15, 0.0, std::f64::consts::TAU);
        ctx.fill();
    }

    fn draw_laser(&self, body: &Body) {
        let ctx = &self.ctx;
        let (x, y) = (body.pos.x as f64, body.pos.y as f64);
        let (w, h) = (body.width as f64, body.height as f64);

        let gradient = ctx.create_linear_gradient(x, y, x + w, y);
        let _ = gradient.add_color_stop(0.0, "rgba(255, 0, 0, 1)");
        let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 0, 0.5)");
        ctx.set_fill_style_canvas_gradient(&gradient);
        ctx.fill_rect(x, y, w, h);

        ctx.set_shadow_color("red");
        ctx.set_shadow_blur(10.0);
        ctx.fill_rect(x, y, w, h);
        ctx.set_shadow_blur(0.0);
    }

    fn draw_rock(&self, body: &Body) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str("#7f8c8d");
        ctx.begin_path();
        let _ = ctx.arc(
            (body.pos.x + body.width / 2.0) as f64,
            (body.pos.y + body.height / 2.0) as f64,
            (body.width / 2.0) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();
    }

    fn draw_hud(&self, state: &GameState, w: f64, h: f64) {
        let ctx = &self.ctx;

        ctx.set_fill_style_str("#2c3e50");
        ctx.set_font("16px Arial");
        ctx.set_text_align("left");
        let _ = ctx.fill_text(&format!("Score: {}", state.score), 12.0, 24.0);
        let _ = ctx.fill_text(&format!("Rocks: {}", state.rocks_remaining()), 12.0, 46.0);
        let _ = ctx.fill_text(
            &format!(
                "Trucks: {}/{}",
                state.trucks_destroyed, state.tuning.victory_trucks
            ),
            12.0,
            68.0,
        );

        match state.phase {
            GamePhase::NotStarted => {
                self.overlay(w, h);
                self.center_text("ROCK HAULER", w, h / 2.0 - 20.0, "32px Arial");
                self.center_text("Press Space to start", w, h / 2.0 + 20.0, "18px Arial");
            }
            GamePhase::Dead => {
                self.overlay(w, h);
                self.center_text("Game Over", w, h / 2.0 - 30.0, "32px Arial");
                self.center_text(
                    &format!("Final score: {}", state.score),
                    w,
                    h / 2.0 + 5.0,
                    "20px Arial",
                );
                self.center_text("Press Space to drive again", w, h / 2.0 + 40.0, "18px Arial");
            }
            GamePhase::Victorious => {
                self.overlay(w, h);
                self.center_text("You made it through!", w, h / 2.0 - 30.0, "32px Arial");
                self.center_text(
                    &format!("Final score: {}", state.score),
                    w,
                    h / 2.0 + 5.0,
                    "20px Arial",
                );
            }
            GamePhase::Playing | GamePhase::Exploding => {}
        }
    }

    fn overlay(&self, w: f64, h: f64) {
        self.ctx.set_fill_style_str("rgba(0, 0, 0, 0.55)");
        self.ctx.fill_rect(0.0, 0.0, w, h);
    }

    fn center_text(&self, text: &str, w: f64, y: f64, font: &str) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str("#ecf0f1");
        ctx.set_font(font);
        ctx.set_text_align("center");
        let _ = ctx.fill_text(text, w / 2.0, y);
        ctx.set_text_align("left");
    }
}
