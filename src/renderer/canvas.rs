//! Canvas 2D render sink
//!
//! Draws a `FrameSnapshot` with plain filled shapes. The playfield is
//! scaled to fit the canvas backing store; nothing is read back.

use std::f64::consts::TAU;

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::settings::Settings;
use crate::sim::snapshot::{EnemyView, SpriteView};
use crate::sim::{FrameSnapshot, GamePhase};

// ============================================================================
// PALETTE
// ============================================================================

const BACKGROUND: &str = "#101418";
const PLAYER: &str = "#4fc3f7";
const ENEMY: &str = "#e53935";
const ENEMY_DODGING: &str = "#ff8a65";
const SHIELD: &str = "rgba(120, 200, 255, 0.55)";
const TELEPORT_FLASH: &str = "rgba(255, 255, 255, 0.8)";
const ARROW: &str = "#fdd835";
const FIREBALL: &str = "#ff6f00";
const HAZARD: &str = "#c62828";
const HAZARD_LABEL: &str = "#ffffff";
const HEALTH_BAR: &str = "#66bb6a";
const HUD_TEXT: &str = "#eceff1";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("canvas has no 2d context")]
    NoContext,
    #[error("canvas call failed: {0}")]
    Js(String),
}

impl From<JsValue> for RenderError {
    fn from(value: JsValue) -> Self {
        RenderError::Js(format!("{value:?}"))
    }
}

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(RenderError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::NoContext)?;
        log::info!("Canvas renderer ready ({}x{})", canvas.width(), canvas.height());
        Ok(Self { canvas, ctx })
    }

    /// Draw one frame
    pub fn render(&self, frame: &FrameSnapshot, settings: &Settings) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;

        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, width, height);

        let scale = (width / frame.playfield.x as f64).min(height / frame.playfield.y as f64);
        ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0)?;

        for hazard in &frame.hazards {
            self.draw_hazard(hazard)?;
        }
        for enemy in &frame.enemies {
            self.draw_enemy(enemy, settings.show_stats)?;
        }

        let player = &frame.player;
        ctx.set_fill_style_str(PLAYER);
        ctx.fill_rect(
            player.pos.x as f64,
            player.pos.y as f64,
            player.size.x as f64,
            player.size.y as f64,
        );
        // Facing notch
        let center = player.pos + player.size / 2.0;
        let tip = center + player.facing.unit() * player.size.x * 0.75;
        ctx.set_stroke_style_str(PLAYER);
        ctx.set_line_width(3.0);
        ctx.begin_path();
        ctx.move_to(center.x as f64, center.y as f64);
        ctx.line_to(tip.x as f64, tip.y as f64);
        ctx.stroke();

        ctx.set_fill_style_str(ARROW);
        for arrow in &frame.arrows {
            self.fill_rotated(arrow)?;
        }

        ctx.set_fill_style_str(FIREBALL);
        for fireball in &frame.fireballs {
            let r = fireball.size.x as f64 / 2.0;
            ctx.begin_path();
            ctx.arc(fireball.pos.x as f64 + r, fireball.pos.y as f64 + r, r, 0.0, TAU)?;
            ctx.fill();
        }

        if settings.show_stats {
            self.draw_hud(frame)?;
        }
        Ok(())
    }

    fn draw_enemy(&self, enemy: &EnemyView, show_health: bool) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        let (x, y) = (enemy.pos.x as f64, enemy.pos.y as f64);
        let (w, h) = (enemy.size.x as f64, enemy.size.y as f64);

        ctx.set_fill_style_str(if enemy.dodging { ENEMY_DODGING } else { ENEMY });
        ctx.fill_rect(x, y, w, h);

        if enemy.shielded {
            ctx.set_stroke_style_str(SHIELD);
            ctx.set_line_width(3.0);
            ctx.begin_path();
            ctx.arc(x + w / 2.0, y + h / 2.0, w * 0.9, 0.0, TAU)?;
            ctx.stroke();
        }
        if enemy.teleported {
            ctx.set_fill_style_str(TELEPORT_FLASH);
            ctx.fill_rect(x - 4.0, y - 4.0, w + 8.0, h + 8.0);
        }
        if show_health {
            ctx.set_fill_style_str(HUD_TEXT);
            ctx.set_font("10px monospace");
            ctx.fill_text(&enemy.health.max(0).to_string(), x, y - 4.0)?;
        }
        Ok(())
    }

    fn draw_hazard(&self, hazard: &SpriteView) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(HAZARD);
        self.fill_rotated(hazard)?;

        ctx.set_fill_style_str(HAZARD_LABEL);
        ctx.set_font("bold 10px monospace");
        ctx.fill_text("TNT", hazard.pos.x as f64 + 5.0, hazard.pos.y as f64 + hazard.size.y as f64 / 2.0 + 3.0)?;
        Ok(())
    }

    /// Fill a box rotated about its center to its heading
    fn fill_rotated(&self, sprite: &SpriteView) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        let (w, h) = (sprite.size.x as f64, sprite.size.y as f64);
        ctx.save();
        ctx.translate(sprite.pos.x as f64 + w / 2.0, sprite.pos.y as f64 + h / 2.0)?;
        ctx.rotate(sprite.angle as f64)?;
        ctx.fill_rect(-w / 2.0, -h / 2.0, w, h);
        ctx.restore();
        Ok(())
    }

    fn draw_hud(&self, frame: &FrameSnapshot) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(HUD_TEXT);
        ctx.set_font("16px monospace");
        ctx.fill_text(&format!("Level {}", frame.level), 10.0, 20.0)?;
        ctx.fill_text(&format!("Lives {}", frame.player.lives.max(0)), 10.0, 40.0)?;

        if let Some(bar) = frame.enemies.first().filter(|_| frame.enemies.len() == 1) {
            ctx.set_fill_style_str(HEALTH_BAR);
            ctx.fill_rect(frame.playfield.x as f64 - 110.0, 10.0, bar.health.max(0) as f64 * 10.0, 8.0);
        }

        let banner = match frame.phase {
            GamePhase::Playing => return Ok(()),
            GamePhase::Victory => "Victory!",
            GamePhase::GameOver => "Game Over",
        };
        ctx.set_font("bold 40px monospace");
        ctx.fill_text(banner, frame.playfield.x as f64 / 2.0 - 100.0, frame.playfield.y as f64 / 2.0)?;
        Ok(())
    }
}
