//! Falling items and the catching paddle.

use rand::Rng;
use rand::seq::IndexedRandom;

pub const FIELD_WIDTH: f32 = 350.0;
pub const FIELD_HEIGHT: f32 = 500.0;
pub const PADDLE_WIDTH: f32 = 60.0;
/// Extra horizontal reach on each side of the paddle.
pub const CATCH_SLACK: f32 = 10.0;
pub const SPAWN_Y: f32 = -30.0;
/// Fall speed range, in px/s.
pub const MIN_SPEED: f32 = 120.0;
pub const MAX_SPEED: f32 = 300.0;
pub const GOOD_CHANCE: f64 = 0.7;

pub const GOOD_ITEMS: [&str; 4] = ["APPLE", "GEM", "STAR", "PIZZA"];
pub const BAD_ITEMS: [&str; 2] = ["BOMB", "POO"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub good: bool,
    pub label: &'static str,
}

impl Item {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let good = rng.random_bool(GOOD_CHANCE);
        let pool: &[&'static str] = if good { &GOOD_ITEMS } else { &BAD_ITEMS };
        Self {
            x: rng.random_range(0.0..FIELD_WIDTH),
            y: SPAWN_Y,
            speed: rng.random_range(MIN_SPEED..MAX_SPEED),
            good,
            label: pool.choose(rng).copied().unwrap_or("?"),
        }
    }

    /// Whether the item is level with the paddle band.
    fn in_catch_band(&self) -> bool {
        self.y > FIELD_HEIGHT - 40.0 && self.y < FIELD_HEIGHT - 20.0
    }
}

/// What happened to an item this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catch {
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub paddle_x: f32,
    pub items: Vec<Item>,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            paddle_x: FIELD_WIDTH / 2.0,
            items: Vec::new(),
        }
    }
}

impl Field {
    /// Centre the paddle on `x`, kept fully inside the field. A NaN or
    /// infinite `x` leaves the paddle where it is.
    pub fn move_paddle(&mut self, x: f32) {
        if !x.is_finite() {
            return;
        }
        let half = PADDLE_WIDTH / 2.0;
        self.paddle_x = x.clamp(half, FIELD_WIDTH - half);
    }

    /// Drop every item by `dt` seconds and collect catches. Caught and
    /// fallen items leave the field.
    pub fn step(&mut self, dt: f32) -> Vec<Catch> {
        let reach = PADDLE_WIDTH / 2.0 + CATCH_SLACK;
        let paddle_x = self.paddle_x;
        let mut caught = Vec::new();
        self.items.retain_mut(|item| {
            item.y += item.speed * dt;
            if item.in_catch_band() && (item.x - paddle_x).abs() < reach {
                caught.push(if item.good { Catch::Good } else { Catch::Bad });
                return false;
            }
            item.y <= FIELD_HEIGHT
        });
        caught
    }
}
