//! Arena geometry for Space Dodge.

use rand::Rng;

pub const ARENA_SIZE: f32 = 350.0;
pub const PLAYER_SIZE: f32 = 20.0;
pub const ORB_RADIUS: f32 = 15.0;
pub const ORB_COUNT: usize = 5;
/// Top orb speed along each axis, in px/s.
pub const ORB_MAX_SPEED: f32 = 240.0;
/// Longest physics step; larger frames are split.
pub const MAX_STEP: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Orb {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: rng.random_range(0.0..ARENA_SIZE),
            y: rng.random_range(0.0..ARENA_SIZE),
            vx: rng.random_range(-ORB_MAX_SPEED..ORB_MAX_SPEED),
            vy: rng.random_range(-ORB_MAX_SPEED..ORB_MAX_SPEED),
        }
    }

    /// Move for `dt` seconds, bouncing off the arena walls.
    pub fn step(&mut self, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        bounce(&mut self.x, &mut self.vx);
        bounce(&mut self.y, &mut self.vy);
    }
}

fn bounce(pos: &mut f32, vel: &mut f32) {
    if *pos < 0.0 {
        *pos = -*pos;
        *vel = vel.abs();
    } else if *pos > ARENA_SIZE {
        *pos = 2.0 * ARENA_SIZE - *pos;
        *vel = -vel.abs();
    }
    *pos = pos.clamp(0.0, ARENA_SIZE);
}

/// Player square centred at `(px, py)` against an orb.
pub fn collides(px: f32, py: f32, orb: &Orb) -> bool {
    let dx = px - orb.x;
    let dy = py - orb.y;
    (dx * dx + dy * dy).sqrt() < PLAYER_SIZE / 2.0 + ORB_RADIUS
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn orb_reflects_off_the_right_wall() {
        let mut orb = Orb {
            x: ARENA_SIZE - 1.0,
            y: 100.0,
            vx: 120.0,
            vy: 0.0,
        };
        orb.step(0.05);
        assert!(orb.vx < 0.0);
        assert!((orb.x - (ARENA_SIZE - 5.0)).abs() < 1e-3);
    }

    #[test]
    fn collision_uses_combined_radius() {
        let orb = Orb {
            x: 100.0,
            y: 100.0,
            vx: 0.0,
            vy: 0.0,
        };
        assert!(collides(124.0, 100.0, &orb));
        assert!(!collides(126.0, 100.0, &orb));
    }

    proptest! {
        #[test]
        fn orbs_stay_in_the_arena(
            x in 0.0f32..ARENA_SIZE,
            y in 0.0f32..ARENA_SIZE,
            vx in -ORB_MAX_SPEED..ORB_MAX_SPEED,
            vy in -ORB_MAX_SPEED..ORB_MAX_SPEED,
            steps in 1usize..600,
        ) {
            let mut orb = Orb { x, y, vx, vy };
            for _ in 0..steps {
                orb.step(MAX_STEP);
                prop_assert!((0.0..=ARENA_SIZE).contains(&orb.x));
                prop_assert!((0.0..=ARENA_SIZE).contains(&orb.y));
            }
        }
    }
}
