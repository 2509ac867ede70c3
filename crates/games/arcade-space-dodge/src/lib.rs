pub mod physics;

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput, seconds_left};
use arcade_core::input_surface::PointerLease;
use arcade_core::link::GameLink;
use arcade_core::result::GameResult;
use arcade_core::timer::Timers;

use physics::{ARENA_SIZE, MAX_STEP, ORB_COUNT, Orb, collides};

pub const GAME_ID: &str = "space-dodge";

pub const SURVIVE_TIME: Duration = Duration::from_secs(15);
pub const WIN_PRIZE: &str = "SURVIVOR";

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Space Dodge".to_string(),
        description: "Steer clear of the bouncing orbs.".to_string(),
        goal: "Survive 15s".to_string(),
        accent_color: AccentColor::NEON_BLUE,
        factory: SpaceDodge::create,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Survived;

/// Pointer-steered square among five bouncing orbs.
pub struct SpaceDodge {
    link: GameLink,
    pointer: PointerLease,
    timers: Timers<Survived>,
    orbs: Vec<Orb>,
    player: (f32, f32),
    done: bool,
}

impl SpaceDodge {
    pub fn new(init: GameInit) -> Self {
        let mut rng = StdRng::seed_from_u64(init.seed);
        let orbs = (0..ORB_COUNT).map(|_| Orb::random(&mut rng)).collect();
        Self::with_orbs(init, orbs)
    }

    fn with_orbs(init: GameInit, orbs: Vec<Orb>) -> Self {
        Self {
            pointer: init.surface.acquire(),
            link: init.link,
            timers: Timers::new(),
            orbs,
            player: (ARENA_SIZE / 2.0, ARENA_SIZE / 2.0),
            done: false,
        }
    }

    pub fn create(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(Self::new(init))
    }

    pub fn player(&self) -> (f32, f32) {
        self.player
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    pub fn elapsed(&self) -> Duration {
        self.timers.now()
    }

    fn follow_pointer(&mut self) {
        if let Some(pos) = self.pointer.take().filter(|p| p.is_finite()) {
            self.player = (pos.x.clamp(0.0, ARENA_SIZE), pos.y.clamp(0.0, ARENA_SIZE));
        }
    }

    fn hit(&self) -> bool {
        let (px, py) = self.player;
        self.orbs.iter().any(|orb| collides(px, py, orb))
    }

    fn crash(&mut self, fx: &mut Feedback) {
        self.done = true;
        self.timers.clear();
        fx.cue(AudioCue::Lose);
        let survived = self.elapsed().as_secs_f32().round() as u32;
        tracing::debug!(survived, "space dodge collision");
        self.link.end(GameResult::lost(survived));
    }
}

impl MiniGame for SpaceDodge {
    fn start(&mut self, _fx: &mut Feedback) {
        self.timers.after(SURVIVE_TIME, Survived);
    }

    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        if self.done {
            return;
        }
        self.follow_pointer();
        let target = self.timers.deadline(dt);
        let max_step = Duration::from_secs_f32(MAX_STEP);
        while !self.done && self.timers.now() < target {
            let h = max_step.min(target - self.timers.now());
            let sub = self.timers.now() + h;
            if self.timers.pop_due(sub).is_some() {
                self.done = true;
                fx.cue(AudioCue::Win);
                self.link.end(GameResult::won(SURVIVE_TIME.as_secs() as u32, WIN_PRIZE));
                return;
            }
            for orb in &mut self.orbs {
                orb.step(h.as_secs_f32());
            }
            if self.hit() {
                self.crash(fx);
            }
        }
    }

    fn handle_input(&mut self, input: PlayerInput, _fx: &mut Feedback) {
        if input == PlayerInput::Back {
            self.link.exit();
        }
    }

    fn view(&self) -> GameView {
        // 10x10 character map of the arena.
        const CELLS: usize = 10;
        let cell = ARENA_SIZE / CELLS as f32;
        let to_cell = |v: f32| ((v / cell) as usize).min(CELLS - 1);
        let mut grid = vec![vec!['.'; CELLS]; CELLS];
        for orb in &self.orbs {
            grid[to_cell(orb.y)][to_cell(orb.x)] = 'o';
        }
        let (px, py) = self.player;
        grid[to_cell(py)][to_cell(px)] = '#';

        let remaining = SURVIVE_TIME.saturating_sub(self.elapsed());
        let mut view = GameView::new("SPACE DODGE").hud(format!("TIME: {}s", seconds_left(remaining)));
        for row in grid {
            view = view.row(row.into_iter().collect::<String>());
        }
        view.hint("move <x> <y> to steer")
    }
}
