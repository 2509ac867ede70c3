pub mod rain;

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput};
use arcade_core::input_surface::PointerLease;
use arcade_core::link::GameLink;
use arcade_core::result::GameResult;
use arcade_core::timer::Timers;

use rain::{Catch, FIELD_HEIGHT, FIELD_WIDTH, Field, Item};

pub const GAME_ID: &str = "emoji-rain";

pub const SPAWN_EVERY: Duration = Duration::from_millis(500);
pub const WIN_CATCHES: u32 = 20;
pub const BAD_PENALTY: u32 = 5;
pub const WIN_PRIZE: &str = "CATCHER";

/// Longest physics step; keeps fast items from skipping the catch band.
const MAX_STEP: Duration = Duration::from_millis(16);

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Emoji Rain".to_string(),
        description: "Catch the goodies, dodge the bombs.".to_string(),
        goal: "Catch 20".to_string(),
        accent_color: AccentColor::GOLD,
        factory: EmojiRain::create,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Spawn;

/// Pointer-driven paddle catching falling items. No clock: the round ends
/// only on the twentieth net catch or when the player leaves.
pub struct EmojiRain {
    link: GameLink,
    pointer: PointerLease,
    rng: StdRng,
    timers: Timers<Spawn>,
    field: Field,
    score: u32,
    done: bool,
}

impl EmojiRain {
    pub fn new(init: GameInit) -> Self {
        Self {
            pointer: init.surface.acquire(),
            link: init.link,
            rng: StdRng::seed_from_u64(init.seed),
            timers: Timers::new(),
            field: Field::default(),
            score: 0,
            done: false,
        }
    }

    pub fn create(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(Self::new(init))
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    fn apply(&mut self, catch: Catch, fx: &mut Feedback) {
        match catch {
            Catch::Good => {
                self.score += 1;
                fx.cue(AudioCue::Coin);
                if self.score >= WIN_CATCHES {
                    self.done = true;
                    self.timers.clear();
                    fx.cue(AudioCue::Win);
                    self.link.end(GameResult::won(WIN_CATCHES, WIN_PRIZE));
                }
            },
            Catch::Bad => {
                self.score = self.score.saturating_sub(BAD_PENALTY);
                fx.cue(AudioCue::Lose);
            },
        }
    }
}

impl MiniGame for EmojiRain {
    fn start(&mut self, _fx: &mut Feedback) {
        self.timers.every(SPAWN_EVERY, Spawn);
    }

    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        if self.done {
            return;
        }
        if let Some(pos) = self.pointer.take() {
            self.field.move_paddle(pos.x);
        }
        let target = self.timers.deadline(dt);
        while !self.done && self.timers.now() < target {
            let h = MAX_STEP.min(target - self.timers.now());
            let sub = self.timers.now() + h;
            while self.timers.pop_due(sub).is_some() {
                let item = Item::random(&mut self.rng);
                self.field.items.push(item);
            }
            for catch in self.field.step(h.as_secs_f32()) {
                self.apply(catch, fx);
                if self.done {
                    break;
                }
            }
        }
    }

    fn handle_input(&mut self, input: PlayerInput, _fx: &mut Feedback) {
        if input == PlayerInput::Back {
            self.link.exit();
        }
    }

    fn view(&self) -> GameView {
        const COLS: usize = 14;
        const ROWS: usize = 10;
        let to_col = |x: f32| ((x / FIELD_WIDTH * COLS as f32) as usize).min(COLS - 1);
        let mut grid = vec![vec!['.'; COLS]; ROWS];
        for item in &self.field.items {
            if item.y < 0.0 {
                continue;
            }
            let row = ((item.y / FIELD_HEIGHT * ROWS as f32) as usize).min(ROWS - 1);
            grid[row][to_col(item.x)] = if item.good { '+' } else { 'x' };
        }
        let paddle = to_col(self.field.paddle_x);
        let mut view = GameView::new("EMOJI RAIN").hud(format!("CAUGHT: {}/{WIN_CATCHES}", self.score));
        for row in grid {
            view = view.row(row.into_iter().collect::<String>());
        }
        let mut floor = vec![' '; COLS];
        for col in paddle.saturating_sub(1)..=(paddle + 1).min(COLS - 1) {
            floor[col] = '=';
        }
        view.row(floor.into_iter().collect::<String>())
            .hint("move <x> <y> to steer the paddle")
    }
}
