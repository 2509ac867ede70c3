use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput};
use arcade_core::link::GameLink;
use arcade_core::result::GameResult;
use arcade_core::timer::Timers;

pub const GAME_ID: &str = "reaction-grid";

pub const CELLS: usize = 16;
pub const ATTEMPTS: usize = 5;
pub const MIN_WAIT_MS: u64 = 1000;
pub const MAX_WAIT_MS: u64 = 3000;
pub const PAUSE: Duration = Duration::from_secs(1);
/// Average reaction time that wins, in milliseconds.
pub const WIN_AVERAGE_MS: f64 = 350.0;
pub const WIN_PRIZE: &str = "SPEEDSTER";

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Reaction Grid".to_string(),
        description: "Test your reaction speed. Click green fast!".to_string(),
        goal: "Avg < 350ms".to_string(),
        accent_color: AccentColor::NEON_PINK,
        factory: ReactionGrid::create,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Light,
    Rearm,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Waiting,
    Ready { cell: usize, lit_at: Duration },
    Clicked,
    Finished,
}

/// Mean of the recorded reaction times in milliseconds.
pub fn average_ms(times: &[Duration]) -> f64 {
    if times.is_empty() {
        return 0.0;
    }
    let total: f64 = times.iter().map(|t| t.as_secs_f64() * 1000.0).sum();
    total / times.len() as f64
}

/// Five timed reactions on a 4x4 grid.
pub struct ReactionGrid {
    link: GameLink,
    rng: StdRng,
    timers: Timers<Tick>,
    stage: Stage,
    times: Vec<Duration>,
    message: String,
}

impl ReactionGrid {
    pub fn new(init: GameInit) -> Self {
        Self {
            link: init.link,
            rng: StdRng::seed_from_u64(init.seed),
            timers: Timers::new(),
            stage: Stage::Waiting,
            times: Vec::with_capacity(ATTEMPTS),
            message: "WAIT FOR GREEN...".to_string(),
        }
    }

    pub fn create(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(Self::new(init))
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn lit_cell(&self) -> Option<usize> {
        match self.stage {
            Stage::Ready { cell, .. } => Some(cell),
            _ => None,
        }
    }

    pub fn times(&self) -> &[Duration] {
        &self.times
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn arm(&mut self) {
        self.stage = Stage::Waiting;
        self.message = "WAIT FOR GREEN...".to_string();
        let wait = self.rng.random_range(MIN_WAIT_MS..=MAX_WAIT_MS);
        self.timers.after(Duration::from_millis(wait), Tick::Light);
    }

    fn on_timer(&mut self, tick: Tick, fx: &mut Feedback) {
        match tick {
            Tick::Light => {
                let cell = self.rng.random_range(0..CELLS);
                self.stage = Stage::Ready {
                    cell,
                    lit_at: self.timers.now(),
                };
                self.message = "CLICK NOW!".to_string();
                fx.cue(AudioCue::Coin);
            },
            Tick::Rearm => self.arm(),
            Tick::Finish => {
                let avg = average_ms(&self.times);
                let won = avg < WIN_AVERAGE_MS;
                let score = avg.round() as u32;
                self.link
                    .end(GameResult::new(won, score, won.then(|| WIN_PRIZE.to_string())));
            },
        }
    }

    fn press(&mut self, index: usize, fx: &mut Feedback) {
        match self.stage {
            Stage::Ready { cell, lit_at } if cell == index => {
                let time = self.timers.now().saturating_sub(lit_at);
                fx.cue(AudioCue::Click);
                self.times.push(time);
                if self.times.len() >= ATTEMPTS {
                    self.stage = Stage::Finished;
                    self.message = format!("AVG: {}ms", average_ms(&self.times).round());
                    self.timers.after(PAUSE, Tick::Finish);
                } else {
                    self.stage = Stage::Clicked;
                    self.message = format!("{}ms", time.as_millis());
                    self.timers.after(PAUSE, Tick::Rearm);
                }
            },
            Stage::Waiting => self.message = "TOO EARLY!".to_string(),
            _ => {},
        }
    }
}

impl MiniGame for ReactionGrid {
    fn start(&mut self, _fx: &mut Feedback) {
        self.arm();
    }

    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        let deadline = self.timers.deadline(dt);
        while let Some(tick) = self.timers.pop_due(deadline) {
            self.on_timer(tick, fx);
        }
    }

    fn handle_input(&mut self, input: PlayerInput, fx: &mut Feedback) {
        match input {
            PlayerInput::Select(index) if index < CELLS => self.press(index, fx),
            PlayerInput::Back => self.link.exit(),
            _ => {},
        }
    }

    fn view(&self) -> GameView {
        let lit = self.lit_cell();
        let mut view = GameView::new("REACTION GRID")
            .hud(format!("ATTEMPT: {}/{ATTEMPTS}", (self.times.len() + 1).min(ATTEMPTS)))
            .hud(self.message.clone());
        for row in 0..4 {
            let cells: Vec<&str> = (0..4)
                .map(|col| if lit == Some(row * 4 + col) { "[#]" } else { "[ ]" })
                .collect();
            view = view.row(cells.join(""));
        }
        view.hint("press <cell> when it lights up")
    }
}
