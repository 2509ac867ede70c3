use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput};
use arcade_core::link::GameLink;
use arcade_core::result::GameResult;
use arcade_core::timer::{TimerId, Timers};

pub const GAME_ID: &str = "pattern-master";

pub const PADS: [&str; 4] = ["PINK", "CYAN", "GREEN", "GOLD"];
pub const ROUNDS: usize = 8;
pub const STEP_INTERVAL: Duration = Duration::from_millis(800);
pub const LIGHT_TIME: Duration = Duration::from_millis(400);
pub const ROUND_PAUSE: Duration = Duration::from_secs(1);
pub const WIN_PRIZE: &str = "MEMORY MASTER";

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Pattern Master".to_string(),
        description: "Memorize the sequence. Repeat the pattern.".to_string(),
        goal: "Complete 8 rounds".to_string(),
        accent_color: AccentColor::GOLD,
        factory: PatternMaster::create,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Playback,
    Unlight,
    NextRound,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Playing the sequence back; input is ignored.
    Watch,
    /// Waiting for the player to repeat it.
    Repeat,
    /// Round cleared, next one starts shortly.
    Good,
    GameOver,
    Won,
}

impl Stage {
    fn message(self) -> &'static str {
        match self {
            Stage::Watch => "WATCH",
            Stage::Repeat => "REPEAT",
            Stage::Good => "GOOD!",
            Stage::GameOver => "GAME OVER",
            Stage::Won => "PERFECT!",
        }
    }
}

/// Simon-style colour sequence game over four pads.
pub struct PatternMaster {
    link: GameLink,
    rng: StdRng,
    timers: Timers<Tick>,
    sequence: Vec<usize>,
    entered: usize,
    played: usize,
    lit: Option<usize>,
    playback: Option<TimerId>,
    stage: Stage,
}

impl PatternMaster {
    pub fn new(init: GameInit) -> Self {
        Self {
            link: init.link,
            rng: StdRng::seed_from_u64(init.seed),
            timers: Timers::new(),
            sequence: Vec::with_capacity(ROUNDS),
            entered: 0,
            played: 0,
            lit: None,
            playback: None,
            stage: Stage::Watch,
        }
    }

    pub fn create(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(Self::new(init))
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Pad lit during playback.
    pub fn lit(&self) -> Option<usize> {
        self.lit
    }

    fn next_round(&mut self) {
        self.stage = Stage::Watch;
        self.entered = 0;
        self.played = 0;
        self.sequence.push(self.rng.random_range(0..PADS.len()));
        self.playback = Some(self.timers.every(STEP_INTERVAL, Tick::Playback));
        tracing::debug!(round = self.sequence.len(), "pattern playback");
    }

    fn on_timer(&mut self, tick: Tick, fx: &mut Feedback) {
        match tick {
            Tick::Playback => {
                if let Some(&pad) = self.sequence.get(self.played) {
                    self.lit = Some(pad);
                    fx.cue(AudioCue::Coin);
                    self.timers.after(LIGHT_TIME, Tick::Unlight);
                    self.played += 1;
                } else {
                    if let Some(id) = self.playback.take() {
                        self.timers.cancel(id);
                    }
                    self.lit = None;
                    self.stage = Stage::Repeat;
                }
            },
            Tick::Unlight => self.lit = None,
            Tick::NextRound => self.next_round(),
            Tick::GameOver => {
                let reached = u32::try_from(self.sequence.len().saturating_sub(1)).unwrap_or(0);
                self.link.end(GameResult::lost(reached));
            },
        }
    }

    fn press(&mut self, pad: usize, fx: &mut Feedback) {
        if self.stage != Stage::Repeat || pad >= PADS.len() {
            return;
        }
        fx.cue(AudioCue::Click);
        if self.sequence.get(self.entered) != Some(&pad) {
            self.stage = Stage::GameOver;
            fx.cue(AudioCue::Lose);
            self.timers.after(ROUND_PAUSE, Tick::GameOver);
            return;
        }
        self.entered += 1;
        if self.entered < self.sequence.len() {
            return;
        }
        if self.sequence.len() >= ROUNDS {
            self.stage = Stage::Won;
            fx.cue(AudioCue::Win);
            self.link.end(GameResult::won(ROUNDS as u32, WIN_PRIZE));
        } else {
            self.stage = Stage::Good;
            self.timers.after(ROUND_PAUSE, Tick::NextRound);
        }
    }
}

impl MiniGame for PatternMaster {
    fn start(&mut self, _fx: &mut Feedback) {
        self.next_round();
    }

    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        let deadline = self.timers.deadline(dt);
        while let Some(tick) = self.timers.pop_due(deadline) {
            self.on_timer(tick, fx);
        }
    }

    fn handle_input(&mut self, input: PlayerInput, fx: &mut Feedback) {
        match input {
            PlayerInput::Select(pad) => self.press(pad, fx),
            PlayerInput::Back => self.link.exit(),
            PlayerInput::Primary => {},
        }
    }

    fn view(&self) -> GameView {
        let pads: Vec<String> = PADS
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if self.lit == Some(i) {
                    format!("<{i}:{name}>")
                } else {
                    format!(" {i}:{name} ")
                }
            })
            .collect();
        GameView::new("PATTERN MASTER")
            .hud(format!("ROUND: {}/{ROUNDS}", self.sequence.len()))
            .hud(self.stage.message())
            .row(pads.join(" "))
            .hint("Repeat the sequence with press <pad>")
    }
}
