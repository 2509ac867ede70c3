use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput, seconds_left};
use arcade_core::juice::Juice;
use arcade_core::link::GameLink;
use arcade_core::result::GameResult;
use arcade_core::timer::Timers;

pub const GAME_ID: &str = "cyber-whack";

pub const HOLES: usize = 9;
pub const ROUND_TIME: Duration = Duration::from_secs(30);
pub const FIRST_NODE: Duration = Duration::from_millis(500);
pub const HIT_POINTS: u32 = 100;
pub const MISS_PENALTY: u32 = 50;
pub const WIN_SCORE: u32 = 1000;
pub const WIN_PRIZE: &str = "REFLEX KING";

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Cyber Whack".to_string(),
        description: "Hit the glitching nodes! Fastest reflexes win.".to_string(),
        goal: "Score 1000pts".to_string(),
        accent_color: AccentColor::NEON_GREEN,
        factory: CyberWhack::create,
    }
}

/// Delay before the node moves again; shrinks as the score grows.
pub fn node_interval(score: u32) -> Duration {
    let ms = 1000u64.saturating_sub(u64::from(score) / 2).max(400);
    Duration::from_millis(ms)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    MoveNode,
    TimeUp,
}

/// Whack-a-mole on a 3x3 grid against a 30 second clock.
pub struct CyberWhack {
    link: GameLink,
    rng: StdRng,
    timers: Timers<Tick>,
    juice: Juice,
    node: Option<usize>,
    score: u32,
    done: bool,
}

impl CyberWhack {
    pub fn new(init: GameInit) -> Self {
        Self {
            link: init.link,
            rng: StdRng::seed_from_u64(init.seed),
            timers: Timers::new(),
            juice: Juice::new(),
            node: None,
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

    /// Hole currently showing a node.
    pub fn node(&self) -> Option<usize> {
        self.node
    }

    fn on_timer(&mut self, tick: Tick, fx: &mut Feedback) {
        match tick {
            Tick::MoveNode => {
                self.node = Some(self.rng.random_range(0..HOLES));
                self.timers.after(node_interval(self.score), Tick::MoveNode);
            },
            Tick::TimeUp => {
                self.done = true;
                self.node = None;
                self.timers.clear();
                let won = self.score >= WIN_SCORE;
                fx.cue(if won { AudioCue::Win } else { AudioCue::Lose });
                let prize = won.then(|| WIN_PRIZE.to_string());
                self.link.end(GameResult::new(won, self.score, prize));
            },
        }
    }

    fn whack(&mut self, hole: usize, fx: &mut Feedback) {
        if hole >= HOLES {
            return;
        }
        if self.node == Some(hole) {
            fx.cue(AudioCue::Hit);
            self.juice.trigger(10, fx);
            self.score += HIT_POINTS;
            self.node = None;
        } else {
            self.score = self.score.saturating_sub(MISS_PENALTY);
        }
    }
}

impl MiniGame for CyberWhack {
    fn start(&mut self, _fx: &mut Feedback) {
        self.timers.after(ROUND_TIME, Tick::TimeUp);
        self.timers.after(FIRST_NODE, Tick::MoveNode);
    }

    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        self.juice.update(dt);
        let deadline = self.timers.deadline(dt);
        while let Some(tick) = self.timers.pop_due(deadline) {
            self.on_timer(tick, fx);
        }
    }

    fn handle_input(&mut self, input: PlayerInput, fx: &mut Feedback) {
        match input {
            PlayerInput::Back => self.link.exit(),
            PlayerInput::Select(hole) if !self.done => self.whack(hole, fx),
            _ => {},
        }
    }

    fn view(&self) -> GameView {
        let remaining = ROUND_TIME.saturating_sub(self.timers.now());
        let mut view = GameView::new("CYBER WHACK")
            .hud(format!("SCORE: {}", self.score))
            .hud(format!("TIME: {}s", seconds_left(remaining)));
        for row in 0..3 {
            let cells: Vec<String> = (0..3)
                .map(|col| {
                    let hole = row * 3 + col;
                    if self.node == Some(hole) {
                        format!("[{hole}:X]")
                    } else {
                        format!("[{hole}: ]")
                    }
                })
                .collect();
            view = view.row(cells.join(" "));
        }
        view.hint("Hit the glitching node").shake(self.juice.shake())
    }
}
