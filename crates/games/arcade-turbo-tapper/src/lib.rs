use std::time::Duration;

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput, seconds_left};
use arcade_core::juice::Juice;
use arcade_core::link::GameLink;
use arcade_core::result::GameResult;
use arcade_core::timer::Timers;

pub const GAME_ID: &str = "turbo-tapper";

pub const ROUND_TIME: Duration = Duration::from_secs(10);
pub const WIN_TAPS: u32 = 50;
pub const COMBO_EVERY: u32 = 5;
pub const MAX_SHAKE: u32 = 15;
pub const WIN_PRIZE: &str = "SPEED DEMON";

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Turbo Tapper".to_string(),
        description: "Mash the button. The clock starts on your first tap.".to_string(),
        goal: "50 taps in 10s".to_string(),
        accent_color: AccentColor::ALERT_RED,
        factory: TurboTapper::create,
    }
}

/// Pitch multiplier for a tap made with `count` taps already counted.
pub fn tap_pitch(count: u32) -> f32 {
    1.0 + count.min(WIN_TAPS) as f32 * 0.02
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimeUp;

/// Ten seconds of button mashing, started by the first tap.
pub struct TurboTapper {
    link: GameLink,
    timers: Timers<TimeUp>,
    juice: Juice,
    count: u32,
    started_at: Option<Duration>,
    done: bool,
}

impl TurboTapper {
    pub fn new(init: GameInit) -> Self {
        Self {
            link: init.link,
            timers: Timers::new(),
            juice: Juice::new(),
            count: 0,
            started_at: None,
            done: false,
        }
    }

    pub fn create(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(Self::new(init))
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some() && !self.done
    }

    pub fn time_left(&self) -> Duration {
        match self.started_at {
            Some(at) => ROUND_TIME.saturating_sub(self.timers.now().saturating_sub(at)),
            None => ROUND_TIME,
        }
    }

    fn tap(&mut self, fx: &mut Feedback) {
        if self.done {
            return;
        }
        if self.started_at.is_none() {
            self.started_at = Some(self.timers.now());
            self.timers.after(ROUND_TIME, TimeUp);
        }
        let cue = if self.count % COMBO_EVERY == 0 {
            AudioCue::Combo
        } else {
            AudioCue::Click
        };
        fx.cue_pitched(cue, tap_pitch(self.count));
        self.juice.trigger((self.count / 2).min(MAX_SHAKE), fx);
        self.count += 1;
    }

    fn time_up(&mut self, fx: &mut Feedback) {
        self.done = true;
        let won = self.count >= WIN_TAPS;
        fx.cue(if won { AudioCue::Win } else { AudioCue::Lose });
        self.link.end(GameResult::new(
            won,
            self.count,
            won.then(|| WIN_PRIZE.to_string()),
        ));
    }
}

impl MiniGame for TurboTapper {
    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        self.juice.update(dt);
        let deadline = self.timers.deadline(dt);
        while self.timers.pop_due(deadline).is_some() {
            self.time_up(fx);
        }
    }

    fn handle_input(&mut self, input: PlayerInput, fx: &mut Feedback) {
        match input {
            PlayerInput::Primary => self.tap(fx),
            PlayerInput::Back => self.link.exit(),
            PlayerInput::Select(_) => {},
        }
    }

    fn view(&self) -> GameView {
        let hint = if self.started_at.is_none() {
            "TAP to start the clock"
        } else if self.done {
            "TIME!"
        } else {
            "TAP TAP TAP!"
        };
        GameView::new("TURBO TAPPER")
            .hud(format!("TAPS: {}", self.count))
            .hud(format!("TIME: {}s", seconds_left(self.time_left())))
            .row(format!("[{:<50}]", "=".repeat(self.count.min(WIN_TAPS) as usize)))
            .hint(hint)
            .shake(self.juice.shake())
    }
}
