use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput};
use arcade_core::juice::Juice;
use arcade_core::link::GameLink;
use arcade_core::prize::PrizeDraw;
use arcade_core::result::GameResult;
use arcade_core::timer::Timers;

pub const GAME_ID: &str = "lucky-slots";

pub const SYMBOLS: [&str; 6] = ["PIZZA", "DIAMOND", "SEVEN", "CHERRY", "BELL", "STAR"];

pub const FIRST_STOP: Duration = Duration::from_millis(1000);
pub const SECOND_STOP: Duration = Duration::from_millis(800);
pub const TEASE_STOP: Duration = Duration::from_millis(2000);
pub const THIRD_STOP: Duration = Duration::from_millis(500);
pub const PAYOUT_DELAY: Duration = Duration::from_secs(1);
pub const REARM_DELAY: Duration = Duration::from_millis(500);

pub const TRIPLE_SCORE: u32 = 500;
pub const TRIPLE_PRIZE: &str = "JACKPOT";
pub const PAIR_SCORE: u32 = 100;

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Lucky Slots".to_string(),
        description: "Line up the symbols for a jackpot.".to_string(),
        goal: "Match 3 symbols".to_string(),
        accent_color: AccentColor::DEEP_PURPLE,
        factory: LuckySlots::create,
    }
}

/// How a finished set of reels pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Triple,
    Pair,
    Nothing,
}

impl Line {
    pub fn of(reels: [usize; 3]) -> Self {
        let [a, b, c] = reels;
        if a == b && b == c {
            Line::Triple
        } else if a == b || b == c || a == c {
            Line::Pair
        } else {
            Line::Nothing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Stop(usize),
    Payout(Line),
    Rearm,
}

/// Three-reel slot machine. Outcomes are fixed when the lever is pulled;
/// the reels only reveal them.
pub struct LuckySlots {
    link: GameLink,
    prizes: PrizeDraw,
    rng: StdRng,
    timers: Timers<Tick>,
    juice: Juice,
    target: [usize; 3],
    shown: [Option<usize>; 3],
    spinning: bool,
    teasing: bool,
    done: bool,
}

impl LuckySlots {
    pub fn new(init: GameInit) -> Self {
        Self {
            link: init.link,
            prizes: init.prizes,
            rng: StdRng::seed_from_u64(init.seed),
            timers: Timers::new(),
            juice: Juice::new(),
            target: [0; 3],
            shown: [None; 3],
            spinning: false,
            teasing: false,
            done: false,
        }
    }

    pub fn create(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(Self::new(init))
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn is_teasing(&self) -> bool {
        self.teasing
    }

    /// Symbols the current pull will land on.
    pub fn target(&self) -> [usize; 3] {
        self.target
    }

    pub fn shown(&self) -> [Option<usize>; 3] {
        self.shown
    }

    fn pull(&mut self, fx: &mut Feedback) {
        self.spinning = true;
        self.teasing = false;
        self.shown = [None; 3];
        fx.cue(AudioCue::SpinUp);
        for reel in &mut self.target {
            *reel = self.rng.random_range(0..SYMBOLS.len());
        }
        self.timers.after(FIRST_STOP, Tick::Stop(0));
        tracing::debug!(target = ?self.target, "slots pulled");
    }

    fn stop_reel(&mut self, reel: usize, fx: &mut Feedback) {
        self.shown[reel] = Some(self.target[reel]);
        fx.cue(AudioCue::Click);
        self.juice.trigger(5, fx);
        match reel {
            0 => {
                self.timers.after(SECOND_STOP, Tick::Stop(1));
            },
            1 => {
                if self.target[0] == self.target[1] {
                    self.teasing = true;
                    fx.cue(AudioCue::RetroJump);
                    self.timers.after(TEASE_STOP, Tick::Stop(2));
                } else {
                    self.timers.after(THIRD_STOP, Tick::Stop(2));
                }
            },
            _ => {
                self.teasing = false;
                self.settle(fx);
            },
        }
    }

    fn settle(&mut self, fx: &mut Feedback) {
        match Line::of(self.target) {
            Line::Triple => {
                fx.cue(AudioCue::Win);
                self.juice.trigger(30, fx);
                self.timers.after(PAYOUT_DELAY, Tick::Payout(Line::Triple));
            },
            Line::Pair => {
                fx.cue(AudioCue::Coin);
                self.timers.after(PAYOUT_DELAY, Tick::Payout(Line::Pair));
            },
            Line::Nothing => {
                self.timers.after(REARM_DELAY, Tick::Rearm);
            },
        }
    }

    fn on_timer(&mut self, tick: Tick, fx: &mut Feedback) {
        match tick {
            Tick::Stop(reel) => self.stop_reel(reel, fx),
            Tick::Payout(Line::Triple) => {
                self.done = true;
                self.link.end(GameResult::won(TRIPLE_SCORE, TRIPLE_PRIZE));
            },
            Tick::Payout(_) => {
                self.done = true;
                let prize = self.prizes.draw();
                self.link.end(GameResult::won(PAIR_SCORE, prize));
            },
            Tick::Rearm => self.spinning = false,
        }
    }
}

impl MiniGame for LuckySlots {
    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        self.juice.update(dt);
        let deadline = self.timers.deadline(dt);
        while let Some(tick) = self.timers.pop_due(deadline) {
            self.on_timer(tick, fx);
        }
    }

    fn handle_input(&mut self, input: PlayerInput, fx: &mut Feedback) {
        match input {
            PlayerInput::Primary if !self.spinning && !self.done => self.pull(fx),
            PlayerInput::Back => self.link.exit(),
            _ => {},
        }
    }

    fn view(&self) -> GameView {
        let reels: Vec<String> = self
            .shown
            .iter()
            .enumerate()
            .map(|(i, shown)| match shown {
                Some(symbol) => format!("[{:^7}]", SYMBOLS[*symbol]),
                None if self.teasing && i == 2 => "[ ?!?!? ]".to_string(),
                None if self.spinning => "[  ...  ]".to_string(),
                None => "[       ]".to_string(),
            })
            .collect();
        let hint = if self.spinning { "Good luck..." } else { "Press SPIN" };
        GameView::new("LUCKY SLOTS")
            .row(reels.join(" "))
            .hint(hint)
            .shake(self.juice.shake())
    }
}
