use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput, seconds_left};
use arcade_core::link::GameLink;
use arcade_core::result::GameResult;
use arcade_core::timer::Timers;

pub const GAME_ID: &str = "math-dash";

pub const ROUND_TIME: Duration = Duration::from_secs(20);
pub const WIN_ANSWERS: u32 = 5;
pub const OPTIONS: usize = 4;
pub const WIN_PRIZE: &str = "MATH WIZ";
pub const TIMEOUT_PRIZE: &str = "TRY AGAIN";

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Math Dash".to_string(),
        description: "Quick sums against the clock.".to_string(),
        goal: "5 answers in 20s".to_string(),
        accent_color: AccentColor::NEON_BLUE,
        factory: MathDash::create,
    }
}

/// One addition question with its shuffled answer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub a: u32,
    pub b: u32,
    pub options: Vec<u32>,
}

impl Question {
    /// `a + b` with both terms in `1..=10` and three distinct positive
    /// distractors within five of the answer.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let a = rng.random_range(1..=10);
        let b = rng.random_range(1..=10);
        let answer = a + b;
        let mut options = vec![answer];
        while options.len() < OPTIONS {
            let candidate = i64::from(answer) + rng.random_range(-5..=4);
            let Ok(candidate) = u32::try_from(candidate) else {
                continue;
            };
            if candidate > 0 && !options.contains(&candidate) {
                options.push(candidate);
            }
        }
        options.shuffle(rng);
        Self { a, b, options }
    }

    pub fn answer(&self) -> u32 {
        self.a + self.b
    }

    /// Option index holding the right answer.
    pub fn answer_index(&self) -> usize {
        self.options
            .iter()
            .position(|&o| o == self.answer())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimeUp;

/// Five correct sums before a fixed 20 second clock runs out.
///
/// The clock is scheduled once at start and never reset by scoring.
pub struct MathDash {
    link: GameLink,
    rng: StdRng,
    timers: Timers<TimeUp>,
    question: Question,
    score: u32,
    done: bool,
}

impl MathDash {
    pub fn new(init: GameInit) -> Self {
        let mut rng = StdRng::seed_from_u64(init.seed);
        let question = Question::generate(&mut rng);
        Self {
            link: init.link,
            rng,
            timers: Timers::new(),
            question,
            score: 0,
            done: false,
        }
    }

    pub fn create(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(Self::new(init))
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> Duration {
        ROUND_TIME.saturating_sub(self.timers.now())
    }

    fn answer(&mut self, index: usize, fx: &mut Feedback) {
        if self.done {
            return;
        }
        let Some(&picked) = self.question.options.get(index) else {
            return;
        };
        if picked != self.question.answer() {
            fx.cue(AudioCue::Click);
            return;
        }
        fx.cue(AudioCue::Coin);
        self.score += 1;
        if self.score >= WIN_ANSWERS {
            self.done = true;
            self.timers.clear();
            fx.cue(AudioCue::Win);
            self.link.end(GameResult::won(self.score, WIN_PRIZE));
        } else {
            self.question = Question::generate(&mut self.rng);
        }
    }
}

impl MiniGame for MathDash {
    fn start(&mut self, _fx: &mut Feedback) {
        self.timers.after(ROUND_TIME, TimeUp);
    }

    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        let deadline = self.timers.deadline(dt);
        while self.timers.pop_due(deadline).is_some() {
            self.done = true;
            fx.cue(AudioCue::Lose);
            // Reads the live score at fire time.
            self.link.end(GameResult::new(
                false,
                self.score,
                Some(TIMEOUT_PRIZE.to_string()),
            ));
        }
    }

    fn handle_input(&mut self, input: PlayerInput, fx: &mut Feedback) {
        match input {
            PlayerInput::Select(index) => self.answer(index, fx),
            PlayerInput::Back => self.link.exit(),
            PlayerInput::Primary => {},
        }
    }

    fn view(&self) -> GameView {
        let options: Vec<String> = self
            .question
            .options
            .iter()
            .enumerate()
            .map(|(i, o)| format!("[{i}] {o}"))
            .collect();
        GameView::new("MATH DASH")
            .hud(format!("SCORE: {}/{WIN_ANSWERS}", self.score))
            .hud(format!("TIME: {}s", seconds_left(self.time_left())))
            .row(format!("{} + {} = ?", self.question.a, self.question.b))
            .row(options.join("  "))
            .hint("press <option>")
    }
}
