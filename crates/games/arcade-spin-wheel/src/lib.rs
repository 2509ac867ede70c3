pub mod wheel;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput};
use arcade_core::juice::Juice;
use arcade_core::link::GameLink;
use arcade_core::prize::{CHOCOLATE_PRIZE, JACKPOT_PRIZE, PrizeDraw};
use arcade_core::result::GameResult;
use arcade_core::timer::Timers;

use wheel::{Payout, SEGMENTS, UNDERSHOOT, landing_rotation, segment_under_pointer};

pub const GAME_ID: &str = "spin-wheel";

/// Full-speed phase of a spin.
pub const FAST_PHASE: Duration = Duration::from_millis(2500);
/// Slow crawl onto the landing angle.
pub const SETTLE_PHASE: Duration = Duration::from_millis(1500);
/// Pause on the outcome before reporting or re-arming.
pub const REVEAL_DELAY: Duration = Duration::from_secs(1);

pub const SPIN_SCORE: u32 = 100;

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Spin & Win".to_string(),
        description: "Classic wheel of fortune. Test your luck!".to_string(),
        goal: "Spin to win".to_string(),
        accent_color: AccentColor::NEON_PINK,
        factory: SpinWheel::create,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Fast,
    Settling,
    Reveal,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    FastDone,
    Settled,
    Revealed,
}

/// Motion of the current spin, for rendering.
#[derive(Debug, Clone, Copy)]
struct Spin {
    started: Duration,
    from: f32,
    to: f32,
    index: usize,
}

/// The prize wheel. One spin picks a segment uniformly, animates onto it and
/// pays out; TRY AGAIN re-arms the wheel.
pub struct SpinWheel {
    link: GameLink,
    prizes: PrizeDraw,
    rng: StdRng,
    timers: Timers<Tick>,
    juice: Juice,
    stage: Stage,
    rotation: f32,
    spin: Option<Spin>,
    spins: u32,
}

impl SpinWheel {
    pub fn new(init: GameInit) -> Self {
        Self {
            link: init.link,
            prizes: init.prizes,
            rng: StdRng::seed_from_u64(init.seed),
            timers: Timers::new(),
            juice: Juice::new(),
            stage: Stage::Idle,
            rotation: 0.0,
            spin: None,
            spins: 0,
        }
    }

    pub fn create(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(Self::new(init))
    }

    pub fn is_spinning(&self) -> bool {
        !matches!(self.stage, Stage::Idle | Stage::Done)
    }

    /// Segment the current spin will land on.
    pub fn target_segment(&self) -> Option<usize> {
        self.spin.map(|s| s.index)
    }

    pub fn spins(&self) -> u32 {
        self.spins
    }

    /// Rotation as drawn right now, in degrees.
    pub fn displayed_rotation(&self) -> f32 {
        let Some(spin) = self.spin else {
            return self.rotation;
        };
        let t = self.timers.now().saturating_sub(spin.started);
        match self.stage {
            Stage::Fast => {
                let p = t.as_secs_f32() / FAST_PHASE.as_secs_f32();
                let eased = p * p;
                spin.from + (spin.to - UNDERSHOOT - spin.from) * eased
            },
            Stage::Settling => {
                let p = (t.saturating_sub(FAST_PHASE).as_secs_f32()
                    / SETTLE_PHASE.as_secs_f32())
                .min(1.0);
                let eased = 1.0 - (1.0 - p) * (1.0 - p);
                spin.to - UNDERSHOOT * (1.0 - eased)
            },
            _ => spin.to,
        }
    }

    fn spin(&mut self, fx: &mut Feedback) {
        fx.cue(AudioCue::Click);
        let index = self.rng.random_range(0..SEGMENTS.len());
        let jitter = self.rng.random::<f32>() - 0.5;
        let to = landing_rotation(self.rotation, index, jitter);
        self.spin = Some(Spin {
            started: self.timers.now(),
            from: self.rotation,
            to,
            index,
        });
        self.rotation = to;
        self.spins += 1;
        self.stage = Stage::Fast;
        self.timers.after(FAST_PHASE, Tick::FastDone);
        tracing::debug!(index, rotation = to, "wheel spinning");
    }

    fn on_timer(&mut self, tick: Tick, fx: &mut Feedback) {
        match tick {
            Tick::FastDone => {
                fx.cue(AudioCue::SpinTick);
                self.juice.trigger(5, fx);
                self.stage = Stage::Settling;
                self.timers.after(SETTLE_PHASE, Tick::Settled);
            },
            Tick::Settled => {
                match self.landed().map(|s| s.payout) {
                    Some(Payout::TryAgain) | None => {
                        fx.cue(AudioCue::Lose);
                        self.juice.trigger(5, fx);
                    },
                    Some(_) => {
                        fx.cue(AudioCue::Win);
                        self.juice.trigger(30, fx);
                    },
                }
                self.stage = Stage::Reveal;
                self.timers.after(REVEAL_DELAY, Tick::Revealed);
            },
            Tick::Revealed => self.reveal(),
        }
    }

    fn landed(&self) -> Option<wheel::Segment> {
        self.spin
            .map(|s| SEGMENTS[segment_under_pointer(s.to)])
    }

    fn reveal(&mut self) {
        let prize = match self.landed().map(|s| s.payout) {
            Some(Payout::Chocolate) => CHOCOLATE_PRIZE.to_string(),
            Some(Payout::Jackpot) => JACKPOT_PRIZE.to_string(),
            Some(Payout::Dare) => self.prizes.dare(),
            Some(Payout::TryAgain) | None => {
                self.stage = Stage::Idle;
                return;
            },
        };
        self.stage = Stage::Done;
        self.link.end(GameResult::won(SPIN_SCORE, prize));
    }
}

impl MiniGame for SpinWheel {
    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        self.juice.update(dt);
        let deadline = self.timers.deadline(dt);
        while let Some(tick) = self.timers.pop_due(deadline) {
            self.on_timer(tick, fx);
        }
    }

    fn handle_input(&mut self, input: PlayerInput, fx: &mut Feedback) {
        match input {
            PlayerInput::Primary if self.stage == Stage::Idle => self.spin(fx),
            PlayerInput::Back => self.link.exit(),
            _ => {},
        }
    }

    fn view(&self) -> GameView {
        let pointer = segment_under_pointer(self.displayed_rotation());
        let mut view = GameView::new("SPIN & WIN")
            .hud(format!("SPINS: {}", self.spins))
            .hud(format!("ANGLE: {:.0}", self.displayed_rotation().rem_euclid(360.0)));
        for (i, segment) in SEGMENTS.iter().enumerate() {
            let marker = if i == pointer { ">" } else { " " };
            view = view.row(format!("{marker} {}", segment.label));
        }
        let hint = match self.stage {
            Stage::Idle if self.spins > 0 => "TRY AGAIN! Press SPIN",
            Stage::Idle => "Press SPIN",
            Stage::Reveal | Stage::Done => match self.landed().map(|s| s.payout) {
                Some(Payout::TryAgain) => "SO CLOSE!",
                _ => "WINNER!",
            },
            _ => "Spinning...",
        };
        view.hint(hint).shake(self.juice.shake())
    }
}

#[cfg(test)]
mod tests {
    use arcade_core::link::GameSignal;
    use arcade_core::prize::{DARE_PREFIX, PrizeCategory};
    use arcade_core::test_helpers::{
        contract_back_requests_exit, contract_ends_at_most_once,
        contract_teardown_releases_surface, contract_view_renders, drain, first_result,
        make_init, recording_feedback, run_for,
    };

    use super::*;

    const STEP: Duration = Duration::from_millis(50);

    fn full_spin() -> Duration {
        FAST_PHASE + SETTLE_PHASE + REVEAL_DELAY
    }

    #[test]
    fn spin_runs_through_phases_and_cues() {
        let (init, mut rx, _surface) = make_init(11);
        let mut game = SpinWheel::new(init);
        let (mut fx, log) = recording_feedback();

        game.handle_input(PlayerInput::Primary, &mut fx);
        assert!(game.is_spinning());
        assert_eq!(log.cues(), vec![AudioCue::Click]);

        run_for(&mut game, &mut fx, FAST_PHASE, STEP);
        assert_eq!(log.cues().last(), Some(&AudioCue::SpinTick));
        run_for(&mut game, &mut fx, SETTLE_PHASE, STEP);
        let outcome = *log.cues().last().unwrap();
        assert!(outcome == AudioCue::Win || outcome == AudioCue::Lose);
        assert!(drain(&mut rx).is_empty(), "nothing reported before the reveal");
    }

    #[test]
    fn input_while_spinning_is_ignored() {
        let (init, _rx, _surface) = make_init(12);
        let mut game = SpinWheel::new(init);
        let mut fx = Feedback::silent();
        game.handle_input(PlayerInput::Primary, &mut fx);
        let target = game.target_segment();
        game.handle_input(PlayerInput::Primary, &mut fx);
        game.handle_input(PlayerInput::Select(3), &mut fx);
        assert_eq!(game.spins(), 1);
        assert_eq!(game.target_segment(), target);
    }

    #[test]
    fn winning_spin_reports_segment_prize() {
        for seed in 0..40 {
            let (init, mut rx, _surface) = make_init(seed);
            let mut game = SpinWheel::new(init);
            let mut fx = Feedback::silent();
            game.handle_input(PlayerInput::Primary, &mut fx);
            let segment = SEGMENTS[game.target_segment().unwrap()];
            run_for(&mut game, &mut fx, full_spin(), STEP);
            let signals = drain(&mut rx);

            if segment.payout == Payout::TryAgain {
                assert!(signals.is_empty());
                assert!(!game.is_spinning(), "TRY AGAIN re-arms the wheel");
                continue;
            }
            let result = first_result(&signals).expect("winning spin reports");
            assert!(result.success());
            assert_eq!(result.score(), SPIN_SCORE);
            let prize = result.prize().unwrap();
            match segment.payout {
                Payout::Chocolate => assert_eq!(prize, CHOCOLATE_PRIZE),
                Payout::Jackpot => assert_eq!(prize, JACKPOT_PRIZE),
                Payout::Dare => assert!(prize.starts_with(DARE_PREFIX)),
                Payout::TryAgain => unreachable!(),
            }
            assert!(PrizeCategory::of_label(prize).is_some());
        }
    }

    #[test]
    fn try_again_allows_another_spin() {
        let seed = (0..500)
            .find(|&seed| {
                let (init, _rx, _surface) = make_init(seed);
                let mut game = SpinWheel::new(init);
                game.handle_input(PlayerInput::Primary, &mut Feedback::silent());
                game.target_segment() == Some(5)
            })
            .expect("some seed lands on TRY AGAIN");
        let (init, mut rx, _surface) = make_init(seed);
        let mut game = SpinWheel::new(init);
        let mut fx = Feedback::silent();
        game.handle_input(PlayerInput::Primary, &mut fx);
        run_for(&mut game, &mut fx, full_spin(), STEP);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(game.view().hint, "TRY AGAIN! Press SPIN");
        let before = game.displayed_rotation();
        game.handle_input(PlayerInput::Primary, &mut fx);
        assert_eq!(game.spins(), 2);
        run_for(&mut game, &mut fx, full_spin(), STEP);
        assert!(game.displayed_rotation() >= before + 1800.0);
    }

    #[test]
    fn shake_follows_the_spin() {
        let (init, _rx, _surface) = make_init(3);
        let mut game = SpinWheel::new(init);
        let mut fx = Feedback::silent();
        game.handle_input(PlayerInput::Primary, &mut fx);
        run_for(&mut game, &mut fx, FAST_PHASE, STEP);
        assert_eq!(game.view().shake, 5);
    }

    #[test]
    fn back_never_reports_a_result() {
        let (init, mut rx, _surface) = make_init(4);
        let mut game = SpinWheel::new(init);
        game.handle_input(PlayerInput::Back, &mut Feedback::silent());
        assert_eq!(drain(&mut rx), vec![GameSignal::Exit]);
    }

    #[test]
    fn contract() {
        contract_view_renders(SpinWheel::create);
        contract_back_requests_exit(SpinWheel::create);
        contract_ends_at_most_once(
            SpinWheel::create,
            &[PlayerInput::Primary],
            Duration::from_secs(120),
        );
        contract_teardown_releases_surface(SpinWheel::create);
    }
}
