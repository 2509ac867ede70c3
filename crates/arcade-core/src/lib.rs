pub mod feedback;
pub mod game_registry;
pub mod game_trait;
pub mod input_surface;
pub mod juice;
pub mod link;
pub mod phase;
pub mod prize;
pub mod result;
pub mod session;
pub mod timer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::feedback::{AudioCue, AudioSink, Feedback, FeedbackError, HapticSink};
    use crate::game_registry::{AccentColor, GameDescriptor, GameId, GameRegistry};
    use crate::game_trait::{GameFactory, GameInit, GameView, MiniGame, PlayerInput};
    use crate::input_surface::{InputSurface, PointerLease};
    use crate::link::{GameLink, GameSignal, SessionId, SignalReceiver};
    use crate::prize::{JACKPOT_PRIZE, PrizeDraw, PrizeTable};
    use crate::result::GameResult;
    use crate::session::Session;
    use crate::timer::Timers;

    // ================================================================
    // Recording feedback
    // ================================================================

    /// One call that reached a recording sink.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum FeedbackEvent {
        Cue(AudioCue, f32),
        Pulse(u32),
    }

    /// Shared view of everything a recording [`Feedback`] received.
    #[derive(Debug, Clone, Default)]
    pub struct CueLog {
        events: Rc<RefCell<Vec<FeedbackEvent>>>,
    }

    impl CueLog {
        pub fn events(&self) -> Vec<FeedbackEvent> {
            self.events.borrow().clone()
        }

        /// Just the audio cues, pitch dropped.
        pub fn cues(&self) -> Vec<AudioCue> {
            self.events
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    FeedbackEvent::Cue(cue, _) => Some(*cue),
                    FeedbackEvent::Pulse(_) => None,
                })
                .collect()
        }
    }

    impl AudioSink for CueLog {
        fn play(&mut self, cue: AudioCue, pitch: f32) -> Result<(), FeedbackError> {
            self.events.borrow_mut().push(FeedbackEvent::Cue(cue, pitch));
            Ok(())
        }
    }

    impl HapticSink for CueLog {
        fn pulse(&mut self, intensity: u32) -> Result<(), FeedbackError> {
            self.events.borrow_mut().push(FeedbackEvent::Pulse(intensity));
            Ok(())
        }
    }

    /// A [`Feedback`] whose calls land in the returned log.
    pub fn recording_feedback() -> (Feedback, CueLog) {
        let log = CueLog::default();
        let fx = Feedback::new(Box::new(log.clone()), Box::new(log.clone()));
        (fx, log)
    }

    // ================================================================
    // Scripted game
    // ================================================================

    /// How long the scripted game waits before ending on its own.
    pub const SCRIPTED_TIMEOUT: Duration = Duration::from_secs(3);

    /// The result the scripted game reports on a primary press.
    pub fn scripted_jackpot() -> GameResult {
        GameResult::won(100, JACKPOT_PRIZE)
    }

    /// Deterministic stand-in game used to exercise the controller.
    ///
    /// Primary ends with a jackpot, `Select(n)` reports twice (the first
    /// with score `n`), Back asks to exit twice, and the game times out as
    /// a loss after [`SCRIPTED_TIMEOUT`].
    struct ScriptedGame {
        link: GameLink,
        timers: Timers<()>,
        inputs: usize,
        _pointer: PointerLease,
    }

    impl MiniGame for ScriptedGame {
        fn start(&mut self, _fx: &mut Feedback) {
            self.timers.after(SCRIPTED_TIMEOUT, ());
        }

        fn update(&mut self, dt: Duration, _fx: &mut Feedback) {
            let deadline = self.timers.deadline(dt);
            while self.timers.pop_due(deadline).is_some() {
                self.link.end(GameResult::lost(0));
            }
        }

        fn handle_input(&mut self, input: PlayerInput, _fx: &mut Feedback) {
            self.inputs += 1;
            match input {
                PlayerInput::Primary => {
                    self.link.end(scripted_jackpot());
                },
                PlayerInput::Select(n) => {
                    let score = u32::try_from(n).unwrap_or(u32::MAX);
                    self.link.end(GameResult::new(true, score, None));
                    self.link.end(GameResult::lost(0));
                },
                PlayerInput::Back => {
                    self.link.exit();
                    self.link.exit();
                },
            }
        }

        fn view(&self) -> GameView {
            GameView::new("SCRIPTED").hud(format!("INPUTS: {}", self.inputs))
        }
    }

    fn scripted_factory(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(ScriptedGame {
            _pointer: init.surface.acquire(),
            link: init.link,
            timers: Timers::new(),
            inputs: 0,
        })
    }

    pub fn scripted_descriptor(id: &str) -> GameDescriptor {
        GameDescriptor {
            id: GameId::from(id),
            title: id.to_uppercase(),
            description: format!("Scripted stand-in for {id}"),
            goal: "Press anything".to_string(),
            accent_color: AccentColor::NEON_PINK,
            factory: scripted_factory,
        }
    }

    /// Three scripted games named after real catalog entries.
    pub fn scripted_registry() -> GameRegistry {
        GameRegistry::new(vec![
            scripted_descriptor("spin-wheel"),
            scripted_descriptor("cyber-whack"),
            scripted_descriptor("pattern-master"),
        ])
        .expect("scripted registry is valid")
    }

    /// Seeded controller over [`scripted_registry`] with silent feedback.
    pub fn new_session() -> Session {
        Session::new(
            scripted_registry(),
            PrizeTable::default(),
            Feedback::silent(),
            Some(0xC0FFEE),
        )
    }

    // ================================================================
    // Driving games directly
    // ================================================================

    /// Build the collaborators a game receives, keeping the receiving end
    /// of its link and a handle on the pointer surface.
    pub fn make_init(seed: u64) -> (GameInit, SignalReceiver, InputSurface) {
        let session = SessionId(seed);
        let (link, rx) = GameLink::channel(session);
        let surface = InputSurface::new();
        let init = GameInit {
            session,
            link,
            seed,
            surface: surface.clone(),
            prizes: PrizeDraw::new(Arc::new(PrizeTable::default()), seed ^ 0x5EED),
        };
        (init, rx, surface)
    }

    /// Everything reported so far.
    pub fn drain(rx: &mut SignalReceiver) -> Vec<GameSignal> {
        let mut out = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            out.push(signal);
        }
        out
    }

    /// The first reported result, if any.
    pub fn first_result(signals: &[GameSignal]) -> Option<GameResult> {
        signals.iter().find_map(|s| match s {
            GameSignal::End(result) => Some(result.clone()),
            GameSignal::Exit => None,
        })
    }

    /// Run `update` in `step` increments for `total` time.
    pub fn run_for(game: &mut dyn MiniGame, fx: &mut Feedback, total: Duration, step: Duration) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            let dt = step.min(total - elapsed);
            game.update(dt, fx);
            elapsed += dt;
        }
    }

    /// Build and start a game from its factory.
    pub fn start_game(
        factory: GameFactory,
        seed: u64,
    ) -> (Box<dyn MiniGame>, SignalReceiver, InputSurface) {
        let (init, rx, surface) = make_init(seed);
        let mut game = factory(init);
        game.start(&mut Feedback::silent());
        (game, rx, surface)
    }

    // ================================================================
    // Mini-game contract tests
    // ================================================================
    // Every MiniGame implementation must pass these. Game crates call them
    // from their own #[cfg(test)] modules with their factory.

    /// A freshly started game renders a headline and reports nothing yet.
    pub fn contract_view_renders(factory: GameFactory) {
        let (game, mut rx, _surface) = start_game(factory, 1);
        let view = game.view();
        assert!(!view.headline.is_empty(), "view must have a headline");
        assert!(
            drain(&mut rx).is_empty(),
            "a game must not report before any input or time passes"
        );
    }

    /// The in-game EXIT control asks to abandon the session.
    pub fn contract_back_requests_exit(factory: GameFactory) {
        let (mut game, mut rx, _surface) = start_game(factory, 2);
        game.handle_input(PlayerInput::Back, &mut Feedback::silent());
        let signals = drain(&mut rx);
        assert!(
            signals.contains(&GameSignal::Exit),
            "Back must request exit, got {signals:?}"
        );
        assert!(first_result(&signals).is_none(), "Back must not report a result");
    }

    /// Driven by `script` (one input per 100 ms step, cycled), the game
    /// reports exactly one result within `limit`. Afterwards further input
    /// and time produce no more reports and nothing panics.
    pub fn contract_ends_at_most_once(factory: GameFactory, script: &[PlayerInput], limit: Duration) {
        let (mut game, mut rx, _surface) = start_game(factory, 3);
        let mut fx = Feedback::silent();
        let step = Duration::from_millis(100);
        let mut elapsed = Duration::ZERO;
        let mut signals = Vec::new();
        let mut inputs = script.iter().cycle();
        while elapsed < limit && first_result(&signals).is_none() {
            if let Some(input) = inputs.next() {
                game.handle_input(*input, &mut fx);
            }
            game.update(step, &mut fx);
            elapsed += step;
            signals.extend(drain(&mut rx));
        }
        let ends = signals
            .iter()
            .filter(|s| matches!(s, GameSignal::End(_)))
            .count();
        assert_eq!(ends, 1, "exactly one result expected within {limit:?}, got {signals:?}");

        for n in 0..16 {
            game.handle_input(PlayerInput::Select(n), &mut fx);
        }
        game.handle_input(PlayerInput::Primary, &mut fx);
        run_for(game.as_mut(), &mut fx, limit, step);
        let late = drain(&mut rx);
        assert!(
            late.iter().all(|s| !matches!(s, GameSignal::End(_))),
            "no result may follow the first, got {late:?}"
        );
    }

    /// Teardown plus drop leaves nothing registered on the pointer surface.
    pub fn contract_teardown_releases_surface(factory: GameFactory) {
        let (mut game, _rx, surface) = start_game(factory, 4);
        game.update(Duration::from_millis(250), &mut Feedback::silent());
        game.teardown();
        drop(game);
        assert_eq!(
            surface.listener_count(),
            0,
            "game leaked pointer listeners past teardown"
        );
    }

    /// Left alone, the game ends by itself within `limit` and returns the
    /// result.
    pub fn contract_timeout_ends(factory: GameFactory, limit: Duration) -> GameResult {
        let (mut game, mut rx, _surface) = start_game(factory, 5);
        let mut fx = Feedback::silent();
        let step = Duration::from_millis(50);
        let mut elapsed = Duration::ZERO;
        while elapsed < limit {
            game.update(step, &mut fx);
            elapsed += step;
            if let Some(result) = first_result(&drain(&mut rx)) {
                return result;
            }
        }
        panic!("game did not end within {limit:?}");
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn scripted_game_passes_the_contract() {
            contract_view_renders(scripted_factory);
            contract_back_requests_exit(scripted_factory);
            contract_ends_at_most_once(scripted_factory, &[], SCRIPTED_TIMEOUT * 2);
            contract_teardown_releases_surface(scripted_factory);
            assert_eq!(
                contract_timeout_ends(scripted_factory, SCRIPTED_TIMEOUT * 2),
                GameResult::lost(0)
            );
        }

        #[test]
        fn recording_feedback_keeps_order() {
            let (mut fx, log) = recording_feedback();
            fx.cue(AudioCue::Coin);
            fx.pulse(7);
            fx.cue_pitched(AudioCue::SpinTick, 1.5);
            assert_eq!(
                log.events(),
                vec![
                    FeedbackEvent::Cue(AudioCue::Coin, 1.0),
                    FeedbackEvent::Pulse(7),
                    FeedbackEvent::Cue(AudioCue::SpinTick, 1.5),
                ]
            );
            assert_eq!(log.cues(), vec![AudioCue::Coin, AudioCue::SpinTick]);
        }
    }
}
