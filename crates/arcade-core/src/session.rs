use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::feedback::{AudioCue, Feedback};
use crate::game_registry::{GameDescriptor, GameId, GameRegistry};
use crate::game_trait::{GameInit, GameView, MiniGame, PlayerInput};
use crate::input_surface::{InputSurface, PointerPos};
use crate::link::{GameLink, GameSignal, SessionId, SignalReceiver};
use crate::phase::Phase;
use crate::prize::{PrizeDraw, PrizeTable};
use crate::result::GameResult;

/// Longest step a single tick hands to the running game. Longer gaps are
/// cut short so neither the game clock nor a sub-stepped simulation can
/// run away.
pub const MAX_TICK: Duration = Duration::from_secs(1);

/// Events the session controller accepts from shells and the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Start,
    SelectGame(GameId),
    Back,
    /// Hard cancel of the running game.
    Exit,
    Redeem,
    Reset,
    /// Input for the running game.
    Play(PlayerInput),
    /// Pointer move on the shared surface.
    Pointer(PointerPos),
}

/// A phase change applied by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

/// Serializable view of the controller state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub active_game: Option<GameId>,
    pub session: Option<SessionId>,
    pub result: Option<GameResult>,
    pub game: Option<GameView>,
}

/// The game currently holding the floor.
struct ActiveGame {
    id: GameId,
    session: SessionId,
    game: Box<dyn MiniGame>,
    signals: SignalReceiver,
}

/// Owns the kiosk phase and the one running game; the only place phases
/// change.
///
/// Events are applied in the order received. Anything not valid for the
/// current phase is ignored.
pub struct Session {
    registry: GameRegistry,
    prizes: Arc<PrizeTable>,
    feedback: Feedback,
    surface: InputSurface,
    seeds: StdRng,
    phase: Phase,
    active: Option<ActiveGame>,
    result: Option<GameResult>,
    next_session: u64,
}

impl Session {
    /// Build a controller in [`Phase::Attract`]. A `seed` makes every game
    /// session reproducible; `None` seeds from the OS.
    pub fn new(
        registry: GameRegistry,
        prizes: PrizeTable,
        feedback: Feedback,
        seed: Option<u64>,
    ) -> Self {
        let seeds = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            registry,
            prizes: Arc::new(prizes),
            feedback,
            surface: InputSurface::new(),
            seeds,
            phase: Phase::Attract,
            active: None,
            result: None,
            next_session: 1,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn active_game_id(&self) -> Option<&GameId> {
        self.active.as_ref().map(|a| &a.id)
    }

    pub fn active_game(&self) -> Option<&GameDescriptor> {
        self.active_game_id()
            .and_then(|id| self.registry.get(id.as_str()))
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(|a| a.session)
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn surface(&self) -> &InputSurface {
        &self.surface
    }

    pub fn game_view(&self) -> Option<GameView> {
        self.active.as_ref().map(|a| a.game.view())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            active_game: self.active_game_id().cloned(),
            session: self.active_session(),
            result: self.result.clone(),
            game: self.game_view(),
        }
    }

    /// Apply one event. Returns the phase change, if any.
    pub fn dispatch(&mut self, intent: Intent) -> Option<Transition> {
        let from = self.phase;
        let to = match (from, intent) {
            (Phase::Attract, Intent::Start) => {
                self.feedback.cue(AudioCue::Coin);
                Phase::Lobby
            },
            (Phase::Lobby, Intent::SelectGame(id)) => {
                if !self.enter_game(&id) {
                    tracing::debug!(game = %id, "unknown game selected, ignoring");
                    return None;
                }
                Phase::Playing
            },
            (Phase::Lobby, Intent::Back) => Phase::Attract,
            (Phase::Playing, Intent::Exit) => {
                self.close_game("exit");
                Phase::Lobby
            },
            (Phase::Playing, Intent::Play(input)) => {
                if let Some(active) = self.active.as_mut() {
                    active.game.handle_input(input, &mut self.feedback);
                }
                return self.drain_signals();
            },
            (Phase::Playing, Intent::Pointer(pos)) => {
                if pos.is_finite() {
                    self.surface.dispatch(pos);
                } else {
                    tracing::debug!(?pos, "non-finite pointer position, ignoring");
                }
                return None;
            },
            (Phase::Result, Intent::Redeem) if self.result.is_some() => Phase::Redeem,
            (Phase::Redeem, Intent::Reset) => {
                self.result = None;
                Phase::Attract
            },
            (phase, intent) => {
                tracing::debug!(%phase, ?intent, "intent not valid here, ignoring");
                return None;
            },
        };
        Some(self.set_phase(to))
    }

    /// Advance the running game by one frame of at most [`MAX_TICK`].
    pub fn tick(&mut self, dt: Duration) -> Option<Transition> {
        if self.phase != Phase::Playing {
            return None;
        }
        if let Some(active) = self.active.as_mut() {
            active.game.update(dt.min(MAX_TICK), &mut self.feedback);
        }
        self.drain_signals()
    }

    fn set_phase(&mut self, to: Phase) -> Transition {
        let from = self.phase;
        self.phase = to;
        tracing::info!(%from, %to, "phase transition");
        debug_assert_eq!(self.active.is_some(), to == Phase::Playing);
        debug_assert_eq!(self.result.is_some(), to.holds_result());
        Transition { from, to }
    }

    /// Instantiate the selected game. Returns false for unknown ids.
    fn enter_game(&mut self, id: &GameId) -> bool {
        let Some(descriptor) = self.registry.get(id.as_str()) else {
            return false;
        };
        let factory = descriptor.factory;

        // Anything still attached belongs to no one.
        self.close_game("replaced");

        let session = SessionId(self.next_session);
        self.next_session += 1;
        let (link, signals) = GameLink::channel(session);
        let init = GameInit {
            session,
            link,
            seed: self.seeds.random(),
            surface: self.surface.clone(),
            prizes: PrizeDraw::new(Arc::clone(&self.prizes), self.seeds.random()),
        };

        let mut game = factory(init);
        self.feedback.cue(AudioCue::Click);
        game.start(&mut self.feedback);
        tracing::info!(game = %id, %session, "game started");
        self.active = Some(ActiveGame {
            id: id.clone(),
            session,
            game,
            signals,
        });
        true
    }

    /// Tear down the running game on any exit path and make sure nothing it
    /// registered outlives it.
    fn close_game(&mut self, reason: &str) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.game.teardown();
        let ActiveGame {
            id,
            session,
            game,
            signals,
        } = active;
        drop(game);
        drop(signals);

        let leaked = self.surface.release_all();
        if leaked > 0 {
            tracing::warn!(game = %id, %session, leaked, "game left pointer listeners behind");
        }
        tracing::info!(game = %id, %session, reason, "game closed");
    }

    /// Consume the running game's reports. The first terminal report wins;
    /// anything queued after it is discarded with the game's channel.
    fn drain_signals(&mut self) -> Option<Transition> {
        let signal = self.active.as_mut()?.signals.try_recv().ok()?;
        match signal {
            GameSignal::End(result) => {
                self.close_game("ended");
                let cue = if result.success() {
                    AudioCue::Win
                } else {
                    AudioCue::Lose
                };
                self.feedback.cue(cue);
                self.result = Some(result);
                Some(self.set_phase(Phase::Result))
            },
            GameSignal::Exit => {
                self.close_game("abandoned");
                Some(self.set_phase(Phase::Lobby))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use proptest::prelude::*;

    use super::*;
    use crate::test_helpers::{
        SCRIPTED_TIMEOUT, new_session, recording_feedback, scripted_jackpot, scripted_registry,
    };

    fn select(id: &str) -> Intent {
        Intent::SelectGame(GameId::from(id))
    }

    fn to_result(session: &mut Session) {
        session.dispatch(Intent::Start);
        session.dispatch(select("spin-wheel"));
        session.dispatch(Intent::Play(PlayerInput::Primary));
        assert_eq!(session.phase(), Phase::Result);
    }

    #[test]
    fn starts_in_attract_with_nothing_held() {
        let session = new_session();
        assert_eq!(session.phase(), Phase::Attract);
        assert!(session.active_game_id().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn scenario_win_flows_to_result() {
        let mut session = new_session();
        assert_eq!(
            session.dispatch(Intent::Start),
            Some(Transition {
                from: Phase::Attract,
                to: Phase::Lobby
            })
        );
        session.dispatch(select("spin-wheel"));
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.active_game_id().unwrap().as_str(), "spin-wheel");

        let t = session.dispatch(Intent::Play(PlayerInput::Primary));
        assert_eq!(t.map(|t| t.to), Some(Phase::Result));
        assert_eq!(session.result(), Some(&scripted_jackpot()));
        assert!(session.active_game_id().is_none());
        assert_eq!(session.surface().listener_count(), 0);
    }

    #[test]
    fn scenario_exit_discards_everything() {
        let mut session = new_session();
        session.dispatch(Intent::Start);
        session.dispatch(select("cyber-whack"));
        session.dispatch(Intent::Pointer(PointerPos::new(1.0, 2.0)));
        assert_eq!(session.surface().listener_count(), 1);

        let t = session.dispatch(Intent::Exit);
        assert_eq!(t.map(|t| t.to), Some(Phase::Lobby));
        assert!(session.active_game_id().is_none());
        assert!(session.result().is_none());
        assert_eq!(session.surface().listener_count(), 0);
    }

    #[test]
    fn module_exit_returns_to_lobby() {
        let mut session = new_session();
        session.dispatch(Intent::Start);
        session.dispatch(select("spin-wheel"));
        // The scripted game reports exit twice; the second is dropped.
        let t = session.dispatch(Intent::Play(PlayerInput::Back));
        assert_eq!(t.map(|t| t.to), Some(Phase::Lobby));
        assert_eq!(session.dispatch(Intent::Play(PlayerInput::Back)), None);
        assert_eq!(session.phase(), Phase::Lobby);
    }

    #[test]
    fn redeem_and_reset_close_the_loop() {
        let mut session = new_session();
        to_result(&mut session);
        assert_eq!(
            session.dispatch(Intent::Redeem).map(|t| t.to),
            Some(Phase::Redeem)
        );
        assert!(session.result().is_some());
        assert_eq!(
            session.dispatch(Intent::Reset).map(|t| t.to),
            Some(Phase::Attract)
        );
        assert!(session.active_game_id().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn second_end_report_does_not_replace_result() {
        let mut session = new_session();
        session.dispatch(Intent::Start);
        session.dispatch(select("spin-wheel"));
        // Select(n) makes the scripted game report twice in one call.
        session.dispatch(Intent::Play(PlayerInput::Select(42)));
        assert_eq!(session.phase(), Phase::Result);
        assert_eq!(session.result(), Some(&GameResult::new(true, 42, None)));
        assert_eq!(session.result().unwrap().prize_label(), "MYSTERY PRIZE");
    }

    #[test]
    fn timer_driven_end_arrives_through_tick() {
        let mut session = new_session();
        session.dispatch(Intent::Start);
        session.dispatch(select("pattern-master"));
        assert_eq!(session.tick(SCRIPTED_TIMEOUT / 2), None);
        let t = session.tick(SCRIPTED_TIMEOUT);
        assert_eq!(t.map(|t| t.to), Some(Phase::Result));
        assert_eq!(session.result(), Some(&GameResult::lost(0)));
    }

    #[test]
    fn huge_tick_is_clamped() {
        let mut session = new_session();
        session.dispatch(Intent::Start);
        session.dispatch(select("spin-wheel"));
        session.tick(Duration::from_secs(1));
        assert_eq!(session.tick(Duration::MAX), None);
        assert_eq!(session.phase(), Phase::Playing);
        // Each clamped tick adds one second; the third reaches the timeout.
        let t = session.tick(Duration::MAX);
        assert_eq!(t.map(|t| t.to), Some(Phase::Result));
        assert_eq!(session.result(), Some(&GameResult::lost(0)));
    }

    #[test]
    fn outcome_picks_the_closing_cue() {
        let (fx, log) = recording_feedback();
        let mut session = Session::new(scripted_registry(), PrizeTable::default(), fx, Some(3));
        session.dispatch(Intent::Start);
        session.dispatch(select("pattern-master"));
        session.tick(SCRIPTED_TIMEOUT);
        assert_eq!(session.result(), Some(&GameResult::lost(0)));
        assert_eq!(
            log.cues(),
            vec![AudioCue::Coin, AudioCue::Click, AudioCue::Lose]
        );

        session.dispatch(Intent::Redeem);
        session.dispatch(Intent::Reset);
        session.dispatch(Intent::Start);
        session.dispatch(select("spin-wheel"));
        session.dispatch(Intent::Play(PlayerInput::Primary));
        assert_eq!(log.cues().last(), Some(&AudioCue::Win));
    }

    #[test]
    fn unknown_game_is_ignored() {
        let mut session = new_session();
        session.dispatch(Intent::Start);
        assert_eq!(session.dispatch(select("pinball")), None);
        assert_eq!(session.phase(), Phase::Lobby);
        assert!(session.active_game_id().is_none());
    }

    #[test]
    fn replaying_builds_a_fresh_session() {
        let mut session = new_session();
        session.dispatch(Intent::Start);
        session.dispatch(select("spin-wheel"));
        let first = session.active_session();
        session.dispatch(Intent::Exit);
        session.dispatch(select("spin-wheel"));
        let second = session.active_session();
        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
        // Fresh instance: the scripted game counts inputs from zero.
        let view = session.game_view().unwrap();
        assert!(view.hud.contains(&"INPUTS: 0".to_string()));
    }

    #[test]
    fn redeem_needs_result_phase() {
        let mut session = new_session();
        assert_eq!(session.dispatch(Intent::Redeem), None);
        session.dispatch(Intent::Start);
        assert_eq!(session.dispatch(Intent::Redeem), None);
        assert_eq!(session.phase(), Phase::Lobby);
    }

    #[test]
    fn tick_outside_playing_is_inert() {
        let mut session = new_session();
        assert_eq!(session.tick(Duration::from_secs(100)), None);
        to_result(&mut session);
        assert_eq!(session.tick(Duration::from_secs(100)), None);
        assert_eq!(session.phase(), Phase::Result);
    }

    #[test]
    fn snapshot_tracks_state() {
        let mut session = new_session();
        session.dispatch(Intent::Start);
        session.dispatch(select("spin-wheel"));
        let snap = session.snapshot();
        assert_eq!(snap.phase, Phase::Playing);
        assert_eq!(snap.active_game, Some(GameId::from("spin-wheel")));
        assert!(snap.game.is_some());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["phase"], "playing");
        assert_eq!(json["active_game"], "spin-wheel");
    }

    fn arb_intent() -> impl Strategy<Value = Intent> {
        prop_oneof![
            Just(Intent::Start),
            Just(Intent::Back),
            Just(Intent::Exit),
            Just(Intent::Redeem),
            Just(Intent::Reset),
            Just(Intent::Play(PlayerInput::Primary)),
            Just(Intent::Play(PlayerInput::Back)),
            (0usize..50).prop_map(|n| Intent::Play(PlayerInput::Select(n))),
            prop::sample::select(vec!["spin-wheel", "cyber-whack", "pattern-master", "bogus"])
                .prop_map(|id| Intent::SelectGame(GameId::from(id))),
            (0.0f32..350.0, 0.0f32..350.0)
                .prop_map(|(x, y)| Intent::Pointer(PointerPos::new(x, y))),
        ]
    }

    /// Whether the transition table has a row for this pair.
    fn is_listed(phase: Phase, intent: &Intent) -> bool {
        matches!(
            (phase, intent),
            (Phase::Attract, Intent::Start)
                | (Phase::Lobby, Intent::SelectGame(_))
                | (Phase::Lobby, Intent::Back)
                | (Phase::Playing, Intent::Exit)
                | (Phase::Playing, Intent::Play(_))
                | (Phase::Playing, Intent::Pointer(_))
                | (Phase::Result, Intent::Redeem)
                | (Phase::Redeem, Intent::Reset)
        )
    }

    fn assert_invariants(session: &Session) {
        assert_eq!(
            session.active_game_id().is_some(),
            session.phase() == Phase::Playing,
            "active game id must be set exactly while playing"
        );
        assert_eq!(
            session.result().is_some(),
            session.phase().holds_result(),
            "result must be held exactly in result/redeem"
        );
        if session.phase() != Phase::Playing {
            assert_eq!(session.surface().listener_count(), 0);
        }
    }

    /// One edge of the exhaustive walk: an intent, or a tick long enough to
    /// time the scripted game out.
    #[derive(Debug, Clone)]
    enum Step {
        Intent(Intent),
        Timeout,
    }

    fn alphabet() -> Vec<Step> {
        let mut steps: Vec<Step> = [
            Intent::Start,
            Intent::Back,
            Intent::Exit,
            Intent::Redeem,
            Intent::Reset,
            Intent::Play(PlayerInput::Primary),
            Intent::Play(PlayerInput::Back),
            Intent::Play(PlayerInput::Select(7)),
            Intent::Pointer(PointerPos::new(5.0, 5.0)),
            select("spin-wheel"),
            select("pattern-master"),
            select("bogus"),
        ]
        .into_iter()
        .map(Step::Intent)
        .collect();
        steps.push(Step::Timeout);
        steps
    }

    fn replay(path: &[usize], steps: &[Step]) -> Session {
        let mut session = new_session();
        for &i in path {
            match &steps[i] {
                Step::Intent(intent) => {
                    session.dispatch(intent.clone());
                },
                Step::Timeout => {
                    session.tick(SCRIPTED_TIMEOUT);
                },
            }
        }
        session
    }

    fn state_key(session: &Session) -> String {
        format!(
            "{:?}/{:?}/{:?}",
            session.phase(),
            session.active_game_id(),
            session.result()
        )
    }

    #[test]
    fn every_reachable_state_keeps_invariants() {
        let steps = alphabet();
        let mut seen = HashSet::from([state_key(&new_session())]);
        let mut queue = VecDeque::from([Vec::<usize>::new()]);
        let mut phases = HashSet::new();

        while let Some(path) = queue.pop_front() {
            let state = replay(&path, &steps);
            assert_invariants(&state);
            phases.insert(state.phase());

            for (i, step) in steps.iter().enumerate() {
                let mut next = path.clone();
                next.push(i);
                let session = replay(&next, &steps);
                assert_invariants(&session);
                let unlisted =
                    matches!(step, Step::Intent(intent) if !is_listed(state.phase(), intent));
                if unlisted {
                    assert_eq!(state_key(&session), state_key(&state), "{step:?} after {path:?}");
                }
                if seen.insert(state_key(&session)) {
                    queue.push_back(next);
                }
            }
        }

        assert_eq!(phases.len(), Phase::ALL.len());
        // Attract, lobby, two playing games, and three results in each of
        // result and redeem.
        assert_eq!(seen.len(), 10);
    }

    proptest! {
        #[test]
        fn unlisted_events_are_noops(intents in prop::collection::vec(arb_intent(), 0..60)) {
            let registry = scripted_registry();
            let mut session = Session::new(registry, PrizeTable::default(), Feedback::silent(), Some(9));
            for intent in intents {
                let before = session.phase();
                let listed = is_listed(before, &intent);
                let transition = session.dispatch(intent);
                if !listed {
                    prop_assert_eq!(transition, None);
                    prop_assert_eq!(session.phase(), before);
                }
            }
        }

        #[test]
        fn invariants_hold_for_every_reachable_state(
            steps in prop::collection::vec((arb_intent(), 0u64..3000), 0..80)
        ) {
            let mut session = new_session();
            assert_invariants(&session);
            for (intent, ms) in steps {
                session.dispatch(intent);
                assert_invariants(&session);
                session.tick(Duration::from_millis(ms));
                assert_invariants(&session);
            }
        }
    }
}
