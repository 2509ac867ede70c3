use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::feedback::Feedback;
use crate::input_surface::InputSurface;
use crate::link::{GameLink, SessionId};
use crate::prize::PrizeDraw;

/// Core trait that every arcade mini-game implements.
///
/// The session controller owns the instance for the length of one play and
/// drives it from the kiosk event loop; the game only handles its own rules,
/// timers and view. It reports its outcome through the [`GameLink`] it was
/// built with.
pub trait MiniGame {
    /// Called once right after construction, before the first frame.
    fn start(&mut self, _fx: &mut Feedback) {}

    /// Called each frame with the elapsed time since the previous frame.
    fn update(&mut self, dt: Duration, fx: &mut Feedback);

    /// Called for every player input while the game is active.
    fn handle_input(&mut self, input: PlayerInput, fx: &mut Feedback);

    /// Current view for the host to render.
    fn view(&self) -> GameView;

    /// Called by the controller on every exit path, right before the
    /// instance is dropped. Owned timers and leases are released by drop;
    /// override this only for extra cleanup.
    fn teardown(&mut self) {}
}

/// Factory function type: creates a fresh game instance for one session.
pub type GameFactory = fn(GameInit) -> Box<dyn MiniGame>;

/// Everything a game receives at instantiation.
pub struct GameInit {
    pub session: SessionId,
    /// The `onEnd` / `onExit` callbacks.
    pub link: GameLink,
    /// Seed for the game's own RNG.
    pub seed: u64,
    pub surface: InputSurface,
    pub prizes: PrizeDraw,
}

/// Discrete player input routed to the active game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerInput {
    /// The big button: SPIN, TAP.
    Primary,
    /// A cell, pad, card or answer, 0-based.
    Select(usize),
    /// The in-game EXIT button.
    Back,
}

/// Text rendering of a running game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub headline: String,
    pub hud: Vec<String>,
    pub board: Vec<String>,
    pub hint: String,
    pub shake: u32,
}

impl GameView {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            ..Self::default()
        }
    }

    pub fn hud(mut self, line: impl Into<String>) -> Self {
        self.hud.push(line.into());
        self
    }

    pub fn row(mut self, line: impl Into<String>) -> Self {
        self.board.push(line.into());
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn shake(mut self, shake: u32) -> Self {
        self.shake = shake;
        self
    }
}

/// Whole seconds left on a countdown, rounded up the way a HUD shows it.
pub fn seconds_left(remaining: Duration) -> u64 {
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_builder_collects_lines() {
        let view = GameView::new("SPIN & WIN")
            .hud("TIME: 10s")
            .row("[ ] [x]")
            .row("[ ] [ ]")
            .hint("press spin")
            .shake(5);
        assert_eq!(view.headline, "SPIN & WIN");
        assert_eq!(view.hud, vec!["TIME: 10s"]);
        assert_eq!(view.board.len(), 2);
        assert_eq!(view.hint, "press spin");
        assert_eq!(view.shake, 5);
    }

    #[test]
    fn seconds_left_rounds_up() {
        assert_eq!(seconds_left(Duration::from_millis(14_001)), 15);
        assert_eq!(seconds_left(Duration::from_secs(15)), 15);
        assert_eq!(seconds_left(Duration::ZERO), 0);
    }
}
