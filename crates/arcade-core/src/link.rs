use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::result::GameResult;

/// Identifies one play of one game, from instantiation to teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a running game reports back to the session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameSignal {
    End(GameResult),
    Exit,
}

pub type SignalReceiver = mpsc::UnboundedReceiver<GameSignal>;

/// A game's `onEnd` / `onExit` pair.
///
/// Each session gets its own channel. Once the controller tears the session
/// down the receiver is gone and any late report is dropped on the floor, so a
/// stale game can never reach a later session.
#[derive(Debug)]
pub struct GameLink {
    session: SessionId,
    tx: mpsc::UnboundedSender<GameSignal>,
    ended: Cell<bool>,
}

impl GameLink {
    pub fn channel(session: SessionId) -> (GameLink, SignalReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let link = GameLink {
            session,
            tx,
            ended: Cell::new(false),
        };
        (link, rx)
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Report the terminal result. Only the first call of a session counts;
    /// returns whether this call was accepted.
    pub fn end(&self, result: GameResult) -> bool {
        if self.ended.replace(true) {
            tracing::debug!(session = %self.session, "repeat end report ignored");
            return false;
        }
        tracing::debug!(
            session = %self.session,
            success = result.success(),
            score = result.score(),
            "game reported result"
        );
        self.tx.send(GameSignal::End(result)).is_ok()
    }

    /// Ask to abandon the session. Ignored once a result has been reported.
    pub fn exit(&self) {
        if self.ended.get() {
            return;
        }
        let _ = self.tx.send(GameSignal::Exit);
    }

    pub fn has_ended(&self) -> bool {
        self.ended.get()
    }

    /// Whether the controller has already torn this session down.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
