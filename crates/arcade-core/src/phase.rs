use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level kiosk phase. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Attract,
    Lobby,
    Playing,
    Result,
    Redeem,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Attract,
        Phase::Lobby,
        Phase::Playing,
        Phase::Result,
        Phase::Redeem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Attract => "attract",
            Phase::Lobby => "lobby",
            Phase::Playing => "playing",
            Phase::Result => "result",
            Phase::Redeem => "redeem",
        }
    }

    /// Whether a game result must be held while in this phase.
    pub fn holds_result(self) -> bool {
        matches!(self, Phase::Result | Phase::Redeem)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
