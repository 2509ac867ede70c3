use serde::{Deserialize, Serialize};

/// Label shown when a result carries no prize.
pub const MYSTERY_PRIZE: &str = "MYSTERY PRIZE";

/// Terminal outcome of one mini-game session.
///
/// Fields are private: a result is fixed once a game reports it. Scores are
/// unsigned, so a negative score cannot be reported at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    success: bool,
    score: u32,
    prize: Option<String>,
}

impl GameResult {
    /// Build a result. A blank prize is stored as no prize.
    pub fn new(success: bool, score: u32, prize: Option<String>) -> Self {
        let prize = prize
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        Self {
            success,
            score,
            prize,
        }
    }

    pub fn won(score: u32, prize: impl Into<String>) -> Self {
        Self::new(true, score, Some(prize.into()))
    }

    pub fn lost(score: u32) -> Self {
        Self::new(false, score, None)
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn prize(&self) -> Option<&str> {
        self.prize.as_deref()
    }

    /// Prize text for display, falling back to [`MYSTERY_PRIZE`].
    pub fn prize_label(&self) -> &str {
        self.prize().unwrap_or(MYSTERY_PRIZE)
    }
}
