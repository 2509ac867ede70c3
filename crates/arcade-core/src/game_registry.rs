use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game_trait::GameFactory;

/// Unique identifier for a registered game type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lobby card accent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccentColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AccentColor {
    pub const NEON_PINK: AccentColor = AccentColor::rgb(0xff, 0x00, 0xff);
    pub const NEON_GREEN: AccentColor = AccentColor::rgb(0x0a, 0xff, 0x00);
    pub const NEON_BLUE: AccentColor = AccentColor::rgb(0x00, 0xff, 0xff);
    pub const GOLD: AccentColor = AccentColor::rgb(0xff, 0xd7, 0x00);
    pub const DEEP_PURPLE: AccentColor = AccentColor::rgb(0x30, 0x2b, 0x63);
    pub const ALERT_RED: AccentColor = AccentColor::rgb(0xff, 0x00, 0x55);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS-style `#rrggbb` form.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A registered game entry in the game catalog.
#[derive(Debug, Clone)]
pub struct GameDescriptor {
    pub id: GameId,
    pub title: String,
    pub description: String,
    pub goal: String,
    pub accent_color: AccentColor,
    pub factory: GameFactory,
}

/// Construction-time registry violations. These abort startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("game id `{0}` is registered more than once")]
    DuplicateId(GameId),
    #[error("game at position {position} has an empty id")]
    EmptyId { position: usize },
    #[error("registry contains no games")]
    Empty,
}

/// Static, ordered catalog of playable games.
#[derive(Debug, Clone)]
pub struct GameRegistry {
    games: Vec<GameDescriptor>,
}

impl GameRegistry {
    /// Validate and freeze the catalog. Duplicate or empty ids are rejected
    /// outright; no entry is ever silently dropped.
    pub fn new(games: Vec<GameDescriptor>) -> Result<Self, RegistryError> {
        if games.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::with_capacity(games.len());
        for (position, game) in games.iter().enumerate() {
            if game.id.as_str().trim().is_empty() {
                return Err(RegistryError::EmptyId { position });
            }
            if !seen.insert(game.id.as_str()) {
                return Err(RegistryError::DuplicateId(game.id.clone()));
            }
        }
        Ok(Self { games })
    }

    /// Linear lookup; the catalog is single digits long.
    pub fn get(&self, id: &str) -> Option<&GameDescriptor> {
        self.games.iter().find(|g| g.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Lobby position lookup, 1-based as shown on screen.
    pub fn nth(&self, position: usize) -> Option<&GameDescriptor> {
        position.checked_sub(1).and_then(|i| self.games.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameDescriptor> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{scripted_descriptor, scripted_registry};

    #[test]
    fn rejects_duplicate_ids() {
        let err = GameRegistry::new(vec![
            scripted_descriptor("spin-wheel"),
            scripted_descriptor("cyber-whack"),
            scripted_descriptor("spin-wheel"),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId(GameId::from("spin-wheel")));
    }

    #[test]
    fn rejects_empty_id() {
        let err = GameRegistry::new(vec![
            scripted_descriptor("spin-wheel"),
            scripted_descriptor("  "),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::EmptyId { position: 1 });
    }

    #[test]
    fn rejects_empty_catalog() {
        assert_eq!(GameRegistry::new(Vec::new()).unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn lookup_preserves_order() {
        let registry = scripted_registry();
        let ids: Vec<&str> = registry.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["spin-wheel", "cyber-whack", "pattern-master"]);
        assert!(registry.contains("cyber-whack"));
        assert!(registry.get("no-such-game").is_none());
    }

    #[test]
    fn nth_is_one_based() {
        let registry = scripted_registry();
        assert_eq!(registry.nth(1).unwrap().id.as_str(), "spin-wheel");
        assert_eq!(registry.nth(3).unwrap().id.as_str(), "pattern-master");
        assert!(registry.nth(0).is_none());
        assert!(registry.nth(4).is_none());
    }

    #[test]
    fn accent_hex_formatting() {
        assert_eq!(AccentColor::NEON_PINK.hex(), "#ff00ff");
        assert_eq!(AccentColor::DEEP_PURPLE.hex(), "#302b63");
    }
}
