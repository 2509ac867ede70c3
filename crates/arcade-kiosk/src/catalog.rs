//! The default game catalog, in lobby order. Each game is behind a cargo
//! feature of the same name.

use arcade_core::game_registry::{GameDescriptor, GameRegistry, RegistryError};

pub fn default_games() -> Vec<GameDescriptor> {
    #[allow(unused_mut)]
    let mut games = Vec::new();
    #[cfg(feature = "spin-wheel")]
    games.push(arcade_spin_wheel::descriptor());
    #[cfg(feature = "cyber-whack")]
    games.push(arcade_cyber_whack::descriptor());
    #[cfg(feature = "pattern-master")]
    games.push(arcade_pattern_master::descriptor());
    #[cfg(feature = "lucky-slots")]
    games.push(arcade_lucky_slots::descriptor());
    #[cfg(feature = "reaction-grid")]
    games.push(arcade_reaction_grid::descriptor());
    #[cfg(feature = "turbo-tapper")]
    games.push(arcade_turbo_tapper::descriptor());
    #[cfg(feature = "math-dash")]
    games.push(arcade_math_dash::descriptor());
    #[cfg(feature = "neon-memory")]
    games.push(arcade_neon_memory::descriptor());
    #[cfg(feature = "space-dodge")]
    games.push(arcade_space_dodge::descriptor());
    #[cfg(feature = "emoji-rain")]
    games.push(arcade_emoji_rain::descriptor());
    games
}

/// Build the registry from every enabled game. Fails when no game feature is
/// enabled.
pub fn default_registry() -> Result<GameRegistry, RegistryError> {
    GameRegistry::new(default_games())
}
