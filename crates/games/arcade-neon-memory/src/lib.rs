use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use arcade_core::feedback::{AudioCue, Feedback};
use arcade_core::game_registry::{AccentColor, GameDescriptor, GameId};
use arcade_core::game_trait::{GameInit, GameView, MiniGame, PlayerInput, seconds_left};
use arcade_core::link::GameLink;
use arcade_core::result::GameResult;
use arcade_core::timer::Timers;

pub const GAME_ID: &str = "neon-memory";

pub const ICONS: [&str; 6] = ["ROCKET", "STAR", "GEM", "PAD", "ALIEN", "FIRE"];
pub const ROUND_TIME: Duration = Duration::from_secs(60);
pub const FLIP_BACK: Duration = Duration::from_secs(1);
pub const POINTS_PER_SECOND: u32 = 100;
pub const WIN_PRIZE: &str = "SMART COOKIE";

pub fn descriptor() -> GameDescriptor {
    GameDescriptor {
        id: GameId::from(GAME_ID),
        title: "Neon Memory".to_string(),
        description: "Flip the cards and find every pair.".to_string(),
        goal: "Match all pairs".to_string(),
        accent_color: AccentColor::NEON_PINK,
        factory: NeonMemory::create,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub icon: usize,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    FlipBack,
    TimeUp,
}

/// Twelve face-down cards, six pairs, sixty seconds.
pub struct NeonMemory {
    link: GameLink,
    timers: Timers<Tick>,
    cards: Vec<Card>,
    flipped: Vec<usize>,
    done: bool,
}

impl NeonMemory {
    pub fn new(init: GameInit) -> Self {
        let mut rng = StdRng::seed_from_u64(init.seed);
        let mut cards: Vec<Card> = (0..ICONS.len())
            .chain(0..ICONS.len())
            .map(|icon| Card {
                icon,
                matched: false,
            })
            .collect();
        cards.shuffle(&mut rng);
        Self {
            link: init.link,
            timers: Timers::new(),
            cards,
            flipped: Vec::with_capacity(2),
            done: false,
        }
    }

    pub fn create(init: GameInit) -> Box<dyn MiniGame> {
        Box::new(Self::new(init))
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    pub fn time_left(&self) -> Duration {
        ROUND_TIME.saturating_sub(self.timers.now())
    }

    fn flip(&mut self, index: usize, fx: &mut Feedback) {
        if self.done || self.flipped.len() >= 2 || self.flipped.contains(&index) {
            return;
        }
        match self.cards.get(index) {
            Some(card) if !card.matched => {},
            _ => return,
        }
        fx.cue(AudioCue::Click);
        self.flipped.push(index);

        let &[first, second] = self.flipped.as_slice() else {
            return;
        };
        if self.cards[first].icon != self.cards[second].icon {
            self.timers.after(FLIP_BACK, Tick::FlipBack);
            return;
        }
        fx.cue(AudioCue::Coin);
        self.cards[first].matched = true;
        self.cards[second].matched = true;
        self.flipped.clear();

        if self.cards.iter().all(|c| c.matched) {
            self.done = true;
            self.timers.clear();
            fx.cue(AudioCue::Win);
            let secs = u32::try_from(seconds_left(self.time_left())).unwrap_or(u32::MAX);
            self.link
                .end(GameResult::won(secs.saturating_mul(POINTS_PER_SECOND), WIN_PRIZE));
        }
    }
}

impl MiniGame for NeonMemory {
    fn start(&mut self, _fx: &mut Feedback) {
        self.timers.after(ROUND_TIME, Tick::TimeUp);
    }

    fn update(&mut self, dt: Duration, fx: &mut Feedback) {
        let deadline = self.timers.deadline(dt);
        while let Some(tick) = self.timers.pop_due(deadline) {
            match tick {
                Tick::FlipBack => self.flipped.clear(),
                Tick::TimeUp => {
                    self.done = true;
                    fx.cue(AudioCue::Lose);
                    self.link.end(GameResult::lost(0));
                },
            }
        }
    }

    fn handle_input(&mut self, input: PlayerInput, fx: &mut Feedback) {
        match input {
            PlayerInput::Select(index) => self.flip(index, fx),
            PlayerInput::Back => self.link.exit(),
            PlayerInput::Primary => {},
        }
    }

    fn view(&self) -> GameView {
        let mut view = GameView::new("NEON MEMORY")
            .hud(format!("TIME: {}s", seconds_left(self.time_left())))
            .hud(format!(
                "PAIRS: {}/{}",
                self.cards.iter().filter(|c| c.matched).count() / 2,
                ICONS.len()
            ));
        for (r, cards) in self.cards.chunks(4).enumerate() {
            let cells: Vec<String> = cards
                .iter()
                .enumerate()
                .map(|(c, card)| {
                    let index = r * 4 + c;
                    if card.matched || self.flipped.contains(&index) {
                        format!("[{:^6}]", ICONS[card.icon])
                    } else {
                        format!("[{index:^6}]")
                    }
                })
                .collect();
            view = view.row(cells.join(" "));
        }
        view.hint("press <card> to flip")
    }
}

#[cfg(test)]
mod tests {
    use arcade_core::test_helpers::{
        contract_back_requests_exit, contract_ends_at_most_once,
        contract_teardown_releases_surface, contract_timeout_ends, contract_view_renders,
        drain, first_result, make_init, run_for,
    };

    use super::*;

    const FRAME: Duration = Duration::from_millis(100);

    fn started(seed: u64) -> (NeonMemory, arcade_core::link::SignalReceiver) {
        let (init, rx, _surface) = make_init(seed);
        let mut game = NeonMemory::new(init);
        game.start(&mut Feedback::silent());
        (game, rx)
    }

    /// Index pairs holding the same icon.
    fn pairs(game: &NeonMemory) -> Vec<(usize, usize)> {
        (0..ICONS.len())
            .map(|icon| {
                let mut at = game
                    .cards()
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.icon == icon)
                    .map(|(i, _)| i);
                (at.next().unwrap(), at.next().unwrap())
            })
            .collect()
    }

    #[test]
    fn deck_has_six_pairs() {
        let (game, _rx) = started(1);
        assert_eq!(game.cards().len(), 12);
        for icon in 0..ICONS.len() {
            assert_eq!(game.cards().iter().filter(|c| c.icon == icon).count(), 2);
        }
    }

    #[test]
    fn mismatch_flips_back_after_a_second() {
        let (mut game, _rx) = started(2);
        let mut fx = Feedback::silent();
        let p = pairs(&game);
        let (a, b) = (p[0].0, p[1].0);
        game.handle_input(PlayerInput::Select(a), &mut fx);
        game.handle_input(PlayerInput::Select(b), &mut fx);
        assert_eq!(game.flipped(), &[a, b]);
        // A third card waits until the pair turns back.
        game.handle_input(PlayerInput::Select(p[2].0), &mut fx);
        assert_eq!(game.flipped().len(), 2);
        run_for(&mut game, &mut fx, FLIP_BACK, FRAME);
        assert!(game.flipped().is_empty());
    }

    #[test]
    fn same_card_twice_does_not_match() {
        let (mut game, _rx) = started(3);
        let mut fx = Feedback::silent();
        game.handle_input(PlayerInput::Select(0), &mut fx);
        game.handle_input(PlayerInput::Select(0), &mut fx);
        assert_eq!(game.flipped(), &[0]);
        assert!(!game.cards()[0].matched);
    }

    #[test]
    fn clearing_the_board_scores_seconds_left() {
        let (mut game, mut rx) = started(4);
        let mut fx = Feedback::silent();
        run_for(&mut game, &mut fx, Duration::from_millis(12_500), FRAME);
        for (a, b) in pairs(&game) {
            game.handle_input(PlayerInput::Select(a), &mut fx);
            game.handle_input(PlayerInput::Select(b), &mut fx);
        }
        assert!(game.cards().iter().all(|c| c.matched));
        // 47.5 s left shows as 48 on the HUD.
        assert_eq!(
            first_result(&drain(&mut rx)),
            Some(GameResult::won(4800, WIN_PRIZE))
        );
    }

    #[test]
    fn timeout_scores_nothing() {
        let result = contract_timeout_ends(NeonMemory::create, ROUND_TIME + FRAME);
        assert_eq!(result, GameResult::lost(0));
    }

    #[test]
    fn contract() {
        contract_view_renders(NeonMemory::create);
        contract_back_requests_exit(NeonMemory::create);
        contract_ends_at_most_once(NeonMemory::create, &[], ROUND_TIME * 2);
        contract_teardown_releases_surface(NeonMemory::create);
    }
}
