//! Presentation shells. Each is a pure function of the data it shows; the
//! commands it offers map onto session intents in `input`.

use std::fmt;

use arcade_core::game_registry::{GameDescriptor, GameRegistry};
use arcade_core::game_trait::GameView;
use arcade_core::phase::Phase;
use arcade_core::result::GameResult;
use arcade_core::session::Session;

const WIDTH: usize = 44;

/// One screenful of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellView {
    pub title: String,
    pub lines: Vec<String>,
    /// Commands this screen accepts, shown in the footer.
    pub actions: Vec<String>,
}

impl ShellView {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.title.contains(needle) || self.lines.iter().any(|l| l.contains(needle))
    }
}

impl fmt::Display for ShellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(WIDTH);
        writeln!(f, "{rule}")?;
        writeln!(f, "{:^WIDTH$}", self.title)?;
        writeln!(f, "{rule}")?;
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        if !self.actions.is_empty() {
            writeln!(f, "{}", "-".repeat(WIDTH))?;
            writeln!(f, "> {}", self.actions.join(" | "))?;
        }
        Ok(())
    }
}

pub fn attract() -> ShellView {
    ShellView::new("NEON ARCADE")
        .line("")
        .line(format!("{:^WIDTH$}", "TAP TO START"))
        .line("")
        .line("Coin inserted: 0/1")
        .action("start")
}

fn lobby_card(position: usize, game: &GameDescriptor) -> [String; 2] {
    [
        format!(
            "{position:>2}. {:<16} {:<18} {}",
            game.title,
            game.goal,
            game.accent_color.hex()
        ),
        format!("    {} ({})", game.description, game.id),
    ]
}

pub fn lobby(registry: &GameRegistry) -> ShellView {
    let mut view = ShellView::new("ARCADE LOBBY").line("SELECT A GAME TO WIN YOUR PRIZE").line("");
    for (i, game) in registry.iter().enumerate() {
        view.lines.extend(lobby_card(i + 1, game));
    }
    view.action("select <id|n>").action("back")
}

pub fn playing(game: Option<&GameDescriptor>, screen: &GameView) -> ShellView {
    let mut view = ShellView::new(screen.headline.as_str());
    if let Some(game) = game {
        view = view.line(format!("{} :: {}", game.title, game.goal));
    }
    if !screen.hud.is_empty() {
        view = view.line(screen.hud.join("  |  "));
    }
    // Shake nudges the board sideways.
    let offset = " ".repeat((screen.shake / 5).min(6) as usize);
    view = view.line("");
    for row in &screen.board {
        view = view.line(format!("{offset}{row}"));
    }
    if !screen.hint.is_empty() {
        view = view.line("").line(screen.hint.as_str());
    }
    view.action("exit").action("abort")
}

pub fn result(result: &GameResult) -> ShellView {
    let title = if result.success() { "WINNER!" } else { "GAME OVER" };
    ShellView::new(title)
        .line("")
        .line(result.prize_label())
        .line(format!("SCORE: {}", result.score()))
        .action("redeem")
}

pub fn redeem(result: &GameResult, ticket: &str) -> ShellView {
    ShellView::new("PRIZE TICKET")
        .line("REWARD:")
        .line(result.prize_label())
        .line(format!("Code: {ticket}"))
        .line("")
        .line("TO CLAIM YOUR PRIZE: show this ticket at the counter")
        .action("reset")
}

/// The screen for the session's current phase.
pub fn render(session: &Session, ticket: Option<&str>) -> ShellView {
    match (session.phase(), session.result()) {
        (Phase::Attract, _) => attract(),
        (Phase::Lobby, _) => lobby(session.registry()),
        (Phase::Playing, _) => {
            let screen = session.game_view().unwrap_or_default();
            playing(session.active_game(), &screen)
        },
        (Phase::Result, Some(r)) => result(r),
        (Phase::Redeem, Some(r)) => redeem(r, ticket.unwrap_or("-")),
        (phase, None) => {
            tracing::warn!(%phase, "no result to show");
            attract()
        },
    }
}
