use std::io::Write;
use std::time::Duration;

use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Instant, MissedTickBehavior};

use arcade_core::game_registry::GameRegistry;
use arcade_core::phase::Phase;
use arcade_core::session::{Session, Transition};

use crate::audio;
use crate::config::KioskConfig;
use crate::error::KioskError;
use crate::input::{self, Command, HELP, InputError};
use crate::shells;

/// Longest frame handed to a game; a stalled terminal does not fast-forward
/// the round.
pub const MAX_FRAME: Duration = Duration::from_millis(250);

const TICKET_LEN: usize = 6;

/// What the host should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nothing,
    Print(String),
    Quit,
}

/// The session controller plus host-only state: the frame clock, the redeem
/// ticket and the last screen drawn.
pub struct Kiosk {
    session: Session,
    frame: Duration,
    tickets: StdRng,
    ticket: Option<String>,
    drawn: Option<String>,
}

impl Kiosk {
    pub fn new(config: &KioskConfig, registry: GameRegistry) -> Result<Self, KioskError> {
        config.validate()?;
        let prizes = config.prize_table()?;
        let feedback = audio::feedback(&config.audio, &config.haptics);
        let tickets = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.rotate_left(17)),
            None => StdRng::from_os_rng(),
        };
        tracing::info!(
            games = registry.len(),
            frame_rate = config.frame_rate,
            seeded = config.seed.is_some(),
            "kiosk ready"
        );
        Ok(Self {
            session: Session::new(registry, prizes, feedback, config.seed),
            frame: config.frame_interval(),
            tickets,
            ticket: None,
            drawn: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }

    pub fn ticket(&self) -> Option<&str> {
        self.ticket.as_deref()
    }

    pub fn parse(&self, line: &str) -> Result<Command, InputError> {
        input::parse(line, self.session.phase(), self.session.registry())
    }

    pub fn apply(&mut self, command: Command) -> Reply {
        match command {
            Command::Intent(intent) => {
                let t = self.session.dispatch(intent);
                self.after(t);
                Reply::Nothing
            },
            Command::Status => match serde_json::to_string_pretty(&self.session.snapshot()) {
                Ok(json) => Reply::Print(json),
                Err(e) => Reply::Print(format!("status unavailable: {e}")),
            },
            Command::Help => Reply::Print(HELP.to_string()),
            Command::Quit => Reply::Quit,
        }
    }

    /// Parse and apply one operator line. Bad input is reported, never fatal.
    pub fn handle_line(&mut self, line: &str) -> Reply {
        match self.parse(line) {
            Ok(command) => self.apply(command),
            Err(InputError::Empty) => Reply::Nothing,
            Err(e) => {
                tracing::debug!(line, error = %e, "rejected command");
                Reply::Print(e.to_string())
            },
        }
    }

    /// Apply a line that arrived `since_frame` after the last frame. Game
    /// time is brought up to the arrival first, so timed games measure the
    /// input itself rather than the frame that follows it.
    pub fn handle_line_after(&mut self, line: &str, since_frame: Duration) -> Reply {
        self.tick(since_frame);
        self.handle_line(line)
    }

    pub fn tick(&mut self, dt: Duration) {
        let t = self.session.tick(dt.min(MAX_FRAME));
        self.after(t);
    }

    fn after(&mut self, transition: Option<Transition>) {
        match transition.map(|t| t.to) {
            Some(Phase::Redeem) => {
                let code: String = (0..TICKET_LEN)
                    .map(|_| char::from(self.tickets.sample(Alphanumeric)).to_ascii_uppercase())
                    .collect();
                self.ticket = Some(format!("TEK-{code}"));
            },
            Some(Phase::Attract) => self.ticket = None,
            _ => {},
        }
    }

    pub fn screen(&self) -> String {
        shells::render(&self.session, self.ticket.as_deref()).to_string()
    }

    /// The current screen, if it differs from the last one returned.
    pub fn redraw(&mut self) -> Option<String> {
        let screen = self.screen();
        if self.drawn.as_deref() == Some(screen.as_str()) {
            return None;
        }
        self.drawn = Some(screen.clone());
        Some(screen)
    }
}

/// Drive the kiosk until `quit` or end of input: operator lines and frame
/// ticks are handled in arrival order on one task.
pub async fn run<R, W>(mut kiosk: Kiosk, input: R, mut out: W) -> Result<(), KioskError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut interval = tokio::time::interval(kiosk.frame());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    if let Some(screen) = kiosk.redraw() {
        write!(out, "{screen}")?;
        out.flush()?;
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("input closed, shutting down");
                    break;
                };
                let now = Instant::now();
                let reply = kiosk.handle_line_after(&line, now.saturating_duration_since(last));
                last = now;
                match reply {
                    Reply::Nothing => {},
                    Reply::Print(text) => writeln!(out, "{text}")?,
                    Reply::Quit => {
                        tracing::info!("quit requested");
                        break;
                    },
                }
            }
            now = interval.tick() => {
                kiosk.tick(now.saturating_duration_since(last));
                last = last.max(now);
            }
        }
        if let Some(screen) = kiosk.redraw() {
            write!(out, "{screen}")?;
        }
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use arcade_core::test_helpers::scripted_registry;

    use super::*;

    fn kiosk() -> Kiosk {
        let config = KioskConfig {
            seed: Some(5),
            ..KioskConfig::default()
        };
        Kiosk::new(&config, scripted_registry()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = KioskConfig {
            frame_rate: 0,
            ..KioskConfig::default()
        };
        assert!(matches!(
            Kiosk::new(&config, scripted_registry()),
            Err(KioskError::Config(_))
        ));
    }

    #[test]
    fn redeem_issues_a_ticket_and_reset_clears_it() {
        let mut k = kiosk();
        for line in ["start", "select spin-wheel", "tap", "redeem"] {
            assert_eq!(k.handle_line(line), Reply::Nothing);
        }
        assert_eq!(k.session().phase(), Phase::Redeem);
        let ticket = k.ticket().unwrap().to_string();
        assert!(ticket.starts_with("TEK-"));
        assert_eq!(ticket.len(), 4 + TICKET_LEN);
        assert!(k.screen().contains(&ticket));

        k.handle_line("reset");
        assert_eq!(k.session().phase(), Phase::Attract);
        assert!(k.ticket().is_none());
    }

    #[test]
    fn bad_lines_print_an_error() {
        let mut k = kiosk();
        assert_eq!(k.handle_line("   "), Reply::Nothing);
        assert!(matches!(k.handle_line("fly"), Reply::Print(_)));
        assert_eq!(k.handle_line("quit"), Reply::Quit);
    }

    #[test]
    fn status_is_json() {
        let mut k = kiosk();
        k.handle_line("start");
        let Reply::Print(json) = k.handle_line("status") else {
            panic!("status should print");
        };
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["phase"], "lobby");
        assert!(value["active_game"].is_null());
    }

    #[test]
    fn redraw_only_on_change() {
        let mut k = kiosk();
        assert!(k.redraw().is_some());
        assert!(k.redraw().is_none());
        k.handle_line("start");
        assert!(k.redraw().unwrap().contains("ARCADE LOBBY"));
    }

    #[test]
    fn long_frames_are_capped() {
        let mut k = kiosk();
        k.handle_line("start");
        k.handle_line("select 1");
        // The scripted game times out after three seconds of game time.
        for _ in 0..11 {
            k.tick(Duration::from_secs(10));
        }
        assert_eq!(k.session().phase(), Phase::Playing);
        k.tick(Duration::from_secs(10));
        assert_eq!(k.session().phase(), Phase::Result);
    }

    #[cfg(feature = "reaction-grid")]
    mod reaction {
        use arcade_core::game_registry::GameRegistry;

        use super::*;

        fn lit_kiosk() -> (Kiosk, usize) {
            let config = KioskConfig {
                seed: Some(11),
                frame_rate: 10,
                ..KioskConfig::default()
            };
            let registry = GameRegistry::new(vec![arcade_reaction_grid::descriptor()]).unwrap();
            let mut k = Kiosk::new(&config, registry).unwrap();
            k.handle_line("start");
            k.handle_line("select reaction-grid");
            for _ in 0..100 {
                k.tick(k.frame());
                let view = k.session().game_view().unwrap();
                let lit = view.board.iter().enumerate().find_map(|(row, cells)| {
                    cells.find("[#]").map(|col| row * 4 + col / 3)
                });
                if let Some(cell) = lit {
                    return (k, cell);
                }
            }
            panic!("cell never lit");
        }

        fn reaction_ms(k: &Kiosk) -> u64 {
            let view = k.session().game_view().unwrap();
            view.hud[1].trim_end_matches("ms").parse().unwrap()
        }

        #[test]
        fn input_is_timed_at_arrival_not_at_the_next_frame() {
            let (mut on_frame, cell) = lit_kiosk();
            let (mut mid_frame, same) = lit_kiosk();
            assert_eq!(cell, same);
            let line = format!("press {cell}");
            on_frame.handle_line(&line);
            mid_frame.handle_line_after(&line, Duration::from_millis(37));
            assert_eq!(reaction_ms(&mid_frame), reaction_ms(&on_frame) + 37);
        }
    }

    #[tokio::test]
    async fn run_reads_until_quit() {
        let script: &[u8] = b"start\nselect 1\ntap\nstatus\nquit\nstart\n";
        let mut out = Vec::new();
        run(kiosk(), script, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("NEON ARCADE"));
        assert!(text.contains("WINNER!"));
        assert!(text.contains("\"phase\": \"result\""));
    }
}
