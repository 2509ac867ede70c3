//! Operator command line: one command per line on stdin.

use thiserror::Error;

use arcade_core::game_registry::{GameId, GameRegistry};
use arcade_core::game_trait::PlayerInput;
use arcade_core::input_surface::PointerPos;
use arcade_core::phase::Phase;
use arcade_core::session::Intent;

pub const HELP: &str = "\
commands:
  start                  leave the attract screen
  select <id|n>          pick a game in the lobby
  back                   lobby: return to attract; in game: same as exit
  tap | spin             the big button
  press <n>              cell, pad, card or answer n (0-based)
  move <x> <y>           pointer position in arena pixels
  exit                   ask the game to quit
  abort                  tear the game down immediately
  redeem                 claim the prize on the result screen
  reset                  finish and return to attract
  status                 print the session snapshot as JSON
  help                   this text
  quit                   shut the kiosk down";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Intent(Intent),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("`{command}` needs {what}")]
    MissingArg {
        command: &'static str,
        what: &'static str,
    },
    #[error("`{command}`: `{value}` is not a valid {what}")]
    BadArg {
        command: &'static str,
        value: String,
        what: &'static str,
    },
    #[error("no game at lobby position {0}")]
    NoSuchPosition(usize),
}

/// A pointer coordinate: any finite number.
fn coordinate(value: &str) -> Result<f32, InputError> {
    number::<f32>(value, "move", "coordinate")
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::BadArg {
            command: "move",
            value: value.to_string(),
            what: "coordinate",
        })
}

fn arg<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    what: &'static str,
) -> Result<&'a str, InputError> {
    args.next().ok_or(InputError::MissingArg { command, what })
}

fn number<T: std::str::FromStr>(
    value: &str,
    command: &'static str,
    what: &'static str,
) -> Result<T, InputError> {
    value.parse().map_err(|_| InputError::BadArg {
        command,
        value: value.to_string(),
        what,
    })
}

/// Parse one line. `back` and `exit` depend on the phase: inside a game they
/// become the game's own EXIT button.
pub fn parse(line: &str, phase: Phase, registry: &GameRegistry) -> Result<Command, InputError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(InputError::Empty);
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "start" => Command::Intent(Intent::Start),
        "select" => {
            let target = arg(&mut words, "select", "a game id or lobby number")?;
            let id = match target.parse::<usize>() {
                Ok(n) => registry
                    .nth(n)
                    .map(|g| g.id.clone())
                    .ok_or(InputError::NoSuchPosition(n))?,
                // Unknown ids are the session's call.
                Err(_) => GameId::from(target),
            };
            Command::Intent(Intent::SelectGame(id))
        },
        "back" if phase == Phase::Playing => Command::Intent(Intent::Play(PlayerInput::Back)),
        "back" => Command::Intent(Intent::Back),
        "exit" => Command::Intent(Intent::Play(PlayerInput::Back)),
        "abort" => Command::Intent(Intent::Exit),
        "tap" | "spin" => Command::Intent(Intent::Play(PlayerInput::Primary)),
        "press" => {
            let n = arg(&mut words, "press", "a number")?;
            Command::Intent(Intent::Play(PlayerInput::Select(number(n, "press", "number")?)))
        },
        "move" => {
            let x = coordinate(arg(&mut words, "move", "x and y")?)?;
            let y = coordinate(arg(&mut words, "move", "x and y")?)?;
            Command::Intent(Intent::Pointer(PointerPos::new(x, y)))
        },
        "redeem" => Command::Intent(Intent::Redeem),
        "reset" => Command::Intent(Intent::Reset),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,
        _ => return Err(InputError::Unknown(head.to_string())),
    };
    Ok(command)
}
