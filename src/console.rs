//! Line-oriented input surface and text presenter for the headless client.
//!
//! Commands:
//! - `/start` starts the game from the lobby
//! - `/clear` clears the canvas (drawer only)
//! - `/color <css color>` and `/size <px>` pick the drawing tool
//! - `/stroke x,y x,y ...` draws one stroke through the given points
//! - `/newgame` rejoins once the game is over
//! - `/quit` leaves
//!
//! Any other line is sent as a guess.

use pictionary::{
    InputCommand, LineCanvas, PointerPhase, PointerSample, Presenter, Prompt, Screen, View,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

pub async fn read_commands(tx: mpsc::UnboundedSender<InputCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, "Failed to read input");
                return;
            }
        };
        if line.trim() == "/quit" {
            return;
        }
        match parse_line(&line) {
            Ok(commands) => {
                for command in commands {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
            }
            Err(err) => eprintln!("{err}"),
        }
    }
}

fn parse_line(line: &str) -> Result<Vec<InputCommand>, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        if line.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![InputCommand::Guess(line.to_string())]);
    };

    let mut words = rest.split_whitespace();
    match words.next() {
        Some("start") => Ok(vec![InputCommand::StartGame]),
        Some("clear") => Ok(vec![InputCommand::ClearCanvas]),
        Some("newgame") => Ok(vec![InputCommand::NewGame]),
        Some("color") => words
            .next()
            .map(|c| vec![InputCommand::SelectColor(c.to_string())])
            .ok_or_else(|| "usage: /color <css color>".to_string()),
        Some("size") => words
            .next()
            .and_then(|s| s.parse().ok())
            .map(|w| vec![InputCommand::SelectWidth(w)])
            .ok_or_else(|| "usage: /size <px>".to_string()),
        Some("stroke") => parse_stroke(words),
        _ => Err(format!("unknown command: /{rest}")),
    }
}

fn parse_stroke<'a>(points: impl Iterator<Item = &'a str>) -> Result<Vec<InputCommand>, String> {
    let points: Vec<(f32, f32)> = points
        .map(|p| {
            let (x, y) = p.split_once(',')?;
            Some((x.parse().ok()?, y.parse().ok()?))
        })
        .collect::<Option<_>>()
        .ok_or_else(|| "usage: /stroke x,y x,y ...".to_string())?;
    let Some(&(last_x, last_y)) = points.last() else {
        return Err("usage: /stroke x,y x,y ...".to_string());
    };

    let mut commands: Vec<InputCommand> = points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            let phase = if i == 0 { PointerPhase::Down } else { PointerPhase::Move };
            InputCommand::Pointer(PointerSample::new(phase, x, y))
        })
        .collect();
    commands.push(InputCommand::Pointer(PointerSample::new(
        PointerPhase::Up,
        last_x,
        last_y,
    )));
    Ok(commands)
}

/// Prints a summary whenever the visible state changes.
#[derive(Default)]
pub struct ConsolePresenter {
    last: Option<(View, usize)>,
}

impl Presenter<LineCanvas> for ConsolePresenter {
    fn render(&mut self, view: &View, surface: &LineCanvas) {
        let current = (view.clone(), surface.lines().len());
        if self.last.as_ref() == Some(&current) {
            return;
        }
        println!("{}", describe(view, current.1));
        self.last = Some(current);
    }
}

fn describe(view: &View, lines: usize) -> String {
    let scores = view
        .scoreboard
        .iter()
        .map(|s| {
            let marker = if s.is_self { "*" } else { "" };
            format!("{}{marker} {}", s.name, s.score)
        })
        .collect::<Vec<_>>()
        .join(", ");

    match view.screen {
        Screen::Joining => "Joining...".to_string(),
        Screen::Disconnected => format!(
            "Disconnected: {}",
            view.notice.as_deref().unwrap_or("connection lost")
        ),
        Screen::Lobby => format!("Lobby [{scores}] - type /start when everyone is here"),
        Screen::Game => {
            let prompt = match &view.prompt {
                Some(Prompt::Draw(word)) => format!("Draw: {word}"),
                _ => "Guess the word!".to_string(),
            };
            let clock = view
                .clock
                .map(|c| {
                    let alert = if c.low_time { "!" } else { "" };
                    format!("{}s{alert}", c.remaining)
                })
                .unwrap_or_default();
            format!(
                "Round {}/{} {clock} | {prompt} | canvas: {lines} lines | [{scores}]",
                view.round, view.max_rounds
            )
        }
        Screen::RoundEnd => format!(
            "Round over, the word was {} | [{scores}]",
            view.revealed_word.as_deref().unwrap_or("?")
        ),
        Screen::GameEnd => {
            let standings = view
                .standings
                .iter()
                .enumerate()
                .map(|(i, s)| format!("{}. {}: {} points", i + 1, s.name, s.score))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Game over\n{standings}\ntype /newgame to play again")
        }
    }
}
