use super::clock::RoundClock;
use super::view::{Prompt, ScoreLine, Screen, View};
use crate::game::core::messages::{ClientMessage, GameSnapshot, Phase, ServerMessage};
use crate::game::core::{Identity, Roster};
use crate::game::stroke::{Mode, PointerSample, StrokeReplicator, Surface, ToolSettings};
use tracing::{debug, info, trace, warn};

/// Discrete commands produced by whatever input surface drives the client.
#[derive(Debug, Clone, PartialEq)]
pub enum InputCommand {
    StartGame,
    Guess(String),
    ClearCanvas,
    SelectColor(String),
    SelectWidth(u32),
    Pointer(PointerSample),
    /// Leave the finished game and join again over a fresh channel
    NewGame,
}

/// Client-side view of the game, driven by server snapshots.
///
/// Screens only change when a snapshot arrives (or when the channel is lost).
/// Local commands go through [`GameMachine::handle_input`], which returns the
/// message to send, if any.
pub struct GameMachine<S> {
    identity: Identity,
    screen: Screen,
    round: u32,
    max_rounds: u32,
    roster: Roster,
    drawer_id: Option<String>,
    word: Option<String>,
    /// (round, drawer) of the turn whose clock is running
    turn: Option<(u32, Option<String>)>,
    timed: bool,
    tool: ToolSettings,
    clock: RoundClock,
    strokes: StrokeReplicator,
    surface: S,
    guesses: Vec<String>,
    notice: Option<String>,
    restart_requested: bool,
}

impl<S: Surface> GameMachine<S> {
    pub fn new(identity: Identity, surface: S) -> Self {
        Self {
            identity,
            screen: Screen::Joining,
            round: 0,
            max_rounds: 0,
            roster: Roster::default(),
            drawer_id: None,
            word: None,
            turn: None,
            timed: false,
            tool: ToolSettings::default(),
            clock: RoundClock::new(),
            strokes: StrokeReplicator::new(),
            surface,
            guesses: Vec::new(),
            notice: None,
            restart_requested: false,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn tool(&self) -> &ToolSettings {
        &self.tool
    }

    pub fn clock(&self) -> &RoundClock {
        &self.clock
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Whether this participant is the one drawing right now.
    pub fn can_draw(&self) -> bool {
        self.screen == Screen::Game && self.drawer_id.as_deref() == Some(self.identity.id.as_str())
    }

    pub fn handle_server(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::GameState(snapshot) => self.apply_snapshot(snapshot),
            ServerMessage::Draw(event) => {
                if self.can_draw() {
                    trace!("Ignoring echo of own stroke");
                    return;
                }
                self.strokes.replay(&event, &mut self.surface);
            }
            ServerMessage::ClearCanvas => {
                debug!("Canvas cleared by server");
                self.strokes.clear(&mut self.surface);
            }
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: GameSnapshot) {
        if snapshot.phase != Phase::Waiting && snapshot.round < self.round {
            warn!(
                previous = self.round,
                received = snapshot.round,
                "Round number went backwards"
            );
        }
        debug!(phase = ?snapshot.phase, round = snapshot.round, "Applying snapshot");

        self.round = snapshot.round;
        self.max_rounds = snapshot.max_rounds;
        self.roster = snapshot.players;
        self.drawer_id = snapshot.current_drawer_id;
        self.notice = None;

        match snapshot.phase {
            Phase::Waiting => self.enter_lobby(),
            Phase::Drawing => {
                self.enter_drawing(snapshot.current_word, snapshot.round_duration_seconds)
            }
            Phase::RoundEnd => self.enter_round_end(snapshot.current_word),
            Phase::GameEnd => self.enter_game_end(),
        }
    }

    pub fn handle_input(&mut self, command: InputCommand) -> Option<ClientMessage> {
        match command {
            InputCommand::StartGame => {
                if self.screen != Screen::Lobby {
                    warn!(screen = ?self.screen, "Start is only available in the lobby");
                    return None;
                }
                Some(ClientMessage::Start)
            }
            InputCommand::Guess(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                if self.screen != Screen::Game || self.can_draw() {
                    warn!(screen = ?self.screen, "Guess dropped, not guessing right now");
                    return None;
                }
                self.guesses.push(text.to_string());
                Some(ClientMessage::Guess(text.to_string()))
            }
            InputCommand::ClearCanvas => {
                if !self.can_draw() {
                    warn!("Only the drawer can clear the canvas");
                    return None;
                }
                self.strokes.clear(&mut self.surface);
                Some(ClientMessage::ClearCanvas)
            }
            InputCommand::SelectColor(color) => {
                self.tool = self.tool.with_color(color);
                None
            }
            InputCommand::SelectWidth(width) => {
                if width == 0 {
                    warn!("Ignoring zero brush width");
                    return None;
                }
                self.tool = self.tool.with_width(width);
                None
            }
            InputCommand::Pointer(sample) => {
                if !self.can_draw() {
                    trace!("Pointer input while not drawing");
                    return None;
                }
                self.strokes
                    .capture(&sample, &self.tool, &mut self.surface)
                    .map(ClientMessage::Draw)
            }
            InputCommand::NewGame => {
                if self.screen != Screen::GameEnd {
                    warn!(screen = ?self.screen, "New game is only available once the game is over");
                    return None;
                }
                info!("Restarting for a new game");
                self.reset();
                None
            }
        }
    }

    /// Whether a new game was requested and the channel must be re-opened.
    pub fn wants_restart(&self) -> bool {
        self.restart_requested
    }

    pub fn tick_clock(&mut self) {
        if let Some(remaining) = self.clock.tick() {
            trace!(remaining, "Clock tick");
        }
    }

    /// A new channel is being opened; wait for the server to resynchronize us.
    pub fn begin_joining(&mut self) {
        self.end_turn();
        self.restart_requested = false;
        self.screen = Screen::Joining;
    }

    pub fn disconnected(&mut self, reason: impl Into<String>) {
        self.end_turn();
        self.screen = Screen::Disconnected;
        self.notice = Some(reason.into());
    }

    pub fn view(&self) -> View {
        let self_id = self.identity.id.as_str();
        let in_game = self.screen == Screen::Game;
        let can_draw = self.can_draw();

        View {
            screen: self.screen,
            round: self.round,
            max_rounds: self.max_rounds,
            scoreboard: self
                .roster
                .iter()
                .map(|p| ScoreLine::new(p, self_id))
                .collect(),
            prompt: in_game.then(|| {
                if can_draw {
                    Prompt::Draw(self.word.clone().unwrap_or_default())
                } else {
                    Prompt::Guess
                }
            }),
            revealed_word: match self.screen {
                Screen::RoundEnd => self.word.clone(),
                _ => None,
            },
            standings: match self.screen {
                Screen::GameEnd => self
                    .roster
                    .standings()
                    .into_iter()
                    .map(|p| ScoreLine::new(p, self_id))
                    .collect(),
                _ => Vec::new(),
            },
            clock: (in_game && self.timed).then(|| self.clock.reading()),
            capture_enabled: can_draw,
            tool: self.tool.clone(),
            guesses: self.guesses.clone(),
            notice: self.notice.clone(),
        }
    }

    fn enter_lobby(&mut self) {
        self.end_turn();
        if self.screen != Screen::Lobby {
            info!(players = self.roster.len(), "Entered lobby");
            self.strokes.clear(&mut self.surface);
            self.guesses.clear();
        }
        self.word = None;
        self.screen = Screen::Lobby;
    }

    fn enter_drawing(&mut self, word: Option<String>, duration: Option<u32>) {
        let turn = (self.round, self.drawer_id.clone());
        let same_turn = self.screen == Screen::Game && self.turn.as_ref() == Some(&turn);

        self.screen = Screen::Game;
        let drawing = self.can_draw();
        self.word = if drawing { word } else { None };
        if drawing && self.word.is_none() {
            warn!("Drawing turn arrived without a word");
        }
        self.strokes
            .set_mode(if drawing { Mode::Capture } else { Mode::Replay });

        if same_turn {
            return;
        }

        self.strokes.clear(&mut self.surface);
        match duration {
            Some(seconds) => self.clock.start(seconds),
            None => {
                warn!("Drawing turn arrived without a duration");
                self.clock.stop();
            }
        }
        self.timed = duration.is_some();
        self.turn = Some(turn);
        info!(round = self.round, drawer = ?self.drawer_id, drawing, "Turn started");
    }

    fn enter_round_end(&mut self, word: Option<String>) {
        self.end_turn();
        self.word = word;
        self.screen = Screen::RoundEnd;
        info!(round = self.round, word = ?self.word, "Round ended");
    }

    fn enter_game_end(&mut self) {
        self.end_turn();
        self.word = None;
        self.screen = Screen::GameEnd;
        info!("Game over");
    }

    /// Forget the finished game and wait to be joined again.
    fn reset(&mut self) {
        self.end_turn();
        self.strokes.clear(&mut self.surface);
        self.guesses.clear();
        self.roster = Roster::default();
        self.round = 0;
        self.max_rounds = 0;
        self.drawer_id = None;
        self.word = None;
        self.notice = None;
        self.screen = Screen::Joining;
        self.restart_requested = true;
    }

    fn end_turn(&mut self) {
        self.clock.stop();
        self.timed = false;
        self.turn = None;
        self.strokes.set_mode(Mode::Replay);
    }
}
