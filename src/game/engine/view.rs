use super::clock::ClockReading;
use crate::game::core::Participant;
use crate::game::stroke::ToolSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Joining,
    Lobby,
    Game,
    RoundEnd,
    GameEnd,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Only ever shown to the drawer
    Draw(String),
    Guess,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    pub id: String,
    pub name: String,
    pub score: u32,
    pub is_self: bool,
}

impl ScoreLine {
    pub(super) fn new(participant: &Participant, self_id: &str) -> Self {
        Self {
            id: participant.id.clone(),
            name: participant.name.clone(),
            score: participant.score,
            is_self: participant.id == self_id,
        }
    }
}

/// Everything a presenter needs to show the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub screen: Screen,
    pub round: u32,
    pub max_rounds: u32,
    pub scoreboard: Vec<ScoreLine>,
    pub prompt: Option<Prompt>,
    pub revealed_word: Option<String>,
    pub standings: Vec<ScoreLine>,
    pub clock: Option<ClockReading>,
    pub capture_enabled: bool,
    pub tool: ToolSettings,
    pub guesses: Vec<String>,
    pub notice: Option<String>,
}
