use super::roster::Roster;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "camelCase")]
pub enum ClientMessage {
    Join,
    Start,
    Draw(StrokeEvent),
    ClearCanvas,
    /// The server expects the bare guess text as content
    Guess(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "camelCase")]
pub enum ServerMessage {
    GameState(GameSnapshot),
    Draw(StrokeEvent),
    ClearCanvas,
}

impl ServerMessage {
    /// Every `type` tag the client knows how to handle
    pub const KINDS: [&'static str; 3] = ["gameState", "draw", "clearCanvas"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Waiting,
    Drawing,
    RoundEnd,
    GameEnd,
}

/// Full game state as broadcast by the server. Each snapshot replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    #[serde(rename = "state")]
    pub phase: Phase,
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub max_rounds: u32,
    #[serde(default)]
    pub players: Roster,
    #[serde(rename = "currentDrawer", default, skip_serializing_if = "Option::is_none")]
    pub current_drawer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_word: Option<String>,
    #[serde(rename = "roundTimeLimit", default, skip_serializing_if = "Option::is_none")]
    pub round_duration_seconds: Option<u32>,
}

/// One step of a freehand stroke: `Begin`, any number of `Segment`s, then `End`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StrokeEvent {
    #[serde(rename = "start")]
    Begin(StrokeStart),
    #[serde(rename = "draw")]
    Segment(Line),
    #[serde(rename = "end")]
    End(StrokeEnd),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStart {
    pub x: f32,
    pub y: f32,
    pub color: String,
    #[serde(rename = "lineWidth")]
    pub width: u32,
}

/// A self-contained line: it carries its own start point so it can be drawn
/// without knowing anything about the stroke it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(rename = "prevX")]
    pub from_x: f32,
    #[serde(rename = "prevY")]
    pub from_y: f32,
    #[serde(rename = "x")]
    pub to_x: f32,
    #[serde(rename = "y")]
    pub to_y: f32,
    pub color: String,
    #[serde(rename = "lineWidth")]
    pub width: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeEnd {
    /// Number of segments the drawer emitted for this stroke, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unrecognized message type `{0}`")]
    UnknownType(String),
}

#[derive(Deserialize)]
struct FrameTag {
    #[serde(rename = "type")]
    kind: String,
}

/// Parse one inbound text frame.
pub fn decode_server_frame(text: &str) -> Result<ServerMessage, ProtocolError> {
    let tag: FrameTag = serde_json::from_str(text)?;
    if !ServerMessage::KINDS.contains(&tag.kind.as_str()) {
        return Err(ProtocolError::UnknownType(tag.kind));
    }
    Ok(serde_json::from_str(text)?)
}

pub fn encode_client_message(msg: &ClientMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}
