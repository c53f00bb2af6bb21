pub mod config;
mod game;

pub use game::core::{Identity, IdentityError, Participant, Roster};
pub use game::engine::{
    ClockReading, GameMachine, InputCommand, LOW_TIME_THRESHOLD, Prompt, RoundClock, ScoreLine,
    Screen, View,
};
pub use game::messages;
pub use game::session::{Presenter, Session, SessionConfig, SessionError};
pub use game::stroke::{
    IncompleteStroke, LineCanvas, Mode, PointerPhase, PointerSample, StrokeReplicator, Surface,
    ToolSettings,
};
pub use game::ws::{CloseReason, Transport, TransportError, TransportEvent, endpoint_for};
