pub mod clock;
mod machine;
mod view;

pub use clock::{ClockReading, RoundClock, LOW_TIME_THRESHOLD};
pub use machine::{GameMachine, InputCommand};
pub use view::{Prompt, ScoreLine, Screen, View};
