pub mod messages;
mod roster;

pub use roster::{Identity, IdentityError, Participant, Roster};
