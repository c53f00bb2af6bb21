pub mod core;
pub mod engine;
pub mod session;
pub mod stroke;
pub mod ws;

pub use self::core::messages;
