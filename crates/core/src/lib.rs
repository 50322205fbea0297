//! Domain layer of the quiz: questions, the per-question countdown, the session
//! state machine and the player's progress. Nothing here performs I/O.

pub mod error;
pub mod model;
pub mod session;
pub mod time;
pub mod timer;

pub use error::Error;
pub use time::Clock;
