mod progress;
mod runner;
mod workflow;

// Public API of the session subsystem.
pub use progress::{ProgressService, ProgressUpdate};
pub use runner::{QuizRunner, RunnerConfig};
pub use workflow::{QuizFlowService, QuizReport, QuizStart};
