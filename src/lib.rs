// Library surface for the quiz engine, the headless integration tests and
// the terminal front end in main.rs.
pub mod app;
pub mod app_dirs;
pub mod assets;
pub mod catalog;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod notifier;
pub mod operator;
pub mod question;
pub mod render;
pub mod runtime;
pub mod source;
pub mod tally;

pub use difficulty::{Difficulty, GenerationPolicy, Normalization};
pub use error::QuizError;
pub use notifier::{Notifier, QuizEvent, QuizObserver, Testable};
pub use operator::Operator;
pub use question::{Permutation, Question};
pub use source::{QuestionSource, Questionable, SourceConfig};
pub use tally::CumulativeTally;

pub const TICK_RATE_MS: u64 = 100;
