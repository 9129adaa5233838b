// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod countdown;
pub mod dictionary;
pub mod error;
pub mod item;
pub mod logging;
pub mod presentation;
pub mod quiz;
pub mod runtime;
pub mod session;
pub mod share;
pub mod source;
pub mod summary;
pub mod view;

pub use error::FetchError;
pub use item::{AnsweredEntry, QuizItem};
pub use quiz::QuizSession;
