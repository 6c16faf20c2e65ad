pub mod ai;
pub mod ai_worker;
pub mod app;
pub mod cli;
pub mod flashcard;
pub mod logger;
pub mod models;
pub mod quiz;
pub mod results;
pub mod session;
pub mod setup;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use ai::{ContentProvider, GenerationError, ModelConfig, OpenRouterProvider};
pub use models::{
    AnswerRecord, ContentKind, Difficulty, Flashcard, GeneratedContent, Language, Question,
    QuizMode, Screen, SessionConfig, Source,
};
pub use results::{QuizSummary, summarize};
pub use session::{Effect, SessionEvent, SessionState, reduce};
