use crate::ai::{DEFAULT_MODEL, ModelConfig};
use crate::models::{DEFAULT_ITEM_COUNT, Difficulty, Language, MAX_ITEM_COUNT, MIN_ITEM_COUNT};
use crate::setup::SetupForm;
use clap::Parser;
use std::path::PathBuf;

/// Generate quizzes and flashcards from a document or web page
#[derive(Parser, Debug, Clone)]
#[command(name = "quiz-forge", version, about, long_about = None)]
pub struct Cli {
    /// OpenRouter model id used for generation
    #[arg(short, long, env = "QUIZ_FORGE_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Initial content language
    #[arg(short, long, value_enum, default_value_t = Language::Vi)]
    pub language: Language,

    /// Initial number of questions or cards
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_ITEM_COUNT,
        value_parser = clap::value_parser!(u8).range(MIN_ITEM_COUNT as i64..=MAX_ITEM_COUNT as i64)
    )]
    pub count: u8,

    /// Initial difficulty
    #[arg(short, long, value_enum, default_value_t = Difficulty::Medium)]
    pub difficulty: Difficulty,

    /// Directory for the log file (defaults to the user cache dir)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::new(self.model.clone())
    }

    pub fn setup_form(&self) -> SetupForm {
        SetupForm::new(self.language, self.count, self.difficulty)
    }
}
