use crate::ai::GenerationError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub const MIN_ITEM_COUNT: u8 = 1;
pub const MAX_ITEM_COUNT: u8 = 20;
pub const DEFAULT_ITEM_COUNT: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Language {
    #[default]
    #[value(name = "vi")]
    Vi,
    #[value(name = "en")]
    En,
}

impl Language {
    pub fn tag(self) -> &'static str {
        match self {
            Language::Vi => "VI",
            Language::En => "EN",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Vi => "Tiếng Việt (VI)",
            Language::En => "English (EN)",
        }
    }

    /// Picks the string matching this language.
    pub fn pick(self, vi: &'static str, en: &'static str) -> &'static str {
        match self {
            Language::Vi => vi,
            Language::En => en,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Language::Vi => Language::En,
            Language::En => Language::Vi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn tag(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        match self {
            Difficulty::Easy => language.pick("Dễ (Easy)", "Easy"),
            Difficulty::Medium => language.pick("Trung bình (Medium)", "Medium"),
            Difficulty::Hard => language.pick("Khó (Hard)", "Hard"),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizMode {
    /// Correctness and explanation are revealed after every answer.
    #[default]
    Practice,
    /// Nothing is revealed until the results screen.
    Exam,
}

impl QuizMode {
    pub fn tag(self) -> &'static str {
        match self {
            QuizMode::Practice => "practice",
            QuizMode::Exam => "exam",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            QuizMode::Practice => QuizMode::Exam,
            QuizMode::Exam => QuizMode::Practice,
        }
    }
}

/// What the provider should generate. A flashcard deck has no quiz mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Quiz(QuizMode),
    Flashcards,
}

/// Material the content is generated from. Exactly one form per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Text(String),
    Url(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::Text(s) | Source::Url(s) => s,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Source::Url(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub source: Source,
    pub kind: ContentKind,
    pub language: Language,
    pub count: u8,
    pub difficulty: Difficulty,
}

impl SessionConfig {
    pub fn new(
        source: Source,
        kind: ContentKind,
        language: Language,
        count: u8,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            source,
            kind,
            language,
            count: clamp_count(count),
            difficulty,
        }
    }
}

pub fn clamp_count(count: u8) -> u8 {
    count.clamp(MIN_ITEM_COUNT, MAX_ITEM_COUNT)
}

/// Accepts numeric or string ids; anything else becomes 0 and is renumbered later.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Option labels sometimes arrive as numbers (`1`) instead of strings (`"1"`).
fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number label, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    #[serde(deserialize_with = "lenient_label")]
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: u32,
    pub text: String,
    pub options: Vec<QuizOption>,
    #[serde(
        rename = "correctAnswer",
        alias = "correct_answer",
        deserialize_with = "lenient_label"
    )]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    pub fn is_correct(&self, option_id: &str) -> bool {
        self.correct_answer == option_id
    }

    pub fn option(&self, option_id: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: u32,
    pub front: String,
    pub back: String,
}

/// Question position -> selected option id.
pub type AnswerRecord = BTreeMap<usize, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedContent {
    Questions(Vec<Question>),
    Flashcards(Vec<Flashcard>),
}

impl GeneratedContent {
    pub fn len(&self) -> usize {
        match self {
            GeneratedContent::Questions(q) => q.len(),
            GeneratedContent::Flashcards(f) => f.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub request_id: u64,
    pub config: SessionConfig,
}

#[derive(Debug)]
pub struct GenerationResponse {
    pub request_id: u64,
    pub result: Result<GeneratedContent, GenerationError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Setup,
    Quiz,
    Flashcard,
    Results,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Setup => "setup",
            Screen::Quiz => "quiz",
            Screen::Flashcard => "flashcard",
            Screen::Results => "results",
        };
        f.write_str(name)
    }
}
