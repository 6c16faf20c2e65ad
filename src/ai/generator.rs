use crate::ai::client::{ModelConfig, OpenRouterClient};
use crate::models::{ContentKind, Flashcard, GeneratedContent, Language, Question, SessionConfig};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

lazy_static! {
    /// Leading option label in answers like "B. Paris" or "c) 42".
    static ref OPTION_LABEL_RE: Regex = Regex::new(r"^\s*([A-Za-z0-9]{1,2})\s*[.):\-]").unwrap();
}

/// Wrapper keys some models use instead of a bare JSON array.
const WRAPPER_KEYS: [&str; 5] = ["questions", "flashcards", "cards", "items", "data"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The client could not be built or configured (e.g. missing API key).
    Client(String),
    /// Network or service-side failure.
    Service(String),
    /// The response was not the JSON we asked for.
    Malformed(String),
    /// The provider answered but produced no usable items.
    Empty(ContentKind),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Client(msg) => write!(f, "client error: {}", msg),
            GenerationError::Service(msg) => write!(f, "service error: {}", msg),
            GenerationError::Malformed(msg) => write!(f, "malformed response: {}", msg),
            GenerationError::Empty(ContentKind::Flashcards) => {
                write!(f, "provider returned no flashcards")
            }
            GenerationError::Empty(ContentKind::Quiz(_)) => {
                write!(f, "provider returned no questions")
            }
        }
    }
}

impl std::error::Error for GenerationError {}

impl GenerationError {
    /// The message shown to the user; details stay in the log.
    pub fn user_message(&self, language: Language) -> String {
        let msg = match self {
            GenerationError::Empty(ContentKind::Quiz(_)) => language.pick(
                "Không thể tạo câu hỏi nào từ nội dung này.",
                "No questions could be generated from this content.",
            ),
            GenerationError::Empty(ContentKind::Flashcards) => language.pick(
                "Không thể tạo flashcard nào từ nội dung này.",
                "No flashcards could be generated from this content.",
            ),
            _ => language.pick(
                "Không thể tạo nội dung từ tài liệu này. Vui lòng kiểm tra lại nguồn dữ liệu hoặc thử nội dung khác.",
                "Could not generate content from this document. Please check the source or try different content.",
            ),
        };
        msg.to_string()
    }
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn generate(&self, config: &SessionConfig) -> Result<GeneratedContent, GenerationError>;
}

/// Generates content through an OpenRouter chat model.
#[derive(Debug, Clone, Default)]
pub struct OpenRouterProvider {
    model: ModelConfig,
}

impl OpenRouterProvider {
    pub fn new(model: ModelConfig) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ContentProvider for OpenRouterProvider {
    async fn generate(&self, config: &SessionConfig) -> Result<GeneratedContent, GenerationError> {
        let client = OpenRouterClient::new()?;
        let model = if config.source.is_url() {
            self.model.online()
        } else {
            self.model.clone()
        };

        info!(
            model = %model.model,
            kind = ?config.kind,
            count = config.count,
            "Requesting generated content"
        );

        let raw = client
            .complete(&system_instruction(config), &build_prompt(config), &model)
            .await?;
        debug!("Raw provider response: {}", raw);

        parse_generated(config, &raw)
    }
}

pub fn system_instruction(config: &SessionConfig) -> String {
    format!(
        r#"You generate study material for a knowledge quiz application.
MANDATORY RULES:
1. Use ONLY the content of the material supplied by the user. Never add outside knowledge or speculate beyond the material.
2. If the material is not enough for the requested amount, produce fewer items, never more than {count}.
3. Language: {language}. Every piece of text you return must be written in this language.
4. For QUIZ (practice/exam) difficulty:
   - easy: recognition, recalling facts.
   - medium: understanding, explaining.
   - hard: synthesis and reasoning over the material.
5. For FLASHCARD: focus on key concepts, definitions, facts and figures. Keep both sides short and memorable.
6. Respond ONLY with a JSON array of objects. No markdown, no extra text."#,
        count = config.count,
        language = config.language.display_name(),
    )
}

pub fn build_prompt(config: &SessionConfig) -> String {
    let input = match &config.source {
        crate::models::Source::Url(url) => format!("WEBSITE_URL: {}", url.trim()),
        crate::models::Source::Text(text) => format!("DOCUMENT_TEXT: {}", text.trim()),
    };

    match config.kind {
        ContentKind::Flashcards => format!(
            r#"INPUT: {input}
PARAMETERS:
- TAB: flashcard
- LANGUAGE: {language}
- NUMBER_OF_CARDS: {count}
- DIFFICULTY: {difficulty}

Create a list of flashcards (front/back) that closely follows the material.
Respond with this exact JSON structure:
[
  {{"id": 1, "front": "term or question", "back": "definition or answer"}}
]"#,
            language = config.language.tag(),
            count = config.count,
            difficulty = config.difficulty.tag(),
        ),
        ContentKind::Quiz(mode) => format!(
            r#"INPUT: {input}
PARAMETERS:
- TAB: quiz
- MODE: {mode}
- LANGUAGE: {language}
- NUMBER_OF_QUESTIONS: {count}
- DIFFICULTY: {difficulty}

Create a list of multiple-choice questions (4 options A-B-C-D) that closely follows the material.
Respond with this exact JSON structure:
[
  {{
    "id": 1,
    "text": "question",
    "options": [{{"id": "A", "text": "..."}}, {{"id": "B", "text": "..."}}, {{"id": "C", "text": "..."}}, {{"id": "D", "text": "..."}}],
    "correctAnswer": "A",
    "explanation": "why the correct option is right, based on the material"
  }}
]"#,
            mode = mode.tag(),
            language = config.language.tag(),
            count = config.count,
            difficulty = config.difficulty.tag(),
        ),
    }
}

/// Whether `value` looks like the payload rather than a bracketed aside.
fn is_payload(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(Value::is_object),
        Value::Object(_) => true,
        _ => false,
    }
}

/// Returns the first complete JSON array or object in `response`, skipping
/// code fences and any prose before or after it.
fn clean_json_response(response: &str) -> String {
    let trimmed = response.trim();
    let starts = trimmed
        .char_indices()
        .filter(|(_, c)| *c == '[' || *c == '{')
        .map(|(i, _)| i);

    for start in starts {
        let mut values =
            serde_json::Deserializer::from_str(&trimmed[start..]).into_iter::<Value>();
        if let Some(Ok(value)) = values.next()
            && is_payload(&value)
        {
            return trimmed[start..start + values.byte_offset()].to_string();
        }
    }

    trimmed.to_string()
}

fn extract_items(raw: &str) -> Result<Vec<Value>, GenerationError> {
    let cleaned = clean_json_response(raw);
    let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
        GenerationError::Malformed(format!(
            "Failed to parse response as JSON: {}\nCleaned: {}",
            e, cleaned
        ))
    })?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                GenerationError::Malformed("JSON object without an item array".to_string())
            }),
        other => Err(GenerationError::Malformed(format!(
            "Expected a JSON array, got: {}",
            other
        ))),
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<T>(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Dropping item {} that does not match the schema: {}", i, e);
                None
            }
        })
        .collect()
}

/// Parses a provider response into the collection the config asked for.
pub fn parse_generated(
    config: &SessionConfig,
    raw: &str,
) -> Result<GeneratedContent, GenerationError> {
    let items = extract_items(raw)?;
    let limit = usize::from(config.count);

    let content = match config.kind {
        ContentKind::Flashcards => {
            let mut cards: Vec<Flashcard> = decode_items::<Flashcard>(items)
                .into_iter()
                .filter_map(normalize_flashcard)
                .collect();
            cards.truncate(limit);
            renumber(&mut cards, |c| &mut c.id);
            GeneratedContent::Flashcards(cards)
        }
        ContentKind::Quiz(_) => {
            let mut questions: Vec<Question> = decode_items::<Question>(items)
                .into_iter()
                .filter_map(normalize_question)
                .collect();
            questions.truncate(limit);
            renumber(&mut questions, |q| &mut q.id);
            GeneratedContent::Questions(questions)
        }
    };

    if content.is_empty() {
        return Err(GenerationError::Empty(config.kind));
    }

    info!("Parsed {} generated items", content.len());
    Ok(content)
}

fn normalize_flashcard(mut card: Flashcard) -> Option<Flashcard> {
    card.front = card.front.trim().to_string();
    card.back = card.back.trim().to_string();
    if card.front.is_empty() || card.back.is_empty() {
        warn!("Dropping flashcard {} with a blank side", card.id);
        return None;
    }
    Some(card)
}

/// Trims ids and resolves the correct answer to exactly one option id.
pub fn normalize_question(mut question: Question) -> Option<Question> {
    question.text = question.text.trim().to_string();
    question.explanation = question.explanation.trim().to_string();
    for option in &mut question.options {
        option.id = option.id.trim().to_string();
        option.text = option.text.trim().to_string();
    }
    question.options.retain(|o| !o.id.is_empty());

    if question.text.is_empty() || question.options.len() < 2 {
        warn!("Dropping question {}: missing text or options", question.id);
        return None;
    }

    let mut seen = HashSet::new();
    if !question.options.iter().all(|o| seen.insert(o.id.as_str())) {
        warn!("Dropping question {}: duplicate option ids", question.id);
        return None;
    }

    let answer = question.correct_answer.trim();
    let resolved = question
        .options
        .iter()
        .find(|o| o.id == answer)
        .or_else(|| {
            let lowered = answer.to_lowercase();
            question
                .options
                .iter()
                .find(|o| o.id.to_lowercase() == lowered)
        })
        .or_else(|| question.options.iter().find(|o| o.text == answer))
        .or_else(|| {
            let label = OPTION_LABEL_RE.captures(answer)?.get(1)?.as_str().to_lowercase();
            question
                .options
                .iter()
                .find(|o| o.id.to_lowercase() == label)
        })
        .map(|o| o.id.clone());

    match resolved {
        Some(id) => {
            question.correct_answer = id;
            Some(question)
        }
        None => {
            warn!(
                "Dropping question {}: correct answer {:?} matches no option",
                question.id, question.correct_answer
            );
            None
        }
    }
}

/// Assigns 1-based positional ids when ids are missing or collide.
fn renumber<T>(items: &mut [T], id: impl Fn(&mut T) -> &mut u32) {
    let mut seen = HashSet::new();
    let valid = items.iter_mut().all(|item| {
        let value = *id(item);
        value != 0 && seen.insert(value)
    });
    if valid {
        return;
    }
    for (i, item) in items.iter_mut().enumerate() {
        *id(item) = u32::try_from(i + 1).unwrap_or(u32::MAX);
    }
}

#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::time::Duration;

/// Mock provider for testing - replays scripted results with an optional delay
#[cfg(test)]
pub struct MockProvider {
    results: Mutex<VecDeque<Result<GeneratedContent, GenerationError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(results: Vec<Result<GeneratedContent, GenerationError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl ContentProvider for MockProvider {
    async fn generate(&self, config: &SessionConfig) -> Result<GeneratedContent, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::Empty(config.kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuizMode, QuizOption, Source};

    fn quiz_config(count: u8) -> SessionConfig {
        SessionConfig::new(
            Source::Text("Photosynthesis converts light into chemical energy.".into()),
            ContentKind::Quiz(QuizMode::Practice),
            Language::En,
            count,
            Difficulty::Medium,
        )
    }

    fn card_config() -> SessionConfig {
        SessionConfig::new(
            Source::Url("https://example.com/article".into()),
            ContentKind::Flashcards,
            Language::Vi,
            5,
            Difficulty::Easy,
        )
    }

    fn question_with_answer(answer: &str) -> Question {
        Question {
            id: 1,
            text: "Capital of France?".into(),
            options: vec![
                QuizOption {
                    id: " A ".into(),
                    text: "Paris".into(),
                },
                QuizOption {
                    id: "B".into(),
                    text: "Rome".into(),
                },
            ],
            correct_answer: answer.into(),
            explanation: "".into(),
        }
    }

    #[test]
    fn test_clean_json_response_markdown_array() {
        let raw = "```json\n[{\"id\": 1}]\n```";
        assert_eq!(clean_json_response(raw), "[{\"id\": 1}]");
    }

    #[test]
    fn test_clean_json_response_with_text() {
        let raw = "Here you go: [{\"id\": 1}, {\"id\": 2}] enjoy";
        assert_eq!(clean_json_response(raw), "[{\"id\": 1}, {\"id\": 2}]");
    }

    #[test]
    fn test_clean_json_response_ignores_trailing_citations() {
        let raw = "[{\"id\": 1}]\n\nSources: [example.com](https://example.com)";
        assert_eq!(clean_json_response(raw), "[{\"id\": 1}]");
    }

    #[test]
    fn test_clean_json_response_skips_bracketed_prose_before_payload() {
        let raw = "See [1] for details. {\"items\": [{\"id\": 1}]} [2]";
        assert_eq!(clean_json_response(raw), "{\"items\": [{\"id\": 1}]}");
    }

    #[test]
    fn test_parse_flashcards_with_sources_after_array() {
        let config = SessionConfig::new(
            Source::Url("https://example.com/atp".into()),
            ContentKind::Flashcards,
            Language::En,
            5,
            Difficulty::Easy,
        );
        let json = r#"[{"id":1,"front":"ATP","back":"Energy"}]"#;
        let raw = format!("{}\n\nSources: [example.com](https://example.com)", json);
        let content = parse_generated(&config, &raw).unwrap();
        assert_eq!(
            content,
            GeneratedContent::Flashcards(vec![Flashcard {
                id: 1,
                front: "ATP".into(),
                back: "Energy".into(),
            }])
        );
    }

    #[test]
    fn test_clean_json_response_object_wrapper() {
        let raw = "{\"questions\": [{\"id\": 1}]}";
        assert_eq!(clean_json_response(raw), raw);
    }

    #[test]
    fn test_parse_questions() {
        let raw = r#"[
            {"id": 1, "text": "Q1", "options": [{"id": "A", "text": "x"}, {"id": "B", "text": "y"}], "correctAnswer": "A", "explanation": "e1"},
            {"id": 2, "text": "Q2", "options": [{"id": "A", "text": "x"}, {"id": "B", "text": "y"}], "correctAnswer": "B", "explanation": "e2"}
        ]"#;
        let content = parse_generated(&quiz_config(5), raw).unwrap();
        match content {
            GeneratedContent::Questions(questions) => {
                assert_eq!(questions.len(), 2);
                assert_eq!(questions[1].correct_answer, "B");
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_parse_flashcards_from_wrapper_object() {
        let raw = r#"{"flashcards": [{"id": "7", "front": "ATP", "back": "Energy carrier"}]}"#;
        let content = parse_generated(&card_config(), raw).unwrap();
        assert_eq!(
            content,
            GeneratedContent::Flashcards(vec![Flashcard {
                id: 7,
                front: "ATP".into(),
                back: "Energy carrier".into(),
            }])
        );
    }

    #[test]
    fn test_empty_array_is_empty_error() {
        let err = parse_generated(&card_config(), "[]").unwrap_err();
        assert_eq!(err, GenerationError::Empty(ContentKind::Flashcards));
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_generated(&quiz_config(5), "I cannot help with that.").unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[test]
    fn test_extra_items_are_truncated() {
        let raw = r#"[
            {"front": "a", "back": "1"},
            {"front": "b", "back": "2"},
            {"front": "c", "back": "3"}
        ]"#;
        let mut config = card_config();
        config.count = 2;
        match parse_generated(&config, raw).unwrap() {
            GeneratedContent::Flashcards(cards) => {
                assert_eq!(cards.len(), 2);
                assert_eq!(cards[0].id, 1);
                assert_eq!(cards[1].id, 2);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_blank_flashcards_are_dropped() {
        let raw = r#"[{"front": " ", "back": "x"}, {"front": "ok", "back": "fine"}]"#;
        match parse_generated(&card_config(), raw).unwrap() {
            GeneratedContent::Flashcards(cards) => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].front, "ok");
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_trims_option_ids() {
        let q = normalize_question(question_with_answer("A")).unwrap();
        assert_eq!(q.options[0].id, "A");
        assert_eq!(q.correct_answer, "A");
    }

    #[test]
    fn test_normalize_case_insensitive_answer() {
        let q = normalize_question(question_with_answer("b")).unwrap();
        assert_eq!(q.correct_answer, "B");
    }

    #[test]
    fn test_normalize_answer_by_option_text() {
        let q = normalize_question(question_with_answer("Rome")).unwrap();
        assert_eq!(q.correct_answer, "B");
    }

    #[test]
    fn test_normalize_answer_with_label_prefix() {
        let q = normalize_question(question_with_answer("A. Paris")).unwrap();
        assert_eq!(q.correct_answer, "A");
    }

    #[test]
    fn test_normalize_rejects_unknown_answer() {
        assert!(normalize_question(question_with_answer("E")).is_none());
    }

    #[test]
    fn test_normalize_rejects_duplicate_option_ids() {
        let mut q = question_with_answer("A");
        q.options[1].id = "A".into();
        assert!(normalize_question(q).is_none());
    }

    #[test]
    fn test_normalize_rejects_single_option() {
        let mut q = question_with_answer("A");
        q.options.truncate(1);
        assert!(normalize_question(q).is_none());
    }

    #[test]
    fn test_user_message_is_localized() {
        let err = GenerationError::Service("timeout".into());
        assert!(err.user_message(Language::En).starts_with("Could not generate"));
        assert!(err.user_message(Language::Vi).starts_with("Không thể tạo nội dung"));
        let empty = GenerationError::Empty(ContentKind::Quiz(QuizMode::Exam));
        assert_eq!(
            empty.user_message(Language::En),
            "No questions could be generated from this content."
        );
    }

    #[test]
    fn test_prompt_uses_url_marker_for_url_sources() {
        let prompt = build_prompt(&card_config());
        assert!(prompt.contains("WEBSITE_URL: https://example.com/article"));
        assert!(prompt.contains("NUMBER_OF_CARDS: 5"));
        assert!(prompt.contains("LANGUAGE: VI"));
    }

    #[test]
    fn test_prompt_for_quiz_carries_mode_and_schema() {
        let prompt = build_prompt(&quiz_config(3));
        assert!(prompt.contains("DOCUMENT_TEXT: Photosynthesis"));
        assert!(prompt.contains("MODE: practice"));
        assert!(prompt.contains("\"correctAnswer\""));
        assert!(system_instruction(&quiz_config(3)).contains("never more than 3"));
    }

    #[tokio::test]
    async fn test_mock_provider_replays_results() {
        let provider = MockProvider::new(vec![Err(GenerationError::Service("down".into()))]);
        let config = quiz_config(2);
        let first = provider.generate(&config).await;
        assert_eq!(first, Err(GenerationError::Service("down".into())));
        let second = provider.generate(&config).await;
        assert_eq!(second, Err(GenerationError::Empty(config.kind)));
        assert_eq!(provider.calls(), 2);
    }
}
