use crate::ai::GenerationError;
use crate::flashcard::FlashcardViewer;
use crate::models::{
    AnswerRecord, ContentKind, Flashcard, GeneratedContent, GenerationRequest, GenerationResponse,
    Question, Screen, SessionConfig,
};
use crate::quiz::QuizPlayer;
use crate::results::{QuizSummary, summarize};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum SessionEvent {
    Start(SessionConfig),
    Generated(GenerationResponse),
    FinishQuiz(AnswerRecord),
    Restart,
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Generate(GenerationRequest),
}

#[derive(Debug, Clone)]
struct PendingGeneration {
    request_id: u64,
    config: SessionConfig,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub screen: Screen,
    pub config: Option<SessionConfig>,
    pub questions: Vec<Question>,
    pub flashcards: Vec<Flashcard>,
    /// Final answers handed over when the quiz finishes.
    pub answers: AnswerRecord,
    pub quiz: QuizPlayer,
    pub deck: FlashcardViewer,
    pub loading: bool,
    pub error: Option<String>,
    pending: Option<PendingGeneration>,
    next_request_id: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `event` through [`reduce`] in place.
    pub fn apply(&mut self, event: SessionEvent) -> Option<Effect> {
        let (next, effect) = reduce(std::mem::take(self), event);
        *self = next;
        effect
    }

    /// True when nothing but the request counter differs from a fresh state.
    pub fn is_initial(&self) -> bool {
        self.screen == Screen::Setup
            && self.config.is_none()
            && self.questions.is_empty()
            && self.flashcards.is_empty()
            && self.answers.is_empty()
            && self.quiz.is_empty()
            && self.deck.is_empty()
            && !self.loading
            && self.error.is_none()
            && self.pending.is_none()
    }

    pub fn summary(&self) -> QuizSummary {
        summarize(&self.questions, &self.answers)
    }

    pub fn language(&self) -> Option<crate::models::Language> {
        self.config.as_ref().map(|c| c.language)
    }
}

pub fn reduce(state: SessionState, event: SessionEvent) -> (SessionState, Option<Effect>) {
    match event {
        SessionEvent::Start(config) => start_session(state, config),
        SessionEvent::Generated(response) => (complete_generation(state, response), None),
        SessionEvent::FinishQuiz(answers) => (finish_quiz(state, answers), None),
        SessionEvent::Restart => (restart(state), None),
    }
}

fn start_session(mut state: SessionState, config: SessionConfig) -> (SessionState, Option<Effect>) {
    if config.source.is_blank() {
        warn!("Ignoring start request with an empty source");
        return (state, None);
    }
    if state.screen != Screen::Setup {
        warn!(screen = %state.screen, "Ignoring start request outside the setup screen");
        return (state, None);
    }
    if let Some(pending) = &state.pending {
        warn!(
            pending = pending.request_id,
            "Ignoring start request while a generation is in flight"
        );
        return (state, None);
    }

    let request_id = state.next_request_id;
    state.next_request_id += 1;
    state.loading = true;
    state.error = None;
    state.pending = Some(PendingGeneration {
        request_id,
        config: config.clone(),
    });

    info!(request_id, kind = ?config.kind, "Starting session generation");
    (
        state,
        Some(Effect::Generate(GenerationRequest { request_id, config })),
    )
}

fn complete_generation(mut state: SessionState, response: GenerationResponse) -> SessionState {
    let pending = match state.pending.take() {
        Some(pending) if pending.request_id == response.request_id => pending,
        other => {
            debug!(
                request_id = response.request_id,
                "Discarding response with no matching pending request"
            );
            state.pending = other;
            return state;
        }
    };

    state.loading = false;
    let config = pending.config;

    let outcome = response.result.and_then(|content| match (config.kind, content) {
        (_, content) if content.is_empty() => Err(GenerationError::Empty(config.kind)),
        (ContentKind::Quiz(mode), GeneratedContent::Questions(questions)) => {
            Ok(Loaded::Quiz(mode, questions))
        }
        (ContentKind::Flashcards, GeneratedContent::Flashcards(cards)) => Ok(Loaded::Deck(cards)),
        (kind, _) => Err(GenerationError::Malformed(format!(
            "content does not match requested kind {:?}",
            kind
        ))),
    });

    match outcome {
        Ok(Loaded::Quiz(mode, questions)) => {
            info!(count = questions.len(), "Quiz ready");
            state.quiz = QuizPlayer::new(mode, questions.len());
            state.questions = questions;
            state.flashcards.clear();
            state.deck = FlashcardViewer::default();
            state.answers.clear();
            state.screen = Screen::Quiz;
            state.config = Some(config);
        }
        Ok(Loaded::Deck(cards)) => {
            info!(count = cards.len(), "Flashcards ready");
            state.deck = FlashcardViewer::new(cards.len());
            state.flashcards = cards;
            state.questions.clear();
            state.quiz = QuizPlayer::default();
            state.answers.clear();
            state.screen = Screen::Flashcard;
            state.config = Some(config);
        }
        Err(e) => {
            warn!("Generation failed: {}", e);
            state.error = Some(e.user_message(config.language));
        }
    }
    state
}

enum Loaded {
    Quiz(crate::models::QuizMode, Vec<Question>),
    Deck(Vec<Flashcard>),
}

fn finish_quiz(mut state: SessionState, answers: AnswerRecord) -> SessionState {
    if state.screen != Screen::Quiz {
        warn!(screen = %state.screen, "Ignoring quiz finish outside the quiz screen");
        return state;
    }
    info!(answered = answers.len(), total = state.questions.len(), "Quiz finished");
    state.answers = answers;
    state.screen = Screen::Results;
    state
}

fn restart(state: SessionState) -> SessionState {
    debug!(from = %state.screen, "Restarting session");
    SessionState {
        next_request_id: state.next_request_id,
        ..SessionState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::generator::MockProvider;
    use crate::ai_worker::spawn_generation_worker;
    use crate::models::{Difficulty, Language, QuizMode, Source};
    use crate::quiz::AdvanceOutcome;
    use crate::results::fixtures::questions;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn config(kind: ContentKind) -> SessionConfig {
        SessionConfig::new(
            Source::Text("The French Revolution began in 1789.".into()),
            kind,
            Language::En,
            5,
            Difficulty::Medium,
        )
    }

    fn cards(n: u32) -> Vec<Flashcard> {
        (1..=n)
            .map(|i| Flashcard {
                id: i,
                front: format!("F{}", i),
                back: format!("B{}", i),
            })
            .collect()
    }

    fn start(state: &mut SessionState, kind: ContentKind) -> GenerationRequest {
        match state.apply(SessionEvent::Start(config(kind))) {
            Some(Effect::Generate(request)) => request,
            None => panic!("expected a generation request"),
        }
    }

    fn respond(
        state: &mut SessionState,
        request: &GenerationRequest,
        result: Result<GeneratedContent, GenerationError>,
    ) {
        state.apply(SessionEvent::Generated(GenerationResponse {
            request_id: request.request_id,
            result,
        }));
    }

    #[test]
    fn test_initial_state() {
        assert!(SessionState::new().is_initial());
    }

    #[test]
    fn test_start_sets_loading_and_keeps_screen() {
        let mut state = SessionState::new();
        state.error = Some("old error".into());
        let request = start(&mut state, ContentKind::Quiz(QuizMode::Practice));

        assert!(state.loading);
        assert_eq!(state.screen, Screen::Setup);
        assert!(state.error.is_none());
        assert_eq!(request.config.count, 5);
    }

    #[test]
    fn test_empty_source_is_rejected() {
        let mut state = SessionState::new();
        let mut blank = config(ContentKind::Flashcards);
        blank.source = Source::Text("   ".into());

        assert!(state.apply(SessionEvent::Start(blank)).is_none());
        assert_eq!(state.screen, Screen::Setup);
        assert!(!state.loading);
        assert!(state.is_initial());
    }

    #[test]
    fn test_second_start_while_loading_is_rejected() {
        let mut state = SessionState::new();
        let first = start(&mut state, ContentKind::Flashcards);
        assert!(
            state
                .apply(SessionEvent::Start(config(ContentKind::Flashcards)))
                .is_none()
        );

        respond(&mut state, &first, Ok(GeneratedContent::Flashcards(cards(2))));
        assert_eq!(state.screen, Screen::Flashcard);
        assert!(!state.loading);
    }

    #[test]
    fn test_quiz_success_moves_to_quiz() {
        let mut state = SessionState::new();
        let request = start(&mut state, ContentKind::Quiz(QuizMode::Exam));
        respond(
            &mut state,
            &request,
            Ok(GeneratedContent::Questions(questions(&["A", "B"]))),
        );

        assert_eq!(state.screen, Screen::Quiz);
        assert!(!state.loading);
        assert_eq!(state.questions.len(), 2);
        assert!(state.flashcards.is_empty());
        assert_eq!(state.quiz.len(), 2);
        assert_eq!(state.quiz.mode(), QuizMode::Exam);
        assert!(state.config.is_some());
    }

    #[test]
    fn test_empty_flashcard_list_is_an_error() {
        let mut state = SessionState::new();
        let request = start(&mut state, ContentKind::Flashcards);
        respond(&mut state, &request, Ok(GeneratedContent::Flashcards(vec![])));

        assert_eq!(state.screen, Screen::Setup);
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("No flashcards could be generated from this content.")
        );
        assert!(state.config.is_none());
    }

    #[test]
    fn test_provider_failure_stays_on_setup() {
        let mut state = SessionState::new();
        let request = start(&mut state, ContentKind::Quiz(QuizMode::Practice));
        respond(
            &mut state,
            &request,
            Err(GenerationError::Service("502".into())),
        );

        assert_eq!(state.screen, Screen::Setup);
        assert!(!state.loading);
        assert!(state.error.as_deref().unwrap().starts_with("Could not generate"));

        // The error is cleared by the next attempt.
        start(&mut state, ContentKind::Quiz(QuizMode::Practice));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_mismatched_content_kind_is_an_error() {
        let mut state = SessionState::new();
        let request = start(&mut state, ContentKind::Flashcards);
        respond(
            &mut state,
            &request,
            Ok(GeneratedContent::Questions(questions(&["A"]))),
        );
        assert_eq!(state.screen, Screen::Setup);
        assert!(state.error.is_some());
    }

    #[test]
    fn test_stale_response_after_restart_is_discarded() {
        let mut state = SessionState::new();
        let request = start(&mut state, ContentKind::Flashcards);
        state.apply(SessionEvent::Restart);
        assert!(state.is_initial());

        respond(&mut state, &request, Ok(GeneratedContent::Flashcards(cards(3))));
        assert!(state.is_initial());

        let second = start(&mut state, ContentKind::Flashcards);
        assert_ne!(second.request_id, request.request_id);
    }

    #[test]
    fn test_practice_all_correct_scores_full_marks() {
        let mut state = SessionState::new();
        let request = start(&mut state, ContentKind::Quiz(QuizMode::Practice));
        let qs = questions(&["A", "B", "C", "D", "A"]);
        respond(&mut state, &request, Ok(GeneratedContent::Questions(qs.clone())));

        let mut finished = None;
        for q in &qs {
            assert!(state.quiz.select_option(&q.correct_answer));
            assert_eq!(state.quiz.current_is_correct(q), Some(true));
            if let AdvanceOutcome::Finished(answers) = state.quiz.advance() {
                finished = Some(answers);
            }
        }
        state.apply(SessionEvent::FinishQuiz(finished.expect("quiz should finish")));

        assert_eq!(state.screen, Screen::Results);
        let summary = state.summary();
        assert_eq!(summary.percentage, 100);
        assert_eq!((summary.score, summary.total), (5, 5));
    }

    #[test]
    fn test_exam_partial_answers_review() {
        let mut state = SessionState::new();
        let request = start(&mut state, ContentKind::Quiz(QuizMode::Exam));
        respond(
            &mut state,
            &request,
            Ok(GeneratedContent::Questions(questions(&["A", "B", "C"]))),
        );

        state.quiz.select_option("A");
        state.quiz.advance();
        state.quiz.select_option("D");
        state.quiz.advance();
        let AdvanceOutcome::Finished(answers) = state.quiz.finish_now() else {
            panic!("finish_now should finish the quiz");
        };
        state.apply(SessionEvent::FinishQuiz(answers));

        let summary = state.summary();
        assert_eq!(summary.score, 1);
        assert_eq!(summary.percentage, 33);
        let third = &summary.reviews[2];
        assert!(!third.is_correct);
        assert!(third.options.iter().all(|o| !o.picked));
    }

    #[test]
    fn test_finish_outside_quiz_is_ignored() {
        let mut state = SessionState::new();
        state.apply(SessionEvent::FinishQuiz(AnswerRecord::new()));
        assert_eq!(state.screen, Screen::Setup);
    }

    #[test]
    fn test_restart_from_every_screen() {
        let mut quiz = SessionState::new();
        let r = start(&mut quiz, ContentKind::Quiz(QuizMode::Practice));
        respond(&mut quiz, &r, Ok(GeneratedContent::Questions(questions(&["A"]))));

        let mut results = quiz.clone();
        results.quiz.select_option("A");
        if let AdvanceOutcome::Finished(a) = results.quiz.advance() {
            results.apply(SessionEvent::FinishQuiz(a));
        }
        assert_eq!(results.screen, Screen::Results);

        let mut deck = SessionState::new();
        let r = start(&mut deck, ContentKind::Flashcards);
        respond(&mut deck, &r, Ok(GeneratedContent::Flashcards(cards(2))));

        for mut state in [SessionState::new(), quiz, results, deck] {
            state.apply(SessionEvent::Restart);
            assert!(state.is_initial());
            state.apply(SessionEvent::Restart);
            assert!(state.is_initial());
        }
    }

    #[tokio::test]
    async fn test_loading_resolves_once_through_worker() {
        let provider = Arc::new(
            MockProvider::new(vec![Ok(GeneratedContent::Flashcards(cards(4)))])
                .with_delay(std::time::Duration::from_millis(20)),
        );
        let (req_tx, req_rx) = mpsc::channel(1);
        let (resp_tx, mut resp_rx) = mpsc::channel(1);
        let _worker = spawn_generation_worker(provider.clone(), req_rx, resp_tx);

        let mut state = SessionState::new();
        let mut loading_changes = Vec::new();

        if let Some(Effect::Generate(request)) =
            state.apply(SessionEvent::Start(config(ContentKind::Flashcards)))
        {
            loading_changes.push(state.loading);
            req_tx.send(request).await.unwrap();
        }

        let response = resp_rx.recv().await.unwrap();
        state.apply(SessionEvent::Generated(response));
        loading_changes.push(state.loading);

        assert_eq!(loading_changes, vec![true, false]);
        assert_eq!(state.screen, Screen::Flashcard);
        assert_eq!(state.deck.len(), 4);
        assert_eq!(provider.calls(), 1);
    }
}
