pub mod layout;
mod flashcard;
mod quiz;
mod results;
mod setup;

pub use flashcard::draw_flashcard;
pub use quiz::{draw_exit_confirmation, draw_quiz};
pub use results::{draw_results, review_lines, score_line};
pub use setup::{draw_setup, spinner_symbol};

use crate::models::{Language, Screen};
use crate::session::SessionState;
use crate::setup::SetupForm;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

/// Whether content generation can work at all, shown on the setup screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiStatus {
    pub enabled: bool,
    pub model: String,
}

/// View-only state that never feeds back into the session.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub results_scroll: u16,
    pub confirm_exit: bool,
    pub spinner_frame: usize,
}

pub(crate) fn key_hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(
            key,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(label),
    ]
}

pub(crate) fn help_bar(lines: Vec<Line<'static>>) -> Paragraph<'static> {
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
}

pub(crate) fn progress_gauge(label: String, percent: u32) -> Gauge<'static> {
    Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent(percent.min(100) as u16)
        .label(Span::styled(
            label,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Draws whichever screen the session is on.
pub fn draw(
    f: &mut Frame,
    session: &SessionState,
    form: &SetupForm,
    ui: &mut UiState,
    ai: &AiStatus,
) {
    let lang = session.language().unwrap_or(form.language);
    match session.screen {
        Screen::Setup => draw_setup(
            f,
            form,
            session.loading,
            ui.spinner_frame,
            session.error.as_deref(),
            ai,
        ),
        Screen::Quiz => {
            if let Some(question) = session.questions.get(session.quiz.index()) {
                draw_quiz(f, question, &session.quiz, lang);
            }
        }
        Screen::Flashcard => {
            if let Some(card) = session.flashcards.get(session.deck.index()) {
                draw_flashcard(f, card, &session.deck, lang);
            }
        }
        Screen::Results => {
            draw_results(f, &session.summary(), lang, &mut ui.results_scroll);
        }
    }

    if ui.confirm_exit && matches!(session.screen, Screen::Quiz | Screen::Flashcard) {
        draw_exit_confirmation(f, lang);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnswerRecord, ContentKind, Difficulty, Flashcard, GeneratedContent, GenerationResponse,
        QuizMode, SessionConfig, Source,
    };
    use crate::results::fixtures::questions;
    use crate::session::{Effect, SessionEvent};
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    fn buffer_text(buffer: &Buffer) -> String {
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(session: &SessionState, form: &SetupForm, ui: &mut UiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 40)).unwrap();
        let ai = AiStatus {
            enabled: true,
            model: "test/model".into(),
        };
        terminal.draw(|f| draw(f, session, form, ui, &ai)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn loaded(kind: ContentKind, content: GeneratedContent, language: Language) -> SessionState {
        let mut session = SessionState::new();
        let config = SessionConfig::new(
            Source::Text("material".into()),
            kind,
            language,
            5,
            Difficulty::Medium,
        );
        let Some(Effect::Generate(request)) = session.apply(SessionEvent::Start(config)) else {
            panic!("start should request generation");
        };
        session.apply(SessionEvent::Generated(GenerationResponse {
            request_id: request.request_id,
            result: Ok(content),
        }));
        session
    }

    #[test]
    fn test_results_show_full_score() {
        let qs = questions(&["A", "B", "C", "D", "A"]);
        let answers: AnswerRecord = qs
            .iter()
            .enumerate()
            .map(|(i, q)| (i, q.correct_answer.clone()))
            .collect();
        let mut session = loaded(
            ContentKind::Quiz(QuizMode::Practice),
            GeneratedContent::Questions(qs),
            Language::En,
        );
        session.apply(SessionEvent::FinishQuiz(answers));

        let screen = render(&session, &SetupForm::default(), &mut UiState::default());
        assert!(screen.contains("100%"));
        assert!(screen.contains("5 out of 5"));
    }

    #[test]
    fn test_results_scroll_is_clamped() {
        let qs = questions(&["A"]);
        let mut session = loaded(
            ContentKind::Quiz(QuizMode::Exam),
            GeneratedContent::Questions(qs),
            Language::En,
        );
        session.apply(SessionEvent::FinishQuiz(AnswerRecord::new()));

        let mut ui = UiState {
            results_scroll: 500,
            ..Default::default()
        };
        let screen = render(&session, &SetupForm::default(), &mut ui);
        assert_eq!(ui.results_scroll, 0);
        assert!(screen.contains("0%"));
        assert!(screen.contains("(not answered)"));
    }

    #[test]
    fn test_setup_shows_error_and_localized_labels() {
        let mut session = SessionState::new();
        session.error = Some("Something failed".into());
        let form = SetupForm::new(Language::En, 5, Difficulty::Medium);
        let screen = render(&session, &form, &mut UiState::default());
        assert!(screen.contains("Something failed"));
        assert!(screen.contains("Difficulty"));
        assert!(screen.contains("Mode"));

        let vi = render(&SessionState::new(), &SetupForm::default(), &mut UiState::default());
        assert!(vi.contains("Độ khó"));
    }

    #[test]
    fn test_quiz_practice_reveals_explanation() {
        let mut session = loaded(
            ContentKind::Quiz(QuizMode::Practice),
            GeneratedContent::Questions(questions(&["B", "A"])),
            Language::En,
        );
        let before = render(&session, &SetupForm::default(), &mut UiState::default());
        assert!(before.contains("Question 1 / 2"));
        assert!(!before.contains("Because B is right."));

        session.quiz.select_option("B");
        let after = render(&session, &SetupForm::default(), &mut UiState::default());
        assert!(after.contains("Correct!"));
        assert!(after.contains("Because B is right."));
    }

    #[test]
    fn test_flashcard_flip_and_confirmation_overlay() {
        let cards = vec![Flashcard {
            id: 1,
            front: "Capital of France".into(),
            back: "Paris".into(),
        }];
        let mut session = loaded(
            ContentKind::Flashcards,
            GeneratedContent::Flashcards(cards),
            Language::En,
        );
        let front = render(&session, &SetupForm::default(), &mut UiState::default());
        assert!(front.contains("Capital of France"));
        assert!(!front.contains("Paris"));

        session.deck.flip();
        let back = render(&session, &SetupForm::default(), &mut UiState::default());
        assert!(back.contains("Paris"));

        let mut ui = UiState {
            confirm_exit: true,
            ..Default::default()
        };
        let overlay = render(&session, &SetupForm::default(), &mut ui);
        assert!(overlay.contains("Leave Session"));
    }
}
