use crate::models::{AnswerRecord, Question, QuizMode};
use crate::results::percent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// No answer yet, or practice feedback not revealed.
    Blocked,
    Next(usize),
    Finished(AnswerRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAction {
    None,
    Finish(AnswerRecord),
    RequestExit,
}

/// Walks a fixed list of questions one at a time.
#[derive(Debug, Clone, Default)]
pub struct QuizPlayer {
    mode: QuizMode,
    len: usize,
    index: usize,
    answers: AnswerRecord,
    feedback_visible: bool,
    cursor: usize,
    finished: bool,
}

impl QuizPlayer {
    pub fn new(mode: QuizMode, len: usize) -> Self {
        Self {
            mode,
            len,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn feedback_visible(&self) -> bool {
        self.feedback_visible
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    pub fn selected(&self) -> Option<&str> {
        self.answers.get(&self.index).map(String::as_str)
    }

    /// Whether the practice-mode reveal is showing for the current question.
    pub fn revealing(&self) -> bool {
        self.mode == QuizMode::Practice && self.feedback_visible
    }

    pub fn progress_percent(&self) -> u32 {
        percent(self.index + 1, self.len)
    }

    /// Records `option_id` for the current question. Returns false when the
    /// answer is locked because practice feedback is already showing.
    pub fn select_option(&mut self, option_id: &str) -> bool {
        if self.finished || self.revealing() {
            return false;
        }
        self.answers.insert(self.index, option_id.to_string());
        if self.mode == QuizMode::Practice {
            self.feedback_visible = true;
        }
        debug!(index = self.index, option_id, "Answer recorded");
        true
    }

    pub fn can_advance(&self) -> bool {
        !self.finished
            && self.selected().is_some()
            && (self.mode == QuizMode::Exam || self.feedback_visible)
    }

    pub fn advance(&mut self) -> AdvanceOutcome {
        if !self.can_advance() {
            return AdvanceOutcome::Blocked;
        }
        if self.is_last() {
            self.finished = true;
            return AdvanceOutcome::Finished(self.answers.clone());
        }
        self.index += 1;
        self.feedback_visible = false;
        self.cursor = 0;
        AdvanceOutcome::Next(self.index)
    }

    /// Ends the quiz with whatever has been answered so far.
    pub fn finish_now(&mut self) -> AdvanceOutcome {
        if self.finished {
            return AdvanceOutcome::Blocked;
        }
        self.finished = true;
        AdvanceOutcome::Finished(self.answers.clone())
    }

    pub fn cursor_up(&mut self, option_count: usize) {
        if option_count == 0 {
            return;
        }
        self.cursor = (self.cursor + option_count - 1) % option_count;
    }

    pub fn cursor_down(&mut self, option_count: usize) {
        if option_count == 0 {
            return;
        }
        self.cursor = (self.cursor + 1) % option_count;
    }

    pub fn current_is_correct(&self, question: &Question) -> Option<bool> {
        self.selected().map(|a| question.is_correct(a))
    }
}

fn select_at(player: &mut QuizPlayer, question: &Question, position: usize) {
    if let Some(option) = question.options.get(position)
        && player.select_option(&option.id)
    {
        player.cursor = position;
    }
}

fn finish_action(outcome: AdvanceOutcome) -> QuizAction {
    match outcome {
        AdvanceOutcome::Finished(answers) => QuizAction::Finish(answers),
        _ => QuizAction::None,
    }
}

pub fn handle_quiz_input(
    player: &mut QuizPlayer,
    questions: &[Question],
    key: KeyEvent,
) -> QuizAction {
    let Some(question) = questions.get(player.index()) else {
        return QuizAction::None;
    };
    let option_count = question.options.len();

    match key.code {
        KeyCode::Esc => QuizAction::RequestExit,
        KeyCode::Char('f') | KeyCode::Char('F')
            if key.modifiers.contains(KeyModifiers::CONTROL) && player.mode() == QuizMode::Exam =>
        {
            finish_action(player.finish_now())
        }
        KeyCode::Up => {
            player.cursor_up(option_count);
            QuizAction::None
        }
        KeyCode::Down => {
            player.cursor_down(option_count);
            QuizAction::None
        }
        KeyCode::Char(' ') => {
            let cursor = player.cursor();
            select_at(player, question, cursor);
            QuizAction::None
        }
        KeyCode::Enter => {
            if player.can_advance() {
                finish_action(player.advance())
            } else {
                let cursor = player.cursor();
                select_at(player, question, cursor);
                QuizAction::None
            }
        }
        KeyCode::Right => finish_action(player.advance()),
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            let by_number = c
                .to_digit(10)
                .and_then(|d| (d as usize).checked_sub(1))
                .filter(|pos| *pos < option_count);
            let label = c.to_lowercase().to_string();
            let by_label = || {
                question
                    .options
                    .iter()
                    .position(|o| o.id.chars().count() == 1 && o.id.to_lowercase() == label)
            };
            if let Some(position) = by_number.or_else(by_label) {
                select_at(player, question, position);
            }
            QuizAction::None
        }
        _ => QuizAction::None,
    }
}
