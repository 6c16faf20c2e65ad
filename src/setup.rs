use crate::models::{
    ContentKind, DEFAULT_ITEM_COUNT, Difficulty, Language, MAX_ITEM_COUNT, MIN_ITEM_COUNT,
    QuizMode, SessionConfig, Source, clamp_count,
};
use crate::utils::byte_index;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTab {
    #[default]
    Quiz,
    Flashcard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Text,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetupField {
    Tab,
    Language,
    SourceKind,
    #[default]
    Source,
    Mode,
    Difficulty,
    Count,
    Start,
}

const QUIZ_FIELDS: [SetupField; 8] = [
    SetupField::Tab,
    SetupField::Language,
    SetupField::SourceKind,
    SetupField::Source,
    SetupField::Mode,
    SetupField::Difficulty,
    SetupField::Count,
    SetupField::Start,
];

const FLASHCARD_FIELDS: [SetupField; 7] = [
    SetupField::Tab,
    SetupField::Language,
    SetupField::SourceKind,
    SetupField::Source,
    SetupField::Difficulty,
    SetupField::Count,
    SetupField::Start,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupAction {
    None,
    Submit(SessionConfig),
    Quit,
}

/// Editable buffer with a cursor counted in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let at = byte_index(&self.value, self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        let at = byte_index(&self.value, self.cursor);
        self.value.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = byte_index(&self.value, self.cursor);
        self.value.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = byte_index(&self.value, self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

/// State of the setup screen. Text and URL keep separate buffers so
/// switching the source kind does not lose what was typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupForm {
    pub tab: ContentTab,
    pub language: Language,
    pub source_kind: SourceKind,
    pub text: TextInput,
    pub url: TextInput,
    pub mode: QuizMode,
    pub difficulty: Difficulty,
    pub count: u8,
    pub focus: SetupField,
}

impl Default for SetupForm {
    fn default() -> Self {
        Self::new(Language::default(), DEFAULT_ITEM_COUNT, Difficulty::default())
    }
}

impl SetupForm {
    pub fn new(language: Language, count: u8, difficulty: Difficulty) -> Self {
        Self {
            tab: ContentTab::default(),
            language,
            source_kind: SourceKind::default(),
            text: TextInput::default(),
            url: TextInput::default(),
            mode: QuizMode::default(),
            difficulty,
            count: clamp_count(count),
            focus: SetupField::default(),
        }
    }

    pub fn fields(&self) -> &'static [SetupField] {
        match self.tab {
            ContentTab::Quiz => &QUIZ_FIELDS,
            ContentTab::Flashcard => &FLASHCARD_FIELDS,
        }
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(pos + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(pos + fields.len() - 1) % fields.len()];
    }

    pub fn source_input(&self) -> &TextInput {
        match self.source_kind {
            SourceKind::Text => &self.text,
            SourceKind::Url => &self.url,
        }
    }

    fn source_input_mut(&mut self) -> &mut TextInput {
        match self.source_kind {
            SourceKind::Text => &mut self.text,
            SourceKind::Url => &mut self.url,
        }
    }

    pub fn source(&self) -> Source {
        match self.source_kind {
            SourceKind::Text => Source::Text(self.text.value().to_string()),
            SourceKind::Url => Source::Url(self.url.value().trim().to_string()),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self.tab {
            ContentTab::Quiz => ContentKind::Quiz(self.mode),
            ContentTab::Flashcard => ContentKind::Flashcards,
        }
    }

    pub fn can_submit(&self, loading: bool) -> bool {
        !loading && !self.source().is_blank()
    }

    pub fn to_config(&self) -> Option<SessionConfig> {
        let source = self.source();
        if source.is_blank() {
            return None;
        }
        Some(SessionConfig::new(
            source,
            self.kind(),
            self.language,
            self.count,
            self.difficulty,
        ))
    }

    /// Pasted text goes into the focused source field. URLs stay on one line.
    pub fn paste(&mut self, data: &str) {
        if self.focus != SetupField::Source {
            return;
        }
        let cleaned = data.replace("\r\n", "\n").replace('\r', "\n");
        match self.source_kind {
            SourceKind::Text => self.text.insert_str(&cleaned),
            SourceKind::Url => {
                let single: String = cleaned.split_whitespace().collect();
                self.url.insert_str(&single);
            }
        }
    }

    /// ←/→ on a choice field. `forward` is →.
    fn cycle(&mut self, forward: bool) {
        match self.focus {
            SetupField::Tab => {
                self.tab = match self.tab {
                    ContentTab::Quiz => ContentTab::Flashcard,
                    ContentTab::Flashcard => ContentTab::Quiz,
                }
            }
            SetupField::Language => self.language = self.language.toggle(),
            SetupField::SourceKind => {
                self.source_kind = match self.source_kind {
                    SourceKind::Text => SourceKind::Url,
                    SourceKind::Url => SourceKind::Text,
                }
            }
            SetupField::Mode => self.mode = self.mode.toggle(),
            SetupField::Difficulty => {
                self.difficulty = if forward {
                    self.difficulty.next()
                } else {
                    self.difficulty.prev()
                }
            }
            SetupField::Count => {
                self.count = if forward {
                    (self.count + 1).min(MAX_ITEM_COUNT)
                } else {
                    self.count.saturating_sub(1).max(MIN_ITEM_COUNT)
                }
            }
            SetupField::Source | SetupField::Start => {}
        }
    }

    fn edit_source(&mut self, key: KeyEvent) {
        let multiline = self.source_kind == SourceKind::Text;
        let input = self.source_input_mut();
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => input.clear(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                input.insert_char(c)
            }
            KeyCode::Enter if multiline => input.insert_char('\n'),
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.move_left(),
            KeyCode::Right => input.move_right(),
            KeyCode::Home => input.home(),
            KeyCode::End => input.end(),
            _ => {}
        }
    }

    fn submit(&self, loading: bool) -> SetupAction {
        if loading {
            return SetupAction::None;
        }
        match self.to_config() {
            Some(config) => SetupAction::Submit(config),
            None => SetupAction::None,
        }
    }
}

pub fn handle_setup_input(form: &mut SetupForm, key: KeyEvent, loading: bool) -> SetupAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('s') | KeyCode::Char('S') if ctrl => return form.submit(loading),
        KeyCode::Esc => return SetupAction::Quit,
        KeyCode::Tab => {
            form.focus_next();
            return SetupAction::None;
        }
        KeyCode::BackTab => {
            form.focus_prev();
            return SetupAction::None;
        }
        _ => {}
    }

    match form.focus {
        SetupField::Source => form.edit_source(key),
        SetupField::Start => {
            if key.code == KeyCode::Enter {
                return form.submit(loading);
            }
            if key.code == KeyCode::Up {
                form.focus_prev();
            }
        }
        _ => match key.code {
            KeyCode::Left => form.cycle(false),
            KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') => form.cycle(true),
            KeyCode::Up => form.focus_prev(),
            KeyCode::Down => form.focus_next(),
            _ => {}
        },
    }
    SetupAction::None
}
