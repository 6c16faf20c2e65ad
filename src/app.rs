use crate::ai::{ContentProvider, GenerationError, api_key_present};
use crate::ai_worker::spawn_generation_worker;
use crate::flashcard::{FlashcardAction, handle_flashcard_input};
use crate::models::{GenerationRequest, GenerationResponse, Screen};
use crate::quiz::{QuizAction, handle_quiz_input};
use crate::session::{Effect, SessionEvent, SessionState};
use crate::setup::{SetupAction, SetupForm, handle_setup_input};
use crate::ui::{self, AiStatus, UiState};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const SPINNER_TICK: Duration = Duration::from_millis(100);
const PAGE_SCROLL: u16 = 10;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Restores the terminal before the default hook prints the panic.
pub fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn enter_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn exit_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Owns every piece of state the UI task mutates.
pub struct App {
    session: SessionState,
    form: SetupForm,
    ui: UiState,
    ai: AiStatus,
    requests: mpsc::Sender<GenerationRequest>,
    should_quit: bool,
}

impl App {
    pub fn new(form: SetupForm, ai: AiStatus, requests: mpsc::Sender<GenerationRequest>) -> Self {
        Self {
            session: SessionState::new(),
            form,
            ui: UiState::default(),
            ai,
            requests,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn apply(&mut self, event: SessionEvent) {
        if let Some(effect) = self.session.apply(event) {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Generate(request) => {
                let request_id = request.request_id;
                if let Err(e) = self.requests.try_send(request) {
                    // Resolve the submission so loading does not hang.
                    error!(request_id, "Could not hand request to the worker: {}", e);
                    self.apply(SessionEvent::Generated(GenerationResponse {
                        request_id,
                        result: Err(GenerationError::Client(
                            "generation worker unavailable".to_string(),
                        )),
                    }));
                }
            }
        }
    }

    pub fn handle_response(&mut self, response: GenerationResponse) {
        self.apply(SessionEvent::Generated(response));
        self.ui.results_scroll = 0;
    }

    pub fn tick(&mut self) {
        if self.session.loading {
            self.ui.spinner_frame = self.ui.spinner_frame.wrapping_add(1);
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Paste(data) if self.session.screen == Screen::Setup => self.form.paste(&data),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            info!("Quit requested");
            self.should_quit = true;
            return;
        }

        if self.ui.confirm_exit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.ui.confirm_exit = false;
                    self.apply(SessionEvent::Restart);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.ui.confirm_exit = false;
                }
                _ => {}
            }
            return;
        }

        match self.session.screen {
            Screen::Setup => match handle_setup_input(&mut self.form, key, self.session.loading) {
                SetupAction::Submit(config) => self.apply(SessionEvent::Start(config)),
                SetupAction::Quit => self.should_quit = true,
                SetupAction::None => {}
            },
            Screen::Quiz => {
                match handle_quiz_input(&mut self.session.quiz, &self.session.questions, key) {
                    QuizAction::Finish(answers) => {
                        self.ui.results_scroll = 0;
                        self.apply(SessionEvent::FinishQuiz(answers));
                    }
                    QuizAction::RequestExit => self.ui.confirm_exit = true,
                    QuizAction::None => {}
                }
            }
            Screen::Flashcard => {
                let action = handle_flashcard_input(
                    &mut self.session.deck,
                    &mut self.session.flashcards,
                    key,
                );
                if action == FlashcardAction::Exit {
                    self.ui.confirm_exit = true;
                }
            }
            Screen::Results => self.handle_results_key(key),
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let scroll = &mut self.ui.results_scroll;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            KeyCode::PageUp => *scroll = scroll.saturating_sub(PAGE_SCROLL),
            KeyCode::PageDown => *scroll = scroll.saturating_add(PAGE_SCROLL),
            KeyCode::Home => *scroll = 0,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('r') | KeyCode::Char('R') => {
                self.apply(SessionEvent::Restart);
            }
            _ => {}
        }
    }

    fn draw(&mut self, terminal: &mut Tui) -> Result<()> {
        terminal
            .draw(|f| ui::draw(f, &self.session, &self.form, &mut self.ui, &self.ai))
            .context("Failed to draw frame")?;
        Ok(())
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Tui,
        responses: &mut mpsc::Receiver<GenerationResponse>,
    ) -> Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(SPINNER_TICK);

        while !self.should_quit {
            self.draw(terminal)?;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                    None => {
                        warn!("Terminal event stream ended");
                        self.should_quit = true;
                    }
                },
                Some(response) = responses.recv() => self.handle_response(response),
                _ = ticker.tick() => self.tick(),
            }
        }
        Ok(())
    }
}

/// Runs the TUI until the user quits. The worker lives as long as the app.
pub async fn run(provider: Arc<dyn ContentProvider>, form: SetupForm, model: String) -> Result<()> {
    let (request_tx, request_rx) = mpsc::channel(1);
    let (response_tx, mut response_rx) = mpsc::channel(1);
    let worker = spawn_generation_worker(provider, request_rx, response_tx);

    let ai = AiStatus {
        enabled: api_key_present(),
        model,
    };
    if !ai.enabled {
        warn!("OPENROUTER_API_KEY is not set, generation will fail");
    }

    let mut app = App::new(form, ai, request_tx);
    let mut terminal = enter_terminal()?;
    let result = app.event_loop(&mut terminal, &mut response_rx).await;
    exit_terminal(&mut terminal)?;

    worker.abort();
    info!("Application exited");
    result
}
