use crate::models::Flashcard;
use crate::results::percent;
use crossterm::event::{KeyCode, KeyEvent};
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashcardAction {
    None,
    Exit,
}

/// Index and flip state over a deck. The index always stays in `[0, len-1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashcardViewer {
    len: usize,
    index: usize,
    flipped: bool,
}

impl FlashcardViewer {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            index: 0,
            flipped: false,
        }
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

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        self.flipped = false;
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        self.flipped = false;
        true
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn progress_percent(&self) -> u32 {
        percent(self.index + 1, self.len)
    }

    /// Shuffles the deck in place and starts over from the first card.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, cards: &mut [Flashcard], rng: &mut R) {
        cards.shuffle(rng);
        self.len = cards.len();
        self.index = 0;
        self.flipped = false;
    }
}

pub fn handle_flashcard_input(
    viewer: &mut FlashcardViewer,
    cards: &mut [Flashcard],
    key: KeyEvent,
) -> FlashcardAction {
    match key.code {
        KeyCode::Esc => return FlashcardAction::Exit,
        KeyCode::Right | KeyCode::PageDown => {
            viewer.next();
        }
        KeyCode::Left | KeyCode::PageUp => {
            viewer.prev();
        }
        // The card itself: flipping never moves between cards.
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Up | KeyCode::Down => viewer.flip(),
        KeyCode::Char('s') | KeyCode::Char('S') => {
            viewer.shuffle(cards, &mut rand::thread_rng());
        }
        _ => {}
    }
    FlashcardAction::None
}
