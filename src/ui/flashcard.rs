use super::{help_bar, key_hint, progress_gauge};
use crate::flashcard::FlashcardViewer;
use crate::models::{Flashcard, Language};
use crate::ui::layout::calculate_flashcard_chunks;
use crate::utils::markdown::render_markdown;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn draw_flashcard(f: &mut Frame, card: &Flashcard, viewer: &FlashcardViewer, lang: Language) {
    let layout = calculate_flashcard_chunks(f.area());

    let label = format!(
        "{} {} / {}",
        lang.pick("Thẻ", "Card"),
        viewer.index() + 1,
        viewer.len()
    );
    f.render_widget(
        progress_gauge(label, viewer.progress_percent()),
        layout.header_area,
    );

    let (title, accent, body) = if viewer.is_flipped() {
        (
            lang.pick("Mặt sau", "Back"),
            Color::Green,
            render_markdown(&card.back, Style::default()),
        )
    } else {
        (
            lang.pick("Mặt trước", "Front"),
            Color::Cyan,
            vec![Line::styled(
                card.front.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )],
        )
    };

    // Push the text roughly to the vertical middle of the card.
    let inner_height = layout.card_area.height.saturating_sub(2) as usize;
    let padding = inner_height.saturating_sub(body.len()) / 2;
    let mut text = Text::default();
    for _ in 0..padding {
        text.push_line(Line::from(""));
    }
    text.extend(body);

    let card_widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(title),
        );
    f.render_widget(card_widget, layout.card_area);

    let mut hints = Vec::new();
    hints.extend(key_hint("Space/Enter", lang.pick(" Lật thẻ  ", " Flip  ")));
    hints.extend(key_hint("←/→", lang.pick(" Trước/Sau  ", " Prev/Next  ")));
    hints.extend(key_hint("s", lang.pick(" Xáo trộn  ", " Shuffle  ")));
    hints.extend(key_hint("Esc", lang.pick(" Thoát", " Exit")));
    f.render_widget(help_bar(vec![Line::from(hints)]), layout.help_area);
}
