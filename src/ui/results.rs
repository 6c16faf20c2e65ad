use super::{help_bar, key_hint};
use crate::models::Language;
use crate::results::{OptionMark, QuizSummary};
use crate::ui::layout::calculate_results_chunks;
use crate::utils::markdown::render_markdown;
use crate::utils::{calculate_max_scroll, estimate_text_height};
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// "5 out of 5" style score line.
pub fn score_line(summary: &QuizSummary, lang: Language) -> String {
    match lang {
        Language::En => format!(
            "You answered {} out of {} questions correctly",
            summary.score, summary.total
        ),
        Language::Vi => format!(
            "Bạn trả lời đúng {} trên {} câu",
            summary.score, summary.total
        ),
    }
}

fn score_color(percentage: u32) -> Color {
    match percentage {
        80.. => Color::Green,
        50..=79 => Color::Yellow,
        _ => Color::Red,
    }
}

pub fn review_lines(summary: &QuizSummary, lang: Language) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for review in &summary.reviews {
        let (badge, badge_style) = if review.is_correct {
            ("✓", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            ("✗", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", badge), badge_style),
            Span::styled(
                format!("{}. {}", review.number, review.text),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));

        for option in &review.options {
            let style = match option.mark {
                OptionMark::Correct => Style::default().fg(Color::Green),
                OptionMark::IncorrectPick => Style::default().fg(Color::Red),
                OptionMark::Neutral => Style::default().fg(Color::DarkGray),
            };
            let style = if option.picked {
                style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                style
            };
            let pick = if option.picked {
                lang.pick("  ← bạn chọn", "  ← your answer")
            } else {
                ""
            };
            lines.push(Line::from(Span::styled(
                format!("    {}. {}{}", option.id, option.text, pick),
                style,
            )));
        }

        if review.user_answer.is_none() {
            lines.push(Line::from(Span::styled(
                lang.pick("    (chưa trả lời)", "    (not answered)"),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        if !review.explanation.trim().is_empty() {
            let dim = Style::default().fg(Color::Gray);
            lines.push(Line::from(Span::styled(
                lang.pick("    Giải thích:", "    Explanation:"),
                dim.add_modifier(Modifier::ITALIC),
            )));
            for line in render_markdown(&review.explanation, dim) {
                let mut spans = vec![Span::raw("    ")];
                spans.extend(line.spans);
                lines.push(Line::from(spans));
            }
        }
        lines.push(Line::from(""));
    }
    lines
}

/// Draws the summary and clamps `scroll` to the content.
pub fn draw_results(f: &mut Frame, summary: &QuizSummary, lang: Language, scroll: &mut u16) {
    let layout = calculate_results_chunks(f.area());

    let header = Paragraph::new(lang.pick("Kết quả", "Results"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let score = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{}%", summary.percentage),
            Style::default()
                .fg(score_color(summary.percentage))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(score_line(summary, lang)),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(score, layout.score_area);

    let review = review_lines(summary, lang);
    let inner_width = layout.review_area.width.saturating_sub(2);
    let visible = layout.review_area.height.saturating_sub(2);
    let max_scroll = calculate_max_scroll(estimate_text_height(&review, inner_width), visible);
    *scroll = (*scroll).min(max_scroll);

    let review_widget = Paragraph::new(review)
        .wrap(Wrap { trim: false })
        .scroll((*scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(lang.pick("Xem lại", "Review")),
        );
    f.render_widget(review_widget, layout.review_area);

    let mut hints = Vec::new();
    hints.extend(key_hint("↑/↓ PgUp/PgDn", lang.pick(" Cuộn  ", " Scroll  ")));
    hints.extend(key_hint("Enter/r", lang.pick(" Làm lại  ", " New session  ")));
    hints.extend(key_hint("Ctrl+C", lang.pick(" Thoát", " Quit")));
    f.render_widget(help_bar(vec![Line::from(hints)]), layout.help_area);
}
