use super::{help_bar, key_hint, progress_gauge};
use crate::models::{Language, Question, QuizMode};
use crate::quiz::QuizPlayer;
use crate::ui::layout::{calculate_quiz_chunks, centered_rect};
use crate::utils::markdown::render_markdown;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

fn option_style(
    question: &Question,
    player: &QuizPlayer,
    option_id: &str,
    highlighted: bool,
) -> Style {
    let picked = player.selected() == Some(option_id);
    let base = if player.revealing() {
        if question.is_correct(option_id) {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if picked {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    } else if picked {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    if highlighted {
        base.add_modifier(Modifier::REVERSED)
    } else {
        base
    }
}

fn feedback_text(question: &Question, player: &QuizPlayer, lang: Language) -> Text<'static> {
    let mut text = Text::default();
    if player.mode() == QuizMode::Exam {
        let line = match player.selected() {
            Some(id) => format!("{} {}", lang.pick("Đã chọn:", "Selected:"), id),
            None => lang.pick("Chưa chọn đáp án", "No answer selected").to_string(),
        };
        text.push_line(Line::from(Span::styled(line, Style::default().fg(Color::Yellow))));
        return text;
    }
    if !player.revealing() {
        text.push_line(Line::from(Span::styled(
            lang.pick(
                "Chọn một đáp án để xem kết quả.",
                "Pick an answer to see the result.",
            ),
            Style::default().fg(Color::DarkGray),
        )));
        return text;
    }

    if player.current_is_correct(question) == Some(true) {
        text.push_line(Line::from(Span::styled(
            lang.pick("✓ Chính xác!", "✓ Correct!"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    } else {
        text.push_line(Line::from(Span::styled(
            format!(
                "✗ {} {}",
                lang.pick("Chưa đúng. Đáp án đúng:", "Incorrect. Correct answer:"),
                question.correct_answer
            ),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    if !question.explanation.trim().is_empty() {
        text.push_line(Line::from(""));
        text.extend(render_markdown(&question.explanation, Style::default()));
    }
    text
}

pub fn draw_quiz(f: &mut Frame, question: &Question, player: &QuizPlayer, lang: Language) {
    let layout = calculate_quiz_chunks(f.area());

    let mode = match player.mode() {
        QuizMode::Practice => lang.pick("Luyện tập", "Practice"),
        QuizMode::Exam => lang.pick("Kiểm tra", "Exam"),
    };
    let label = format!(
        "{} {} / {} · {}",
        lang.pick("Câu", "Question"),
        player.index() + 1,
        player.len(),
        mode
    );
    f.render_widget(
        progress_gauge(label, player.progress_percent()),
        layout.header_area,
    );

    let question_widget = Paragraph::new(question.text.clone())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(lang.pick("Câu hỏi", "Question")),
        );
    f.render_widget(question_widget, layout.question_area);

    let option_lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let highlighted = i == player.cursor();
            let marker = if player.selected() == Some(option.id.as_str()) {
                "●"
            } else {
                "○"
            };
            Line::from(Span::styled(
                format!(" {} {}. {}", marker, option.id, option.text),
                option_style(question, player, &option.id, highlighted),
            ))
        })
        .collect();
    let options = Paragraph::new(option_lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(lang.pick("Đáp án", "Options")),
        );
    f.render_widget(options, layout.options_area);

    let feedback = Paragraph::new(feedback_text(question, player, lang))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(lang.pick("Giải thích", "Feedback")),
        );
    f.render_widget(feedback, layout.feedback_area);

    let next_label = if player.is_last() {
        lang.pick(" Nộp bài  ", " Finish  ")
    } else {
        lang.pick(" Câu tiếp  ", " Next  ")
    };
    let mut hints = Vec::new();
    hints.extend(key_hint("↑/↓", lang.pick(" Chọn  ", " Move  ")));
    hints.extend(key_hint("A-D/1-4", lang.pick(" Trả lời  ", " Answer  ")));
    hints.extend(key_hint("Enter/→", next_label));
    if player.mode() == QuizMode::Exam {
        hints.extend(key_hint("Ctrl+F", lang.pick(" Nộp ngay  ", " Finish now  ")));
    }
    hints.extend(key_hint("Esc", lang.pick(" Thoát", " Exit")));
    f.render_widget(help_bar(vec![Line::from(hints)]), layout.help_area);
}

/// Overlay asking whether to abandon the running session.
pub fn draw_exit_confirmation(f: &mut Frame, lang: Language) {
    let area = centered_rect(56, 11, f.area());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(area);

    let title = Paragraph::new(lang.pick("Thoát phiên học", "Leave Session"))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new(lang.pick(
        "Quay lại màn hình cấu hình? Tiến độ hiện tại sẽ bị mất.",
        "Return to setup? Current progress will be lost.",
    ))
    .style(Style::default().fg(Color::White))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(lang.pick(" Có  ", " Yes  ")),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(lang.pick(" Không", " No")),
    ])];
    f.render_widget(help_bar(help_text), chunks[2]);
}
