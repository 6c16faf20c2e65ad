use super::{AiStatus, help_bar, key_hint};
use crate::models::{Language, QuizMode};
use crate::setup::{ContentTab, SetupField, SetupForm, SourceKind};
use crate::ui::layout::calculate_setup_chunks;
use crate::utils::{calculate_wrapped_cursor_position, wrap_chars};
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_symbol(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

fn field_label(field: SetupField, lang: Language) -> &'static str {
    match field {
        SetupField::Tab => lang.pick("Loại nội dung", "Content"),
        SetupField::Language => lang.pick("Ngôn ngữ", "Language"),
        SetupField::SourceKind => lang.pick("Nguồn", "Source"),
        SetupField::Mode => lang.pick("Chế độ", "Mode"),
        SetupField::Difficulty => lang.pick("Độ khó", "Difficulty"),
        SetupField::Count => lang.pick("Số lượng", "Count"),
        SetupField::Source | SetupField::Start => "",
    }
}

fn field_value(form: &SetupForm, field: SetupField) -> String {
    let lang = form.language;
    match field {
        SetupField::Tab => match form.tab {
            ContentTab::Quiz => "Quiz".to_string(),
            ContentTab::Flashcard => "Flashcard".to_string(),
        },
        SetupField::Language => form.language.display_name().to_string(),
        SetupField::SourceKind => match form.source_kind {
            SourceKind::Text => lang.pick("Văn bản", "Text").to_string(),
            SourceKind::Url => "URL".to_string(),
        },
        SetupField::Mode => match form.mode {
            QuizMode::Practice => lang.pick("Luyện tập", "Practice").to_string(),
            QuizMode::Exam => lang.pick("Kiểm tra", "Exam").to_string(),
        },
        SetupField::Difficulty => form.difficulty.label(lang).to_string(),
        SetupField::Count => form.count.to_string(),
        SetupField::Source | SetupField::Start => String::new(),
    }
}

fn option_lines(form: &SetupForm) -> Vec<Line<'static>> {
    form.fields()
        .iter()
        .filter(|f| !matches!(f, SetupField::Source | SetupField::Start))
        .map(|&field| {
            let focused = form.focus == field;
            let marker = if focused { "▶ " } else { "  " };
            let value_style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{:<16}", field_label(field, form.language)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("◀ {} ▶", field_value(form, field)), value_style),
            ])
        })
        .collect()
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn draw_setup(
    f: &mut Frame,
    form: &SetupForm,
    loading: bool,
    spinner_frame: usize,
    error: Option<&str>,
    ai: &AiStatus,
) {
    let lang = form.language;
    let options = option_lines(form);
    let layout = calculate_setup_chunks(f.area(), options.len() as u16);

    let title = Paragraph::new(format!("Quiz Forge v{}", env!("CARGO_PKG_VERSION")))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, layout.title_area);

    let options_block = Block::default()
        .borders(Borders::ALL)
        .title(lang.pick("Cấu hình", "Settings"));
    f.render_widget(Paragraph::new(options).block(options_block), layout.options_area);

    // Source editor, hard-wrapped so the cursor math matches what is drawn.
    let source_focused = form.focus == SetupField::Source;
    let input = form.source_input();
    let inner_width = layout.source_area.width.saturating_sub(2).max(1) as usize;
    let visible = layout.source_area.height.saturating_sub(2).max(1) as usize;
    let (cursor_row, cursor_col) =
        calculate_wrapped_cursor_position(input.value(), input.cursor(), inner_width);
    let scroll = cursor_row.saturating_sub(visible - 1);

    let source_title = match form.source_kind {
        SourceKind::Text => lang.pick(
            "Nội dung tài liệu (dán hoặc nhập)",
            "Document text (paste or type)",
        ),
        SourceKind::Url => lang.pick("Địa chỉ website", "Website URL"),
    };
    let source_lines: Vec<Line> = if input.value().is_empty() {
        vec![Line::from(Span::styled(
            match form.source_kind {
                SourceKind::Text => {
                    lang.pick("[Nhập nội dung tại đây...]", "[Type your content here...]")
                }
                SourceKind::Url => "https://...",
            },
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))]
    } else {
        wrap_chars(input.value(), inner_width)
            .into_iter()
            .skip(scroll)
            .map(|row| Line::from(row.text))
            .collect()
    };
    let source = Paragraph::new(source_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(source_focused))
            .title(source_title),
    );
    f.render_widget(source, layout.source_area);

    if source_focused {
        let x = layout.source_area.x + 1 + cursor_col as u16;
        let y = layout.source_area.y + 1 + (cursor_row - scroll) as u16;
        f.set_cursor_position((x, y));
    }

    let start_focused = form.focus == SetupField::Start;
    let start_style = if !form.can_submit(loading) {
        Style::default().fg(Color::DarkGray)
    } else if start_focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    let start_label = if loading {
        format!("{} {}", spinner_symbol(spinner_frame), lang.pick("Đang tạo", "Generating"))
    } else {
        lang.pick("Bắt đầu", "Start").to_string()
    };
    let start = Paragraph::new(start_label)
        .style(start_style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(start_focused)),
        );
    f.render_widget(start, layout.start_area);

    let status = if let Some(error) = error {
        Paragraph::new(error.to_string())
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else if loading {
        Paragraph::new(lang.pick(
            "AI đang xử lý nội dung, vui lòng chờ...",
            "AI is processing your content, please wait...",
        ))
        .style(Style::default().fg(Color::Yellow))
    } else if ai.enabled {
        Paragraph::new(format!("AI: {} · {}", lang.pick("Sẵn sàng", "Ready"), ai.model))
            .style(Style::default().fg(Color::Green))
    } else {
        Paragraph::new(format!(
            "AI: {} · {}",
            lang.pick("Chưa cấu hình", "Disabled"),
            lang.pick("Hãy đặt OPENROUTER_API_KEY", "Set OPENROUTER_API_KEY")
        ))
        .style(Style::default().fg(Color::Yellow))
    };
    f.render_widget(
        status.wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(lang.pick("Trạng thái", "Status")),
        ),
        layout.status_area,
    );

    let mut hints = Vec::new();
    hints.extend(key_hint("Tab", lang.pick(" Chuyển ô  ", " Next field  ")));
    hints.extend(key_hint("←/→", lang.pick(" Đổi lựa chọn  ", " Change  ")));
    hints.extend(key_hint("Ctrl+S", lang.pick(" Bắt đầu  ", " Start  ")));
    hints.extend(key_hint("Esc/Ctrl+C", lang.pick(" Thoát", " Quit")));
    f.render_widget(help_bar(vec![Line::from(hints)]), layout.help_area);
}
