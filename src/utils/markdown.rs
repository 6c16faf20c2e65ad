use lazy_static::lazy_static;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;

lazy_static! {
    static ref NUMBERED_RE: Regex = Regex::new(r"^(\d+)[.)]\s+(.*)$").unwrap();
    static ref INLINE_RE: Regex = Regex::new(r"\*\*(.+?)\*\*|\*(.+?)\*|`([^`]+)`").unwrap();
}

/// Renders the light markdown models put into explanations and card backs:
/// headings, bullet and numbered lists, and inline **bold**, *italic* and
/// `code`. Every span starts from `base`.
pub fn render_markdown(content: &str, base: Style) -> Vec<Line<'static>> {
    let heading = base.add_modifier(Modifier::BOLD);
    content
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Line::from("");
            }
            if let Some(text) = strip_heading(trimmed) {
                return Line::from(Span::styled(text.to_string(), heading));
            }
            if let Some(item) = trimmed.strip_prefix("- ").or(trimmed.strip_prefix("* ")) {
                let mut spans = vec![Span::styled("  • ", base)];
                spans.extend(parse_inline(item, base));
                return Line::from(spans);
            }
            if let Some(caps) = NUMBERED_RE.captures(trimmed) {
                let mut spans = vec![Span::styled(format!("  {}. ", &caps[1]), base)];
                spans.extend(parse_inline(&caps[2], base));
                return Line::from(spans);
            }
            Line::from(parse_inline(trimmed, base))
        })
        .collect()
}

fn strip_heading(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches('#');
    let level = line.len() - rest.len();
    if (1..=6).contains(&level) {
        rest.strip_prefix(' ')
    } else {
        None
    }
}

fn parse_inline(text: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Span::styled(text[last..whole.start()].to_string(), base));
        }
        let (inner, style) = if let Some(bold) = caps.get(1) {
            (bold, base.add_modifier(Modifier::BOLD))
        } else if let Some(italic) = caps.get(2) {
            (italic, base.add_modifier(Modifier::ITALIC))
        } else if let Some(code) = caps.get(3) {
            (code, base.add_modifier(Modifier::DIM))
        } else {
            continue;
        };
        spans.push(Span::styled(inner.as_str().to_string(), style));
        last = whole.end();
    }

    if last < text.len() || spans.is_empty() {
        spans.push(Span::styled(text[last..].to_string(), base));
    }
    spans
}
